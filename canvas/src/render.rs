//! Rendering: display-list commands and the drawing layers both views share.
//!
//! Renderers never touch a graphics backend. They append [`DrawCmd`]s to a
//! `Vec` from read-only views of scene and camera state; the host replays the
//! list on whatever surface it owns (a 2D canvas, a texture, a test). Layer
//! order is the caller's responsibility: later commands paint on top.
//!
//! Coordinates inside a `PushTransform` / `PopTransform` pair are world space.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point};
use crate::consts::{GRID_STROKE, PING_RGB, TOKEN_FALLBACK_FILL, TOKEN_OUTLINE};
use crate::images::LoadedImage;
use crate::ping::Ping;
use crate::scene::{Drawing, Fx, FxKind, Token};

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Which fog bitmap a [`DrawCmd::FogLayer`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogSource {
    /// The master's live raster.
    Raster,
    /// The last `fogUpdate` image a player received.
    Received,
}

/// A single, stateless render instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Wipe the whole surface.
    Clear,
    /// Apply translation then uniform scale until the matching `PopTransform`.
    PushTransform { translate: Point, scale: f64 },
    PopTransform,
    FillRect { x: f64, y: f64, w: f64, h: f64, color: String },
    StrokeRect { x: f64, y: f64, w: f64, h: f64, color: String, width: f64 },
    /// Open path through `points`, round caps. A single point draws a dot.
    Polyline { points: Vec<Point>, color: String, width: f64, dash: Option<[f64; 2]> },
    /// Square grid from the origin to `extent` on both axes.
    Grid { spacing: f64, extent: f64, color: String },
    /// Circle outline.
    Ring { center: Point, radius: f64, color: String, width: f64 },
    /// Restrict drawing to a circle until `PopClip`.
    PushClipCircle { center: Point, radius: f64 },
    PopClip,
    Image { reference: String, x: f64, y: f64, w: f64, h: f64 },
    Text { x: f64, y: f64, text: String, color: String, font: String, align: TextAlign },
    /// Composite a fog bitmap at the world origin, stretched to `w` × `h`.
    FogLayer { source: FogSource, alpha: f64, w: f64, h: f64 },
    /// Full-surface cosmetic overlay.
    Effect(FxKind),
}

/// Open the camera transform.
pub fn push_camera(out: &mut Vec<DrawCmd>, camera: &Camera) {
    out.push(DrawCmd::PushTransform { translate: camera.pan(), scale: camera.zoom });
}

/// Grid lines over the `[0, extent)` world square the fog raster covers.
pub fn draw_grid(out: &mut Vec<DrawCmd>, grid_size: u32, extent: u32) {
    out.push(DrawCmd::Grid {
        spacing: f64::from(grid_size.max(1)),
        extent: f64::from(extent),
        color: GRID_STROKE.to_string(),
    });
}

pub fn draw_path(out: &mut Vec<DrawCmd>, points: &[Point], color: &str, width: f64) {
    if points.is_empty() {
        return;
    }
    out.push(DrawCmd::Polyline { points: points.to_vec(), color: color.to_string(), width, dash: None });
}

pub fn draw_drawings(out: &mut Vec<DrawCmd>, drawings: &[Drawing]) {
    for d in drawings {
        draw_path(out, &d.points, &d.color, d.stroke_width);
    }
}

/// Token as a clipped circle: artwork when loaded, a red placeholder otherwise.
///
/// `label` adds the name's first letter to the placeholder.
pub fn draw_token(
    out: &mut Vec<DrawCmd>,
    token: &Token,
    grid_size: u32,
    image: Option<&LoadedImage>,
    label: bool,
    outline_width: f64,
) {
    let extent = token.extent(grid_size);
    let center = token.center(grid_size);
    let radius = extent / 2.0;

    out.push(DrawCmd::PushClipCircle { center, radius });
    if let Some(img) = image {
        out.push(DrawCmd::Image { reference: img.reference.clone(), x: token.x, y: token.y, w: extent, h: extent });
    } else if token.img_src.is_none() || label {
        out.push(DrawCmd::FillRect { x: token.x, y: token.y, w: extent, h: extent, color: TOKEN_FALLBACK_FILL.to_string() });
        if label {
            if let Some(initial) = token.name.chars().next() {
                out.push(DrawCmd::Text {
                    x: center.x,
                    y: center.y + 8.0,
                    text: initial.to_string(),
                    color: TOKEN_OUTLINE.to_string(),
                    font: "bold 20px Arial".to_string(),
                    align: TextAlign::Center,
                });
            }
        }
    }
    out.push(DrawCmd::PopClip);
    out.push(DrawCmd::Ring { center, radius, color: TOKEN_OUTLINE.to_string(), width: outline_width });
}

pub fn draw_pings(out: &mut Vec<DrawCmd>, pings: &[Ping]) {
    let (r, g, b) = PING_RGB;
    for p in pings {
        out.push(DrawCmd::Ring {
            center: Point::new(p.x, p.y),
            radius: p.radius,
            color: format!("rgba({r}, {g}, {b}, {:.2})", p.alpha.max(0.0)),
            width: 3.0,
        });
    }
}

pub fn draw_effects(out: &mut Vec<DrawCmd>, fx: &Fx) {
    out.extend(fx.overlays().into_iter().map(DrawCmd::Effect));
}
