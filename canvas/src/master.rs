//! Master view renderer.
//!
//! Builds one frame of the master's display list from the [`Engine`]. Layers,
//! bottom to top: backdrop or map, grid, committed drawings, the live brush
//! stroke, the fog selection preview, tokens with the selection ring, the
//! translucent fog overlay, the ruler and pings. Effects go on last, outside
//! the camera transform.
//!
//! The master always sees the map through the fog. Its overlay alpha is
//! `0.1 + fog_opacity * 0.5`, so fully fogged areas stay readable.

#[cfg(test)]
#[path = "master_test.rs"]
mod master_test;

use crate::camera::Point;
use crate::consts::{
    BACKDROP_HALF_EXTENT, BACKGROUND_FILL, FOG_HIDE_PREVIEW, FOG_REVEAL_PREVIEW, MASTER_FOG_ALPHA_BASE,
    MASTER_FOG_ALPHA_SPAN, RULER_STROKE, SELECTION_RING, TOKEN_OUTLINE,
};
use crate::engine::Engine;
use crate::input::{format_distance, ruler_distance};
use crate::render::{self, DrawCmd, FogSource, TextAlign};

const TOKEN_OUTLINE_WIDTH: f64 = 2.0;
const SELECTION_RING_GAP: f64 = 5.0;
const SELECTION_RING_WIDTH: f64 = 3.0;
const RULER_WIDTH: f64 = 3.0;
const RULER_DASH: [f64; 2] = [10.0, 5.0];

/// Render one master frame. Takes `&mut` only to queue image loads.
pub fn render(engine: &mut Engine) -> Vec<DrawCmd> {
    let mut out = Vec::new();
    out.push(DrawCmd::Clear);
    let camera = engine.camera();
    render::push_camera(&mut out, &camera);

    draw_map(&mut out, engine);
    if engine.scene.fx.grid {
        render::draw_grid(&mut out, engine.scene.grid_size, engine.fog.width());
    }
    render::draw_drawings(&mut out, &engine.scene.drawings);
    if let Some(path) = engine.brush_path() {
        render::draw_path(&mut out, path, &engine.ui.brush.color, engine.ui.brush.size);
    }
    draw_fog_preview(&mut out, engine);
    draw_tokens(&mut out, engine);

    if engine.ui.show_mask && engine.scene.fog_enabled {
        out.push(DrawCmd::FogLayer {
            source: FogSource::Raster,
            alpha: overlay_alpha(engine.scene.fog_opacity),
            w: f64::from(engine.fog.width()),
            h: f64::from(engine.fog.height()),
        });
    }

    if let Some((start, end)) = engine.ruler_segment() {
        draw_ruler(&mut out, start, end, engine.scene.grid_size);
    }
    render::draw_pings(&mut out, &engine.pings);
    out.push(DrawCmd::PopTransform);

    render::draw_effects(&mut out, &engine.scene.fx);
    out
}

/// Master fog overlay alpha for a player-facing opacity.
#[must_use]
pub fn overlay_alpha(fog_opacity: f64) -> f64 {
    MASTER_FOG_ALPHA_BASE + fog_opacity.clamp(0.0, 1.0) * MASTER_FOG_ALPHA_SPAN
}

fn draw_map(out: &mut Vec<DrawCmd>, engine: &mut Engine) {
    let loaded = match engine.scene.map_src.as_deref() {
        Some(src) => engine.images.resolve(src).cloned(),
        None => None,
    };
    match loaded {
        Some(map) => out.push(DrawCmd::Image {
            reference: map.reference,
            x: 0.0,
            y: 0.0,
            w: f64::from(map.width),
            h: f64::from(map.height),
        }),
        None => out.push(DrawCmd::FillRect {
            x: -BACKDROP_HALF_EXTENT,
            y: -BACKDROP_HALF_EXTENT,
            w: BACKDROP_HALF_EXTENT * 2.0,
            h: BACKDROP_HALF_EXTENT * 2.0,
            color: BACKGROUND_FILL.to_string(),
        }),
    }
}

fn draw_fog_preview(out: &mut Vec<DrawCmd>, engine: &Engine) {
    let Some((rect, reveal)) = engine.fog_preview() else {
        return;
    };
    let (min, max) = rect.normalized();
    let (w, h) = (max.x - min.x, max.y - min.y);
    let fill = if reveal { FOG_REVEAL_PREVIEW } else { FOG_HIDE_PREVIEW };
    out.push(DrawCmd::FillRect { x: min.x, y: min.y, w, h, color: fill.to_string() });
    out.push(DrawCmd::StrokeRect { x: min.x, y: min.y, w, h, color: TOKEN_OUTLINE.to_string(), width: 1.0 });
}

fn draw_tokens(out: &mut Vec<DrawCmd>, engine: &mut Engine) {
    let grid = engine.scene.grid_size;
    let selected = engine.ui.selected;
    for token in &engine.scene.tokens {
        if selected == Some(token.id) {
            out.push(DrawCmd::Ring {
                center: token.center(grid),
                radius: token.extent(grid) / 2.0 + SELECTION_RING_GAP,
                color: SELECTION_RING.to_string(),
                width: SELECTION_RING_WIDTH,
            });
        }
        let image = token.img_src.as_deref().and_then(|src| engine.images.resolve(src));
        render::draw_token(out, token, grid, image, true, TOKEN_OUTLINE_WIDTH);
    }
}

fn draw_ruler(out: &mut Vec<DrawCmd>, start: Point, end: Point, grid_size: u32) {
    out.push(DrawCmd::Polyline {
        points: vec![start, end],
        color: RULER_STROKE.to_string(),
        width: RULER_WIDTH,
        dash: Some(RULER_DASH),
    });
    out.push(DrawCmd::FillRect { x: end.x + 10.0, y: end.y - 25.0, w: 60.0, h: 20.0, color: "#000".to_string() });
    out.push(DrawCmd::Text {
        x: end.x + 15.0,
        y: end.y - 10.0,
        text: format_distance(ruler_distance(start, end, grid_size)),
        color: RULER_STROKE.to_string(),
        font: "bold 14px Arial".to_string(),
        align: TextAlign::Left,
    });
}
