#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Camera state for pan/zoom over the tabletop.
///
/// `pan_x` / `pan_y` are in screen pixels.
/// `zoom` is a uniform scale factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Build a camera from a translation and uniform scale.
    #[must_use]
    pub fn from_transform(pos: Point, scale: f64) -> Self {
        Self { pan_x: pos.x, pan_y: pos.y, zoom: scale }
    }

    /// The translation component as a point.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Convert a screen-space point (pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Shift the translation by a screen-space delta. A move that would leave
    /// the translation non-finite is ignored.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (x, y) = (self.pan_x + dx, self.pan_y + dy);
        if x.is_finite() && y.is_finite() {
            self.pan_x = x;
            self.pan_y = y;
        }
    }

    /// Multiply the scale by `factor`, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = clamp_zoom(self.zoom * factor);
    }
}

/// Scale multiplier for a single wheel event. Positive `dy` scrolls away (zoom out).
#[must_use]
pub fn wheel_factor(dy: f64) -> f64 {
    if dy > 0.0 { ZOOM_OUT_FACTOR } else { ZOOM_IN_FACTOR }
}

/// Keep a scale factor strictly positive and bounded.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
