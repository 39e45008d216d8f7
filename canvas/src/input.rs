//! Input model: tools, modifier keys, and the gesture state machine.
//!
//! This module defines the types consumed by the master engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying the context needed to apply incremental updates and
//! commit the final mutation on release. `DragState` is the raw drag record in
//! screen space that previews read from.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_SIZE, DISTANCE_PER_CELL};
use crate::scene::TokenId;

/// Which tool is currently active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Drag the camera (default).
    #[default]
    Pan,
    /// Pick and move tokens.
    Select,
    /// Freehand strokes.
    Draw,
    /// Drag a rectangle to clear fog.
    FogReveal,
    /// Drag a rectangle to restore fog.
    FogHide,
    /// Measure a distance.
    Ruler,
}

impl Tool {
    /// CSS cursor the host should show while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Pan => "grab",
            Self::Select => "default",
            Self::Draw | Self::FogReveal | Self::FogHide | Self::Ruler => "crosshair",
        }
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held. Turns a press into a ping.
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    #[serde(default)]
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = away from the user).
    pub dy: f64,
}

/// Freehand stroke settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub color: String,
    pub size: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { color: DEFAULT_BRUSH_COLOR.to_string(), size: DEFAULT_BRUSH_SIZE }
    }
}

/// Master-only UI state. Never broadcast.
#[derive(Debug, Clone)]
pub struct UiState {
    pub tool: Tool,
    /// Lookup key of the selected token. May name a token that no longer exists.
    pub selected: Option<TokenId>,
    pub brush: Brush,
    /// Show the dimmed fog overlay on the master view.
    pub show_mask: bool,
    /// Ask players to mirror the master camera.
    pub sync_view: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::default(), selected: None, brush: Brush::default(), show_mask: true, sync_view: false }
    }
}

/// Raw drag record, in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    /// Anchor for the next incremental delta. Pans rebase it every move.
    pub start: Point,
    /// Latest pointer position.
    pub current: Point,
    /// World-space grab offset from a dragged token's corner to the pointer.
    pub offset: Point,
}

/// Internal state for the input state machine.
///
/// Each active variant carries the gesture context needed to update the scene
/// while moving and to commit on pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the camera. `temporary` marks a select-mode press on empty space.
    Panning { temporary: bool },
    /// Moving a token. The id may go stale mid-drag; moves then do nothing.
    DraggingToken { id: TokenId },
    /// Laying down a freehand path in world space.
    Drawing { path: Vec<Point> },
    /// Sizing a fog rectangle from a world-space anchor.
    MarkingFog { anchor: Point, reveal: bool },
    /// Measuring from `start` to `end`, both world space.
    Measuring { start: Point, end: Point },
}

impl InputState {
    /// Gesture opened by a pointer-down for `tool` at `world`.
    ///
    /// `hit` is the token under the pointer and only matters for `Select`:
    /// a miss there pans for this one drag instead of doing nothing.
    #[must_use]
    pub fn begin(tool: Tool, world: Point, hit: Option<TokenId>) -> Self {
        match (tool, hit) {
            (Tool::Pan, _) => Self::Panning { temporary: false },
            (Tool::Select, Some(id)) => Self::DraggingToken { id },
            (Tool::Select, None) => Self::Panning { temporary: true },
            (Tool::Draw, _) => Self::Drawing { path: vec![world] },
            (Tool::FogReveal, _) => Self::MarkingFog { anchor: world, reveal: true },
            (Tool::FogHide, _) => Self::MarkingFog { anchor: world, reveal: false },
            (Tool::Ruler, _) => Self::Measuring { start: world, end: world },
        }
    }
}

/// Ruler distance in table units: pixels over grid size, times 1.5 per cell.
#[must_use]
pub fn ruler_distance(start: Point, end: Point, grid_size: u32) -> f64 {
    start.distance(end) / f64::from(grid_size.max(1)) * DISTANCE_PER_CELL
}

/// Ruler readout, one decimal place.
#[must_use]
pub fn format_distance(distance: f64) -> String {
    format!("{distance:.1}m")
}
