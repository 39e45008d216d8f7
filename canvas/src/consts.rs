//! Shared numeric constants for the canvas crate.

// ── Scene ───────────────────────────────────────────────────────

/// Default world units per grid cell.
pub const DEFAULT_GRID_SIZE: u32 = 50;

/// Distance units (metres) covered by one grid cell.
pub const DISTANCE_PER_CELL: f64 = 1.5;

/// Smallest token size multiplier reachable through resizing.
pub const MIN_TOKEN_SIZE: f64 = 0.5;

/// Where freshly created tokens appear, in world units.
pub const TOKEN_SPAWN_X: f64 = 100.0;
pub const TOKEN_SPAWN_Y: f64 = 100.0;

// ── Fog ─────────────────────────────────────────────────────────

/// Side length of the square occlusion raster. Covers the largest supported map.
pub const FOG_EXTENT: u32 = 4000;

/// Raster value for an undiscovered pixel.
pub const FOG_OPAQUE: u8 = 255;

/// Raster value for a revealed pixel.
pub const FOG_CLEAR: u8 = 0;

/// Floor of the master's fog overlay alpha, so covered areas stay visible.
pub const MASTER_FOG_ALPHA_BASE: f64 = 0.1;

/// How much of `fog_opacity` carries into the master's overlay alpha.
pub const MASTER_FOG_ALPHA_SPAN: f64 = 0.5;

// ── Camera ──────────────────────────────────────────────────────

/// Scale multiplier for one wheel notch towards the user (zoom in).
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Scale multiplier for one wheel notch away from the user (zoom out).
pub const ZOOM_OUT_FACTOR: f64 = 1.0 / ZOOM_IN_FACTOR;

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 20.0;

// ── Pings ───────────────────────────────────────────────────────

/// Starting ring radius for a ping raised locally on the master view.
pub const MASTER_PING_RADIUS: f64 = 5.0;

/// Starting ring radius for a ping received by a player view.
pub const PLAYER_PING_RADIUS: f64 = 10.0;

/// Radius growth per tick.
pub const PING_GROWTH: f64 = 2.0;

/// Alpha lost per tick.
pub const PING_DECAY: f64 = 0.03;

// ── Colors ──────────────────────────────────────────────────────

pub const BACKGROUND_FILL: &str = "#0b0c10";
pub const GRID_STROKE: &str = "rgba(255,255,255,0.1)";
pub const TOKEN_FALLBACK_FILL: &str = "#f00";
pub const TOKEN_OUTLINE: &str = "#fff";
pub const SELECTION_RING: &str = "#66fcf1";
pub const RULER_STROKE: &str = "#fbbf24";
pub const PING_RGB: (u8, u8, u8) = (102, 252, 241);
pub const FOG_REVEAL_PREVIEW: &str = "rgba(100,255,100,0.3)";
pub const FOG_HIDE_PREVIEW: &str = "rgba(255,100,100,0.3)";
pub const DEFAULT_BRUSH_COLOR: &str = "#ff0000";
pub const DEFAULT_BRUSH_SIZE: f64 = 5.0;

/// Half-extent of the dark backdrop drawn when no map is loaded.
pub const BACKDROP_HALF_EXTENT: f64 = 5000.0;
