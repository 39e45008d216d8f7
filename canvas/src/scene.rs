//! Scene model: tokens, drawings, effect flags, camera and initiative.
//!
//! `Scene` is the single source of truth owned by the master view. It is the
//! exact payload of every `sync` frame, so its serde shape is the snapshot
//! wire schema (camelCase keys). Tokens carry only an image *reference*;
//! loaded image handles live in each view's [`crate::images::ImageCache`].
//!
//! All lookups by [`TokenId`] are fallible. A token deleted while selected
//! turns every later operation against that id into a no-op.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::{DEFAULT_GRID_SIZE, MIN_TOKEN_SIZE, TOKEN_SPAWN_X, TOKEN_SPAWN_Y};
use crate::hit;

/// Unique token identifier, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u64);

/// A creature or object marker on the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Side length in grid cells.
    pub size: f64,
    /// Image reference (URI or `blob:` name), if the token has artwork.
    pub img_src: Option<String>,
}

impl Token {
    /// Side length of the token's bounding square in world units.
    #[must_use]
    pub fn extent(&self, grid_size: u32) -> f64 {
        self.size * f64::from(grid_size)
    }

    /// World-space center of the token.
    #[must_use]
    pub fn center(&self, grid_size: u32) -> Point {
        let half = self.extent(grid_size) / 2.0;
        Point::new(self.x + half, self.y + half)
    }
}

/// A committed freehand stroke. Never edited after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub points: Vec<Point>,
    pub color: String,
    pub stroke_width: f64,
}

/// Cosmetic overlay switches.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fx {
    pub rain: bool,
    pub fog: bool,
    pub vignette: bool,
    pub grid: bool,
    pub fire: bool,
}

impl Default for Fx {
    fn default() -> Self {
        Self { rain: false, fog: false, vignette: false, grid: true, fire: false }
    }
}

/// Names one [`Fx`] flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FxKind {
    Rain,
    Fog,
    Vignette,
    Grid,
    Fire,
}

impl Fx {
    #[must_use]
    pub fn get(&self, kind: FxKind) -> bool {
        match kind {
            FxKind::Rain => self.rain,
            FxKind::Fog => self.fog,
            FxKind::Vignette => self.vignette,
            FxKind::Grid => self.grid,
            FxKind::Fire => self.fire,
        }
    }

    fn slot(&mut self, kind: FxKind) -> &mut bool {
        match kind {
            FxKind::Rain => &mut self.rain,
            FxKind::Fog => &mut self.fog,
            FxKind::Vignette => &mut self.vignette,
            FxKind::Grid => &mut self.grid,
            FxKind::Fire => &mut self.fire,
        }
    }

    /// Enabled overlay effects, in paint order. The grid is not an overlay.
    #[must_use]
    pub fn overlays(&self) -> Vec<FxKind> {
        [FxKind::Rain, FxKind::Fog, FxKind::Vignette, FxKind::Fire]
            .into_iter()
            .filter(|k| self.get(*k))
            .collect()
    }
}

/// One combatant in the turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub name: String,
    pub value: i32,
}

/// The shared tabletop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub tokens: Vec<Token>,
    pub drawings: Vec<Drawing>,
    pub fx: Fx,
    pub fog_enabled: bool,
    /// Player-side fog alpha in `[0, 1]`.
    pub fog_opacity: f64,
    /// World units per grid cell. Always positive.
    pub grid_size: u32,
    pub bg_pos: Point,
    pub bg_scale: f64,
    pub map_src: Option<String>,
    pub initiative: Vec<InitiativeEntry>,
    pub active_turn_index: usize,
    #[serde(skip)]
    next_token_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            drawings: Vec::new(),
            fx: Fx::default(),
            fog_enabled: true,
            fog_opacity: 1.0,
            grid_size: DEFAULT_GRID_SIZE,
            bg_pos: Point::default(),
            bg_scale: 1.0,
            map_src: None,
            initiative: Vec::new(),
            active_turn_index: 0,
            next_token_id: 1,
        }
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The master camera described by `bg_pos` / `bg_scale`.
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::from_transform(self.bg_pos, self.bg_scale)
    }

    /// Write a camera back into `bg_pos` / `bg_scale`.
    pub fn set_camera(&mut self, camera: Camera) {
        self.bg_pos = camera.pan();
        self.bg_scale = camera.zoom;
    }

    // --- Tokens ---

    /// Append a token at the spawn point and return its id.
    pub fn add_token(&mut self, name: &str, img_src: Option<String>) -> TokenId {
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        let name = if name.trim().is_empty() { "Token" } else { name };
        self.tokens.push(Token {
            id,
            name: name.to_string(),
            x: TOKEN_SPAWN_X,
            y: TOKEN_SPAWN_Y,
            size: 1.0,
            img_src,
        });
        id
    }

    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }

    pub fn remove_token(&mut self, id: TokenId) -> Option<Token> {
        let idx = self.tokens.iter().position(|t| t.id == id)?;
        Some(self.tokens.remove(idx))
    }

    /// Grow or shrink a token by `delta` cells. Returns false for unknown ids.
    pub fn resize_token(&mut self, id: TokenId, delta: f64) -> bool {
        let Some(token) = self.token_mut(id) else {
            return false;
        };
        token.size = (token.size + delta).max(MIN_TOKEN_SIZE);
        true
    }

    /// Place a token's top-left corner. Returns false for unknown ids.
    pub fn move_token(&mut self, id: TokenId, x: f64, y: f64) -> bool {
        let Some(token) = self.token_mut(id) else {
            return false;
        };
        token.x = x;
        token.y = y;
        true
    }

    /// Topmost token whose bounding square contains `world`.
    #[must_use]
    pub fn token_at(&self, world: Point) -> Option<TokenId> {
        hit::token_at(self, world)
    }

    // --- Drawings ---

    pub fn add_drawing(&mut self, drawing: Drawing) {
        self.drawings.push(drawing);
    }

    pub fn clear_drawings(&mut self) {
        self.drawings.clear();
    }

    // --- Effects, fog, grid, map ---

    pub fn toggle_fx(&mut self, kind: FxKind) {
        let slot = self.fx.slot(kind);
        *slot = !*slot;
    }

    pub fn set_fog_enabled(&mut self, enabled: bool) {
        self.fog_enabled = enabled;
    }

    /// Set the player fog alpha, clamped to `[0, 1]`. NaN is ignored.
    pub fn set_fog_opacity(&mut self, opacity: f64) {
        if opacity.is_nan() {
            return;
        }
        self.fog_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Change the grid cell size. Zero is rejected.
    pub fn set_grid_size(&mut self, grid_size: u32) -> bool {
        if grid_size == 0 {
            return false;
        }
        self.grid_size = grid_size;
        true
    }

    /// Swap the background map and re-home the camera translation.
    pub fn set_map(&mut self, src: Option<String>) {
        self.map_src = src;
        self.bg_pos = Point::default();
    }

    // --- Initiative ---

    /// Append a combatant. Blank names are ignored.
    pub fn add_initiative(&mut self, name: &str, value: i32) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.initiative.push(InitiativeEntry { name: name.to_string(), value });
        true
    }

    /// Highest value first; ties keep insertion order.
    pub fn sort_initiative(&mut self) {
        self.initiative.sort_by(|a, b| b.value.cmp(&a.value));
    }

    /// Drop the entry at `idx`, keeping the active pointer on a valid entry.
    pub fn remove_initiative(&mut self, idx: usize) -> Option<InitiativeEntry> {
        if idx >= self.initiative.len() {
            return None;
        }
        let removed = self.initiative.remove(idx);
        if idx < self.active_turn_index {
            self.active_turn_index -= 1;
        }
        if self.active_turn_index >= self.initiative.len() {
            self.active_turn_index = 0;
        }
        Some(removed)
    }

    pub fn clear_initiative(&mut self) {
        self.initiative.clear();
        self.active_turn_index = 0;
    }

    /// Advance the active pointer, wrapping to the top. No-op on an empty list.
    pub fn next_turn(&mut self) {
        if self.initiative.is_empty() {
            return;
        }
        self.active_turn_index = (self.active_turn_index + 1) % self.initiative.len();
    }

    #[must_use]
    pub fn active_entry(&self) -> Option<&InitiativeEntry> {
        self.initiative.get(self.active_turn_index)
    }
}
