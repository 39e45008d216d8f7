//! Master engine: owns the scene, the fog raster and the tool state machine.
//!
//! Every pointer event and toolbar command goes through [`Engine`]. Handlers
//! mutate state in place and return [`Action`]s telling the host what to
//! publish or update; the engine itself never performs I/O.

use crate::camera::{Camera, Point, wheel_factor};
use crate::consts::{FOG_EXTENT, MASTER_PING_RADIUS};
use crate::fog::{FogRaster, FogRect};
use crate::images::ImageCache;
use crate::input::{DragState, InputState, Modifiers, Tool, UiState, WheelDelta};
use crate::ping::{self, Ping};
use crate::scene::{Drawing, FxKind, Scene, Token, TokenId};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A ping was raised at this world position; publish it.
    PingEmitted(Point),
    /// The fog raster changed; serialize and publish it.
    FogChanged,
    /// The selected token changed.
    SelectionChanged(Option<TokenId>),
    /// A freehand stroke was committed to the scene.
    DrawingCommitted,
    /// The host should switch the pointer cursor.
    SetCursor(&'static str),
    /// Publish a snapshot now instead of waiting for the next tick.
    BroadcastNow,
}

/// Master-side engine state.
pub struct Engine {
    pub scene: Scene,
    pub fog: FogRaster,
    pub ui: UiState,
    pub input: InputState,
    pub drag: DragState,
    pub pings: Vec<Ping>,
    pub images: ImageCache,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(FOG_EXTENT)
    }
}

impl Engine {
    /// Start a session with an undiscovered fog raster of side `fog_extent`.
    #[must_use]
    pub fn new(fog_extent: u32) -> Self {
        Self {
            scene: Scene::new(),
            fog: FogRaster::new(fog_extent),
            ui: UiState::default(),
            input: InputState::default(),
            drag: DragState::default(),
            pings: Vec::new(),
            images: ImageCache::new(),
        }
    }

    // --- Queries ---

    /// The master camera.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.scene.camera()
    }

    /// Id of the selected token, which may be stale.
    #[must_use]
    pub fn selection(&self) -> Option<TokenId> {
        self.ui.selected
    }

    /// The selected token, if it still exists.
    #[must_use]
    pub fn selected_token(&self) -> Option<&Token> {
        self.ui.selected.and_then(|id| self.scene.token(id))
    }

    fn to_world(&self, screen: Point) -> Point {
        self.camera().screen_to_world(screen)
    }

    /// In-progress fog rectangle in world space, with `true` for reveal.
    #[must_use]
    pub fn fog_preview(&self) -> Option<(FogRect, bool)> {
        match self.input {
            InputState::MarkingFog { anchor, reveal } if self.drag.active => {
                Some((FogRect::new(anchor, self.to_world(self.drag.current)), reveal))
            }
            _ => None,
        }
    }

    /// Active ruler segment in world space.
    #[must_use]
    pub fn ruler_segment(&self) -> Option<(Point, Point)> {
        match self.input {
            InputState::Measuring { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// Freehand path being drawn.
    #[must_use]
    pub fn brush_path(&self) -> Option<&[Point]> {
        match &self.input {
            InputState::Drawing { path } => Some(path),
            _ => None,
        }
    }

    // --- Pointer input ---

    /// Pointer pressed at `screen` (pixels relative to the canvas).
    pub fn on_pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.to_world(screen);
        if modifiers.shift {
            return self.trigger_ping(world);
        }

        self.drag = DragState { active: true, start: screen, current: screen, offset: Point::default() };

        let tool = self.ui.tool;
        let hit = if tool == Tool::Select { self.scene.token_at(world) } else { None };
        self.input = InputState::begin(tool, world, hit);

        let mut actions = Vec::new();
        if tool == Tool::Select {
            if let Some(token) = hit.and_then(|id| self.scene.token(id)) {
                self.drag.offset = Point::new(world.x - token.x, world.y - token.y);
            }
            self.ui.selected = hit;
            actions.push(Action::SelectionChanged(hit));
        }
        actions
    }

    /// Pointer moved. Ignored unless a drag is active.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        if !self.drag.active {
            return Vec::new();
        }
        let world = self.to_world(screen);
        self.drag.current = screen;

        match &mut self.input {
            InputState::Panning { .. } => {
                let mut camera = self.scene.camera();
                camera.pan_by(screen.x - self.drag.start.x, screen.y - self.drag.start.y);
                self.scene.set_camera(camera);
                self.drag.start = screen;
            }
            InputState::DraggingToken { id } => {
                let offset = self.drag.offset;
                self.scene.move_token(*id, world.x - offset.x, world.y - offset.y);
            }
            InputState::Drawing { path } => path.push(world),
            InputState::Measuring { end, .. } => *end = world,
            InputState::MarkingFog { .. } | InputState::Idle => {}
        }
        Vec::new()
    }

    /// Pointer released. Commits whatever the gesture produced.
    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        if !self.drag.active {
            return Vec::new();
        }
        let world = self.to_world(screen);
        self.drag.active = false;
        self.drag.current = screen;

        match std::mem::take(&mut self.input) {
            InputState::Drawing { path } => {
                if path.is_empty() {
                    return Vec::new();
                }
                self.scene.add_drawing(Drawing {
                    points: path,
                    color: self.ui.brush.color.clone(),
                    stroke_width: self.ui.brush.size,
                });
                vec![Action::DrawingCommitted]
            }
            InputState::MarkingFog { anchor, reveal } => {
                let rect = FogRect::new(anchor, world);
                let changed = if reveal { self.fog.reveal(rect) } else { self.fog.hide(rect) };
                if changed { vec![Action::FogChanged] } else { Vec::new() }
            }
            InputState::Panning { .. }
            | InputState::DraggingToken { .. }
            | InputState::Measuring { .. }
            | InputState::Idle => Vec::new(),
        }
    }

    /// Wheel zoom. Scrolling away zooms out, towards zooms in.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let mut camera = self.scene.camera();
        camera.zoom_by(wheel_factor(delta.dy));
        self.scene.set_camera(camera);
        Vec::new()
    }

    // --- Tools and commands ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        vec![Action::SetCursor(tool.cursor())]
    }

    /// Raise a ping locally and ask the host to publish it.
    pub fn trigger_ping(&mut self, world: Point) -> Vec<Action> {
        self.pings.push(Ping::new(world, MASTER_PING_RADIUS));
        vec![Action::PingEmitted(world)]
    }

    pub fn create_token(&mut self, name: &str, img_src: Option<String>) -> TokenId {
        self.scene.add_token(name, img_src)
    }

    /// Select a token from outside the canvas (e.g. a token list). Switches to `Select`.
    pub fn select_token(&mut self, id: TokenId) -> Vec<Action> {
        if self.scene.token(id).is_none() {
            return Vec::new();
        }
        self.ui.selected = Some(id);
        let mut actions = vec![Action::SelectionChanged(Some(id))];
        actions.extend(self.set_tool(Tool::Select));
        actions
    }

    pub fn delete_selected_token(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected.take() else {
            return Vec::new();
        };
        self.scene.remove_token(id);
        vec![Action::SelectionChanged(None)]
    }

    /// Resize the selected token. False when nothing (live) is selected.
    pub fn resize_selected_token(&mut self, delta: f64) -> bool {
        self.ui.selected.is_some_and(|id| self.scene.resize_token(id, delta))
    }

    pub fn clear_drawings(&mut self) {
        self.scene.clear_drawings();
    }

    pub fn toggle_fx(&mut self, kind: FxKind) {
        self.scene.toggle_fx(kind);
    }

    pub fn reset_fog(&mut self, cover_all: bool) -> Vec<Action> {
        self.fog.reset(cover_all);
        vec![Action::FogChanged]
    }

    /// Change player fog alpha and push it out without waiting for a tick.
    pub fn set_fog_opacity(&mut self, opacity: f64) -> Vec<Action> {
        self.scene.set_fog_opacity(opacity);
        vec![Action::BroadcastNow]
    }

    pub fn set_fog_enabled(&mut self, enabled: bool) {
        self.scene.set_fog_enabled(enabled);
    }

    pub fn set_mask_visible(&mut self, visible: bool) {
        self.ui.show_mask = visible;
    }

    pub fn set_sync_view(&mut self, enabled: bool) {
        self.ui.sync_view = enabled;
    }

    pub fn set_brush(&mut self, color: &str, size: f64) {
        self.ui.brush.color = color.to_string();
        if size.is_finite() && size > 0.0 {
            self.ui.brush.size = size;
        }
    }

    pub fn set_map(&mut self, src: Option<String>) {
        self.scene.set_map(src);
    }

    // --- Tick ---

    /// Per-tick transient state: ping decay.
    pub fn tick(&mut self) {
        ping::advance_all(&mut self.pings);
    }
}
