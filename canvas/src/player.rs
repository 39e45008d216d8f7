//! Player view: a read-only mirror of the master's scene.
//!
//! DESIGN
//! ======
//! A player holds the last snapshot, the last fog image and its own camera.
//! Every frame is applied last-write-wins; nothing is merged or reordered.
//! While the master has `syncView` on, every snapshot overwrites the camera
//! and local pan/zoom input is ignored. With it off the player navigates
//! freely, starting from wherever the last synced camera left it.
//!
//! Players never learn anything the master did not send: tokens under fog
//! are drawn, then covered by the received fog image at `fog_opacity`.
//!
//! ERROR HANDLING
//! ==============
//! A fog image that fails to decode is reported to the caller and the
//! previous fog stays in place.

#[cfg(test)]
#[path = "player_test.rs"]
mod player_test;

use crate::camera::{Camera, Point, wheel_factor};
use crate::consts::{FOG_EXTENT, PLAYER_PING_RADIUS};
use crate::fog::{FogError, FogImage};
use crate::images::{ImageCache, ImageError, LoadedImage};
use crate::input::{DragState, WheelDelta};
use crate::ping::{self, Ping};
use crate::protocol::Message;
use crate::render::{self, DrawCmd, FogSource};
use crate::scene::Scene;

const TOKEN_OUTLINE_WIDTH: f64 = 1.0;

/// Pointer input aimed at one player view, in that view's screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Wheel(WheelDelta),
}

#[derive(Debug, Default)]
pub struct PlayerView {
    snapshot: Option<Scene>,
    sync_view: bool,
    fog: Option<FogImage>,
    images: ImageCache,
    camera: Camera,
    pings: Vec<Ping>,
    drag: DragState,
}

impl PlayerView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Channel ---

    /// Apply one received message.
    ///
    /// # Errors
    ///
    /// Returns [`FogError`] when a `fogUpdate` image cannot be decoded. The
    /// previous fog image is kept.
    pub fn apply(&mut self, message: Message) -> Result<(), FogError> {
        match message {
            Message::Sync { state, sync_view } => {
                if self.snapshot.is_none() || sync_view {
                    self.camera = state.camera();
                }
                self.sync_view = sync_view;
                self.snapshot = Some(state);
            }
            Message::FogUpdate { data, width, height } => {
                self.fog = Some(FogImage::decode(&data, width, height)?);
            }
            Message::Ping { x, y } => {
                self.pings.push(Ping::new(Point::new(x, y), PLAYER_PING_RADIUS));
            }
        }
        Ok(())
    }

    // --- Queries ---

    #[must_use]
    pub fn snapshot(&self) -> Option<&Scene> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn fog(&self) -> Option<&FogImage> {
        self.fog.as_ref()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.sync_view
    }

    #[must_use]
    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    // --- Local navigation ---

    pub fn handle_input(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::PointerDown(screen) => self.on_pointer_down(screen),
            PlayerInput::PointerMove(screen) => self.on_pointer_move(screen),
            PlayerInput::PointerUp => self.on_pointer_up(),
            PlayerInput::Wheel(delta) => self.on_wheel(delta),
        }
    }

    pub fn on_pointer_down(&mut self, screen: Point) {
        self.drag = DragState { active: true, start: screen, current: screen, offset: Point::default() };
    }

    /// Pan by the pointer delta unless the master drives the camera.
    pub fn on_pointer_move(&mut self, screen: Point) {
        if !self.drag.active || self.sync_view {
            return;
        }
        self.camera.pan_by(screen.x - self.drag.start.x, screen.y - self.drag.start.y);
        self.drag.start = screen;
        self.drag.current = screen;
    }

    pub fn on_pointer_up(&mut self) {
        self.drag.active = false;
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) {
        if self.sync_view || delta.dy == 0.0 {
            return;
        }
        self.camera.zoom_by(wheel_factor(delta.dy));
    }

    // --- Images ---

    /// Drain image references the renderer could not resolve yet.
    pub fn take_image_requests(&mut self) -> Vec<String> {
        self.images.take_requests()
    }

    pub fn fulfil_image(&mut self, reference: &str, result: Result<LoadedImage, ImageError>) {
        self.images.fulfil(reference, result);
    }

    // --- Frame ---

    /// World square the grid covers: the received fog extent, or the default
    /// raster extent before any fog has arrived.
    fn grid_extent(&self) -> u32 {
        self.fog.as_ref().map_or(FOG_EXTENT, |fog| fog.width.max(fog.height))
    }

    /// Render one frame and advance pings. Nothing but a clear before the first snapshot.
    pub fn tick(&mut self) -> Vec<DrawCmd> {
        let mut out = vec![DrawCmd::Clear];
        if let Some(scene) = &self.snapshot {
            render::push_camera(&mut out, &self.camera);

            if let Some(map) = scene.map_src.as_deref().and_then(|src| self.images.resolve(src)) {
                out.push(DrawCmd::Image {
                    reference: map.reference.clone(),
                    x: 0.0,
                    y: 0.0,
                    w: f64::from(map.width),
                    h: f64::from(map.height),
                });
            }
            if scene.fx.grid {
                render::draw_grid(&mut out, scene.grid_size, self.grid_extent());
            }
            render::draw_drawings(&mut out, &scene.drawings);
            for token in &scene.tokens {
                let image = token.img_src.as_deref().and_then(|src| self.images.resolve(src));
                render::draw_token(&mut out, token, scene.grid_size, image, false, TOKEN_OUTLINE_WIDTH);
            }
            if let (true, Some(fog)) = (scene.fog_enabled, &self.fog) {
                out.push(DrawCmd::FogLayer {
                    source: FogSource::Received,
                    alpha: scene.fog_opacity,
                    w: f64::from(fog.width),
                    h: f64::from(fog.height),
                });
            }
            render::draw_pings(&mut out, &self.pings);
            out.push(DrawCmd::PopTransform);
            render::draw_effects(&mut out, &scene.fx);
        }
        ping::advance_all(&mut self.pings);
        out
    }
}
