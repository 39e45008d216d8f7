//! Scene, fog-of-war and input engine for the shared tabletop.
//!
//! This crate is synchronous and free of I/O. It owns the master's editable
//! scene, the occlusion raster, the pointer-driven tool state machine, the
//! wire codec for the master-to-player sync channel, and both renderers. The
//! renderers produce backend-neutral display lists; the host decides how to
//! paint them and how to move frames between views.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Master engine state and the pointer/command handlers |
//! | [`scene`] | Scene state: tokens, drawings, effects, initiative |
//! | [`fog`] | Occlusion raster and its image artifact |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tools, modifiers and the gesture state machine |
//! | [`hit`] | Token hit-testing |
//! | [`ping`] | Transient decaying ping markers |
//! | [`images`] | Lazy image reference cache |
//! | [`protocol`] | Sync channel messages and frame codec |
//! | [`render`] | Display list commands and shared drawing layers |
//! | [`master`] | Master view renderer |
//! | [`player`] | Player view state and renderer |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod fog;
pub mod hit;
pub mod images;
pub mod input;
pub mod master;
pub mod ping;
pub mod player;
pub mod protocol;
pub mod render;
pub mod scene;
