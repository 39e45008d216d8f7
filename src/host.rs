//! Host events: the input side of a session.
//!
//! The host (a UI shell, a script, a test) drives the session with JSON
//! lines, one [`HostEvent`] per line, `type`-tagged:
//!
//! ```text
//! {"type":"tool","tool":"fog-reveal"}
//! {"type":"pointerDown","x":120,"y":80,"modifiers":{"shift":false}}
//! {"type":"pointerUp","x":300,"y":240}
//! {"type":"openPlayer"}
//! {"type":"playerWheel","player":"6f1c2d3e-4a5b-4c6d-8e7f-001122334455","dy":-1}
//! ```
//!
//! Canvas events map straight onto [`Engine`] handlers. Everything that
//! needs the session (player views, stores, dice) comes back as a
//! [`SessionCommand`].

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use canvas::camera::Point;
use canvas::engine::{Action, Engine};
use canvas::input::{Modifiers, Tool, WheelDelta};
use canvas::player::PlayerInput;
use canvas::scene::{FxKind, TokenId};
use serde::Deserialize;
use uuid::Uuid;

/// Error returned when a host line cannot be understood.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid host event: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostEvent {
    // --- Pointer (screen pixels) ---
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    Wheel {
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    Resize { width: f64, height: f64 },

    // --- Tools ---
    Tool { tool: Tool },
    Brush { color: String, size: f64 },
    /// Ping at a world position, as from a toolbar button.
    Ping { x: f64, y: f64 },

    // --- Tokens ---
    CreateToken {
        name: String,
        #[serde(default)]
        img_src: Option<String>,
    },
    SelectToken { id: u64 },
    DeleteToken,
    ResizeToken { delta: f64 },

    // --- Scene ---
    ClearDrawings,
    ToggleFx { fx: FxKind },
    SetMap {
        #[serde(default)]
        src: Option<String>,
    },
    GridSize { size: u32 },

    // --- Fog ---
    FogEnabled { enabled: bool },
    FogOpacity { value: f64 },
    ResetFog { cover: bool },
    ShowMask { visible: bool },
    SyncView { enabled: bool },

    // --- Initiative ---
    AddInitiative { name: String, value: i32 },
    SortInitiative,
    RemoveInitiative { index: usize },
    NextTurn,
    ClearInitiative,

    // --- Player views (that view's screen pixels) ---
    PlayerPointerDown { player: Uuid, x: f64, y: f64 },
    PlayerPointerMove { player: Uuid, x: f64, y: f64 },
    PlayerPointerUp { player: Uuid },
    PlayerWheel {
        player: Uuid,
        #[serde(default)]
        dx: f64,
        dy: f64,
    },

    // --- Session ---
    OpenPlayer,
    Roll { expr: String },
    SetNote { key: String, value: String },
    GetNote { key: String },
    /// Upload a file to the blob store. `data` is base64.
    Upload { name: String, mime_type: String, data: String },
    ListFiles,
}

/// Work the engine cannot do on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    OpenPlayer,
    PlayerInput { player: Uuid, input: PlayerInput },
    Roll { expr: String },
    SetNote { key: String, value: String },
    GetNote { key: String },
    Upload { name: String, mime_type: String, data: String },
    ListFiles,
}

/// Where an event ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Applied to the engine; these actions need handling.
    Engine(Vec<Action>),
    Session(SessionCommand),
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`HostError::Parse`] for malformed JSON or an unknown event type.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, HostError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Apply an event to the engine, or hand it back as a session command.
pub fn dispatch(engine: &mut Engine, event: HostEvent) -> Dispatch {
    let actions = match event {
        HostEvent::PointerDown { x, y, modifiers } => engine.on_pointer_down(Point::new(x, y), modifiers),
        HostEvent::PointerMove { x, y } => engine.on_pointer_move(Point::new(x, y)),
        HostEvent::PointerUp { x, y } => engine.on_pointer_up(Point::new(x, y)),
        HostEvent::Wheel { dx, dy } => engine.on_wheel(WheelDelta { dx, dy }),
        // The engine works in world units; the surface size is the host's concern.
        HostEvent::Resize { .. } => Vec::new(),
        HostEvent::Tool { tool } => engine.set_tool(tool),
        HostEvent::Brush { color, size } => {
            engine.set_brush(&color, size);
            Vec::new()
        }
        HostEvent::Ping { x, y } => engine.trigger_ping(Point::new(x, y)),
        HostEvent::CreateToken { name, img_src } => {
            engine.create_token(&name, img_src);
            Vec::new()
        }
        HostEvent::SelectToken { id } => engine.select_token(TokenId(id)),
        HostEvent::DeleteToken => engine.delete_selected_token(),
        HostEvent::ResizeToken { delta } => {
            engine.resize_selected_token(delta);
            Vec::new()
        }
        HostEvent::ClearDrawings => {
            engine.clear_drawings();
            Vec::new()
        }
        HostEvent::ToggleFx { fx } => {
            engine.toggle_fx(fx);
            Vec::new()
        }
        HostEvent::SetMap { src } => {
            engine.set_map(src);
            Vec::new()
        }
        HostEvent::GridSize { size } => {
            engine.scene.set_grid_size(size);
            Vec::new()
        }
        HostEvent::FogEnabled { enabled } => {
            engine.set_fog_enabled(enabled);
            Vec::new()
        }
        HostEvent::FogOpacity { value } => engine.set_fog_opacity(value),
        HostEvent::ResetFog { cover } => engine.reset_fog(cover),
        HostEvent::ShowMask { visible } => {
            engine.set_mask_visible(visible);
            Vec::new()
        }
        HostEvent::SyncView { enabled } => {
            engine.set_sync_view(enabled);
            Vec::new()
        }
        HostEvent::AddInitiative { name, value } => {
            engine.scene.add_initiative(&name, value);
            Vec::new()
        }
        HostEvent::SortInitiative => {
            engine.scene.sort_initiative();
            Vec::new()
        }
        HostEvent::RemoveInitiative { index } => {
            engine.scene.remove_initiative(index);
            Vec::new()
        }
        HostEvent::NextTurn => {
            engine.scene.next_turn();
            Vec::new()
        }
        HostEvent::ClearInitiative => {
            engine.scene.clear_initiative();
            Vec::new()
        }
        HostEvent::PlayerPointerDown { player, x, y } => {
            return player_input(player, PlayerInput::PointerDown(Point::new(x, y)));
        }
        HostEvent::PlayerPointerMove { player, x, y } => {
            return player_input(player, PlayerInput::PointerMove(Point::new(x, y)));
        }
        HostEvent::PlayerPointerUp { player } => return player_input(player, PlayerInput::PointerUp),
        HostEvent::PlayerWheel { player, dx, dy } => {
            return player_input(player, PlayerInput::Wheel(WheelDelta { dx, dy }));
        }
        HostEvent::OpenPlayer => return Dispatch::Session(SessionCommand::OpenPlayer),
        HostEvent::Roll { expr } => return Dispatch::Session(SessionCommand::Roll { expr }),
        HostEvent::SetNote { key, value } => return Dispatch::Session(SessionCommand::SetNote { key, value }),
        HostEvent::GetNote { key } => return Dispatch::Session(SessionCommand::GetNote { key }),
        HostEvent::Upload { name, mime_type, data } => {
            return Dispatch::Session(SessionCommand::Upload { name, mime_type, data });
        }
        HostEvent::ListFiles => return Dispatch::Session(SessionCommand::ListFiles),
    };
    Dispatch::Engine(actions)
}

fn player_input(player: Uuid, input: PlayerInput) -> Dispatch {
    Dispatch::Session(SessionCommand::PlayerInput { player, input })
}
