//! Session: the master engine plus everything around it.
//!
//! DESIGN
//! ======
//! A `Session` is owned by exactly one task, the master loop. It holds the
//! engine, the sync channel and the player views it has opened, so the
//! scene and raster need no locks. Host events come in through
//! [`Session::handle_event`]; engine actions are turned into publishes here.
//!
//! ERROR HANDLING
//! ==============
//! Nothing in here is fatal. Failed commands return a [`SessionError`] for
//! the loop to log. Hitting the player limit is logged once per session and
//! never retried.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use canvas::camera::Point;
use canvas::engine::{Action, Engine};
use canvas::fog::FogError;
use canvas::images::{ImageError, LoadedImage};
use canvas::master;
use canvas::player::{PlayerInput, PlayerView};
use canvas::protocol::Frame;
use canvas::render::DrawCmd;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::host::{self, Dispatch, HostEvent, SessionCommand};
use crate::services::channel::SyncChannel;
use crate::services::dice::{self, Roll};
use crate::services::player::spawn_player_loop;
use crate::services::storage::{BlobStore, NoteStore, StorageError};

/// Error returned by session commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("player limit reached ({max} open)")]
    PlayerLimit { max: usize },
    #[error("no open player view {0}")]
    UnknownPlayer(Uuid),
    #[error("not a dice expression: {0}")]
    BadRoll(String),
    #[error("upload is not valid base64: {0}")]
    UploadEncoding(#[from] base64::DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fog(#[from] FogError),
}

/// What a handled event produced, for the host log.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Done,
    PlayerOpened(Uuid),
    Rolled(Roll),
    Note { key: String, value: Option<String> },
    Stored(String),
    Files(Vec<String>),
}

const PLAYER_INPUT_CAPACITY: usize = 64;

struct PlayerHandle {
    id: Uuid,
    input: mpsc::Sender<PlayerInput>,
    task: JoinHandle<PlayerView>,
}

pub struct Session {
    pub engine: Engine,
    channel: SyncChannel,
    config: SessionConfig,
    blobs: Arc<dyn BlobStore>,
    notes: Arc<dyn NoteStore>,
    players: Vec<PlayerHandle>,
    limit_warned: bool,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig, blobs: Arc<dyn BlobStore>, notes: Arc<dyn NoteStore>) -> Self {
        let mut engine = Engine::new(config.fog_extent);
        engine.scene.set_grid_size(config.grid_size);
        Self {
            engine,
            channel: SyncChannel::new(config.channel_capacity),
            config,
            blobs,
            notes,
            players: Vec::new(),
            limit_warned: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn blobs(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.blobs)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.channel.len()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Apply one host event.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when a session command fails. Engine events never fail.
    pub async fn handle_event(&mut self, event: HostEvent) -> Result<Reply, SessionError> {
        match host::dispatch(&mut self.engine, event) {
            Dispatch::Engine(actions) => {
                self.handle_actions(actions)?;
                Ok(Reply::Done)
            }
            Dispatch::Session(command) => self.run_command(command).await,
        }
    }

    /// Turn engine actions into publishes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fog`] if the fog raster cannot be serialized.
    pub fn handle_actions(&mut self, actions: Vec<Action>) -> Result<(), SessionError> {
        for action in actions {
            match action {
                Action::PingEmitted(at) => self.publish_ping(at),
                Action::FogChanged => self.publish_fog()?,
                Action::BroadcastNow => self.publish_sync(),
                Action::SelectionChanged(id) => debug!(token = ?id, "selection changed"),
                Action::DrawingCommitted => debug!(drawings = self.engine.scene.drawings.len(), "drawing committed"),
                Action::SetCursor(cursor) => debug!(cursor, "cursor"),
            }
        }
        Ok(())
    }

    async fn run_command(&mut self, command: SessionCommand) -> Result<Reply, SessionError> {
        match command {
            SessionCommand::OpenPlayer => self.open_player().map(Reply::PlayerOpened),
            SessionCommand::PlayerInput { player, input } => self.send_player_input(player, input).map(|()| Reply::Done),
            SessionCommand::Roll { expr } => dice::roll(&expr).map(Reply::Rolled).ok_or(SessionError::BadRoll(expr)),
            SessionCommand::SetNote { key, value } => {
                self.notes.set(&key, &value).await;
                Ok(Reply::Done)
            }
            SessionCommand::GetNote { key } => {
                let value = self.notes.get(&key).await;
                Ok(Reply::Note { key, value })
            }
            SessionCommand::Upload { name, mime_type, data } => {
                let bytes = STANDARD.decode(data.trim())?;
                let reference = self.blobs.put(&name, &mime_type, bytes).await?;
                Ok(Reply::Stored(reference))
            }
            SessionCommand::ListFiles => {
                let files = self.blobs.list().await?;
                Ok(Reply::Files(files.into_iter().map(|b| format!("{} ({})", b.name, b.mime_type)).collect()))
            }
        }
    }

    // =========================================================================
    // PLAYERS
    // =========================================================================

    /// Open a player view and bring it up to date.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PlayerLimit`] when `max_players` views are already open.
    pub fn open_player(&mut self) -> Result<Uuid, SessionError> {
        let max = self.config.max_players;
        if self.channel.len() >= max {
            if !self.limit_warned {
                warn!(max, "player view could not be opened; player limit reached");
                self.limit_warned = true;
            }
            return Err(SessionError::PlayerLimit { max });
        }

        let (id, frames) = self.channel.subscribe();
        let (input, inputs) = mpsc::channel(PLAYER_INPUT_CAPACITY);
        let task = spawn_player_loop(id, frames, inputs, self.blobs(), self.config.player_tick_ms);
        self.players.push(PlayerHandle { id, input, task });

        self.publish_sync();
        self.publish_fog()?;
        Ok(id)
    }

    /// Forward local pointer input to one player view.
    ///
    /// Input for a view whose queue is full is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownPlayer`] when no open view has that id.
    pub fn send_player_input(&self, player: Uuid, input: PlayerInput) -> Result<(), SessionError> {
        let handle = self.players.iter().find(|p| p.id == player).ok_or(SessionError::UnknownPlayer(player))?;
        match handle.input.try_send(input) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(input)) => {
                debug!(%player, ?input, "player input dropped; queue full");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SessionError::UnknownPlayer(player)),
        }
    }

    /// Close the channel and wait for every player loop to drain.
    pub async fn shutdown(self) -> Vec<(Uuid, PlayerView)> {
        let Self { channel, players, .. } = self;
        drop(channel);
        let mut views = Vec::with_capacity(players.len());
        for PlayerHandle { id, input, task } in players {
            drop(input);
            match task.await {
                Ok(view) => views.push((id, view)),
                Err(e) => warn!(%id, error = %e, "player loop ended abnormally"),
            }
        }
        info!(players = views.len(), "session shut down");
        views
    }

    // =========================================================================
    // TICK / PUBLISH
    // =========================================================================

    /// One master tick: render, decay pings, publish the snapshot.
    pub fn tick(&mut self) -> Vec<DrawCmd> {
        let frame = master::render(&mut self.engine);
        self.engine.tick();
        self.publish_sync();
        frame
    }

    pub fn publish_sync(&mut self) {
        if self.channel.is_empty() {
            return;
        }
        let (scene, sync_view) = (&self.engine.scene, self.engine.ui.sync_view);
        self.channel.publish(|seq| Frame::sync(seq, scene, sync_view));
    }

    /// Serialize the raster and send it to every player.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fog`] if PNG encoding fails.
    pub fn publish_fog(&mut self) -> Result<(), SessionError> {
        if self.channel.is_empty() {
            return Ok(());
        }
        let artifact = self.engine.fog.serialize(self.config.fog_artifact_scale)?;
        let report = self.channel.publish(|seq| Frame::fog(seq, artifact));
        debug!(
            seq = self.channel.seq(),
            bytes = report.bytes,
            revision = self.engine.fog.revision(),
            delivered = report.delivered,
            pruned = report.pruned,
            "fog published"
        );
        if report.dropped > 0 {
            warn!(dropped = report.dropped, "fog update dropped for some players");
        }
        Ok(())
    }

    pub fn publish_ping(&mut self, at: Point) {
        if self.channel.is_empty() {
            return;
        }
        self.channel.publish(|seq| Frame::ping(seq, at));
    }

    // =========================================================================
    // IMAGES
    // =========================================================================

    pub fn take_image_requests(&mut self) -> Vec<String> {
        self.engine.images.take_requests()
    }

    pub fn fulfil_image(&mut self, reference: &str, result: Result<LoadedImage, ImageError>) {
        self.engine.images.fulfil(reference, result);
    }
}
