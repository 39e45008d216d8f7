//! Sync channel messages and the frame codec.
//!
//! ARCHITECTURE
//! ============
//! The master publishes; players only listen. There is no request/response,
//! no acknowledgment and no delta: every master tick carries the whole scene,
//! so a dropped frame is simply superseded by the next one.
//!
//! | type | payload | sent |
//! |------|---------|------|
//! | `sync` | full scene + `syncView` | every master tick |
//! | `fogUpdate` | PNG data URL + extent | after each fog mutation |
//! | `ping` | world `x`, `y` | on each ping |
//!
//! Frames are JSON. `seq` increases per publish so receivers and logs can
//! spot gaps; receivers apply frames last-write-wins and never reorder.

#[cfg(test)]
#[path = "protocol_test.rs"]
mod protocol_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::fog::FogArtifact;
use crate::scene::Scene;

/// Error returned by [`encode_frame`] and [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("frame json codec failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One message on the sync channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Full scene snapshot.
    Sync {
        state: Scene,
        /// Players should mirror the master camera.
        #[serde(rename = "syncView")]
        sync_view: bool,
    },
    /// Serialized occlusion raster.
    FogUpdate { data: String, width: u32, height: u32 },
    /// A ping at world coordinates.
    Ping { x: f64, y: f64 },
}

impl Message {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sync { .. } => "sync",
            Self::FogUpdate { .. } => "fogUpdate",
            Self::Ping { .. } => "ping",
        }
    }
}

/// Envelope around a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    /// Publish counter of the sending session.
    pub seq: u64,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    pub message: Message,
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    #[must_use]
    pub fn new(seq: u64, message: Message) -> Self {
        Self { id: Uuid::new_v4(), seq, ts: now_ms(), message }
    }

    #[must_use]
    pub fn sync(seq: u64, scene: &Scene, sync_view: bool) -> Self {
        Self::new(seq, Message::Sync { state: scene.clone(), sync_view })
    }

    #[must_use]
    pub fn fog(seq: u64, artifact: FogArtifact) -> Self {
        Self::new(seq, Message::FogUpdate { data: artifact.data, width: artifact.width, height: artifact.height })
    }

    #[must_use]
    pub fn ping(seq: u64, at: Point) -> Self {
        Self::new(seq, Message::Ping { x: at.x, y: at.y })
    }
}

/// Encode a frame as JSON.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_frame(frame: &Frame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode a JSON frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed or unknown messages.
pub fn decode_frame(raw: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(raw)?)
}
