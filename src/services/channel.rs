//! Sync channel: fan-out of master frames to player views.
//!
//! DESIGN
//! ======
//! Each subscribed player gets its own bounded queue of encoded JSON frames.
//! A frame is encoded once per publish and shared by every queue. Publishing
//! is fire-and-forget with `try_send`: a full queue drops the frame for that
//! player only (the next tick supersedes it) and a closed queue is pruned.
//! The master never waits on a player.

#[cfg(test)]
#[path = "channel_test.rs"]
mod channel_test;

use std::collections::HashMap;
use std::sync::Arc;

use canvas::protocol::{Frame, encode_frame};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One encoded frame as it travels to a player.
pub type WireFrame = Arc<str>;

/// Delivery counts for one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
    pub pruned: usize,
    /// Encoded frame size.
    pub bytes: usize,
}

pub struct SyncChannel {
    clients: HashMap<Uuid, mpsc::Sender<WireFrame>>,
    capacity: usize,
    seq: u64,
}

impl SyncChannel {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { clients: HashMap::new(), capacity: capacity.max(1), seq: 0 }
    }

    /// Register a player and return its id and frame queue.
    pub fn subscribe(&mut self) -> (Uuid, mpsc::Receiver<WireFrame>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.capacity);
        self.clients.insert(id, tx);
        info!(%id, players = self.clients.len(), "player subscribed");
        (id, rx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Sequence number of the last published frame.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Build the next frame with `build`, encode it and offer it to every player.
    ///
    /// A frame that cannot be encoded is logged and dropped for everyone.
    pub fn publish(&mut self, build: impl FnOnce(u64) -> Frame) -> PublishReport {
        self.seq += 1;
        let frame = build(self.seq);
        let wire: WireFrame = match encode_frame(&frame) {
            Ok(raw) => raw.into(),
            Err(e) => {
                warn!(seq = frame.seq, kind = frame.message.kind(), error = %e, "frame not encodable; dropped");
                return PublishReport::default();
            }
        };
        let mut report = PublishReport { bytes: wire.len(), ..PublishReport::default() };
        let mut closed = Vec::new();

        for (id, tx) in &self.clients {
            match tx.try_send(Arc::clone(&wire)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(%id, seq = frame.seq, kind = frame.message.kind(), "player queue full; frame dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        for id in closed {
            self.clients.remove(&id);
            report.pruned += 1;
            info!(%id, "player channel closed; pruned");
        }
        report
    }
}
