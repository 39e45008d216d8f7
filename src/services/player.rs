//! Player loop: one task per open player view.
//!
//! Applies frames as they arrive, redraws on its own fixed tick and resolves
//! artwork through the blob store. Local pointer input arrives on a second
//! channel. The loop ends when the sync channel closes and hands back the
//! final view.

#[cfg(test)]
#[path = "player_test.rs"]
mod player_test;

use std::sync::Arc;
use std::time::Duration;

use canvas::player::{PlayerInput, PlayerView};
use canvas::protocol::decode_frame;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::services::channel::WireFrame;
use crate::services::storage::BlobStore;
use crate::services::{ImageLoad, spawn_image_loads};

const IMAGE_QUEUE_CAPACITY: usize = 32;

#[must_use]
pub fn spawn_player_loop(
    id: Uuid,
    mut frames: mpsc::Receiver<WireFrame>,
    mut inputs: mpsc::Receiver<PlayerInput>,
    blobs: Arc<dyn BlobStore>,
    tick_ms: u64,
) -> JoinHandle<PlayerView> {
    tokio::spawn(async move {
        let mut view = PlayerView::new();
        let (loaded_tx, mut loaded_rx) = mpsc::channel::<ImageLoad>(IMAGE_QUEUE_CAPACITY);
        let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_seq = 0;

        info!(%id, tick_ms, "player view opened");
        loop {
            tokio::select! {
                maybe_wire = frames.recv() => {
                    let Some(wire) = maybe_wire else {
                        break;
                    };
                    let frame = match decode_frame(&wire) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(%id, bytes = wire.len(), error = %e, "undecodable frame skipped");
                            continue;
                        }
                    };
                    if frame.seq > last_seq + 1 && last_seq > 0 {
                        debug!(%id, missed = frame.seq - last_seq - 1, "frames skipped");
                    }
                    last_seq = frame.seq;
                    let kind = frame.message.kind();
                    if let Err(e) = view.apply(frame.message) {
                        warn!(%id, seq = frame.seq, kind, error = %e, "frame rejected");
                    }
                }
                Some(input) = inputs.recv() => {
                    trace!(%id, ?input, "player input");
                    view.handle_input(input);
                }
                _ = ticker.tick() => {
                    let commands = view.tick();
                    trace!(%id, commands = commands.len(), "player frame");
                    spawn_image_loads(&blobs, view.take_image_requests(), &loaded_tx);
                }
                Some((reference, result)) = loaded_rx.recv() => {
                    view.fulfil_image(&reference, result);
                }
            }
        }
        info!(%id, "player view closed");
        view
    })
}
