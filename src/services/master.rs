//! Master loop: drives the session on a fixed tick.
//!
//! DESIGN
//! ======
//! Host events are applied between ticks as they arrive; fog and ping frames
//! go out immediately. Every tick renders the master view, decays pings and
//! publishes a full snapshot. A slow tick is skipped rather than bunched up.
//! The loop ends when the host event queue closes and returns the session so
//! the caller can shut the players down.

#[cfg(test)]
#[path = "master_test.rs"]
mod master_test;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

use crate::host::HostEvent;
use crate::services::{ImageLoad, spawn_image_loads};
use crate::session::{Reply, Session};

const IMAGE_QUEUE_CAPACITY: usize = 32;

#[must_use]
pub fn spawn_master_loop(mut session: Session, mut events: mpsc::Receiver<HostEvent>) -> JoinHandle<Session> {
    let tick_ms = session.config().tick_ms.max(1);
    tokio::spawn(async move {
        let (loaded_tx, mut loaded_rx) = mpsc::channel::<ImageLoad>(IMAGE_QUEUE_CAPACITY);
        let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let blobs = session.blobs();

        info!(tick_ms, "master loop started");
        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        break;
                    };
                    match session.handle_event(event).await {
                        Ok(reply) => log_reply(&reply),
                        Err(e) => warn!(error = %e, "host event failed"),
                    }
                }
                _ = ticker.tick() => {
                    let commands = session.tick();
                    trace!(commands = commands.len(), "master frame");
                    spawn_image_loads(&blobs, session.take_image_requests(), &loaded_tx);
                }
                Some((reference, result)) = loaded_rx.recv() => {
                    session.fulfil_image(&reference, result);
                }
            }
        }
        info!("master loop stopped");
        session
    })
}

fn log_reply(reply: &Reply) {
    match reply {
        Reply::Done => {}
        Reply::PlayerOpened(id) => info!(%id, "player view opened"),
        Reply::Rolled(roll) => info!(
            count = roll.expr.count,
            sides = roll.expr.sides,
            modifier = roll.expr.modifier,
            rolls = ?roll.rolls,
            total = roll.total,
            "dice rolled"
        ),
        Reply::Note { key, value } => info!(%key, value = value.as_deref().unwrap_or(""), "note"),
        Reply::Stored(reference) => info!(%reference, "file stored"),
        Reply::Files(names) => info!(count = names.len(), files = ?names, "files"),
    }
}
