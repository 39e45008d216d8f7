//! Session services: the sync channel, the master and player loops, and the
//! storage and dice collaborators.
//!
//! ARCHITECTURE
//! ============
//! The master loop owns the session and is the only writer. Each player view
//! runs its own loop fed by the sync channel. Image loads run as independent
//! tasks against the blob store and report back to whichever loop asked.

pub mod channel;
pub mod dice;
pub mod master;
pub mod player;
pub mod storage;

use std::sync::Arc;

use canvas::images::{ImageError, LoadedImage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::services::storage::{BlobStore, load_image};

/// Outcome of one image load, keyed by reference.
pub type ImageLoad = (String, Result<LoadedImage, ImageError>);

/// Start loading each reference in the background; results arrive on `tx`.
pub(crate) fn spawn_image_loads(store: &Arc<dyn BlobStore>, references: Vec<String>, tx: &mpsc::Sender<ImageLoad>) {
    for reference in references {
        let store = Arc::clone(store);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = load_image(store.as_ref(), &reference).await;
            if let Err(e) = &result {
                warn!(%reference, error = %e, "image load failed");
            }
            if let Err(mpsc::error::SendError((reference, _))) = tx.send((reference, result)).await {
                debug!(%reference, "image load finished after its view closed");
            }
        });
    }
}
