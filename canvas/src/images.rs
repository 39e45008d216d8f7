//! Lazy image resolution for map and token artwork.
//!
//! Scene snapshots carry image *references* only. A view resolves a reference
//! through its [`ImageCache`]: the first lookup queues a load request and
//! returns nothing, so the draw is skipped for that tick. The host drains the
//! queue with [`ImageCache::take_requests`], loads the bytes however it likes,
//! and hands the outcome back through [`ImageCache::fulfil`]. Nothing here
//! ever blocks a frame.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

use std::collections::HashMap;

/// Error produced while materializing an image reference.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The reference does not name a stored image.
    #[error("image not found: {0}")]
    NotFound(String),
    /// The bytes are not a decodable image.
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// A materialized image. Pixel data stays with the host; the display list
/// only needs the reference and the intrinsic size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub reference: String,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    /// Probe encoded image bytes for their dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Decode`] if the bytes are not a supported image.
    pub fn decode(reference: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self { reference: reference.to_string(), width: img.width(), height: img.height() })
    }
}

#[derive(Debug, Clone)]
enum ImageSlot {
    Pending,
    Ready(LoadedImage),
    Failed,
}

/// Reference → image slots, plus the queue of loads not yet handed out.
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<String, ImageSlot>,
    requests: Vec<String>,
}

impl ImageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the image if it is ready. Unknown references are queued for loading.
    pub fn resolve(&mut self, reference: &str) -> Option<&LoadedImage> {
        if !self.slots.contains_key(reference) {
            self.slots.insert(reference.to_string(), ImageSlot::Pending);
            self.requests.push(reference.to_string());
            return None;
        }
        match self.slots.get(reference) {
            Some(ImageSlot::Ready(img)) => Some(img),
            _ => None,
        }
    }

    /// Drain references that need loading.
    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }

    /// Record the outcome of a load. Failed references are not requested
    /// again; reporting the error is up to the loader.
    pub fn fulfil(&mut self, reference: &str, result: Result<LoadedImage, ImageError>) {
        let slot = match result {
            Ok(img) => ImageSlot::Ready(img),
            Err(_) => ImageSlot::Failed,
        };
        self.slots.insert(reference.to_string(), slot);
    }
}
