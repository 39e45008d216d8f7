//! Fog of war: the occlusion raster and its transport artifact.
//!
//! DESIGN
//! ======
//! The raster is one fixed-size single-channel bitmap laid over the world at
//! the origin, one pixel per world unit. Each pixel stores opacity: 255 is
//! undiscovered, 0 is revealed. Edits are rectangle fills, so an edit costs the
//! area it touches and no history is kept. Last write wins per pixel, which is
//! what makes reveal idempotent and reveal/hide order-dependent.
//!
//! The raster never rides inside the scene snapshot. After each mutation the
//! master serializes it to a PNG data URL and ships it as a separate
//! `fogUpdate` frame. Players decode that back into a [`FogImage`].

#[cfg(test)]
#[path = "fog_test.rs"]
mod fog_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma};

use crate::camera::Point;
use crate::consts::{FOG_CLEAR, FOG_OPAQUE};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Error produced while encoding or decoding a fog artifact.
#[derive(Debug, thiserror::Error)]
pub enum FogError {
    /// PNG encoding or decoding failed.
    #[error("fog image codec failed: {0}")]
    Image(#[from] image::ImageError),
    /// The artifact body is not valid base64.
    #[error("fog artifact is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The artifact is not a PNG data URL.
    #[error("fog artifact is not a PNG data URL")]
    NotDataUrl,
}

/// A rectangle given by two opposite corners, in raster coordinates.
///
/// The corners may arrive in any order (a drag can run in any direction).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogRect {
    pub start: Point,
    pub end: Point,
}

impl FogRect {
    #[must_use]
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Top-left and bottom-right corners.
    #[must_use]
    pub fn normalized(&self) -> (Point, Point) {
        (
            Point::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            Point::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        )
    }
}

/// Serialized raster ready for the sync channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogArtifact {
    /// PNG data URL.
    pub data: String,
    /// World extent covered by the image, which may be smaller than this when downsampled.
    pub width: u32,
    pub height: u32,
}

/// The master's persistent occlusion bitmap.
pub struct FogRaster {
    mask: GrayImage,
    revision: u64,
}

impl FogRaster {
    /// A square raster of side `extent`, fully undiscovered.
    #[must_use]
    pub fn new(extent: u32) -> Self {
        let extent = extent.max(1);
        Self { mask: GrayImage::from_pixel(extent, extent, Luma([FOG_OPAQUE])), revision: 0 }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// Bumped on every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Opacity at a raster pixel, `None` outside the raster.
    #[must_use]
    pub fn opacity_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        Some(self.mask.get_pixel(x, y).0[0])
    }

    /// Cover everything (`true`) or clear everything (`false`).
    pub fn reset(&mut self, cover_all: bool) {
        let value = if cover_all { FOG_OPAQUE } else { FOG_CLEAR };
        let buf: &mut [u8] = &mut self.mask;
        buf.fill(value);
        self.revision += 1;
    }

    /// Clear the fog over `rect`. Returns false when the rect misses the raster.
    pub fn reveal(&mut self, rect: FogRect) -> bool {
        self.fill(rect, FOG_CLEAR)
    }

    /// Restore the fog over `rect`. Returns false when the rect misses the raster.
    pub fn hide(&mut self, rect: FogRect) -> bool {
        self.fill(rect, FOG_OPAQUE)
    }

    fn fill(&mut self, rect: FogRect, value: u8) -> bool {
        let (min, max) = rect.normalized();
        let Some((x0, x1)) = pixel_span(min.x, max.x, self.width()) else {
            return false;
        };
        let Some((y0, y1)) = pixel_span(min.y, max.y, self.height()) else {
            return false;
        };

        let stride = self.width() as usize;
        let buf: &mut [u8] = &mut self.mask;
        for row in y0..y1 {
            let offset = row * stride;
            buf[offset + x0..offset + x1].fill(value);
        }
        self.revision += 1;
        true
    }

    /// Encode the raster as a PNG data URL, downsampled by `scale` when above 1.
    ///
    /// # Errors
    ///
    /// Returns [`FogError::Image`] if PNG encoding fails.
    pub fn serialize(&self, scale: u32) -> Result<FogArtifact, FogError> {
        let scale = scale.max(1);
        let png = if scale == 1 {
            encode_png(&self.mask)?
        } else {
            let w = (self.width() / scale).max(1);
            let h = (self.height() / scale).max(1);
            encode_png(&imageops::resize(&self.mask, w, h, FilterType::Nearest))?
        };
        Ok(FogArtifact {
            data: format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)),
            width: self.width(),
            height: self.height(),
        })
    }
}

/// Clip `[round(min), round(max))` to `[0, limit)`. `None` when empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixel_span(min: f64, max: f64, limit: u32) -> Option<(usize, usize)> {
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    let lo = min.round().max(0.0);
    let hi = max.round().min(f64::from(limit));
    if lo >= hi {
        return None;
    }
    Some((lo as usize, hi as usize))
}

fn encode_png(img: &GrayImage) -> Result<Vec<u8>, FogError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// A received fog artifact, decoded on the player side.
#[derive(Debug, Clone)]
pub struct FogImage {
    pub mask: GrayImage,
    /// World extent the mask is stretched over.
    pub width: u32,
    pub height: u32,
}

impl FogImage {
    /// Decode a PNG data URL covering a `width` × `height` world extent.
    ///
    /// # Errors
    ///
    /// Returns [`FogError`] if the data URL is malformed or the PNG is invalid.
    pub fn decode(data: &str, width: u32, height: u32) -> Result<Self, FogError> {
        let body = data.strip_prefix(DATA_URL_PREFIX).ok_or(FogError::NotDataUrl)?;
        let bytes = STANDARD.decode(body)?;
        let mask = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_luma8();
        Ok(Self { mask, width: width.max(1), height: height.max(1) })
    }

    /// Opacity at a world position, or `None` outside the covered extent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn opacity_at(&self, world: Point) -> Option<u8> {
        if world.x < 0.0 || world.y < 0.0 || world.x >= f64::from(self.width) || world.y >= f64::from(self.height) {
            return None;
        }
        let sx = (world.x * f64::from(self.mask.width()) / f64::from(self.width)) as u32;
        let sy = (world.y * f64::from(self.mask.height()) / f64::from(self.height)) as u32;
        let sx = sx.min(self.mask.width() - 1);
        let sy = sy.min(self.mask.height() - 1);
        Some(self.mask.get_pixel(sx, sy).0[0])
    }
}
