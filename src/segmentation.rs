//! Foreground segmentation abstraction
//!
//! Segmentation is an external collaborator: given an arbitrary raster, it
//! returns an RGBA cutout whose alpha channel isolates the subject. The core
//! never reimplements it; anything from a neural model to a remote service
//! plugs in behind [`Segmenter`].

use crate::error::Result;
use image::{DynamicImage, RgbaImage};

/// Trait for foreground segmentation backends
pub trait Segmenter: Send {
    /// Produce an RGBA cutout of `image`, alpha = subject opacity.
    ///
    /// # Errors
    /// Any failure (unsupported input, no inference result) must surface as
    /// `StageError::Segmentation`, never as an empty raster.
    fn segment(&mut self, image: &DynamicImage) -> Result<RgbaImage>;

    /// Short human-readable backend name for logging
    fn describe(&self) -> &str;
}

/// Segmenter for inputs that already carry an alpha cutout.
///
/// Returns the image converted to RGBA unchanged. Useful when an upstream tool
/// has already removed the background, and as the deterministic backend for
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughSegmenter;

impl PassthroughSegmenter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Segmenter for PassthroughSegmenter {
    fn segment(&mut self, image: &DynamicImage) -> Result<RgbaImage> {
        Ok(image.to_rgba8())
    }

    fn describe(&self) -> &str {
        "passthrough"
    }
}
