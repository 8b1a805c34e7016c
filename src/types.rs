//! Core types for product staging operations

use crate::{config::OutputFormat, error::Result};
use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a staging operation
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// The composited scene, always fully opaque RGB
    pub image: DynamicImage,

    /// Human-readable background label actually used
    pub label: String,

    /// Alpha mask of the refined subject as it was pasted
    pub subject_mask: AlphaMask,

    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

impl StagedResult {
    /// Create a new staged result
    #[must_use]
    pub fn new(
        image: DynamicImage,
        label: String,
        subject_mask: AlphaMask,
        metadata: ProcessingMetadata,
    ) -> Self {
        Self {
            image,
            label,
            subject_mask,
            metadata,
        }
    }

    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Save the result as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save the result as JPEG with the given quality
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let rgb_image = self.image.to_rgb8();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            std::fs::File::create(path)?,
            quality,
        );
        encoder.encode_image(&rgb_image)?;
        Ok(())
    }

    /// Save in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        match format {
            OutputFormat::Png => self.save_png(path),
            OutputFormat::Jpeg => self.save_jpeg(path, quality),
        }
    }

    /// Get the image as encoded bytes in the specified format
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        match format {
            OutputFormat::Png => {
                self.image.write_to(&mut cursor, image::ImageFormat::Png)?;
            },
            OutputFormat::Jpeg => {
                let rgb_image = self.image.to_rgb8();
                let mut encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
                encoder.encode_image(&rgb_image)?;
            },
        }
        Ok(buffer)
    }

    /// Get detailed timing breakdown
    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }

    /// Timing summary for display
    #[must_use]
    pub fn timing_summary(&self) -> String {
        let t = &self.metadata.timings;
        format!(
            "Total: {}ms | Segment: {}ms | Refine: {}ms | Light: {}ms | Composite: {}ms",
            t.total_ms, t.segmentation_ms, t.refinement_ms, t.lighting_ms, t.compositing_ms
        )
    }
}

/// Single-channel opacity mask tied to a raster of equal dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaMask {
    /// Mask data as opacity values (0-255)
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl AlphaMask {
    /// Create a new alpha mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Create a mask from a grayscale image
    #[must_use]
    pub fn from_image(image: &ImageBuffer<image::Luma<u8>, Vec<u8>>) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.as_raw().clone(), (width, height))
    }

    /// Extract the alpha channel of an RGBA image as a mask
    #[must_use]
    pub fn from_alpha_channel(image: &ImageBuffer<Rgba<u8>, Vec<u8>>) -> Self {
        let (width, height) = image.dimensions();
        let data = image.pixels().map(|px| px[3]).collect();
        Self::new(data, (width, height))
    }

    /// Convert the mask to a grayscale image
    pub fn to_image(&self) -> Result<ImageBuffer<image::Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            crate::error::StageError::internal("Failed to create image from mask data")
        })
    }

    /// Apply the mask to the alpha channel of an RGBA image
    ///
    /// # Errors
    /// Returns an error if the mask and image dimensions differ.
    pub fn apply_to_image(&self, image: &mut ImageBuffer<Rgba<u8>, Vec<u8>>) -> Result<()> {
        if image.dimensions() != self.dimensions {
            return Err(crate::error::StageError::internal(
                "Image and mask dimensions do not match",
            ));
        }

        for (pixel, alpha) in image.pixels_mut().zip(self.data.iter()) {
            pixel[3] = *alpha;
        }

        Ok(())
    }

    /// Resize the mask to new dimensions
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<AlphaMask> {
        let current = self.to_image()?;
        let resized = image::imageops::resize(
            &current,
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        );
        Ok(AlphaMask::from_image(&resized))
    }

    /// Get mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total_pixels = self.data.len();
        let opaque_pixels = self.data.iter().filter(|&&x| x > 0).count();

        MaskStatistics {
            total_pixels,
            opaque_pixels,
            coverage: if total_pixels == 0 {
                0.0
            } else {
                opaque_pixels as f32 / total_pixels as f32
            },
        }
    }
}

/// Statistics about an alpha mask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskStatistics {
    pub total_pixels: usize,
    pub opaque_pixels: usize,
    pub coverage: f32,
}

/// Detailed timing breakdown for a staging run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Segmentation collaborator call
    pub segmentation_ms: u64,

    /// Trim, pad, shave, defringe, feather
    pub refinement_ms: u64,

    /// Cinematic pass, scene shadows, light wrap
    pub lighting_ms: u64,

    /// Layer assembly and grain
    pub compositing_ms: u64,

    /// Total end-to-end processing time
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Metadata describing how a result was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Background label actually used
    pub background_label: String,

    /// Subject classification at the second (post-refinement) measurement,
    /// when the pipeline performed one
    pub subject_is_light: Option<bool>,

    /// Seed used for the grain noise source, when grain was applied
    pub grain_seed: Option<u64>,

    /// Per-stage timings
    pub timings: ProcessingTimings,

    /// When processing completed
    pub processed_at: DateTime<Utc>,
}

impl ProcessingMetadata {
    /// Create metadata for the given background label
    #[must_use]
    pub fn new(background_label: String) -> Self {
        Self {
            background_label,
            subject_is_light: None,
            grain_seed: None,
            timings: ProcessingTimings::new(),
            processed_at: Utc::now(),
        }
    }

    /// Attach detailed timings
    pub fn set_timings(&mut self, timings: ProcessingTimings) {
        self.timings = timings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_roundtrip() {
        let mask = AlphaMask::new(vec![0, 128, 255, 64], (2, 2));
        let image = mask.to_image().unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        let back = AlphaMask::from_image(&image);
        assert_eq!(back.data, mask.data);
    }

    #[test]
    fn test_mask_dimension_mismatch() {
        let mask = AlphaMask::new(vec![255; 4], (2, 2));
        let mut image = ImageBuffer::from_pixel(3, 3, Rgba([10, 20, 30, 0]));
        assert!(mask.apply_to_image(&mut image).is_err());
    }

    #[test]
    fn test_mask_apply() {
        let mask = AlphaMask::new(vec![0, 255, 128, 32], (2, 2));
        let mut image = ImageBuffer::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        mask.apply_to_image(&mut image).unwrap();
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(1, 0)[3], 255);
        assert_eq!(image.get_pixel(0, 1)[3], 128);
    }

    #[test]
    fn test_mask_statistics() {
        let mask = AlphaMask::new(vec![0, 0, 255, 10], (2, 2));
        let stats = mask.statistics();
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.opaque_pixels, 2);
        assert!((stats.coverage - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_alpha_channel() {
        let mut image = ImageBuffer::from_pixel(2, 1, Rgba([1, 2, 3, 40]));
        image.put_pixel(1, 0, Rgba([1, 2, 3, 200]));
        let mask = AlphaMask::from_alpha_channel(&image);
        assert_eq!(mask.data, vec![40, 200]);
    }
}
