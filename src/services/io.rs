//! Image file I/O service
//!
//! Thin wrapper over the `image` crate with contextual errors and
//! format-by-extension detection, shared by the CLI and library callers.

use crate::{
    config::OutputFormat,
    error::{Result, StageError},
};
use image::DynamicImage;
use log::debug;
use std::path::Path;

/// Stateless image loading/saving helpers
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from disk with contextual error reporting
    ///
    /// # Errors
    /// Returns `StageError::Image` for unreadable or unsupported files.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|err| StageError::image_load_error(path, &err))?;
        debug!(
            "Loaded image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Decode an image from in-memory bytes
    ///
    /// # Errors
    /// Returns `StageError::Image` for malformed data.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    /// Save an image in the given output format
    ///
    /// # Errors
    /// Returns `StageError::Io`/`StageError::Image` on encoding or write
    /// failures.
    pub fn save_image<P: AsRef<Path>>(
        path: P,
        image: &DynamicImage,
        format: OutputFormat,
        quality: u8,
    ) -> Result<()> {
        let path = path.as_ref();
        match format {
            OutputFormat::Png => {
                image.save_with_format(path, image::ImageFormat::Png)?;
            },
            OutputFormat::Jpeg => {
                let rgb = image.to_rgb8();
                let file = std::fs::File::create(path)
                    .map_err(|err| StageError::file_io_error("create output file", path, err))?;
                let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, quality);
                encoder.encode_image(&rgb)?;
            },
        }
        debug!("Saved {} as {}", path.display(), format);
        Ok(())
    }

    /// Infer the output format from a file extension; defaults to PNG for
    /// unknown extensions
    #[must_use]
    pub fn format_for_path<P: AsRef<Path>>(path: P) -> OutputFormat {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }
}
