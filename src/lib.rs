#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # photostage
//!
//! A product photo staging library: composites a cut-out product photo onto a
//! synthetic scene (flat color or photographic background plate) so the
//! result looks photographed in place rather than pasted.
//!
//! The pipeline refines the cutout's edges (trim, safe-zone pad, fringe shave,
//! color-aware defringe, feather), plans geometry against the chosen plate,
//! synthesizes lighting layers (drop shadows, perspective ground shadows,
//! reflections, rim glow, light wrap, scene-shadow projection), assembles
//! everything in a fixed paint order and unifies the frame with film grain.
//!
//! ## Features
//!
//! - **Closed style catalog**: 11 plate styles plus flat White/Black and
//!   auto-detection, each carrying an explicit staging rule
//! - **Pluggable segmentation**: the foreground cutout comes from any
//!   [`Segmenter`] implementation; a passthrough backend handles pre-cut inputs
//! - **Deterministic output**: film grain is the only randomness and is
//!   seedable for reproducible renders
//! - **CLI integration**: optional command-line interface (enable with the
//!   `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use photostage::{
//!     stage_product_from_bytes, BackgroundChoice, BackgroundStyle,
//!     PassthroughSegmenter, StageConfig,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StageConfig::builder()
//!     .background(BackgroundChoice::Style(BackgroundStyle::MarbleFloor))
//!     .assets_dir("assets/backgrounds")
//!     .build()?;
//!
//! let bytes = tokio::fs::read("cutout.png").await?;
//! let result = stage_product_from_bytes(
//!     &bytes,
//!     &config,
//!     Box::new(PassthroughSegmenter::new()),
//! )
//! .await?;
//! result.save_png("staged.png")?;
//! println!("Background used: {}", result.label);
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! All staging functionality is available by default; enable the `cli` feature
//! for the command-line interface and tracing setup. To use only as a library:
//!
//! ```toml
//! [dependencies]
//! photostage = { version = "0.1", default-features = false }
//! ```

pub mod assets;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod compositor;
pub mod config;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod processor;
pub mod segmentation;
pub mod services;
pub mod styles;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use assets::BackgroundCatalog;
pub use config::{
    BackgroundChoice, OutputFormat, StageConfig, StageConfigBuilder, DEFAULT_ASSETS_DIR,
};
pub use error::{Result, StageError};
pub use geometry::CompositionPlan;
pub use lighting::ShadowLayer;
pub use processor::StagingProcessor;
pub use segmentation::{PassthroughSegmenter, Segmenter};
pub use services::ImageIOService;
pub use styles::{BackgroundStyle, FlatColor, StagingRule};
pub use types::{AlphaMask, MaskStatistics, ProcessingMetadata, ProcessingTimings, StagedResult};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Stage a product photo provided as encoded image bytes.
///
/// Suitable for web servers and memory-based processing where no file exists.
///
/// # Arguments
///
/// * `image_bytes` - Raw image data (PNG, JPEG, TIFF)
/// * `config` - Staging configuration including the background choice
/// * `segmenter` - Foreground segmentation backend
///
/// # Returns
///
/// A [`StagedResult`] carrying the composited RGB image and the resolved
/// background label.
///
/// # Examples
///
/// ```rust,no_run
/// use photostage::{stage_product_from_bytes, PassthroughSegmenter, StageConfig};
///
/// # async fn example(upload_bytes: Vec<u8>) -> anyhow::Result<()> {
/// let config = StageConfig::builder().build()?;
/// let result = stage_product_from_bytes(
///     &upload_bytes,
///     &config,
///     Box::new(PassthroughSegmenter::new()),
/// )
/// .await?;
/// let _png = result.to_bytes(photostage::OutputFormat::Png, 100)?;
/// # Ok(())
/// # }
/// ```
pub async fn stage_product_from_bytes(
    image_bytes: &[u8],
    config: &StageConfig,
    segmenter: Box<dyn Segmenter>,
) -> Result<StagedResult> {
    let image = ImageIOService::load_from_bytes(image_bytes)?;
    stage_product_image(&image, config, segmenter)
}

/// Stage a product photo from an async reader stream.
///
/// Accepts any `AsyncRead`, making it suitable for network streams or large
/// files.
///
/// # Examples
///
/// ```rust,no_run
/// use photostage::{stage_product_from_reader, PassthroughSegmenter, StageConfig};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let file = File::open("cutout.png").await?;
/// let config = StageConfig::builder().build()?;
/// let result = stage_product_from_reader(
///     file,
///     &config,
///     Box::new(PassthroughSegmenter::new()),
/// )
/// .await?;
/// result.save_png("staged.png")?;
/// # Ok(())
/// # }
/// ```
pub async fn stage_product_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    config: &StageConfig,
    segmenter: Box<dyn Segmenter>,
) -> Result<StagedResult> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| StageError::internal(format!("Failed to read from stream: {}", e)))?;

    stage_product_from_bytes(&buffer, config, segmenter).await
}

/// Stage a pre-loaded `DynamicImage` directly.
///
/// The most flexible entry point for in-memory processing; the core pipeline
/// is synchronous and runs to completion before returning.
pub fn stage_product_image(
    image: &image::DynamicImage,
    config: &StageConfig,
    segmenter: Box<dyn Segmenter>,
) -> Result<StagedResult> {
    let mut processor = StagingProcessor::new(config.clone(), segmenter)?;
    processor.process_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_compiles() {
        // Basic compilation test to ensure API is well-formed
        let _config = StageConfig::default();
    }

    #[tokio::test]
    async fn test_stage_from_bytes_rejects_garbage() {
        let config = StageConfig::default();
        let result = stage_product_from_bytes(
            b"definitely not an image",
            &config,
            Box::new(PassthroughSegmenter::new()),
        )
        .await;
        assert!(matches!(result, Err(StageError::Image(_))));
    }
}
