//! Configuration types for product staging operations

use crate::{
    error::{Result, StageError},
    styles::{BackgroundStyle, FlatColor},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding background plate assets
pub const DEFAULT_ASSETS_DIR: &str = "assets/backgrounds";

/// Default film grain intensity (fraction of full-scale, sigma = intensity * 255)
pub const DEFAULT_GRAIN_INTENSITY: f32 = 0.012;

/// Default transparent safe-zone margin around the trimmed subject, in pixels
pub const DEFAULT_SAFE_MARGIN: u32 = 100;

/// Default brightness threshold separating light from dark subjects
pub const DEFAULT_LIGHT_THRESHOLD: u8 = 200;

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG (lossless)
    Png,
    /// JPEG (lossy, quality-controlled)
    Jpeg,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Background selection for a staging run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundChoice {
    /// Pick White or Black from the subject's brightness
    Auto,
    /// Solid color canvas, no lighting stages
    Flat(FlatColor),
    /// Photographic plate with full staging
    Style(BackgroundStyle),
}

impl Default for BackgroundChoice {
    fn default() -> Self {
        Self::Auto
    }
}

impl BackgroundChoice {
    /// Parse a user-facing selection string.
    ///
    /// Accepts `None`, "Auto" or "Auto-detect" for automatic selection, the flat
    /// color names, and any public plate style name.
    ///
    /// # Errors
    /// Returns `StageError::InvalidConfig` for unknown selections.
    pub fn parse(selection: Option<&str>) -> Result<Self> {
        let Some(raw) = selection else {
            return Ok(Self::Auto);
        };
        let name = raw.trim();
        if name.is_empty()
            || name.eq_ignore_ascii_case("auto")
            || name.eq_ignore_ascii_case("auto-detect")
        {
            return Ok(Self::Auto);
        }
        if name.eq_ignore_ascii_case("white") {
            return Ok(Self::Flat(FlatColor::White));
        }
        if name.eq_ignore_ascii_case("black") {
            return Ok(Self::Flat(FlatColor::Black));
        }
        BackgroundStyle::from_name(name).map(Self::Style).ok_or_else(|| {
            StageError::invalid_config(format!(
                "Unknown background '{}'. Valid selections: {}",
                name,
                crate::styles::public_backgrounds().join(", ")
            ))
        })
    }

    /// Label reported when this choice resolves without looking at the subject
    #[must_use]
    pub fn fixed_label(&self) -> Option<&'static str> {
        match self {
            Self::Auto => None,
            Self::Flat(color) => Some(color.label()),
            Self::Style(style) => Some(style.display_name()),
        }
    }
}

/// Configuration for the staging pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Background selection (auto, flat color, or plate style)
    pub background: BackgroundChoice,

    /// Directory holding `<style_key>.png` plate assets
    pub assets_dir: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// Film grain intensity; sigma of the per-channel noise is `intensity * 255`
    pub grain_intensity: f32,

    /// Seed for the grain noise source (None = OS entropy)
    pub grain_seed: Option<u64>,

    /// Transparent margin added around the trimmed subject before filtering
    pub safe_margin: u32,

    /// Brightness threshold separating light from dark subjects
    pub light_threshold: u8,

    /// Enable debug mode (additional logging)
    pub debug: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            background: BackgroundChoice::default(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
            grain_intensity: DEFAULT_GRAIN_INTENSITY,
            grain_seed: None,
            safe_margin: DEFAULT_SAFE_MARGIN,
            light_threshold: DEFAULT_LIGHT_THRESHOLD,
            debug: false,
        }
    }
}

impl StageConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    /// ```rust
    /// use photostage::{BackgroundChoice, BackgroundStyle, StageConfig};
    ///
    /// let config = StageConfig::builder()
    ///     .background(BackgroundChoice::Style(BackgroundStyle::MarbleFloor))
    ///     .grain_seed(7)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.grain_seed, Some(7));
    /// ```
    #[must_use]
    pub fn builder() -> StageConfigBuilder {
        StageConfigBuilder::new()
    }
}

/// Builder for `StageConfig` with validation at build time
pub struct StageConfigBuilder {
    config: StageConfig,
}

impl StageConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StageConfig::default(),
        }
    }

    #[must_use]
    pub fn background(mut self, background: BackgroundChoice) -> Self {
        self.config.background = background;
        self
    }

    #[must_use]
    pub fn assets_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.assets_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(0, 100);
        self
    }

    #[must_use]
    pub fn grain_intensity(mut self, intensity: f32) -> Self {
        self.config.grain_intensity = intensity;
        self
    }

    #[must_use]
    pub fn grain_seed(mut self, seed: u64) -> Self {
        self.config.grain_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn safe_margin(mut self, margin: u32) -> Self {
        self.config.safe_margin = margin;
        self
    }

    #[must_use]
    pub fn light_threshold(mut self, threshold: u8) -> Self {
        self.config.light_threshold = threshold;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns `StageError::InvalidConfig` for out-of-range grain intensity or
    /// an oversized safe margin.
    pub fn build(self) -> Result<StageConfig> {
        if !self.config.grain_intensity.is_finite()
            || !(0.0..=0.25).contains(&self.config.grain_intensity)
        {
            return Err(StageError::config_value_error(
                "grain_intensity",
                self.config.grain_intensity,
                "0.0-0.25",
            ));
        }
        if self.config.safe_margin > 2048 {
            return Err(StageError::config_value_error(
                "safe_margin",
                self.config.safe_margin,
                "0-2048",
            ));
        }
        Ok(self.config)
    }
}

impl Default for StageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StageConfig::default();
        assert_eq!(config.background, BackgroundChoice::Auto);
        assert_eq!(config.safe_margin, DEFAULT_SAFE_MARGIN);
        assert_eq!(config.light_threshold, DEFAULT_LIGHT_THRESHOLD);
    }

    #[test]
    fn test_parse_selections() {
        assert_eq!(BackgroundChoice::parse(None).unwrap(), BackgroundChoice::Auto);
        assert_eq!(
            BackgroundChoice::parse(Some("Auto-detect")).unwrap(),
            BackgroundChoice::Auto
        );
        assert_eq!(
            BackgroundChoice::parse(Some("white")).unwrap(),
            BackgroundChoice::Flat(FlatColor::White)
        );
        assert_eq!(
            BackgroundChoice::parse(Some("Marble Floor")).unwrap(),
            BackgroundChoice::Style(BackgroundStyle::MarbleFloor)
        );
        assert!(BackgroundChoice::parse(Some("Lunar Surface")).is_err());
    }

    #[test]
    fn test_builder_validation() {
        let err = StageConfig::builder().grain_intensity(0.9).build();
        assert!(matches!(err, Err(StageError::InvalidConfig(_))));

        let err = StageConfig::builder().grain_intensity(f32::NAN).build();
        assert!(err.is_err());

        let config = StageConfig::builder()
            .grain_intensity(0.0)
            .jpeg_quality(255)
            .build()
            .unwrap();
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn test_fixed_labels() {
        assert_eq!(BackgroundChoice::Auto.fixed_label(), None);
        assert_eq!(
            BackgroundChoice::Flat(FlatColor::Black).fixed_label(),
            Some("Black")
        );
        assert_eq!(
            BackgroundChoice::Style(BackgroundStyle::WoodenFloor).fixed_label(),
            Some("Wooden Floor")
        );
    }
}
