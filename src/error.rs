//! Error types for product staging operations

use thiserror::Error;

/// Result type alias for product staging operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Comprehensive error types for the staging pipeline
#[derive(Error, Debug)]
pub enum StageError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or decoding errors (malformed/unsupported source image)
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Segmentation collaborator failures
    #[error("Segmentation error: {0}")]
    Segmentation(String),

    /// Segmentation produced an empty bounding box
    #[error("No subject detected: {0}")]
    NoSubject(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected failure inside a lighting/compositing stage
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StageError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new segmentation error
    pub fn segmentation<S: Into<String>>(msg: S) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Create a no-subject error with a remediation hint
    pub fn no_subject<S: Into<String>>(msg: S) -> Self {
        Self::NoSubject(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create image loading error with format context
    pub fn image_load_error<P: AsRef<std::path::Path>>(path: P, error: &image::ImageError) -> Self {
        let path_display = path.as_ref().display();
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Failed to load image '{}' (format: {}): {}. Supported formats: PNG, JPEG, TIFF",
                path_display, extension, error
            ),
        )))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Create internal error with stage context
    pub fn stage_error(stage: &str, details: &str) -> Self {
        Self::Internal(format!("Processing failed at stage '{}': {}", stage, details))
    }
}
