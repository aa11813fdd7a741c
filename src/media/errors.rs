//! # Media Errors

use thiserror::Error;

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;

/// Product image storage errors
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Empty image upload")]
    EmptyUpload,

    #[error("Unsupported image format")]
    InvalidImage,

    #[error("Image too large: {0} bytes (max: {1})")]
    TooLarge(u64, u64),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl MediaError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            MediaError::EmptyUpload => 400,
            MediaError::InvalidImage => 400,
            MediaError::TooLarge(_, _) => 413,
            MediaError::IoError(_) => 500,
        }
    }
}
