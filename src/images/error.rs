use thiserror::Error;

/// Errors raised by image backends.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Empty keyword provided for image generation")]
    EmptyKeyword,

    #[cfg(feature = "http-backend")]
    #[error("Network request to image backend failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Image backend returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("Image generation is not available: {0}")]
    Unavailable(String),

    #[error("Image backend panicked: {0}")]
    Panicked(String),

    #[error("Image worker pool could not be started: {0}")]
    WorkerPool(String),
}

/// A specialized Result type for image backend operations.
pub type Result<T> = std::result::Result<T, ImageError>;
