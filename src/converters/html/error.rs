use thiserror::Error;

/// Errors that can occur while rendering one slide to an HTML fragment.
#[derive(Error, Debug)]
pub enum HtmlRenderError {
    #[error("Formatting error during HTML generation: {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("Layout is not supported by this renderer: {0}")]
    Unsupported(String),
    #[error("An internal error occurred during rendering: {0}")]
    Internal(String),
}

/// A specialized Result type for HTML rendering operations.
pub type Result<T> = std::result::Result<T, HtmlRenderError>;
