use thiserror::Error;

/// Represents errors that stop a whole deck from being rendered.
///
/// Anything that only affects one slide is recovered inside the renderer and
/// never reaches this type.
#[derive(Error, Debug)]
pub enum SlidesError {
    /// The slide deck could not be read as a mapping, even after every JSON
    /// recovery strategy was attempted.
    #[error("Slide deck is not a mapping: {0}")]
    InvalidDeck(String),

    /// The deck was readable but no slide survived validation.
    #[error("Slide deck contains no valid slides")]
    EmptyDeck,

    /// Error occurred while serializing the frontend payload.
    #[error("Failed to serialize slides payload: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// An I/O error occurred while writing the payload or reading templates.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The image backend failed in a way the caller asked to see.
    #[error("Image backend error: {0}")]
    Image(#[from] crate::images::ImageError),
}

/// A type alias for `Result<T, SlidesError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, SlidesError>;
