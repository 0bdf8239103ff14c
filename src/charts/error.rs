use thiserror::Error;

/// Errors raised while reading a chart specification or drawing it.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart specification must be a mapping, got {0}")]
    InvalidSpec(String),

    #[error("Chart type '{0}' is not supported")]
    UnsupportedType(String),

    #[error("Chart has no plottable data")]
    EmptyData,

    #[error("Chart value for '{label}' is not numeric: {value}")]
    NonNumeric { label: String, value: String },

    #[error("Formatting error during SVG generation: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("Failed to rasterise chart: {0}")]
    Render(String),

    #[error("Chart data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// A specialized Result type for chart operations.
pub type Result<T> = std::result::Result<T, ChartError>;
