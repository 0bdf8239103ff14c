//! Image keywords: collection across a deck, generation through a pluggable
//! backend, and round-robin resolution during rendering.

mod backend;
mod collect;
mod error;
mod resolver;

#[cfg(feature = "http-backend")]
pub use backend::HttpImageBackend;
pub use backend::{normalize_keyword, ImageBackend};
pub use collect::{collect_keywords, collect_slide_keywords};
pub use error::{ImageError, Result};
pub use resolver::{ImageCache, ImageResolver, UsageTracker};
