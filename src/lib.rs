pub mod charts;
pub mod config;
pub mod converters;
pub mod errors;
pub mod images;
pub mod models;
pub mod templates;

pub use config::{PresentationConfig, RenderSettings};
pub use converters::html::{generate_web_slides, write_payload, SlideRenderer};
pub use errors::{Result, SlidesError};
pub use images::{ImageBackend, ImageResolver};
pub use models::{FrontendPayload, SlideDeck};
pub use templates::TemplateRegistry;
