//! Data model of a slide deck: normalized slide views, layout tags, theme,
//! script sections and the emitted payload.

pub mod deck;
pub mod layout;
pub mod payload;
pub mod script;
pub mod slide;
pub mod theme;
pub mod unvalidated;

pub use deck::SlideDeck;
pub use layout::LayoutType;
pub use payload::{FrontendPayload, Metadata, SlideRender};
pub use script::ScriptMap;
pub use slide::{DesignSpec, SlideView};
pub use theme::ThemeColors;
pub use unvalidated::{ensure_mapping, ensure_sequence, Unvalidated};
