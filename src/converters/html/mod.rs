//! Renders slide decks to self-contained HTML fragments for the web viewer.
//!
//! `generate_web_slides` is the main entry point. It validates the deck,
//! renders each slide through the layout chain and writes the frontend
//! payload as JSON.
//!
//! # Layouts
//! *   Cover slide for the first slide or an explicit `cover-slide` layout.
//! *   Structured layouts (comparison grid, icon row, icon sequence, linear
//!     process, flowchart, process flow, workflow diagram, data table), with
//!     items synthesized from bullet points when none are supplied.
//! *   Fancy content-text with highlighted numbers and a title icon.
//! *   Chart slides, embedding a PNG rendered from the chart specification.
//! *   Image slides and the text-only fallback.
//!
//! A failing layout falls through to the next one, and a panic while
//! rendering a slide yields a placeholder for that slide only.

mod charts;
mod components;
mod constants;
mod context;
mod diagrams;
mod error;
mod layouts;
mod slides;
mod structure;
mod synthesis;
mod text;

pub use context::SlideRenderer;
pub use error::{HtmlRenderError, Result};
pub use structure::{generate_web_slides, global_css, write_payload, DEFAULT_PRESENTATION_TITLE};
pub use text::{escape_html_attr, escape_html_text, highlight_numbers, markdown_to_html};
