use super::theme::ThemeColors;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON document handed to the slide viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendPayload {
    pub metadata: Metadata,
    /// CSS shared by every slide, derived from the theme.
    pub global_css: String,
    pub slides: Vec<SlideRender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub total_slides: usize,
    pub scenario: String,
    pub duration: String,
    pub target_audience: String,
    pub theme_colors: ThemeColors,
}

/// One rendered slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRender {
    pub slide_number: i64,
    /// Self-contained fragment, styles included.
    pub html: String,
    pub css: String,
    pub design_spec: Map<String, Value>,
    pub speaker_notes: Value,
    pub script: Option<Map<String, Value>>,
    pub title: String,
    pub has_icons: bool,
    pub charts_needed: bool,
    /// Passed through so the viewer can regenerate charts client-side.
    pub chart_spec: Option<Value>,
}
