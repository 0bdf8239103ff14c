//! Deck-level assembly: every slide rendered in order, each one isolated,
//! plus the metadata and shared stylesheet the viewer needs.

use super::constants::GLOBAL_CSS_TEMPLATE;
use super::context::{SlideContext, SlideRenderer};
use super::error::HtmlRenderError;
use super::layouts::render_slide;
use super::text::escape_html_text;
use crate::charts::{ChartGenerator, RasterChartGenerator};
use crate::config::{PresentationConfig, DEFAULT_OUTPUT_DIR, DEFAULT_SLIDES_DATA_FILE};
use crate::errors::Result;
use crate::images::ImageResolver;
use crate::models::deck::SlideDeck;
use crate::models::payload::{FrontendPayload, Metadata, SlideRender};
use crate::models::script::ScriptMap;
use crate::models::slide::SlideView;
use crate::models::theme::ThemeColors;
use crate::models::unvalidated::ensure_sequence;
use crate::templates::{substitute, TemplateRegistry};
use serde_json::{Map, Value};
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

pub const DEFAULT_PRESENTATION_TITLE: &str = "Generated Presentation";

impl<'a> SlideRenderer<'a> {
    pub fn new(
        registry: &'a TemplateRegistry,
        theme: &'a ThemeColors,
        config: &'a PresentationConfig,
        charts: &'a dyn ChartGenerator,
    ) -> Self {
        SlideRenderer {
            registry,
            theme,
            config,
            charts,
        }
    }

    /// Renders one slide to an HTML fragment.
    ///
    /// Never fails: layout errors fall through to simpler layouts, and a
    /// panic anywhere in rendering yields a placeholder fragment.
    pub fn render_slide(
        &self,
        slide: &SlideView,
        script: Option<&Map<String, Value>>,
        resolver: &mut ImageResolver,
    ) -> String {
        let rendered = catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = SlideContext::new(*self, slide, script, resolver);
            render_slide(&mut ctx)
        }));
        match rendered {
            Ok(html) => html,
            Err(panic) => {
                let err = HtmlRenderError::Internal(panic_message(panic.as_ref()));
                log::error!(
                    "Slide {} failed to render, using a placeholder: {}",
                    slide.slide_number,
                    err
                );
                placeholder_slide(&slide.title)
            }
        }
    }

    /// Renders every slide of `deck` in order through one resolver.
    pub fn assemble(
        &self,
        deck: &SlideDeck,
        scripts: &ScriptMap,
        title: &str,
        resolver: &mut ImageResolver,
    ) -> FrontendPayload {
        let mut slides = Vec::with_capacity(deck.len());
        for slide in &deck.slides {
            let script = scripts.get(slide.slide_number);
            let html = self.render_slide(slide, script, resolver);
            slides.push(SlideRender {
                slide_number: slide.slide_number,
                html,
                css: String::new(),
                design_spec: slide.design_spec.clone(),
                speaker_notes: slide.speaker_notes.clone(),
                script: script.cloned(),
                title: slide.title.clone(),
                has_icons: !ensure_sequence(slide.visual_elements.get("icons_fetched"), "icons_fetched")
                    .is_empty(),
                charts_needed: slide.charts_needed(),
                chart_spec: slide.visual_elements.get("chart_spec").filter(|v| is_present(v)).cloned(),
            });
        }
        log::info!("Rendered {} slides", slides.len());

        FrontendPayload {
            metadata: Metadata {
                title: title.to_string(),
                total_slides: deck.len(),
                scenario: self.config.scenario_or_empty(),
                duration: self.config.duration_or_empty(),
                target_audience: self.config.target_audience_or_empty(),
                theme_colors: self.theme.clone(),
            },
            global_css: global_css(self.theme),
            slides,
        }
    }
}

/// The deck-wide stylesheet for `theme`.
pub fn global_css(theme: &ThemeColors) -> String {
    substitute(GLOBAL_CSS_TEMPLATE, &theme.as_variables(), None)
}

fn placeholder_slide(title: &str) -> String {
    format!(
        r#"<div class="slide-content slide-text-only"><h1 class="slide-title">{}</h1><div class="slide-body"></div></div>"#,
        escape_html_text(title)
    )
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Bool(true) => true,
    }
}

/// Renders a deck with the built-in templates and the raster chart
/// generator, writes the payload as pretty JSON, and returns it.
///
/// `output_path` defaults to `output/slides_data.json`; parent directories
/// are created. An empty `title` becomes "Generated Presentation".
pub fn generate_web_slides(
    slide_deck: &Value,
    presentation_script: &Value,
    config: &PresentationConfig,
    title: &str,
    output_path: Option<&Path>,
    resolver: &mut ImageResolver,
) -> Result<FrontendPayload> {
    let deck = SlideDeck::from_value(slide_deck)?;
    let scripts = ScriptMap::from_value(presentation_script);
    let registry = TemplateRegistry::builtin();
    let theme = config.theme_colors();
    let charts = RasterChartGenerator::default();
    let title = if title.trim().is_empty() {
        DEFAULT_PRESENTATION_TITLE
    } else {
        title
    };

    let payload = SlideRenderer::new(&registry, &theme, config, &charts).assemble(&deck, &scripts, title, resolver);

    let path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR).join(DEFAULT_SLIDES_DATA_FILE));
    write_payload(&payload, &path)?;
    Ok(payload)
}

/// Writes `payload` as pretty-printed JSON, creating parent directories.
pub fn write_payload(payload: &FrontendPayload, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(path, json)?;
    log::info!("Wrote slides payload to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartSpec, Result as ChartResult};
    use serde_json::json;

    struct Panicking;

    impl ChartGenerator for Panicking {
        fn render_png(&self, _: &ChartSpec) -> ChartResult<Vec<u8>> {
            panic!("backend exploded")
        }
    }

    #[test]
    fn global_css_uses_the_theme() {
        let css = global_css(&ThemeColors::for_scenario("academic talk"));
        assert!(css.contains("color: #1E40AF;"));
        assert!(css.contains("#3B82F615"));
        assert!(!css.contains("{theme_"));
    }

    #[test]
    fn slide_fields_are_passed_through() {
        let registry = TemplateRegistry::builtin();
        let theme = ThemeColors::default();
        let config = PresentationConfig::from_value(&json!({"scenario": "business", "duration": "10 min"}));
        let charts = RasterChartGenerator::default();
        let deck = SlideDeck::from_value(&json!({"slides": [
            {"title": "Intro", "speaker_notes": null},
            {"slide_number": 5, "title": "Numbers",
             "visual_elements": {"icons_fetched": [{"icon_url": "u"}], "chart_spec": {}, "charts_needed": false},
             "design_spec": {"layout_type": "content-text"}}
        ]}))
        .unwrap();
        let scripts = ScriptMap::from_value(&json!({"script_sections": [{"slide_number": 5, "opening_line": "Hi"}]}));
        let mut resolver = ImageResolver::new();

        let payload = SlideRenderer::new(&registry, &theme, &config, &charts).assemble(&deck, &scripts, "Deck", &mut resolver);
        assert_eq!(payload.metadata.total_slides, 2);
        assert_eq!(payload.metadata.scenario, "business");
        assert_eq!(payload.metadata.target_audience, "");
        let second = &payload.slides[1];
        assert_eq!(second.slide_number, 5);
        assert!(second.has_icons);
        assert_eq!(second.chart_spec, None);
        assert_eq!(second.script.as_ref().unwrap()["opening_line"], json!("Hi"));
        assert_eq!(payload.slides[0].speaker_notes, json!(""));
        assert!(payload.slides[0].script.is_none());
        assert_eq!(second.css, "");
    }

    #[test]
    fn generator_panics_do_not_stop_the_deck() {
        let registry = TemplateRegistry::builtin();
        let theme = ThemeColors::default();
        let config = PresentationConfig::default();
        let deck = SlideDeck::from_value(&json!({"slides": [
            {"title": "Cover"},
            {"title": "Boom", "content": {"bullet_points": ["a"]},
             "visual_elements": {"charts_needed": true, "chart_spec": {"data": {"a": 1}}}},
            {"title": "After"}
        ]}))
        .unwrap();
        let mut resolver = ImageResolver::new();
        let payload = SlideRenderer::new(&registry, &theme, &config, &Panicking).assemble(
            &deck,
            &ScriptMap::default(),
            "Deck",
            &mut resolver,
        );
        assert_eq!(payload.slides.len(), 3);
        assert!(payload.slides[1].html.contains("Chart generation error"));
        assert!(payload.slides[2].html.contains("After"));
    }

    #[test]
    fn payload_is_written_to_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/slides.json");
        let payload = generate_web_slides(
            &json!({"slides": [{"title": "Only"}]}),
            &Value::Null,
            &PresentationConfig::default(),
            "",
            Some(&path),
            &mut ImageResolver::new(),
        )
        .unwrap();
        assert_eq!(payload.metadata.title, DEFAULT_PRESENTATION_TITLE);
        let written: FrontendPayload = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
    }

    #[test]
    fn invalid_decks_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.json");
        let result = generate_web_slides(
            &json!({"slides": []}),
            &Value::Null,
            &PresentationConfig::default(),
            "T",
            Some(&path),
            &mut ImageResolver::new(),
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
