//! Per-slide rendering state shared by the layout steps.

use super::charts::{resolve_chart, ChartOutcome};
use super::constants::MAX_SCRIPT_POINTS;
use super::text::{bullet_list_html, escape_html_attr, escape_html_text, markdown_to_html};
use crate::charts::ChartGenerator;
use crate::config::PresentationConfig;
use crate::images::ImageResolver;
use crate::models::layout::LayoutType;
use crate::models::slide::{mapping_list, text_field, DesignSpec, SlideView};
use crate::models::theme::ThemeColors;
use crate::templates::{TemplateRegistry, Variables};
use serde_json::{Map, Value};

/// Everything that stays fixed while a deck is rendered.
#[derive(Clone, Copy)]
pub struct SlideRenderer<'a> {
    pub registry: &'a TemplateRegistry,
    pub theme: &'a ThemeColors,
    pub config: &'a PresentationConfig,
    pub charts: &'a dyn ChartGenerator,
}

/// Mutable state for one slide as it moves through the layout steps.
pub(crate) struct SlideContext<'a> {
    pub renderer: SlideRenderer<'a>,
    pub slide: &'a SlideView,
    pub script: Option<&'a Map<String, Value>>,
    pub resolver: &'a mut ImageResolver,
    /// Effective layout; steps may demote it.
    pub layout: Option<LayoutType>,
    /// Effective bullets; may be replaced from the script.
    pub bullets: Vec<String>,
    pub content_html: String,
    pub icons_html: String,
    pub design: DesignSpec,
    /// The slide's own pictures as `(url, alt)`, resolved before any step runs.
    pub slide_images: Vec<(String, String)>,
    chart: Option<ChartOutcome>,
}

impl<'a> SlideContext<'a> {
    pub fn new(
        renderer: SlideRenderer<'a>,
        slide: &'a SlideView,
        script: Option<&'a Map<String, Value>>,
        resolver: &'a mut ImageResolver,
    ) -> Self {
        let bullets = slide.bullet_points();
        let mut content_html = String::new();
        if let Some(main_text) = slide.main_text() {
            content_html.push_str(&format!(
                r#"<div class="main-text">{}</div>"#,
                markdown_to_html(&main_text)
            ));
        }
        if !bullets.is_empty() {
            content_html.push_str(&bullet_list_html(&bullets));
        }
        let slide_images = slide_images(slide, resolver);

        SlideContext {
            renderer,
            slide,
            script,
            resolver,
            layout: slide.layout_type(),
            bullets,
            content_html,
            icons_html: icons_html(slide),
            design: slide.design(),
            slide_images,
            chart: None,
        }
    }

    pub fn theme(&self) -> &'a ThemeColors {
        self.renderer.theme
    }

    pub fn registry(&self) -> &'a TemplateRegistry {
        self.renderer.registry
    }

    pub fn title_html(&self) -> String {
        escape_html_text(&self.slide.title)
    }

    /// The chart region, generated on first use.
    pub fn chart(&mut self) -> &ChartOutcome {
        if self.chart.is_none() {
            self.chart = Some(resolve_chart(self.slide, self.renderer.charts));
        }
        self.chart.get_or_insert(ChartOutcome::NotNeeded)
    }

    pub fn resolve_image(&mut self, keyword: &str) -> Option<String> {
        self.resolver.resolve(keyword)
    }

    /// Title typography shared by most page layouts.
    pub fn title_vars(&self) -> Variables {
        let mut vars = Variables::new();
        vars.insert("title".into(), Value::String(self.title_html()));
        vars.insert("title_font_size".into(), Value::String(self.design.title_size()));
        vars.insert("title_align".into(), Value::String(self.design.title_align.clone()));
        vars
    }

    /// Fills an empty body from the script section.
    ///
    /// Script points become the bullets when `replace_bullets` is set or
    /// the slide has none. Returns whether any content was produced.
    pub fn fill_from_script(&mut self, replace_bullets: bool) -> bool {
        let (html, points) = script_content(self.script);
        if html.is_empty() {
            return false;
        }
        log::info!(
            "Slide {}: generated body from the presentation script",
            self.slide.slide_number
        );
        if !points.is_empty() && (replace_bullets || self.bullets.is_empty()) {
            self.bullets = points;
        }
        self.content_html = html;
        true
    }
}

/// Every keyword from `image_keywords` (else `icons_suggested`) is resolved
/// in order, so each occurrence advances the rotation; without any, `figures`
/// entries may name a keyword or a direct URL.
fn slide_images(slide: &SlideView, resolver: &mut ImageResolver) -> Vec<(String, String)> {
    let mut keywords = slide.visual_list("image_keywords");
    if keywords.is_empty() {
        keywords = slide.visual_list("icons_suggested");
    }
    if !keywords.is_empty() {
        return keywords
            .into_iter()
            .filter_map(|kw| resolver.resolve(&kw).map(|url| (url, kw)))
            .collect();
    }

    let mut images = Vec::new();
    for figure in slide.visual_items("figures") {
        let caption = text_field(&figure, "caption").or_else(|| text_field(&figure, "alt_text"));
        if let Some(keyword) = text_field(&figure, "image_keyword") {
            if let Some(url) = resolver.resolve(&keyword) {
                images.push((url, caption.unwrap_or(keyword)));
            }
        } else if let Some(url) = text_field(&figure, "image_url") {
            images.push((url, caption.unwrap_or_else(|| "Image".to_string())));
        }
    }
    images
}

/// Up to three `main_content` points as a bullet list, else the opening line.
fn script_content(script: Option<&Map<String, Value>>) -> (String, Vec<String>) {
    let Some(script) = script else {
        return (String::new(), Vec::new());
    };

    let points: Vec<String> = mapping_list(script, "main_content")
        .iter()
        .filter_map(|point| text_field(point, "point").or_else(|| text_field(point, "explanation")))
        .take(MAX_SCRIPT_POINTS)
        .collect();
    if !points.is_empty() {
        return (bullet_list_html(&points), points);
    }

    match text_field(script, "opening_line") {
        Some(line) => (
            format!(r#"<div class="main-text">{}</div>"#, escape_html_text(&line)),
            Vec::new(),
        ),
        None => (String::new(), Vec::new()),
    }
}

/// `<div class="icons-container">` for `icons_fetched`, or empty.
fn icons_html(slide: &SlideView) -> String {
    let icons: Vec<String> = slide
        .visual_items("icons_fetched")
        .iter()
        .filter_map(|icon| {
            let url = text_field(icon, "icon_url")?;
            let name = text_field(icon, "icon_name").unwrap_or_else(|| "icon".to_string());
            Some(format!(
                r#"<img src="{}" alt="{}" class="slide-icon">"#,
                escape_html_attr(&url),
                escape_html_attr(&name)
            ))
        })
        .collect();
    if icons.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="icons-container">{}</div>"#, icons.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn script_points_are_capped() {
        let script = json!({"main_content": [
            {"point": "a"}, {"explanation": "b"}, "skip", {"point": "c"}, {"point": "d"}
        ]});
        let (html, points) = script_content(script.as_object());
        assert_eq!(points, vec!["a", "b", "c"]);
        assert_eq!(html, r#"<ul class="bullet-points"><li>a</li><li>b</li><li>c</li></ul>"#);
    }

    #[test]
    fn opening_line_is_the_second_choice() {
        let script = json!({"main_content": [], "opening_line": "Welcome"});
        let (html, points) = script_content(script.as_object());
        assert_eq!(html, r#"<div class="main-text">Welcome</div>"#);
        assert!(points.is_empty());
        assert_eq!(script_content(None), (String::new(), Vec::new()));
    }

    #[test]
    fn fetched_icons_need_a_url() {
        let slide = SlideView::from_value(
            &json!({"visual_elements": {"icons_fetched": [
                {"icon_url": "https://i/1.png", "icon_name": "lock"},
                {"icon_name": "no-url"},
                {"icon_url": "https://i/2.png"}
            ]}}),
            0,
        )
        .unwrap();
        assert_eq!(
            icons_html(&slide),
            r#"<div class="icons-container"><img src="https://i/1.png" alt="lock" class="slide-icon"><img src="https://i/2.png" alt="icon" class="slide-icon"></div>"#
        );
    }
}
