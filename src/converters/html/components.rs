//! Renderers for the item-based layouts: comparison grid, data table, icon
//! row, icon sequence and linear process.

use super::context::SlideContext;
use super::error::Result;
use super::text::{escape_html_attr, escape_html_text};
use crate::models::slide::{integer_of, scalar_text, text_field};
use crate::models::unvalidated::ensure_sequence;
use crate::templates::{variables_from, Variables};
use serde_json::{Map, Value};

const MIN_SECTIONS: usize = 2;
const MAX_SECTIONS: usize = 4;

/// The picture for one item.
///
/// Sources in order: `image_url`, `image_keyword`, `image` (a URL or a
/// keyword), legacy `icon_url`, and an emoji in `icon`. Keywords go through
/// the slide's image resolver; a keyword that cannot be resolved yields no
/// picture.
pub(crate) fn item_icon_html(
    ctx: &mut SlideContext<'_>,
    item: &Map<String, Value>,
    alt: &str,
    img_class: Option<&str>,
) -> String {
    let class_attr = img_class
        .map(|c| format!(r#" class="{}""#, c))
        .unwrap_or_default();
    let img = |src: &str, alt: &str| {
        format!(
            r#"<img src="{}"{} alt="{}" />"#,
            escape_html_attr(src),
            class_attr,
            escape_html_attr(alt)
        )
    };

    if let Some(url) = text_field(item, "image_url") {
        return img(&url, alt);
    }
    if let Some(keyword) = text_field(item, "image_keyword") {
        return ctx.resolve_image(&keyword).map(|url| img(&url, alt)).unwrap_or_default();
    }
    if let Some(image) = text_field(item, "image") {
        if image.starts_with("http") {
            return img(&image, alt);
        }
        return ctx.resolve_image(&image).map(|url| img(&url, alt)).unwrap_or_default();
    }
    let icon = text_field(item, "icon");
    if let Some(url) = text_field(item, "icon_url") {
        return img(&url, icon.as_deref().unwrap_or(alt));
    }
    match icon {
        Some(emoji) => format!(
            r#"<div class="{}-placeholder">{}</div>"#,
            img_class.unwrap_or("icon"),
            escape_html_text(&emoji)
        ),
        None => String::new(),
    }
}

/// Two to four sections side by side; fewer than two is not rendered.
pub(crate) fn comparison_grid(ctx: &mut SlideContext<'_>, sections: &[Map<String, Value>]) -> Result<Option<String>> {
    if sections.len() < MIN_SECTIONS {
        log::warn!(
            "Slide {}: comparison-grid needs at least {} sections, got {}",
            ctx.slide.slide_number,
            MIN_SECTIONS,
            sections.len()
        );
        return Ok(None);
    }
    if sections.len() > MAX_SECTIONS {
        log::warn!(
            "Slide {}: comparison-grid supports {} sections, truncating {}",
            ctx.slide.slide_number,
            MAX_SECTIONS,
            sections.len()
        );
    }

    let mut rendered = Vec::new();
    for section in sections.iter().take(MAX_SECTIONS) {
        let title = text_field(section, "title").unwrap_or_default();
        let mut vars = Map::new();
        vars.insert("icon_html".into(), item_icon_html(ctx, section, &title, Some("section-icon")).into());
        vars.insert("title".into(), escape_html_text(&title).into());
        vars.insert(
            "content".into(),
            escape_html_text(&text_field(section, "content").unwrap_or_default()).into(),
        );
        if let Some(color) = text_field(section, "background_color") {
            vars.insert("background_color".into(), escape_html_attr(&color).into());
        }
        let highlighted = section.get("highlight").map(is_truthy).unwrap_or(false);
        vars.insert("highlight".into(), if highlighted { "highlighted" } else { "" }.into());
        rendered.push(Value::Object(vars));
    }

    let mut vars = ctx.title_vars();
    vars.insert("sections_count".into(), rendered.len().into());
    vars.insert("sections".into(), Value::Array(rendered));
    let (registry, theme) = (ctx.registry(), ctx.theme());
    let section = |vars: &Map<String, Value>| registry.render_component("comparison-section", &variables_from(vars), theme);
    Ok(Some(registry.render_page_layout_with("comparison-grid", &vars, theme, Some(&section))))
}

/// The `<table>` for `table_data`, or `None` without both headers and rows.
pub(crate) fn data_table_html(ctx: &SlideContext<'_>, table: &Map<String, Value>) -> Option<String> {
    let headers = ensure_sequence(table.get("headers"), "table_data.headers");
    let rows = ensure_sequence(table.get("rows"), "table_data.rows");
    if headers.is_empty() || rows.is_empty() {
        return None;
    }

    let mut alignments = Vec::with_capacity(headers.len());
    let mut headers_html = String::new();
    for header in &headers {
        let (text, width, align) = match header {
            Value::Object(h) => (
                text_field(h, "text").unwrap_or_default(),
                text_field(h, "width"),
                text_field(h, "align").unwrap_or_else(|| "left".to_string()),
            ),
            other => match scalar_text(other) {
                Some(text) => (text, None, "left".to_string()),
                None => {
                    log::warn!("Slide {}: blank table header for {}", ctx.slide.slide_number, other);
                    (String::new(), None, "left".to_string())
                }
            },
        };
        let align = escape_html_attr(&align);
        let style = match width {
            Some(width) => format!("width: {}; text-align: {};", escape_html_attr(&width), align),
            None => format!("text-align: {};", align),
        };
        headers_html.push_str(&format!(r#"<th style="{}">{}</th>"#, style, escape_html_text(&text)));
        alignments.push(align);
    }

    let highlight_rows = index_list(table.get("highlight_rows"));
    let highlight_columns = index_list(table.get("highlight_columns"));
    let mut rows_html = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        let Value::Array(cells) = row else {
            log::warn!("Slide {}: table row {} is not a list, skipping", ctx.slide.slide_number, row_index);
            continue;
        };
        if highlight_rows.contains(&row_index) {
            rows_html.push_str(r#"<tr class="highlight-row">"#);
        } else {
            rows_html.push_str("<tr>");
        }
        for (col_index, cell) in cells.iter().enumerate() {
            let align = alignments.get(col_index).map(String::as_str).unwrap_or("left");
            let class = if highlight_columns.contains(&col_index) {
                r#" class="highlight-cell""#
            } else {
                ""
            };
            let text = scalar_text(cell).unwrap_or_default();
            rows_html.push_str(&format!(
                r#"<td{} style="text-align: {};">{}</td>"#,
                class,
                align,
                escape_html_text(&text)
            ));
        }
        rows_html.push_str("</tr>\n");
    }

    let mut vars = Variables::new();
    vars.insert("headers".into(), headers_html.into());
    vars.insert("rows".into(), rows_html.into());
    vars.insert(
        "style".into(),
        escape_html_attr(&text_field(table, "style").unwrap_or_else(|| "striped".to_string())).into(),
    );
    let caption = text_field(table, "caption")
        .map(|c| format!(r#"<div class="table-caption">{}</div>"#, escape_html_text(&c)))
        .unwrap_or_default();
    vars.insert("caption_html".into(), caption.into());
    Some(ctx.registry().render_component("data-table", &vars, ctx.theme()))
}

/// The data-table page: the table, with the slide's text below it.
pub(crate) fn data_table(ctx: &mut SlideContext<'_>, table: &Map<String, Value>) -> Result<Option<String>> {
    let Some(table_html) = data_table_html(ctx, table) else {
        return Ok(None);
    };
    let mut vars = ctx.title_vars();
    vars.insert("table_html".into(), table_html.into());
    vars.insert("additional_content_html".into(), ctx.content_html.clone().into());
    Ok(Some(ctx.registry().render_page_layout("data-table", &vars, ctx.theme())))
}

pub(crate) fn icon_row(ctx: &mut SlideContext<'_>, items: &[Map<String, Value>]) -> Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        let label = text_field(item, "label").unwrap_or_default();
        let mut vars = Map::new();
        vars.insert("icon_html".into(), item_icon_html(ctx, item, &label, None).into());
        vars.insert("label".into(), escape_html_text(&label).into());
        rendered.push(Value::Object(vars));
    }

    let mut vars = ctx.title_vars();
    vars.insert("subtitle_html".into(), subtitle_html(ctx).into());
    vars.insert("icon_items".into(), Value::Array(rendered));
    let (registry, theme) = (ctx.registry(), ctx.theme());
    let item = |vars: &Map<String, Value>| registry.render_component("icon-item", &variables_from(vars), theme);
    Ok(Some(registry.render_page_layout_with("icon-row", &vars, theme, Some(&item))))
}

/// Icons joined by connectors (`arrow` unless the item names another).
pub(crate) fn icon_sequence(ctx: &mut SlideContext<'_>, items: &[Map<String, Value>]) -> Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    let mut rendered = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let label = text_field(item, "label").unwrap_or_default();
        let connector_html = if i + 1 < items.len() {
            let connector = text_field(item, "connector").unwrap_or_else(|| "arrow".to_string());
            format!(
                r#"<div class="sequence-connector"><div class="connector-{}"></div></div>"#,
                escape_html_attr(&connector)
            )
        } else {
            String::new()
        };
        let mut vars = Map::new();
        vars.insert("icon_html".into(), item_icon_html(ctx, item, &label, None).into());
        vars.insert("label".into(), escape_html_text(&label).into());
        vars.insert("connector_html".into(), connector_html.into());
        rendered.push(Value::Object(vars));
    }

    let goal_text_html = ctx
        .slide
        .main_text()
        .map(|text| format!(r#"<p class="goal-text">{}</p>"#, escape_html_text(&text)))
        .unwrap_or_default();
    let mut vars = ctx.title_vars();
    vars.insert("sequence_items".into(), Value::Array(rendered));
    vars.insert("goal_text_html".into(), goal_text_html.into());
    let (registry, theme) = (ctx.registry(), ctx.theme());
    let item = |vars: &Map<String, Value>| registry.render_component("sequence-item", &variables_from(vars), theme);
    Ok(Some(registry.render_page_layout_with("icon-sequence", &vars, theme, Some(&item))))
}

/// Numbered steps with arrows between them.
pub(crate) fn linear_process(ctx: &mut SlideContext<'_>, steps: &[Map<String, Value>]) -> Result<Option<String>> {
    if steps.is_empty() {
        return Ok(None);
    }
    let mut rendered = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        let number = step
            .get("step_number")
            .and_then(scalar_text)
            .unwrap_or_else(|| (i + 1).to_string());
        let label = text_field(step, "label").unwrap_or_else(|| format!("Step {}", number));
        let arrow_html = if i + 1 < steps.len() {
            r#"<div class="process-step-arrow">&rarr;</div>"#
        } else {
            ""
        };
        let mut vars = Map::new();
        vars.insert("step_number".into(), escape_html_text(&number).into());
        vars.insert("icon_html".into(), item_icon_html(ctx, step, &label, None).into());
        vars.insert("label".into(), escape_html_text(&label).into());
        vars.insert("arrow_html".into(), arrow_html.into());
        rendered.push(Value::Object(vars));
    }

    let mut vars = ctx.title_vars();
    vars.insert("section_header_html".into(), section_header_html(ctx).into());
    vars.insert("process_steps".into(), Value::Array(rendered));
    let (registry, theme) = (ctx.registry(), ctx.theme());
    let step = |vars: &Map<String, Value>| registry.render_component("process-step", &variables_from(vars), theme);
    Ok(Some(registry.render_page_layout_with("linear-process", &vars, theme, Some(&step))))
}

/// `<p class="slide-subtitle">` from `main_text`, or empty.
pub(crate) fn subtitle_html(ctx: &SlideContext<'_>) -> String {
    ctx.slide
        .main_text()
        .map(|text| format!(r#"<p class="slide-subtitle">{}</p>"#, escape_html_text(&text)))
        .unwrap_or_default()
}

/// `<h3 class="section-header">` from `visual_elements.section_header`, or empty.
pub(crate) fn section_header_html(ctx: &SlideContext<'_>) -> String {
    ctx.slide
        .visual_text("section_header")
        .map(|text| format!(r#"<h3 class="section-header">{}</h3>"#, escape_html_text(&text)))
        .unwrap_or_default()
}

fn index_list(value: Option<&Value>) -> Vec<usize> {
    ensure_sequence(value, "highlight indices")
        .iter()
        .filter_map(integer_of)
        .filter_map(|i| usize::try_from(i).ok())
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty() && !s.eq_ignore_ascii_case("false"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RasterChartGenerator;
    use crate::config::PresentationConfig;
    use crate::converters::html::context::SlideRenderer;
    use crate::images::{ImageCache, ImageResolver, UsageTracker};
    use crate::models::slide::SlideView;
    use crate::models::theme::ThemeColors;
    use crate::templates::TemplateRegistry;
    use serde_json::json;

    struct Fixture {
        registry: TemplateRegistry,
        theme: ThemeColors,
        config: PresentationConfig,
        charts: RasterChartGenerator,
        resolver: ImageResolver,
    }

    impl Fixture {
        fn new() -> Self {
            let mut cache = ImageCache::new();
            cache.insert("shield".into(), vec!["https://img/shield-1.png".into(), "https://img/shield-2.png".into()]);
            Fixture {
                registry: TemplateRegistry::builtin(),
                theme: ThemeColors::default(),
                config: PresentationConfig::default(),
                charts: RasterChartGenerator::default(),
                resolver: ImageResolver::from_parts(cache, UsageTracker::new()),
            }
        }

        fn with<R>(&mut self, slide: &SlideView, f: impl FnOnce(&mut SlideContext<'_>) -> R) -> R {
            let renderer = SlideRenderer {
                registry: &self.registry,
                theme: &self.theme,
                config: &self.config,
                charts: &self.charts,
            };
            let mut ctx = SlideContext::new(renderer, slide, None, &mut self.resolver);
            f(&mut ctx)
        }
    }

    fn items(value: Value) -> Vec<Map<String, Value>> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn icon_sources_follow_priority() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({}), 0).unwrap();
        let cases = items(json!([
            {"image_url": "https://x/a.png", "image_keyword": "shield"},
            {"image_keyword": "SHIELD"},
            {"image": "https://x/b.png"},
            {"image": "shield"},
            {"icon_url": "https://x/c.png", "icon": "lock"},
            {"icon": "🔒"},
            {"image_keyword": "unknown"}
        ]));
        let html: Vec<String> = fx.with(&slide, |ctx| {
            cases.iter().map(|item| item_icon_html(ctx, item, "Alt", Some("section-icon"))).collect()
        });
        assert_eq!(html[0], r#"<img src="https://x/a.png" class="section-icon" alt="Alt" />"#);
        assert!(html[1].contains("shield-1.png"));
        assert!(html[2].contains("https://x/b.png"));
        assert!(html[3].contains("shield-2.png"));
        assert!(html[4].contains(r#"alt="lock""#));
        assert_eq!(html[5], r#"<div class="section-icon-placeholder">🔒</div>"#);
        assert_eq!(html[6], "");
    }

    #[test]
    fn tables_apply_column_options() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({}), 0).unwrap();
        let table = json!({
            "headers": [{"text": "Name", "width": "40%"}, {"text": "Score", "align": "right"}, "Notes"],
            "rows": [["a", 1, null], "bad row", ["b", 2, "<ok>"]],
            "highlight_rows": [2],
            "highlight_columns": [1],
            "caption": "Results"
        });
        let html = fx.with(&slide, |ctx| data_table_html(ctx, table.as_object().unwrap())).unwrap();
        assert_eq!(html.matches("<th ").count(), 3);
        assert!(html.contains(r#"<th style="width: 40%; text-align: left;">Name</th>"#));
        assert!(html.contains(r#"<td class="highlight-cell" style="text-align: right;">1</td>"#));
        assert!(html.contains(r#"<tr class="highlight-row">"#));
        assert!(html.contains("&lt;ok&gt;"));
        assert!(html.contains("table-striped"));
        assert!(html.contains(r#"<div class="table-caption">Results</div>"#));
        assert_eq!(html.matches("<tr").count(), 3);
    }

    #[test]
    fn unreadable_headers_keep_their_column() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({}), 0).unwrap();
        let table = json!({
            "headers": ["Team", ["nested"], {"text": "Score", "align": "right"}],
            "rows": [["Sales", "x", "92"]]
        });
        let html = fx.with(&slide, |ctx| data_table_html(ctx, table.as_object().unwrap())).unwrap();
        assert_eq!(html.matches("<th ").count(), 3);
        assert!(html.contains(r#"<th style="text-align: left;"></th><th style="text-align: right;">Score</th>"#));
        assert!(html.contains(r#"<td style="text-align: right;">92</td>"#));
    }

    #[test]
    fn tables_need_headers_and_rows() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({}), 0).unwrap();
        let table = json!({"headers": ["a"], "rows": "not a list"});
        assert!(fx.with(&slide, |ctx| data_table_html(ctx, table.as_object().unwrap())).is_none());
    }

    #[test]
    fn comparison_grid_truncates_to_four() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({"title": "Options"}), 0).unwrap();
        let sections = items(json!([
            {"title": "A", "highlight": true}, {"title": "B"}, {"title": "C"}, {"title": "D"}, {"title": "E"}
        ]));
        let html = fx.with(&slide, |ctx| comparison_grid(ctx, &sections)).unwrap().unwrap();
        assert_eq!(html.matches(r#"<div class="comparison-section"#).count(), 4);
        assert!(html.contains("comparison-grid-4"));
        assert!(html.contains("comparison-section highlighted"));
        assert!(!html.contains(">E<"));

        let one = items(json!([{"title": "A"}]));
        assert!(fx.with(&slide, |ctx| comparison_grid(ctx, &one)).unwrap().is_none());
    }

    #[test]
    fn sequences_connect_all_but_the_last_item() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({"content": {"main_text": "Goal"}}), 0).unwrap();
        let seq = items(json!([{"label": "a", "connector": "plus"}, {"label": "b"}, {"label": "c"}]));
        let html = fx.with(&slide, |ctx| icon_sequence(ctx, &seq)).unwrap().unwrap();
        assert_eq!(html.matches("sequence-connector").count(), 2);
        assert!(html.contains("connector-plus"));
        assert!(html.contains(r#"<p class="goal-text">Goal</p>"#));
    }

    #[test]
    fn linear_steps_are_numbered() {
        let mut fx = Fixture::new();
        let slide = SlideView::from_value(&json!({}), 0).unwrap();
        let steps = items(json!([{"label": "Plan"}, {"step_number": 7}]));
        let html = fx.with(&slide, |ctx| linear_process(ctx, &steps)).unwrap().unwrap();
        assert!(html.contains(r#"<div class="process-step-number">1</div>"#));
        assert!(html.contains("Step 7"));
        assert_eq!(html.matches("process-step-arrow\">").count(), 1);
    }
}
