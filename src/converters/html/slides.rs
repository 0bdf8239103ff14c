//! Renderers for the unstructured layouts: cover, the decorative two-column
//! templates, and the standard chart, image and text slides.

use super::charts::ChartOutcome;
use super::constants::*;
use super::context::SlideContext;
use super::error::Result;
use super::text::{escape_html_attr, escape_html_text, highlight_numbers, markdown_to_html};
use crate::models::slide::text_field;
use crate::templates::Variables;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FIRST_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<img[^>]+>").unwrap());

/// Material Symbols shown on the decorative text slide, by title keyword.
const TITLE_ICONS: &[(&[&str], &str)] = &[
    (&["injection", "threat", "problem"], "syringe"),
    (&["security", "defense"], "shield"),
    (&["analysis", "data", "finding"], "analytics"),
    (&["process", "workflow"], "settings"),
    (&["benchmark"], "database"),
];
const DEFAULT_TITLE_ICON: &str = "lightbulb";

/// The title slide.
pub(crate) fn cover(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    let slide = ctx.slide;
    let config = ctx.renderer.config;

    let mut subtitle = slide
        .main_text()
        .or_else(|| text_field(&slide.content, "subtitle"))
        .or_else(|| ctx.bullets.first().cloned())
        .unwrap_or_default();

    let mut main_title = slide.title.trim().to_string();
    if let Some((head, tail)) = slide.title.split_once(':') {
        main_title = head.trim().to_string();
        if subtitle.is_empty() {
            subtitle = tail.trim().to_string();
        }
    }
    if subtitle.is_empty() {
        subtitle = DEFAULT_SUBTITLE.to_string();
    }

    let (header, subtitle) = split_header(&subtitle);
    let header_html = if header.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="cover-slide-header-text">{}</span>"#,
            escape_html_text(&header)
        )
    };

    let author_html = match config.author_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            let title_html = config
                .author_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| {
                    format!(
                        r#"<p class="text-sm text-gray-500 dark:text-gray-400">{}</p>"#,
                        escape_html_text(t)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<div class="pt-4"><p class="font-semibold text-gray-800 dark:text-gray-100">{}</p>{}</div>"#,
                escape_html_text(name),
                title_html
            )
        }
        None => String::new(),
    };

    let branding = config
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| main_title.split_whitespace().next().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BRANDING.to_string());

    let mut vars = Variables::new();
    vars.insert("header_html".into(), header_html.into());
    vars.insert("title_html".into(), accent_last_word(&main_title).into());
    vars.insert("subtitle".into(), escape_html_text(&subtitle).into());
    vars.insert("author_html".into(), author_html.into());
    vars.insert("branding".into(), escape_html_text(&branding).into());
    vars.insert("slide_number".into(), format!("{:02}", slide.slide_number).into());
    Ok(Some(ctx.registry().render_page_layout("cover-slide", &vars, ctx.theme())))
}

/// `"Presented by X | Event"` → header `Event`, subtitle `X`.
///
/// Without that shape a short subtitle doubles as an upper-case header.
fn split_header(subtitle: &str) -> (String, String) {
    if let Some((who, event)) = subtitle.split_once('|') {
        let event = event.split('|').next().unwrap_or_default().trim();
        if !event.is_empty() {
            let who = who.replace("Presented by", "").trim().to_string();
            return (event.to_string(), who);
        }
    }
    if subtitle.chars().count() < MAX_HEADER_LEN {
        (subtitle.to_uppercase(), subtitle.to_string())
    } else {
        (DEFAULT_HEADER.to_string(), subtitle.to_string())
    }
}

/// Wraps the last word of a multi-word title in the accent colour.
fn accent_last_word(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    match words.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!(
            r#"{} <span class="text-primary">{}</span>"#,
            escape_html_text(&rest.join(" ")),
            escape_html_text(last)
        ),
        _ => escape_html_text(title),
    }
}

fn fancy_bullets(ctx: &SlideContext<'_>) -> String {
    let primary = &ctx.theme().primary;
    ctx.bullets
        .iter()
        .map(|point| {
            format!(
                r#"<li class="fancy-bullet-item"><span class="material-symbols-outlined fancy-bullet-icon">{}</span><p class="fancy-bullet-text">{}</p></li>"#,
                FANCY_BULLET_ICON,
                highlight_numbers(&markdown_to_html(point), primary)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Two columns: highlighted bullets and a decorative icon.
pub(crate) fn fancy_text(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    let image = ctx.slide_images.first();
    let icon_html = match image {
        Some((url, alt)) => format!(
            r#"<img src="{}" class="fancy-icon-image" alt="{}" />"#,
            escape_html_attr(url),
            escape_html_attr(alt)
        ),
        None => format!(
            r#"<span class="material-symbols-outlined fancy-icon-symbol">{}</span>"#,
            title_icon(&ctx.slide.title)
        ),
    };

    let mut vars = Variables::new();
    vars.insert("title".into(), ctx.title_html().into());
    vars.insert("bullets_html".into(), fancy_bullets(ctx).into());
    vars.insert("icon_html".into(), icon_html.into());
    log::info!("Slide {}: using fancy content template", ctx.slide.slide_number);
    Ok(Some(ctx.registry().render_page_layout("fancy-content-text", &vars, ctx.theme())))
}

fn title_icon(title: &str) -> &'static str {
    let title = title.to_lowercase();
    TITLE_ICONS
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| title.contains(t)))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_TITLE_ICON)
}

/// Chart slides: bullets beside the chart when there are any, else the
/// standard body-and-visual page.
pub(crate) fn chart_slide(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    let chart = ctx.chart().clone();
    if chart == ChartOutcome::NotNeeded {
        return Ok(None);
    }
    if !ctx.bullets.is_empty() {
        let mut vars = Variables::new();
        vars.insert("title".into(), ctx.title_html().into());
        vars.insert("bullets_html".into(), fancy_bullets(ctx).into());
        vars.insert("chart_image_html".into(), chart_image_html(chart.html()).into());
        log::info!("Slide {}: using fancy chart template", ctx.slide.slide_number);
        return Ok(Some(ctx.registry().render_page_layout("fancy-chart", &vars, ctx.theme())));
    }
    Ok(Some(with_visual(ctx, chart.html())))
}

/// The bare `<img>` when the chart region holds one, else the region itself.
fn chart_image_html(chart_html: &str) -> String {
    if chart_html.contains(r#"<div class="chart-container">"#) {
        if let Some(img) = FIRST_IMG.find(chart_html) {
            return img.as_str().to_string();
        }
    }
    chart_html.to_string()
}

/// A slide showing the first picture that resolved.
pub(crate) fn image_slide(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    let Some((url, alt)) = ctx.slide_images.first() else {
        return Ok(None);
    };
    let image_html = format!(
        r#"<div class="slide-image-single"><img src="{}" alt="{}" class="slide-image"></div>"#,
        escape_html_attr(url),
        escape_html_attr(alt)
    );
    Ok(Some(with_visual(ctx, &image_html)))
}

fn body_vars(ctx: &SlideContext<'_>) -> Variables {
    let mut vars = ctx.title_vars();
    let layout_class = if ctx.slide.charts_needed() {
        "slide-with-chart"
    } else {
        "slide-text-only"
    };
    vars.insert("layout_class".into(), layout_class.into());
    vars.insert("body_font_size".into(), ctx.design.body_size().into());
    vars.insert("body_align".into(), ctx.design.body_align.clone().into());
    vars.insert("content_html".into(), ctx.content_html.clone().into());
    vars.insert("icons_html".into(), ctx.icons_html.clone().into());
    vars
}

fn with_visual(ctx: &SlideContext<'_>, visual_html: &str) -> String {
    let mut vars = body_vars(ctx);
    vars.insert("visual_html".into(), Value::String(visual_html.to_string()));
    ctx.registry().render_page_layout("content-with-visual", &vars, ctx.theme())
}

/// Title and body with no visuals; always produces a slide.
pub(crate) fn text_only(ctx: &mut SlideContext<'_>) -> String {
    if ctx.content_html.is_empty() && !ctx.fill_from_script(false) {
        log::warn!(
            "Slide {} has no content, using placeholder",
            ctx.slide.slide_number
        );
        ctx.content_html = EMPTY_CONTENT_PLACEHOLDER.to_string();
    }
    let chart_html = ctx.chart().html().to_string();
    let mut vars = body_vars(ctx);
    vars.insert("chart_html".into(), chart_html.into());
    ctx.registry().render_page_layout("content-text", &vars, ctx.theme())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presented_by_subtitles_yield_a_header() {
        assert_eq!(
            split_header("Presented by Ada | Rust Summit 2025"),
            ("Rust Summit 2025".to_string(), "Ada".to_string())
        );
        assert_eq!(
            split_header("A short line"),
            ("A SHORT LINE".to_string(), "A short line".to_string())
        );
        let long = "x".repeat(60);
        assert_eq!(split_header(&long), (DEFAULT_HEADER.to_string(), long.clone()));
    }

    #[test]
    fn last_title_word_is_accented() {
        assert_eq!(
            accent_last_word("The Future of Search"),
            r#"The Future of <span class="text-primary">Search</span>"#
        );
        assert_eq!(accent_last_word("Solo"), "Solo");
        assert_eq!(accent_last_word("A <b>"), r#"A <span class="text-primary">&lt;b&gt;</span>"#);
    }

    #[test]
    fn icons_follow_title_keywords() {
        assert_eq!(title_icon("Prompt Injection Threats"), "syringe");
        assert_eq!(title_icon("Defense in depth"), "shield");
        assert_eq!(title_icon("Benchmark suite"), "database");
        assert_eq!(title_icon("Wrap-up"), DEFAULT_TITLE_ICON);
    }

    #[test]
    fn chart_images_are_unwrapped() {
        let region = r#"<div class="chart-container"><img src="data:image/png;base64,AA==" alt="Chart" class="chart-image"></div>"#;
        assert_eq!(
            chart_image_html(region),
            r#"<img src="data:image/png;base64,AA==" alt="Chart" class="chart-image">"#
        );
        let stacked = r#"<div class="charts-container"><p>none</p></div>"#;
        assert_eq!(chart_image_html(stacked), stacked);
    }
}
