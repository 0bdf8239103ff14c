//! Chooses between pre-rendered chart data, on-the-fly generation from a
//! chart specification, and a placeholder.

use super::constants::*;
use super::text::escape_html_attr;
use crate::charts::{clean_chart_data, ChartDefaults, ChartError, ChartGenerator, ChartSpec};
use crate::models::slide::SlideView;
use crate::models::unvalidated::parse_json_leniently;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What the chart region of a slide holds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChartOutcome {
    /// `charts_needed` is false.
    NotNeeded,
    /// At least one chart image was produced.
    Image(String),
    /// A chart was asked for but none could be produced.
    Placeholder(String),
}

impl ChartOutcome {
    pub fn html(&self) -> &str {
        match self {
            ChartOutcome::NotNeeded => "",
            ChartOutcome::Image(html) | ChartOutcome::Placeholder(html) => html,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ChartOutcome::Image(_))
    }
}

pub(crate) fn resolve_chart(slide: &SlideView, generator: &dyn ChartGenerator) -> ChartOutcome {
    if !slide.charts_needed() {
        return ChartOutcome::NotNeeded;
    }

    if let Some(raw) = slide.visual_text("chart_data") {
        match clean_chart_data(&raw) {
            Ok(data) => return ChartOutcome::Image(chart_image(&data, "Chart")),
            Err(e) => log::warn!(
                "Slide {}: ignoring chart_data ({}), trying chart_spec",
                slide.slide_number,
                e
            ),
        }
    }

    let spec = match slide.visual_elements.get("chart_spec") {
        Some(Value::String(text)) => parse_json_leniently(text).unwrap_or(Value::Null),
        Some(other) => other.clone(),
        None => Value::Null,
    };
    match spec {
        Value::Object(map) if !map.is_empty() => {
            match render_one(&Value::Object(map), &ChartDefaults::single(), generator) {
                Ok(html) => ChartOutcome::Image(html),
                Err(message) => {
                    log::warn!("Slide {}: {}", slide.slide_number, message);
                    ChartOutcome::Placeholder(placeholder(message))
                }
            }
        }
        Value::Array(items) if !items.is_empty() => render_list(slide, &items, generator),
        Value::Number(_) | Value::Bool(true) => {
            log::warn!("Slide {}: chart_spec has an unusable type", slide.slide_number);
            ChartOutcome::Placeholder(placeholder(CHART_INVALID))
        }
        _ => ChartOutcome::Placeholder(placeholder(CHART_SPEC_MISSING)),
    }
}

fn render_list(slide: &SlideView, items: &[Value], generator: &dyn ChartGenerator) -> ChartOutcome {
    let mut parts = Vec::new();
    let mut any_image = false;
    for (index, item) in items.iter().enumerate() {
        let item = match item {
            Value::String(text) => match parse_json_leniently(text) {
                Some(parsed) => parsed,
                None => {
                    log::warn!("Slide {}: chart_spec[{}] is not valid JSON, skipping", slide.slide_number, index);
                    continue;
                }
            },
            other => other.clone(),
        };
        if !item.is_object() {
            log::warn!("Slide {}: chart_spec[{}] is not a mapping, skipping", slide.slide_number, index);
            continue;
        }
        match render_one(&item, &ChartDefaults::in_list(index), generator) {
            Ok(html) => {
                any_image = true;
                parts.push(html);
            }
            Err(message) => {
                log::warn!("Slide {}: chart {}: {}", slide.slide_number, index + 1, message);
                parts.push(placeholder(message));
            }
        }
    }

    if parts.is_empty() {
        return ChartOutcome::Placeholder(placeholder(NO_CHARTS_GENERATED));
    }
    let html = format!(
        r#"<div class="charts-container" style="display: flex; flex-direction: column; gap: 20px;">{}</div>"#,
        parts.concat()
    );
    if any_image {
        ChartOutcome::Image(html)
    } else {
        ChartOutcome::Placeholder(html)
    }
}

/// Renders one chart, or the placeholder text explaining why it could not be.
fn render_one(
    spec: &Value,
    defaults: &ChartDefaults,
    generator: &dyn ChartGenerator,
) -> std::result::Result<String, &'static str> {
    let spec = ChartSpec::from_value(spec, defaults).map_err(|e| match e {
        ChartError::EmptyData => NO_CHART_DATA,
        ChartError::InvalidSpec(_) => CHART_INVALID,
        _ => CHART_FAILED,
    })?;
    match catch_unwind(AssertUnwindSafe(|| generator.render_base64(&spec))) {
        Ok(Ok(data)) => Ok(chart_image(&data, &spec.title)),
        Ok(Err(e)) => {
            log::error!("Chart '{}' failed to render: {}", spec.title, e);
            Err(CHART_FAILED)
        }
        Err(_) => {
            log::error!("Chart generator panicked on '{}'", spec.title);
            Err(CHART_ERROR)
        }
    }
}

fn chart_image(data: &str, alt: &str) -> String {
    format!(
        r#"<div class="chart-container"><img src="data:image/png;base64,{}" alt="{}" class="chart-image"></div>"#,
        data,
        escape_html_attr(alt)
    )
}

fn placeholder(message: &str) -> String {
    format!(
        r#"<div class="chart-container"><p class="text-slate-400 italic">{}</p></div>"#,
        message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{RasterChartGenerator, Result as ChartResult};
    use serde_json::json;

    struct Failing;

    impl ChartGenerator for Failing {
        fn render_png(&self, _: &ChartSpec) -> ChartResult<Vec<u8>> {
            Err(ChartError::EmptyData)
        }
    }

    fn slide(visuals: Value) -> SlideView {
        SlideView::from_value(&json!({ "visual_elements": visuals }), 0).unwrap()
    }

    #[test]
    fn not_needed_without_flag() {
        let outcome = resolve_chart(&slide(json!({"chart_spec": {"data": {"a": 1}}})), &RasterChartGenerator::default());
        assert_eq!(outcome, ChartOutcome::NotNeeded);
    }

    #[test]
    fn chart_data_is_used_directly() {
        let outcome = resolve_chart(
            &slide(json!({"charts_needed": true, "chart_data": "data:image/png;base64,aGVsbG8="})),
            &Failing,
        );
        assert_eq!(
            outcome,
            ChartOutcome::Image(chart_image("aGVsbG8=", "Chart"))
        );
    }

    #[test]
    fn single_spec_generates_one_image() {
        let outcome = resolve_chart(
            &slide(json!({"charts_needed": true, "chart_spec": {"chart_type": "bar", "data": {"A": 1, "B": 2}}})),
            &RasterChartGenerator::default(),
        );
        assert!(outcome.is_image());
        assert_eq!(outcome.html().matches("<img").count(), 1);
        assert!(outcome.html().contains("data:image/png;base64,"));
    }

    #[test]
    fn placeholders_explain_failures() {
        let cases = [
            (json!({"charts_needed": true}), CHART_SPEC_MISSING),
            (json!({"charts_needed": true, "chart_spec": 7}), CHART_INVALID),
            (json!({"charts_needed": true, "chart_spec": {"data": {"a": null}}}), NO_CHART_DATA),
            (json!({"charts_needed": true, "chart_spec": {"data": {"a": 1}}}), CHART_FAILED),
            (json!({"charts_needed": true, "chart_spec": [1, "nope"]}), NO_CHARTS_GENERATED),
        ];
        for (visuals, message) in cases {
            let outcome = resolve_chart(&slide(visuals), &Failing);
            assert_eq!(outcome, ChartOutcome::Placeholder(placeholder(message)));
        }
    }

    #[test]
    fn spec_lists_stack_charts() {
        let outcome = resolve_chart(
            &slide(json!({"charts_needed": true, "chart_spec": [
                {"data": {"a": 1}},
                "{\"chart_type\": \"pie\", \"data\": {\"x\": 2}}",
                {"data": {}}
            ]})),
            &RasterChartGenerator::default(),
        );
        let html = outcome.html();
        assert!(html.starts_with(r#"<div class="charts-container""#));
        assert_eq!(html.matches("<img").count(), 2);
        assert!(html.contains(r#"alt="Chart 1""#) && html.contains(r#"alt="Chart 2""#));
        assert!(html.contains(NO_CHART_DATA));
    }
}
