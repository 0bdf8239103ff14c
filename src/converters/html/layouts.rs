//! The ordered layout chain.
//!
//! Each step has a predicate and a renderer. A renderer returns `Ok(None)`
//! to pass the slide on; errors are logged and also pass it on. The text-only
//! page at the end of the chain always renders.

use super::components;
use super::constants::EMPTY_CONTENT_PLACEHOLDER;
use super::context::SlideContext;
use super::diagrams;
use super::error::{HtmlRenderError, Result};
use super::slides;
use super::synthesis::synthesize;
use crate::models::layout::LayoutType;
use crate::models::slide::mapping_list;
use crate::models::unvalidated::ensure_mapping;
use serde_json::{Map, Value};

pub(crate) struct LayoutStep {
    pub name: &'static str,
    pub applies: fn(&SlideContext<'_>) -> bool,
    pub render: fn(&mut SlideContext<'_>) -> Result<Option<String>>,
}

pub(crate) const LAYOUT_STEPS: &[LayoutStep] = &[
    LayoutStep {
        name: "cover-slide",
        applies: |ctx| ctx.slide.index == 0 || ctx.layout == Some(LayoutType::CoverSlide),
        render: slides::cover,
    },
    LayoutStep {
        name: "structured",
        applies: |ctx| ctx.layout.as_ref().map(LayoutType::is_structured).unwrap_or(false),
        render: render_structured,
    },
    LayoutStep {
        name: "chartless content-with-chart",
        applies: |ctx| ctx.layout == Some(LayoutType::ContentWithChart),
        render: demote_without_chart,
    },
    LayoutStep {
        name: "fancy-content-text",
        applies: |ctx| {
            ctx.layout == Some(LayoutType::ContentText)
                && ctx.bullets.len() >= 2
                && !ctx.slide.charts_needed()
        },
        render: slides::fancy_text,
    },
    LayoutStep {
        name: "chart",
        applies: |ctx| ctx.slide.charts_needed(),
        render: slides::chart_slide,
    },
    LayoutStep {
        name: "image",
        applies: |_| true,
        render: slides::image_slide,
    },
];

/// Runs the chain for one slide.
pub(crate) fn render_slide(ctx: &mut SlideContext<'_>) -> String {
    for step in LAYOUT_STEPS {
        if !(step.applies)(ctx) {
            continue;
        }
        match (step.render)(ctx) {
            Ok(Some(html)) => {
                log::debug!("Slide {}: rendered as {}", ctx.slide.slide_number, step.name);
                return html;
            }
            Ok(None) => {}
            Err(e) => log::error!(
                "Slide {}: {} layout failed, trying the next one: {}",
                ctx.slide.slide_number,
                step.name,
                e
            ),
        }
    }
    slides::text_only(ctx)
}

/// Renders a declared structured layout from its own data, or from data
/// synthesized out of the bullets when none was supplied.
fn render_structured(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    let Some(layout) = ctx.layout.clone() else {
        return Ok(None);
    };
    let slide = ctx.slide;
    let visuals = &slide.visual_elements;

    match layout {
        LayoutType::DataTable => {
            let table = ensure_mapping(visuals.get("table_data"), "table_data");
            if let Some(html) = components::data_table(ctx, &table)? {
                return Ok(Some(html));
            }
            log::info!(
                "Slide {}: data-table without table_data, rendering as text",
                ctx.slide.slide_number
            );
            ctx.layout = Some(LayoutType::ContentText);
            if ctx.content_html.is_empty() && !ctx.fill_from_script(true) {
                ctx.content_html = EMPTY_CONTENT_PLACEHOLDER.to_string();
            }
            Ok(None)
        }
        LayoutType::WorkflowDiagram => {
            let supplied = ensure_mapping(visuals.get("workflow"), "workflow");
            if diagrams::has_workflow_nodes(&supplied) {
                return diagrams::workflow_diagram(ctx, &supplied);
            }
            match synthesize(&layout, slide, &ctx.bullets) {
                Some(Value::Object(flow)) => diagrams::workflow_diagram(ctx, &flow),
                _ => Ok(None),
            }
        }
        _ => {
            let Some(field) = layout.structured_field() else {
                return Ok(None);
            };
            let mut items = mapping_list(visuals, field);
            if items.is_empty() {
                items = synthesize(&layout, slide, &ctx.bullets)
                    .map(|value| as_mappings(&value))
                    .unwrap_or_default();
            }
            match layout {
                LayoutType::ComparisonGrid => components::comparison_grid(ctx, &items),
                LayoutType::IconRow => components::icon_row(ctx, &items),
                LayoutType::IconSequence => components::icon_sequence(ctx, &items),
                LayoutType::LinearProcess => components::linear_process(ctx, &items),
                LayoutType::Flowchart => diagrams::flowchart(ctx, &items),
                LayoutType::ProcessFlow => diagrams::process_flow(ctx, &items),
                other => Err(HtmlRenderError::Unsupported(other.to_string())),
            }
        }
    }
}

fn as_mappings(value: &Value) -> Vec<Map<String, Value>> {
    match value {
        Value::Array(items) => items.iter().filter_map(|i| i.as_object().cloned()).collect(),
        _ => Vec::new(),
    }
}

/// A content-with-chart slide whose chart cannot be produced is treated as
/// content-text from here on.
fn demote_without_chart(ctx: &mut SlideContext<'_>) -> Result<Option<String>> {
    if !ctx.chart().is_image() {
        log::info!(
            "Slide {}: no chart available, using content-text",
            ctx.slide.slide_number
        );
        ctx.layout = Some(LayoutType::ContentText);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order_is_fixed() {
        let names: Vec<&str> = LAYOUT_STEPS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "cover-slide",
                "structured",
                "chartless content-with-chart",
                "fancy-content-text",
                "chart",
                "image"
            ]
        );
    }
}
