//! Flowcharts (Mermaid), workflow diagrams and process flows.

use super::components::{item_icon_html, section_header_html, subtitle_html};
use super::constants::FLOWCHART_PLACEHOLDER;
use super::context::SlideContext;
use super::error::Result;
use super::text::{escape_html_attr, escape_html_text};
use crate::models::slide::{mapping_list, scalar_text, text_field};
use crate::models::unvalidated::ensure_mapping;
use crate::templates::{variables_from, Variables};
use serde_json::{Map, Value};
use std::fmt::Write;

/// Mermaid source for a chain of steps, wrapped for client-side rendering.
///
/// `vertical` orientation lays the chart out top-down, anything else left
/// to right. The diagram id is derived from the slide number.
pub(crate) fn mermaid_flowchart(steps: &[Map<String, Value>], vertical: bool, slide_number: i64) -> Result<String> {
    if steps.is_empty() {
        return Ok(FLOWCHART_PLACEHOLDER.to_string());
    }

    let mut code = String::new();
    writeln!(code, "flowchart {}", if vertical { "TD" } else { "LR" })?;
    for (i, step) in steps.iter().enumerate() {
        let label = text_field(step, "label").unwrap_or_else(|| format!("Step {}", i + 1));
        let text = match text_field(step, "description") {
            Some(description) => format!("{}<br/>{}", mermaid_text(&label), mermaid_text(&description)),
            None => mermaid_text(&label),
        };
        writeln!(code, "    step{}[\"{}\"]", i + 1, text)?;
    }
    for i in 1..steps.len() {
        writeln!(code, "    step{} --> step{}", i, i + 1)?;
    }

    Ok(format!(
        "<div class=\"mermaid-flowchart-container\" data-mermaid-id=\"mermaid-slide-{}\">\n<pre class=\"mermaid\">\n{}</pre>\n</div>",
        slide_number, code
    ))
}

fn mermaid_text(text: &str) -> String {
    escape_html_text(text).replace('"', "&quot;").replace('\'', "&apos;")
}

pub(crate) fn flowchart(ctx: &mut SlideContext<'_>, steps: &[Map<String, Value>]) -> Result<Option<String>> {
    if steps.is_empty() {
        return Ok(None);
    }
    let vertical = ctx
        .slide
        .visual_text("flowchart_orientation")
        .map(|o| o.eq_ignore_ascii_case("vertical"))
        .unwrap_or(false);
    let mut vars = ctx.title_vars();
    vars.insert(
        "flowchart_html".into(),
        mermaid_flowchart(steps, vertical, ctx.slide.slide_number)?.into(),
    );
    Ok(Some(ctx.registry().render_page_layout("flowchart", &vars, ctx.theme())))
}

/// One `workflow-box` component; `kind` is used when the node names no `type`.
fn workflow_box(ctx: &mut SlideContext<'_>, node: &Map<String, Value>, kind: &str) -> String {
    let label = text_field(node, "label").unwrap_or_default();
    let note_html = text_field(node, "note")
        .map(|note| format!(r#"<div class="workflow-box-note">{}</div>"#, escape_html_text(&note)))
        .unwrap_or_default();
    let kind = text_field(node, "type").unwrap_or_else(|| kind.to_string());

    let mut vars = Variables::new();
    vars.insert("type".into(), escape_html_attr(&kind).into());
    vars.insert("icon_html".into(), item_icon_html(ctx, node, &label, None).into());
    vars.insert("label".into(), escape_html_text(&label).into());
    vars.insert("note_html".into(), note_html.into());
    ctx.registry().render_component("workflow-box", &vars, ctx.theme())
}

/// Whether a workflow mapping holds any node to draw.
pub(crate) fn has_workflow_nodes(workflow: &Map<String, Value>) -> bool {
    ["inputs", "processes", "outputs"]
        .iter()
        .any(|key| !mapping_list(workflow, key).is_empty())
}

/// Inputs row, then each process, then the outputs row, joined by arrows.
pub(crate) fn workflow_diagram(ctx: &mut SlideContext<'_>, workflow: &Map<String, Value>) -> Result<Option<String>> {
    if !has_workflow_nodes(workflow) {
        return Ok(None);
    }
    let arrow = r#"<div class="workflow-arrow">&rarr;</div>"#;
    let mut html = String::new();

    let inputs = mapping_list(workflow, "inputs");
    if !inputs.is_empty() {
        let boxes: String = inputs.iter().map(|node| workflow_box(ctx, node, "input")).collect();
        write!(html, r#"<div class="workflow-row">{}</div>"#, boxes)?;
    }
    for (i, node) in mapping_list(workflow, "processes").iter().enumerate() {
        if i > 0 || !html.is_empty() {
            html.push_str(arrow);
        }
        html.push_str(&workflow_box(ctx, node, "process"));
    }
    let outputs = mapping_list(workflow, "outputs");
    if !outputs.is_empty() {
        let boxes: String = outputs.iter().map(|node| workflow_box(ctx, node, "output")).collect();
        if !html.is_empty() {
            html.push_str(arrow);
        }
        write!(html, r#"<div class="workflow-row">{}</div>"#, boxes)?;
    }

    let criteria = ctx.slide.visual_list("evaluation_criteria");
    let criteria_html = if criteria.is_empty() {
        String::new()
    } else {
        let items: String = criteria
            .iter()
            .map(|c| format!("<li>{}</li>", escape_html_text(c)))
            .collect();
        format!(
            r#"<div class="evaluation-criteria-list"><h4>Evaluation Criteria</h4><ul>{}</ul></div>"#,
            items
        )
    };

    let mut vars = ctx.title_vars();
    vars.insert("subtitle_html".into(), subtitle_html(ctx).into());
    vars.insert("workflow_html".into(), html.into());
    vars.insert("evaluation_criteria_html".into(), criteria_html.into());
    Ok(Some(ctx.registry().render_page_layout("workflow-diagram", &vars, ctx.theme())))
}

/// Stages of inputs → process → output.
pub(crate) fn process_flow(ctx: &mut SlideContext<'_>, stages: &[Map<String, Value>]) -> Result<Option<String>> {
    if stages.is_empty() {
        return Ok(None);
    }
    let mut rendered = Vec::with_capacity(stages.len());
    for (i, stage) in stages.iter().enumerate() {
        let number = stage
            .get("stage")
            .and_then(scalar_text)
            .unwrap_or_else(|| (i + 1).to_string());
        let title = text_field(stage, "title").unwrap_or_else(|| format!("Stage {}", number));

        let inputs_html: String = mapping_list(stage, "inputs")
            .iter()
            .map(|node| workflow_box(ctx, node, "input"))
            .collect();
        let process = ensure_mapping(stage.get("process"), "flow_stages.process");
        let output = ensure_mapping(stage.get("output"), "flow_stages.output");
        let process_html = optional_box(ctx, &process, "process");
        let output_html = optional_box(ctx, &output, "output");

        let mut vars = Map::new();
        vars.insert("stage_number".into(), escape_html_text(&number).into());
        vars.insert("stage_title".into(), escape_html_text(&title).into());
        vars.insert("inputs_html".into(), inputs_html.into());
        vars.insert("process_html".into(), process_html.into());
        vars.insert("output_html".into(), output_html.into());
        rendered.push(Value::Object(vars));
    }

    let mut vars = ctx.title_vars();
    vars.insert("section_header_html".into(), section_header_html(ctx).into());
    vars.insert("flow_stages".into(), Value::Array(rendered));
    let (registry, theme) = (ctx.registry(), ctx.theme());
    let stage = |vars: &Map<String, Value>| registry.render_component("flow-stage", &variables_from(vars), theme);
    Ok(Some(registry.render_page_layout_with("process-flow", &vars, theme, Some(&stage))))
}

fn optional_box(ctx: &mut SlideContext<'_>, node: &Map<String, Value>, kind: &str) -> String {
    if node.is_empty() {
        String::new()
    } else {
        workflow_box(ctx, node, kind)
    }
}
