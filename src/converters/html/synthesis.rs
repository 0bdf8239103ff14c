//! Builds structured layout data from plain bullets when a slide declares a
//! structured layout but does not supply its data.
//!
//! Synthesized items use the same field names as supplied ones, so both go
//! through the same component rendering.

use super::constants::{MAX_ICON_LABEL_WORDS, MAX_SYNTHESIZED_ITEMS};
use super::text::{first_words, strip_bullet_marker};
use crate::models::layout::LayoutType;
use crate::models::slide::SlideView;
use serde_json::{json, Map, Value};

/// Keywords picked from the slide title when it names none of its own.
const TITLE_KEYWORDS: &[(&[&str], [&str; 4])] = &[
    (&["benchmark", "evaluation"], ["checklist", "database", "analytics", "data"]),
    (&["defense", "strategy"], ["shield", "security", "protection", "lock"]),
    (&["vulnerability", "threat"], ["warning", "alert", "security", "danger"]),
    (&["result", "effectiveness"], ["chart", "analytics", "data", "graph"]),
];
const GENERIC_KEYWORDS: [&str; 4] = ["document", "info", "feature", "item"];

/// Substitute data for `layout`, or `None` if nothing usable can be built.
///
/// Tables are never synthesized. The result is shaped like the layout's
/// structured field: a list of mappings, or a mapping for workflows.
pub(crate) fn synthesize(layout: &LayoutType, slide: &SlideView, bullets: &[String]) -> Option<Value> {
    let points: Vec<String> = bullets
        .iter()
        .map(|b| strip_bullet_marker(b))
        .filter(|b| !b.is_empty())
        .take(MAX_SYNTHESIZED_ITEMS)
        .collect();
    if points.is_empty() {
        return None;
    }
    let keywords = icon_keywords(slide);
    let keyword = |i: usize| keywords[i % keywords.len()].clone();

    let items: Vec<Value> = match layout {
        LayoutType::ComparisonGrid => {
            if points.len() < 2 {
                return None;
            }
            points
                .iter()
                .enumerate()
                .map(|(i, point)| {
                    let (title, content) = split_section(point, i);
                    json!({"title": title, "content": content, "image_keyword": keyword(i), "highlight": false})
                })
                .collect()
        }
        LayoutType::IconRow => points
            .iter()
            .enumerate()
            .map(|(i, point)| json!({"label": short_label(point), "image_keyword": keyword(i)}))
            .collect(),
        LayoutType::IconSequence => points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                json!({"label": short_label(point), "image_keyword": keyword(i), "connector": "arrow"})
            })
            .collect(),
        LayoutType::LinearProcess => points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                json!({"step_number": i + 1, "label": short_label(point), "image_keyword": keyword(i)})
            })
            .collect(),
        LayoutType::Flowchart => points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let (label, description) = split_step(point, i);
                json!({"label": label, "description": description})
            })
            .collect(),
        LayoutType::ProcessFlow => points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let (label, description) = split_step(point, i);
                json!({
                    "stage": i + 1,
                    "title": label,
                    "process": {"label": description, "image_keyword": keyword(i)}
                })
            })
            .collect(),
        LayoutType::WorkflowDiagram => return Some(workflow(&points, &keyword)),
        _ => return None,
    };
    log::info!(
        "Slide {}: synthesized {} {} item(s) from bullet points",
        slide.slide_number,
        items.len(),
        layout
    );
    Some(Value::Array(items))
}

/// First bullet feeds in, the last comes out, the rest are processing steps.
fn workflow(points: &[String], keyword: &dyn Fn(usize) -> String) -> Value {
    let node = |i: usize, kind: &str| {
        json!({"label": short_label(&points[i]), "image_keyword": keyword(i), "type": kind})
    };
    let mut flow = Map::new();
    match points.len() {
        1 => {
            flow.insert("processes".into(), json!([node(0, "process")]));
        }
        n => {
            flow.insert("inputs".into(), json!([node(0, "input")]));
            let processes: Vec<Value> = (1..n - 1).map(|i| node(i, "process")).collect();
            if !processes.is_empty() {
                flow.insert("processes".into(), Value::Array(processes));
            }
            flow.insert("outputs".into(), json!([node(n - 1, "output")]));
        }
    }
    Value::Object(flow)
}

/// `icons_suggested` then `image_keywords`, else keywords chosen from the title.
fn icon_keywords(slide: &SlideView) -> Vec<String> {
    let mut keywords = slide.visual_list("icons_suggested");
    keywords.extend(slide.visual_list("image_keywords"));
    if !keywords.is_empty() {
        return keywords;
    }
    let title = slide.title.to_lowercase();
    let chosen = TITLE_KEYWORDS
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| title.contains(t)))
        .map(|(_, keywords)| keywords)
        .unwrap_or(&GENERIC_KEYWORDS);
    chosen.iter().map(|k| k.to_string()).collect()
}

/// Long bullets lend their first five words as a title.
fn split_section(point: &str, index: usize) -> (String, String) {
    let words: Vec<&str> = point.split_whitespace().collect();
    if words.len() > 5 {
        (words[..5].join(" "), words[5..].join(" "))
    } else {
        (format!("Item {}", index + 1), point.to_string())
    }
}

/// `"Label: description"`, else the first two words of a long bullet.
fn split_step(point: &str, index: usize) -> (String, String) {
    if let Some((label, description)) = point.split_once(':') {
        if !label.trim().is_empty() {
            return (label.trim().to_string(), description.trim().to_string());
        }
    }
    let words: Vec<&str> = point.split_whitespace().collect();
    if words.len() > 3 {
        (words[..2].join(" "), words[2..].join(" "))
    } else {
        (format!("Step {}", index + 1), point.to_string())
    }
}

fn short_label(point: &str) -> String {
    match first_words(point, MAX_ICON_LABEL_WORDS) {
        (label, true) => format!("{}...", label),
        (label, false) => label,
    }
}
