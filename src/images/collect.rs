//! Collects every image keyword a deck will ask for, so images can be
//! generated up front.

use crate::models::deck::SlideDeck;
use crate::models::layout::LayoutType;
use crate::models::slide::{mapping_list, SlideView};
use crate::models::unvalidated::ensure_mapping;
use serde_json::{Map, Value};

/// Every keyword occurrence across the deck, in slide order.
///
/// Duplicates are kept: each occurrence gets its own generated image.
pub fn collect_keywords(deck: &SlideDeck) -> Vec<String> {
    let mut keywords = Vec::new();
    for slide in &deck.slides {
        collect_slide_keywords(slide, &mut keywords);
    }
    keywords
}

/// Keywords for a single slide, appended to `out`.
pub fn collect_slide_keywords(slide: &SlideView, out: &mut Vec<String>) {
    let image_keywords = slide.visual_list("image_keywords");
    if image_keywords.is_empty() {
        out.extend(slide.visual_list("icons_suggested"));
    } else {
        out.extend(image_keywords);
    }

    extract_from_items(&slide.visual_items("figures"), out);

    let visuals = &slide.visual_elements;
    match slide.layout_type() {
        Some(LayoutType::ComparisonGrid) => extract_from_items(&mapping_list(visuals, "sections"), out),
        Some(LayoutType::IconRow) => extract_from_items(&mapping_list(visuals, "icon_items"), out),
        Some(LayoutType::IconSequence) => {
            extract_from_items(&mapping_list(visuals, "sequence_items"), out)
        }
        Some(LayoutType::LinearProcess) => {
            extract_from_items(&mapping_list(visuals, "process_steps"), out)
        }
        Some(LayoutType::WorkflowDiagram) => {
            let workflow = ensure_mapping(visuals.get("workflow"), "workflow");
            for key in ["inputs", "processes", "outputs"] {
                extract_from_items(&mapping_list(&workflow, key), out);
            }
        }
        Some(LayoutType::ProcessFlow) => {
            for stage in mapping_list(visuals, "flow_stages") {
                extract_from_items(&mapping_list(&stage, "inputs"), out);
                for key in ["process", "output"] {
                    let node = ensure_mapping(stage.get(key), key);
                    extract_from_item(&node, out);
                }
            }
        }
        _ => {}
    }
}

fn extract_from_items(items: &[Map<String, Value>], out: &mut Vec<String>) {
    for item in items {
        extract_from_item(item, out);
    }
}

/// `image_keyword`, plus the legacy `image` field when it is not a URL.
fn extract_from_item(item: &Map<String, Value>, out: &mut Vec<String>) {
    if let Some(keyword) = item.get("image_keyword").and_then(Value::as_str) {
        push_keyword(keyword, out);
    }
    if let Some(image) = item.get("image").and_then(Value::as_str) {
        if !image.trim_start().starts_with("http") {
            push_keyword(image, out);
        }
    }
}

fn push_keyword(keyword: &str, out: &mut Vec<String>) {
    let keyword = keyword.trim();
    if !keyword.is_empty() {
        out.push(keyword.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deck(slides: Value) -> SlideDeck {
        SlideDeck::from_value(&json!({ "slides": slides })).unwrap()
    }

    #[test]
    fn explicit_keywords_take_priority_over_suggestions() {
        let deck = deck(json!([
            {"visual_elements": {"image_keywords": ["shield", " "], "icons_suggested": ["lock"]}},
            {"visual_elements": {"icons_suggested": ["lock"]}},
            {"visual_elements": {"image_keywords": ["shield"]}}
        ]));
        assert_eq!(collect_keywords(&deck), vec!["shield", "lock", "shield"]);
    }

    #[test]
    fn figures_and_layout_structures_are_scanned() {
        let deck = deck(json!([{
            "design_spec": {"layout_type": "process-flow"},
            "visual_elements": {
                "figures": ["fig1", {"image_keyword": "chart"}, {"image": "https://x/y.png"}],
                "flow_stages": [{
                    "inputs": [{"image_keyword": "document"}],
                    "process": {"image_keyword": "gear"},
                    "output": {"image": "report"}
                }]
            }
        }]));
        assert_eq!(collect_keywords(&deck), vec!["chart", "document", "gear", "report"]);
    }

    #[test]
    fn structures_of_other_layouts_are_ignored() {
        let deck = deck(json!([{
            "design_spec": {"layout_type": "content-text"},
            "visual_elements": {"sections": [{"image_keyword": "unused"}]}
        }]));
        assert!(collect_keywords(&deck).is_empty());
    }

    #[test]
    fn workflow_nodes_are_collected_in_order() {
        let deck = deck(json!([{
            "design_spec": {"layout_type": "workflow-diagram"},
            "visual_elements": {"workflow": "{\"inputs\": [{\"image_keyword\": \"a\"}], \"processes\": [{\"image_keyword\": \"b\"}], \"outputs\": [{\"image_keyword\": \"c\"}]}"}
        }]));
        assert_eq!(collect_keywords(&deck), vec!["a", "b", "c"]);
    }
}
