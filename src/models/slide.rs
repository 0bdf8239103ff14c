use super::layout::LayoutType;
use super::unvalidated::{ensure_mapping, ensure_sequence, parse_json_leniently};
use serde_json::{Map, Value};

pub const DEFAULT_TITLE_FONT_SIZE: f64 = 36.0;
pub const DEFAULT_BODY_FONT_SIZE: f64 = 16.0;

/// A slide after every structured field has been normalized.
///
/// Constructing a view never fails for a mapping; fields that could not be
/// recovered are simply empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideView {
    /// Position of the slide in the validated deck, starting at 0.
    pub index: usize,
    pub slide_number: i64,
    pub title: String,
    pub content: Map<String, Value>,
    pub visual_elements: Map<String, Value>,
    pub design_spec: Map<String, Value>,
    pub speaker_notes: Value,
}

impl SlideView {
    /// Builds a view over one entry of `slides`.
    ///
    /// Returns `None` when the entry is not a mapping (nor a string holding one).
    pub fn from_value(value: &Value, index: usize) -> Option<Self> {
        let slide = match value {
            Value::Object(map) => map.clone(),
            Value::String(text) => match parse_json_leniently(text) {
                Some(Value::Object(map)) => map,
                _ => return None,
            },
            _ => return None,
        };

        let slide_number = slide
            .get("slide_number")
            .and_then(integer_of)
            .unwrap_or(index as i64 + 1);

        Some(SlideView {
            index,
            slide_number,
            title: slide.get("title").and_then(scalar_text).unwrap_or_default(),
            content: ensure_mapping(slide.get("content"), "content"),
            visual_elements: ensure_mapping(slide.get("visual_elements"), "visual_elements"),
            design_spec: ensure_mapping(slide.get("design_spec"), "design_spec"),
            speaker_notes: slide
                .get("speaker_notes")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
        })
    }

    pub fn bullet_points(&self) -> Vec<String> {
        string_list(&self.content, "bullet_points")
    }

    pub fn main_text(&self) -> Option<String> {
        text_field(&self.content, "main_text")
    }

    pub fn layout_type(&self) -> Option<LayoutType> {
        text_field(&self.design_spec, "layout_type").map(|tag| LayoutType::parse(&tag))
    }

    pub fn design(&self) -> DesignSpec {
        DesignSpec::from_map(&self.design_spec)
    }

    /// `visual_elements.charts_needed`, accepting `true` or a truthy string.
    pub fn charts_needed(&self) -> bool {
        match self.visual_elements.get("charts_needed") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => {
                matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "1")
            }
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            _ => false,
        }
    }

    pub fn visual_list(&self, key: &str) -> Vec<String> {
        string_list(&self.visual_elements, key)
    }

    pub fn visual_items(&self, key: &str) -> Vec<Map<String, Value>> {
        mapping_list(&self.visual_elements, key)
    }

    pub fn visual_text(&self, key: &str) -> Option<String> {
        text_field(&self.visual_elements, key)
    }
}

/// Typography and alignment read from `design_spec`.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSpec {
    pub title_font_size: f64,
    pub body_font_size: f64,
    pub title_align: String,
    pub body_align: String,
}

impl Default for DesignSpec {
    fn default() -> Self {
        DesignSpec {
            title_font_size: DEFAULT_TITLE_FONT_SIZE,
            body_font_size: DEFAULT_BODY_FONT_SIZE,
            title_align: "left".to_string(),
            body_align: "left".to_string(),
        }
    }
}

impl DesignSpec {
    pub fn from_map(design_spec: &Map<String, Value>) -> Self {
        let alignment = ensure_mapping(design_spec.get("alignment"), "design_spec.alignment");
        DesignSpec {
            title_font_size: font_size(design_spec.get("title_font_size"), DEFAULT_TITLE_FONT_SIZE),
            body_font_size: font_size(design_spec.get("body_font_size"), DEFAULT_BODY_FONT_SIZE),
            title_align: text_align(alignment.get("title")),
            body_align: text_align(alignment.get("body")),
        }
    }

    /// Font size in points without a trailing `.0` for whole numbers.
    pub fn title_size(&self) -> String {
        format_points(self.title_font_size)
    }

    pub fn body_size(&self) -> String {
        format_points(self.body_font_size)
    }
}

fn font_size(value: Option<&Value>, default: f64) -> f64 {
    let size = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(text)) => text.trim().trim_end_matches("pt").trim().parse::<f64>().ok(),
        _ => None,
    };
    match size {
        Some(size) if size.is_finite() && size > 0.0 && size <= 400.0 => size,
        _ => default,
    }
}

fn text_align(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str).map(|s| s.trim().to_lowercase()) {
        Some(align) if matches!(align.as_str(), "left" | "center" | "right" | "justify") => align,
        _ => "left".to_string(),
    }
}

fn format_points(size: f64) -> String {
    if size.fract() == 0.0 {
        format!("{}", size as i64)
    } else {
        format!("{}", size)
    }
}

/// Reads an integer from a number or a numeric string.
pub fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Stringifies scalars; `None` for null, mappings and sequences.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A non-blank scalar field, trimmed.
pub fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// A sequence of non-blank scalars. A lone string is treated as a one-item list
/// unless it holds an encoded JSON sequence.
pub fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    let raw = map.get(key);
    let items = match raw {
        Some(Value::String(text)) => match parse_json_leniently(text) {
            Some(Value::Array(items)) => items,
            _ => vec![Value::String(text.clone())],
        },
        _ => ensure_sequence(raw, key),
    };
    items
        .iter()
        .filter_map(scalar_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// A sequence of mappings; entries that are not (and do not encode) a mapping are dropped.
pub fn mapping_list(map: &Map<String, Value>, key: &str) -> Vec<Map<String, Value>> {
    ensure_sequence(map.get(key), key)
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(obj.clone()),
            Value::String(text) => match parse_json_leniently(text) {
                Some(Value::Object(obj)) => Some(obj),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_to_empty_slide() {
        let view = SlideView::from_value(&json!({}), 2).unwrap();
        assert_eq!(view.slide_number, 3);
        assert_eq!(view.title, "");
        assert!(view.bullet_points().is_empty());
        assert_eq!(view.layout_type(), None);
        assert_eq!(view.design(), DesignSpec::default());
        assert!(!view.charts_needed());
    }

    #[test]
    fn non_numeric_slide_number_uses_position() {
        let view = SlideView::from_value(&json!({"slide_number": "first"}), 0).unwrap();
        assert_eq!(view.slide_number, 1);
        let view = SlideView::from_value(&json!({"slide_number": "7"}), 0).unwrap();
        assert_eq!(view.slide_number, 7);
    }

    #[test]
    fn non_mapping_entries_are_rejected() {
        assert!(SlideView::from_value(&json!(12), 0).is_none());
        assert!(SlideView::from_value(&json!(["a"]), 0).is_none());
        assert!(SlideView::from_value(&json!("{\"title\": \"T\"}"), 0).is_some());
    }

    #[test]
    fn encoded_fields_are_recovered() {
        let slide = json!({
            "title": "Findings",
            "content": "{\"bullet_points\": [\"one\", \"  \", \"two\"]}",
            "design_spec": {"layout_type": "icon-row", "title_font_size": "40",
                            "alignment": {"title": "Center", "body": "diagonal"}}
        });
        let view = SlideView::from_value(&slide, 0).unwrap();
        assert_eq!(view.bullet_points(), vec!["one", "two"]);
        assert_eq!(view.layout_type(), Some(LayoutType::IconRow));
        let design = view.design();
        assert_eq!(design.title_size(), "40");
        assert_eq!(design.title_align, "center");
        assert_eq!(design.body_align, "left");
    }

    #[test]
    fn mapping_list_skips_bad_entries() {
        let map = json!({"sections": [{"title": "A"}, 3, "{\"title\": \"B\"}", "junk"]});
        let items = mapping_list(map.as_object().unwrap(), "sections");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["title"], json!("B"));
    }

    #[test]
    fn charts_needed_accepts_truthy_strings() {
        let view =
            SlideView::from_value(&json!({"visual_elements": {"charts_needed": "True"}}), 0).unwrap();
        assert!(view.charts_needed());
    }
}
