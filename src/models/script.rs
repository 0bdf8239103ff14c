use super::slide::integer_of;
use super::unvalidated::{ensure_mapping, ensure_sequence};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Script sections of a presentation keyed by `slide_number`.
///
/// Duplicate keys keep the last section; sections without a usable
/// `slide_number` are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptMap {
    sections: IndexMap<i64, Map<String, Value>>,
}

impl ScriptMap {
    /// Reads `presentation_script.script_sections`, tolerating any shape.
    pub fn from_value(presentation_script: &Value) -> Self {
        let script = ensure_mapping(Some(presentation_script), "presentation_script");
        let mut sections = IndexMap::new();
        for section in ensure_sequence(script.get("script_sections"), "script_sections") {
            let Value::Object(section) = section else {
                continue;
            };
            match section.get("slide_number").and_then(integer_of) {
                Some(number) => {
                    if sections.insert(number, section).is_some() {
                        log::debug!("Script section for slide {} replaced by a later one", number);
                    }
                }
                None => log::warn!("Script section without a slide_number ignored"),
            }
        }
        ScriptMap { sections }
    }

    pub fn get(&self, slide_number: i64) -> Option<&Map<String, Value>> {
        self.sections.get(&slide_number)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_section_wins() {
        let script = json!({"script_sections": [
            {"slide_number": 1, "opening_line": "first"},
            {"slide_number": "1", "opening_line": "second"},
            {"slide_number": 2, "opening_line": "other"},
            {"opening_line": "orphan"},
            "garbage"
        ]});
        let map = ScriptMap::from_value(&script);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1).unwrap()["opening_line"], json!("second"));
        assert!(map.get(3).is_none());
    }

    #[test]
    fn malformed_script_is_empty() {
        assert!(ScriptMap::from_value(&json!("not a script")).is_empty());
        assert!(ScriptMap::from_value(&Value::Null).is_empty());
    }
}
