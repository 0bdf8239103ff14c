use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four colours every rendered fragment is themed with.
///
/// Serialized as `{primary, secondary, background, text}` in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
}

impl Default for ThemeColors {
    /// Purple and pink.
    fn default() -> Self {
        ThemeColors::new("#7C3AED", "#EC4899")
    }
}

impl ThemeColors {
    fn new(primary: &str, secondary: &str) -> Self {
        ThemeColors {
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            background: "#FFFFFF".to_string(),
            text: "#1F2937".to_string(),
        }
    }

    /// Picks a theme from the free-form scenario name.
    ///
    /// `academic` anywhere in the name selects blue, `business` selects green.
    pub fn for_scenario(scenario: &str) -> Self {
        let scenario = scenario.to_lowercase();
        if scenario.contains("academic") {
            ThemeColors::new("#1E40AF", "#3B82F6")
        } else if scenario.contains("business") {
            ThemeColors::new("#059669", "#10B981")
        } else {
            ThemeColors::default()
        }
    }

    /// Template variables `theme_primary`, `theme_secondary`, `theme_background`, `theme_text`.
    pub fn as_variables(&self) -> IndexMap<String, Value> {
        self.entries()
            .into_iter()
            .map(|(key, value)| (format!("theme_{}", key), Value::String(value.to_string())))
            .collect()
    }

    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("background", self.background.as_str()),
            ("text", self.text.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_selects_theme() {
        assert_eq!(ThemeColors::for_scenario("Academic Teaching").primary, "#1E40AF");
        assert_eq!(ThemeColors::for_scenario("business_pitch").primary, "#059669");
        assert_eq!(ThemeColors::for_scenario("conference").primary, "#7C3AED");
        assert_eq!(ThemeColors::for_scenario("").secondary, "#EC4899");
    }

    #[test]
    fn variables_are_namespaced() {
        let vars = ThemeColors::default().as_variables();
        let keys: Vec<&str> = vars.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["theme_primary", "theme_secondary", "theme_background", "theme_text"]
        );
        assert_eq!(vars["theme_text"], Value::String("#1F2937".to_string()));
    }
}
