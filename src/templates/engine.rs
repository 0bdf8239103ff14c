//! Placeholder substitution for layout and component templates.
//!
//! Placeholders are `{name}` or `{name|default}`. The name must be an
//! identifier, so CSS rule bodies such as `{ color: red; }` are left alone.

use super::registry::Template;
use crate::models::theme::ThemeColors;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_|]*)\}").unwrap());

/// Variables handed to a template, in insertion order.
pub type Variables = IndexMap<String, Value>;

/// Renders one element of a list-of-mappings variable.
pub type ComponentRenderer<'a> = &'a dyn Fn(&Map<String, Value>) -> String;

/// Renders a template's HTML, prefixed by its CSS in a `<style>` block.
///
/// Theme colours are merged in as `theme_<key>` and win over caller variables
/// of the same name. HTML and CSS are substituted independently.
pub fn render_template(
    template: &Template,
    variables: &Variables,
    theme: &ThemeColors,
    component_renderer: Option<ComponentRenderer<'_>>,
) -> String {
    let mut merged = variables.clone();
    merged.extend(theme.as_variables());

    let html = substitute(&template.html, &merged, component_renderer);
    match template.css.as_deref().filter(|css| !css.trim().is_empty()) {
        Some(css) => {
            let css = substitute(css, &merged, None);
            format!("<style>{}</style>\n{}", css, html)
        }
        None => html,
    }
}

/// Replaces every placeholder in `text`.
///
/// Unknown names and nulls take the default after `|`, or become empty.
pub fn substitute(
    text: &str,
    variables: &Variables,
    component_renderer: Option<ComponentRenderer<'_>>,
) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            let expr = &caps[1];
            let (name, default) = match expr.split_once('|') {
                Some((name, default)) => (name.trim(), default.trim()),
                None => (expr.trim(), ""),
            };
            match variables.get(name) {
                None | Some(Value::Null) => default.to_string(),
                Some(value) => stringify(value, component_renderer),
            }
        })
        .into_owned()
}

fn stringify(value: &Value, component_renderer: Option<ComponentRenderer<'_>>) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => match (items.first(), component_renderer) {
            (Some(Value::Object(_)), Some(render)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => render(map),
                    other => stringify(other, None),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            _ => items
                .iter()
                .map(|item| stringify(item, None))
                .collect::<Vec<_>>()
                .join("\n"),
        },
        Value::Object(_) => value.to_string(),
    }
}

/// Converts a JSON mapping into template variables.
pub fn variables_from(map: &Map<String, Value>) -> Variables {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}
