use super::error::{ChartError, Result};
use crate::models::slide::{integer_of, string_list, text_field};
use crate::models::unvalidated::{ensure_mapping, parse_json_leniently, type_name};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

const MIN_DIMENSION: u32 = 100;
const MAX_DIMENSION: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Bar,
    Line,
    Pie,
}

impl ChartType {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "" | "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            other => Err(ChartError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
        })
    }
}

/// Title and size used when a specification leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDefaults {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl ChartDefaults {
    /// A chart standing alone on a slide.
    pub fn single() -> Self {
        ChartDefaults {
            title: "Chart".to_string(),
            width: 800,
            height: 600,
        }
    }

    /// The `index`-th chart of a stacked list.
    pub fn in_list(index: usize) -> Self {
        ChartDefaults {
            title: format!("Chart {}", index + 1),
            width: 700,
            height: 350,
        }
    }
}

/// A validated chart specification.
///
/// Every series holds at least one value. Bar and pie series hold exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub data: IndexMap<String, Vec<f64>>,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub color: Option<String>,
    pub colors: Vec<String>,
    pub highlighted_items: Vec<String>,
}

impl ChartSpec {
    /// Reads a specification from a mapping or a string encoding one.
    ///
    /// `data` may itself be an encoded string; null values are dropped.
    pub fn from_value(value: &Value, defaults: &ChartDefaults) -> Result<Self> {
        let spec = match value {
            Value::Object(map) => map.clone(),
            Value::String(text) => match parse_json_leniently(text) {
                Some(Value::Object(map)) => map,
                _ => return Err(ChartError::InvalidSpec("unparseable string".to_string())),
            },
            other => return Err(ChartError::InvalidSpec(type_name(other).to_string())),
        };
        Self::from_map(&spec, defaults)
    }

    pub fn from_map(spec: &Map<String, Value>, defaults: &ChartDefaults) -> Result<Self> {
        let type_tag = text_field(spec, "chart_type")
            .or_else(|| text_field(spec, "type"))
            .unwrap_or_default();
        let chart_type = ChartType::parse(&type_tag)?;
        let data = parse_data(&ensure_mapping(spec.get("data"), "chart_spec.data"), chart_type)?;

        Ok(ChartSpec {
            chart_type,
            data,
            title: text_field(spec, "title").unwrap_or_else(|| defaults.title.clone()),
            x_label: text_field(spec, "x_label"),
            y_label: text_field(spec, "y_label"),
            width: dimension(spec.get("width"), defaults.width),
            height: dimension(spec.get("height"), defaults.height),
            color: text_field(spec, "color"),
            colors: string_list(spec, "colors"),
            highlighted_items: string_list(spec, "highlighted_items"),
        })
    }

    /// First value of every series, in order.
    pub fn points(&self) -> Vec<(&str, f64)> {
        self.data
            .iter()
            .filter_map(|(label, values)| values.first().map(|v| (label.as_str(), *v)))
            .collect()
    }
}

fn parse_data(data: &Map<String, Value>, chart_type: ChartType) -> Result<IndexMap<String, Vec<f64>>> {
    let mut parsed = IndexMap::new();
    for (label, value) in data {
        let values = match (value, chart_type) {
            (Value::Null, _) => continue,
            (Value::Array(items), ChartType::Line) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| number(label, item))
                .collect::<Result<Vec<_>>>()?,
            _ => vec![number(label, value)?],
        };
        if !values.is_empty() {
            parsed.insert(label.clone(), values);
        }
    }
    if parsed.is_empty() {
        return Err(ChartError::EmptyData);
    }
    Ok(parsed)
}

fn number(label: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).ok_or_else(|| ChartError::NonNumeric {
        label: label.to_string(),
        value: value.to_string(),
    })
}

fn dimension(value: Option<&Value>, default: u32) -> u32 {
    value
        .and_then(integer_of)
        .map(|v| v.clamp(MIN_DIMENSION as i64, MAX_DIMENSION as i64) as u32)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_missing_fields() {
        let spec = ChartSpec::from_value(&json!({"data": {"A": 1, "B": null}}), &ChartDefaults::single())
            .unwrap();
        assert_eq!(spec.chart_type, ChartType::Bar);
        assert_eq!(spec.title, "Chart");
        assert_eq!((spec.width, spec.height), (800, 600));
        assert_eq!(spec.points(), vec![("A", 1.0)]);
    }

    #[test]
    fn list_defaults_are_numbered() {
        let spec = ChartSpec::from_value(
            &json!({"type": "PIE", "data": "{\"x\": 3, \"y\": \"4.5\"}", "width": 10}),
            &ChartDefaults::in_list(1),
        )
        .unwrap();
        assert_eq!(spec.chart_type, ChartType::Pie);
        assert_eq!(spec.title, "Chart 2");
        assert_eq!((spec.width, spec.height), (MIN_DIMENSION, 350));
        assert_eq!(spec.points(), vec![("x", 3.0), ("y", 4.5)]);
    }

    #[test]
    fn line_series_accept_lists_and_scalars() {
        let spec = ChartSpec::from_value(
            &json!({"chart_type": "line", "data": {"s1": [1, 2, null, 3], "s2": 5}}),
            &ChartDefaults::single(),
        )
        .unwrap();
        assert_eq!(spec.data["s1"], vec![1.0, 2.0, 3.0]);
        assert_eq!(spec.data["s2"], vec![5.0]);
    }

    #[test]
    fn rejects_bad_specs() {
        let defaults = ChartDefaults::single();
        assert!(matches!(
            ChartSpec::from_value(&json!(42), &defaults),
            Err(ChartError::InvalidSpec(_))
        ));
        assert!(matches!(
            ChartSpec::from_value(&json!({"data": {}}), &defaults),
            Err(ChartError::EmptyData)
        ));
        assert!(matches!(
            ChartSpec::from_value(&json!({"chart_type": "radar", "data": {"a": 1}}), &defaults),
            Err(ChartError::UnsupportedType(_))
        ));
        assert!(matches!(
            ChartSpec::from_value(&json!({"data": {"a": "lots"}}), &defaults),
            Err(ChartError::NonNumeric { .. })
        ));
    }
}
