//! Per-request presentation configuration and process-level render settings.

use crate::models::slide::scalar_text;
use crate::models::theme::ThemeColors;
use crate::models::unvalidated::ensure_mapping;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_SLIDES_DATA_FILE: &str = "slides_data.json";
pub const DEFAULT_IMAGE_WORKERS: usize = 10;

/// The recognised keys of a presentation request.
///
/// Every field is optional; values of the wrong type read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    pub scenario: Option<String>,
    pub duration: Option<String>,
    pub target_audience: Option<String>,
    pub custom_instruction: Option<String>,
    pub author_name: Option<String>,
    pub author_title: Option<String>,
    pub title: Option<String>,
}

impl PresentationConfig {
    pub fn from_value(value: &Value) -> Self {
        let map = ensure_mapping(Some(value), "config");
        let field = |key: &str| -> Option<String> {
            map.get(key)
                .and_then(scalar_text)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        };
        PresentationConfig {
            scenario: field("scenario"),
            duration: field("duration"),
            target_audience: field("target_audience"),
            custom_instruction: field("custom_instruction"),
            author_name: field("author_name"),
            author_title: field("author_title"),
            title: field("title"),
        }
    }

    pub fn theme_colors(&self) -> ThemeColors {
        ThemeColors::for_scenario(self.scenario.as_deref().unwrap_or(""))
    }

    pub fn scenario_or_empty(&self) -> String {
        self.scenario.clone().unwrap_or_default()
    }

    pub fn duration_or_empty(&self) -> String {
        self.duration.clone().unwrap_or_default()
    }

    pub fn target_audience_or_empty(&self) -> String {
        self.target_audience.clone().unwrap_or_default()
    }

    /// Back to a JSON mapping, omitting unset keys.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let pairs = [
            ("scenario", &self.scenario),
            ("duration", &self.duration),
            ("target_audience", &self.target_audience),
            ("custom_instruction", &self.custom_instruction),
            ("author_name", &self.author_name),
            ("author_title", &self.author_title),
            ("title", &self.title),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        map
    }
}

/// Settings read once from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// `SLIDES_OUTPUT_DIR`, default `output`.
    pub output_dir: PathBuf,
    /// `SLIDES_DATA_FILE`, default `slides_data.json`.
    pub slides_data_file: String,
    /// `SLIDES_TEMPLATES_DIR`; built-in templates only when unset.
    pub templates_dir: Option<PathBuf>,
    /// `IMAGE_BACKEND_URL`; no image generation when unset.
    pub image_backend_url: Option<String>,
    pub image_backend_api_key: Option<String>,
    /// `IMAGE_MAX_WORKERS`, default 10.
    pub image_max_workers: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            slides_data_file: DEFAULT_SLIDES_DATA_FILE.to_string(),
            templates_dir: None,
            image_backend_url: None,
            image_backend_api_key: None,
            image_max_workers: DEFAULT_IMAGE_WORKERS,
        }
    }
}

impl RenderSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = RenderSettings::default();

        let image_max_workers = match get("IMAGE_MAX_WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    log::warn!(
                        "IMAGE_MAX_WORKERS='{}' is not a positive integer, using {}",
                        raw,
                        DEFAULT_IMAGE_WORKERS
                    );
                    DEFAULT_IMAGE_WORKERS
                }
            },
            None => defaults.image_max_workers,
        };

        RenderSettings {
            output_dir: get("SLIDES_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            slides_data_file: get("SLIDES_DATA_FILE").unwrap_or(defaults.slides_data_file),
            templates_dir: get("SLIDES_TEMPLATES_DIR").map(PathBuf::from),
            image_backend_url: get("IMAGE_BACKEND_URL"),
            image_backend_api_key: get("IMAGE_BACKEND_API_KEY"),
            image_max_workers,
        }
    }

    /// `output_dir/slides_data_file`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.slides_data_file)
    }
}
