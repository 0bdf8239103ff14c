use super::engine::{render_template, ComponentRenderer, Variables};
use crate::models::theme::ThemeColors;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A named pair of HTML and optional CSS, both containing placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: Option<String>,
}

/// Which of the two template sets a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    PageLayout,
    Component,
}

impl TemplateKind {
    fn dir_name(self) -> &'static str {
        match self {
            TemplateKind::PageLayout => "page_layouts",
            TemplateKind::Component => "components",
        }
    }
}

const BUILTIN_PAGE_LAYOUTS: &[(&str, &str)] = &[
    ("comparison-grid", include_str!("../../templates/page_layouts/comparison-grid.json")),
    ("content-text", include_str!("../../templates/page_layouts/content-text.json")),
    ("content-with-visual", include_str!("../../templates/page_layouts/content-with-visual.json")),
    ("cover-slide", include_str!("../../templates/page_layouts/cover-slide.json")),
    ("data-table", include_str!("../../templates/page_layouts/data-table.json")),
    ("fancy-chart", include_str!("../../templates/page_layouts/fancy-chart.json")),
    ("fancy-content-text", include_str!("../../templates/page_layouts/fancy-content-text.json")),
    ("flowchart", include_str!("../../templates/page_layouts/flowchart.json")),
    ("icon-row", include_str!("../../templates/page_layouts/icon-row.json")),
    ("icon-sequence", include_str!("../../templates/page_layouts/icon-sequence.json")),
    ("linear-process", include_str!("../../templates/page_layouts/linear-process.json")),
    ("process-flow", include_str!("../../templates/page_layouts/process-flow.json")),
    ("workflow-diagram", include_str!("../../templates/page_layouts/workflow-diagram.json")),
];

const BUILTIN_COMPONENTS: &[(&str, &str)] = &[
    ("comparison-section", include_str!("../../templates/components/comparison-section.json")),
    ("data-table", include_str!("../../templates/components/data-table.json")),
    ("flow-stage", include_str!("../../templates/components/flow-stage.json")),
    ("icon-item", include_str!("../../templates/components/icon-item.json")),
    ("process-step", include_str!("../../templates/components/process-step.json")),
    ("sequence-item", include_str!("../../templates/components/sequence-item.json")),
    ("workflow-box", include_str!("../../templates/components/workflow-box.json")),
];

/// All page layouts and components, loaded once and read-only afterwards.
///
/// Construct it at startup and pass it by reference to every renderer.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    page_layouts: IndexMap<String, Template>,
    components: IndexMap<String, Template>,
}

impl TemplateRegistry {
    /// A registry with no templates; every lookup falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The template set compiled into the crate.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (kind, sources) in [
            (TemplateKind::PageLayout, BUILTIN_PAGE_LAYOUTS),
            (TemplateKind::Component, BUILTIN_COMPONENTS),
        ] {
            for (name, source) in sources {
                match parse_template(name, source) {
                    Some(template) => registry.insert(kind, template),
                    None => log::error!("Built-in template '{}' is malformed", name),
                }
            }
        }
        log::debug!(
            "Loaded {} built-in page layouts and {} components",
            registry.page_layouts.len(),
            registry.components.len()
        );
        registry
    }

    /// Built-in templates, overridden by any `page_layouts/*.json` and
    /// `components/*.json` found under `dir`.
    pub fn load_from_dir(dir: &Path) -> Self {
        Self::builtin().with_overrides_from(dir)
    }

    /// Replaces templates with those found on disk. Unreadable directories and
    /// malformed files are logged and skipped.
    pub fn with_overrides_from(mut self, dir: &Path) -> Self {
        for kind in [TemplateKind::PageLayout, TemplateKind::Component] {
            let subdir = dir.join(kind.dir_name());
            let entries = match fs::read_dir(&subdir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Template directory {} not readable: {}", subdir.display(), e);
                    continue;
                }
            };
            let mut paths: Vec<_> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
                .collect();
            paths.sort();

            for path in paths {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                let loaded = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|source| {
                        parse_template(&stem, &source)
                            .ok_or_else(|| "not a template mapping".to_string())
                    });
                match loaded {
                    Ok(template) => {
                        log::debug!("Loaded template '{}' from {}", template.name, path.display());
                        self.insert(kind, template);
                    }
                    Err(e) => log::warn!("Skipping template {}: {}", path.display(), e),
                }
            }
        }
        self
    }

    pub fn insert(&mut self, kind: TemplateKind, template: Template) {
        let set = match kind {
            TemplateKind::PageLayout => &mut self.page_layouts,
            TemplateKind::Component => &mut self.components,
        };
        set.insert(template.name.clone(), template);
    }

    pub fn get(&self, kind: TemplateKind, name: &str) -> Option<&Template> {
        match kind {
            TemplateKind::PageLayout => self.page_layouts.get(name),
            TemplateKind::Component => self.components.get(name),
        }
    }

    pub fn has_page_layout(&self, name: &str) -> bool {
        self.page_layouts.contains_key(name)
    }

    pub fn page_layout_names(&self) -> impl Iterator<Item = &str> {
        self.page_layouts.keys().map(String::as_str)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn render_page_layout(&self, name: &str, variables: &Variables, theme: &ThemeColors) -> String {
        self.render_page_layout_with(name, variables, theme, None)
    }

    /// Renders a page layout; list-of-mapping variables go through
    /// `component_renderer`. A missing layout yields a plain title and body.
    pub fn render_page_layout_with(
        &self,
        name: &str,
        variables: &Variables,
        theme: &ThemeColors,
        component_renderer: Option<ComponentRenderer<'_>>,
    ) -> String {
        match self.page_layouts.get(name) {
            Some(template) => render_template(template, variables, theme, component_renderer),
            None => {
                log::warn!("Page layout '{}' not found, using fallback", name);
                fallback_fragment(variables)
            }
        }
    }

    /// Renders a component, or an empty string if it does not exist.
    pub fn render_component(&self, name: &str, variables: &Variables, theme: &ThemeColors) -> String {
        match self.components.get(name) {
            Some(template) => render_template(template, variables, theme, None),
            None => {
                log::warn!("Component '{}' not found", name);
                String::new()
            }
        }
    }
}

fn parse_template(name: &str, source: &str) -> Option<Template> {
    let mut template: Template = match serde_json::from_str(source) {
        Ok(template) => template,
        Err(e) => {
            log::warn!("Template '{}' could not be parsed: {}", name, e);
            return None;
        }
    };
    if template.name.trim().is_empty() {
        template.name = name.to_string();
    }
    Some(template)
}

fn fallback_fragment(variables: &Variables) -> String {
    let text = |key: &str| match variables.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    format!(
        "<div class=\"slide-content\"><h1 class=\"slide-title\">{}</h1><div class=\"slide-body\">{}</div></div>",
        text("title"),
        text("content")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn builtin_set_is_complete() {
        let registry = TemplateRegistry::builtin();
        assert_eq!(registry.page_layout_names().count(), BUILTIN_PAGE_LAYOUTS.len());
        assert_eq!(registry.component_names().count(), BUILTIN_COMPONENTS.len());
        for (name, _) in BUILTIN_PAGE_LAYOUTS {
            assert!(registry.has_page_layout(name), "missing {}", name);
        }
    }

    #[test]
    fn missing_layout_falls_back_to_title_and_body() {
        let registry = TemplateRegistry::empty();
        let mut vars = Variables::new();
        vars.insert("title".into(), json!("Hi"));
        vars.insert("content".into(), json!("<p>x</p>"));
        assert_eq!(
            registry.render_page_layout("nope", &vars, &ThemeColors::default()),
            "<div class=\"slide-content\"><h1 class=\"slide-title\">Hi</h1><div class=\"slide-body\"><p>x</p></div></div>"
        );
    }

    #[test]
    fn missing_component_is_empty() {
        let registry = TemplateRegistry::empty();
        assert_eq!(
            registry.render_component("nope", &Variables::new(), &ThemeColors::default()),
            ""
        );
    }

    #[test]
    fn directory_overrides_replace_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let layouts = dir.path().join("page_layouts");
        fs::create_dir_all(&layouts).unwrap();
        fs::write(
            layouts.join("icon-row.json"),
            r#"{"html": "<section>{title}</section>"}"#,
        )
        .unwrap();
        fs::write(layouts.join("broken.json"), "{not json").unwrap();

        let registry = TemplateRegistry::load_from_dir(dir.path());
        let template = registry.get(TemplateKind::PageLayout, "icon-row").unwrap();
        assert_eq!(template.html, "<section>{title}</section>");
        assert!(!registry.has_page_layout("broken"));
        assert!(registry.has_page_layout("cover-slide"));
    }
}
