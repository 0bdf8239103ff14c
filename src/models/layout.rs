use std::fmt;

/// The layout tag a slide declares in `design_spec.layout_type`.
///
/// Unknown tags are kept verbatim in [`LayoutType::Other`] so they can still be
/// logged, but they render through the generic text path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayoutType {
    CoverSlide,
    ContentText,
    ContentWithChart,
    ComparisonGrid,
    DataTable,
    Flowchart,
    IconRow,
    IconSequence,
    LinearProcess,
    WorkflowDiagram,
    ProcessFlow,
    Other(String),
}

impl LayoutType {
    /// Parses a tag leniently: case, surrounding whitespace and `_` vs `-` are ignored.
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "cover-slide" => LayoutType::CoverSlide,
            "content-text" => LayoutType::ContentText,
            "content-with-chart" => LayoutType::ContentWithChart,
            "comparison-grid" => LayoutType::ComparisonGrid,
            "data-table" => LayoutType::DataTable,
            "flowchart" => LayoutType::Flowchart,
            "icon-row" => LayoutType::IconRow,
            "icon-sequence" => LayoutType::IconSequence,
            "linear-process" => LayoutType::LinearProcess,
            "workflow-diagram" => LayoutType::WorkflowDiagram,
            "process-flow" => LayoutType::ProcessFlow,
            _ => LayoutType::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayoutType::CoverSlide => "cover-slide",
            LayoutType::ContentText => "content-text",
            LayoutType::ContentWithChart => "content-with-chart",
            LayoutType::ComparisonGrid => "comparison-grid",
            LayoutType::DataTable => "data-table",
            LayoutType::Flowchart => "flowchart",
            LayoutType::IconRow => "icon-row",
            LayoutType::IconSequence => "icon-sequence",
            LayoutType::LinearProcess => "linear-process",
            LayoutType::WorkflowDiagram => "workflow-diagram",
            LayoutType::ProcessFlow => "process-flow",
            LayoutType::Other(tag) => tag,
        }
    }

    /// The `visual_elements` key holding this layout's structured data.
    pub fn structured_field(&self) -> Option<&'static str> {
        match self {
            LayoutType::ComparisonGrid => Some("sections"),
            LayoutType::DataTable => Some("table_data"),
            LayoutType::Flowchart => Some("flowchart_steps"),
            LayoutType::IconRow => Some("icon_items"),
            LayoutType::IconSequence => Some("sequence_items"),
            LayoutType::LinearProcess => Some("process_steps"),
            LayoutType::WorkflowDiagram => Some("workflow"),
            LayoutType::ProcessFlow => Some("flow_stages"),
            _ => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.structured_field().is_some()
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
