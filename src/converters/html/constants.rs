//! Fixed strings used by the HTML renderer.

// Chart placeholders.
pub const NO_CHART_DATA: &str = "No chart data available";
pub const CHART_FAILED: &str = "Chart generation failed";
pub const CHART_INVALID: &str = "Invalid chart specification";
pub const CHART_ERROR: &str = "Chart generation error";
pub const CHART_SPEC_MISSING: &str = "Chart specification not available";
pub const NO_CHARTS_GENERATED: &str = "No charts generated";

pub const EMPTY_CONTENT_PLACEHOLDER: &str = r#"<div class="main-text" style="color: #94A3B8; font-style: italic;">Content will be generated based on the presentation script.</div>"#;
pub const FLOWCHART_PLACEHOLDER: &str =
    r#"<div class="mermaid-flowchart-placeholder">No flowchart steps provided</div>"#;

pub const DEFAULT_SUBTITLE: &str = "An in-depth analysis and presentation";
pub const DEFAULT_HEADER: &str = "PRESENTATION";
pub const DEFAULT_BRANDING: &str = "Deckora";
pub const MAX_HEADER_LEN: usize = 50;

pub const FANCY_BULLET_ICON: &str = "keyboard_double_arrow_right";
pub const MAX_SCRIPT_POINTS: usize = 3;
pub const MAX_SYNTHESIZED_ITEMS: usize = 4;
pub const MAX_ICON_LABEL_WORDS: usize = 8;

/// Deck-wide stylesheet; `{theme_*}` placeholders are filled per deck.
pub const GLOBAL_CSS_TEMPLATE: &str = r#"
.slide-content {
    display: flex;
    flex-direction: column;
    height: 100%;
    width: 100%;
    padding: 30px 40px;
    box-sizing: border-box;
}
.slide-content.slide-with-chart {
    display: flex;
    flex-direction: column;
}
.slide-content.slide-with-chart .slide-title {
    grid-column: 1 / -1;
    width: 100%;
    margin-bottom: 30px;
}
.slide-content-wrapper {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 40px;
    align-items: center;
    flex: 1;
}
.slide-title {
    color: {theme_primary};
    margin-bottom: 30px;
    font-weight: 700;
    line-height: 1.2;
}
.slide-body {
    flex: 1;
    line-height: 1.6;
    color: {theme_text};
}
.main-text {
    margin-bottom: 20px;
    font-size: 1.1em;
}
.bullet-points {
    list-style: none;
    padding-left: 0;
}
.bullet-points li {
    margin-bottom: 16px;
    padding-left: 30px;
    position: relative;
}
.bullet-points li:before {
    content: "•";
    position: absolute;
    left: 0;
    color: {theme_primary};
    font-size: 1.5em;
    line-height: 1;
}
.chart-container {
    display: flex;
    justify-content: center;
    align-items: center;
    padding: 0;
    background: white;
    border-radius: 8px;
    min-height: 0;
    overflow: hidden;
    height: 100%;
    width: 100%;
}
.chart-image {
    max-width: 100%;
    max-height: 100%;
    width: auto;
    height: auto;
    object-fit: contain;
    border-radius: 4px;
    display: block;
}
.icons-container {
    display: flex;
    gap: 16px;
    margin-top: 20px;
    flex-wrap: wrap;
}
.slide-icon {
    width: 48px;
    height: 48px;
    opacity: 0.8;
}
.data-table .highlight-row {
    background-color: {theme_secondary}15 !important;
    font-weight: 600;
}
.data-table .highlight-row td {
    color: {theme_primary};
}
.data-table .highlight-cell {
    background-color: {theme_secondary}15 !important;
    font-weight: 600;
    color: {theme_primary};
}
.slide-image-single {
    display: flex;
    justify-content: center;
    align-items: center;
}
.slide-image {
    max-width: 100%;
    max-height: 150px;
    width: auto;
    height: auto;
    object-fit: contain;
    border-radius: 8px;
    background: transparent;
    flex-shrink: 0;
    image-rendering: -webkit-optimize-contrast;
    image-rendering: crisp-edges;
    border: none;
    outline: none;
    box-shadow: none;
}
@media (max-width: 1024px) {
    .slide-content-wrapper {
        grid-template-columns: 1fr;
    }
    .chart-container {
        margin-top: 30px;
    }
}
"#;
