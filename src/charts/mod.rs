//! Chart specifications and their rasterisation to PNG.

mod error;
mod raster;
mod spec;

pub use error::{ChartError, Result};
pub use raster::{parse_hex_color, RasterChartGenerator};
pub use spec::{ChartDefaults, ChartSpec, ChartType};

use base64::Engine;

/// Turns a chart specification into PNG bytes.
pub trait ChartGenerator: Send + Sync {
    fn render_png(&self, spec: &ChartSpec) -> Result<Vec<u8>>;

    /// The PNG as standard base64, without a data-URL prefix.
    fn render_base64(&self, spec: &ChartSpec) -> Result<String> {
        let png = self.render_png(spec)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(png))
    }
}

/// Validates pre-rendered chart data and strips any `data:...;base64,` prefix
/// and embedded whitespace.
pub fn clean_chart_data(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
        None => trimmed,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(ChartError::EmptyData);
    }
    base64::engine::general_purpose::STANDARD.decode(&cleaned)?;
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_data_prefix_is_stripped() {
        assert_eq!(clean_chart_data("data:image/png;base64,aGVs bG8=").unwrap(), "aGVsbG8=");
        assert_eq!(clean_chart_data(" aGVsbG8= ").unwrap(), "aGVsbG8=");
    }

    #[test]
    fn invalid_chart_data_is_rejected() {
        assert!(matches!(clean_chart_data("not base64!"), Err(ChartError::InvalidBase64(_))));
        assert!(matches!(clean_chart_data("data:image/png;base64,"), Err(ChartError::EmptyData)));
    }
}
