// demos/render_deck.rs
//
// cargo run --example render_deck -- [deck.json] [script.json]

use std::env;
use std::fs;
#[cfg(feature = "http-backend")]
use std::sync::Arc;

use anyhow::Context;
use web_slides::charts::RasterChartGenerator;
use web_slides::images::collect_keywords;
use web_slides::models::ScriptMap;
use web_slides::{
    write_payload, ImageResolver, PresentationConfig, RenderSettings, SlideDeck, SlideRenderer,
    TemplateRegistry,
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let settings = RenderSettings::from_env();
    let args: Vec<String> = env::args().skip(1).collect();
    let deck_path = args
        .first()
        .map(String::as_str)
        .unwrap_or("demos/sample_deck.json");

    log::info!("Loading deck from {}", deck_path);
    let deck_json = read_json(deck_path)?;
    let script_json = match args.get(1) {
        Some(path) => read_json(path)?,
        None => serde_json::Value::Null,
    };

    let config =
        PresentationConfig::from_value(deck_json.get("config").unwrap_or(&serde_json::Value::Null));
    let deck = SlideDeck::from_value(&deck_json)?;
    let scripts = ScriptMap::from_value(&script_json);

    let registry = match &settings.templates_dir {
        Some(dir) => TemplateRegistry::builtin().with_overrides_from(dir),
        None => TemplateRegistry::builtin(),
    };
    let mut resolver = image_resolver(&settings, &deck);

    let theme = config.theme_colors();
    let charts = RasterChartGenerator::default();
    let title = config.title.clone().unwrap_or_else(|| "Demo Deck".to_string());
    let payload = SlideRenderer::new(&registry, &theme, &config, &charts).assemble(
        &deck,
        &scripts,
        &title,
        &mut resolver,
    );

    let output = settings.output_path();
    write_payload(&payload, &output)?;
    log::info!(
        "Rendered {} slides ({} image keywords cached)",
        payload.metadata.total_slides,
        resolver.cache().len()
    );
    Ok(())
}

#[cfg(feature = "http-backend")]
fn image_resolver(settings: &RenderSettings, deck: &SlideDeck) -> ImageResolver {
    use web_slides::images::HttpImageBackend;

    let Some(url) = &settings.image_backend_url else {
        log::info!("IMAGE_BACKEND_URL not set, rendering without generated images");
        return ImageResolver::new();
    };
    let backend = Arc::new(HttpImageBackend::new(
        url.clone(),
        settings.image_backend_api_key.clone(),
    ));
    let keywords = collect_keywords(deck);
    log::info!("Pre-generating {} images", keywords.len());
    ImageResolver::pre_generate(&keywords, backend, settings.image_max_workers)
}

#[cfg(not(feature = "http-backend"))]
fn image_resolver(_settings: &RenderSettings, deck: &SlideDeck) -> ImageResolver {
    log::info!(
        "Built without http-backend, skipping {} image keywords",
        collect_keywords(deck).len()
    );
    ImageResolver::new()
}

fn read_json(path: &str) -> anyhow::Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
}
