use super::backend::{normalize_keyword, ImageBackend};
use super::error::ImageError;
use indexmap::IndexMap;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Keyword → generated image URLs, in generation order.
pub type ImageCache = IndexMap<String, Vec<String>>;
/// Keyword → index of the next URL to hand out.
pub type UsageTracker = IndexMap<String, usize>;

/// Owns the image cache and the round-robin usage tracker for one deck render.
///
/// Lookups go through [`ImageResolver::resolve`], which mutates the tracker,
/// so a resolver must be threaded through slides in order.
#[derive(Clone, Default)]
pub struct ImageResolver {
    cache: ImageCache,
    tracker: UsageTracker,
    backend: Option<Arc<dyn ImageBackend>>,
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("cache", &self.cache)
            .field("tracker", &self.tracker)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

impl ImageResolver {
    /// An empty resolver that never generates images.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty resolver that generates every image on demand.
    pub fn with_backend(backend: Arc<dyn ImageBackend>) -> Self {
        ImageResolver {
            backend: Some(backend),
            ..Self::default()
        }
    }

    /// Builds a resolver from an existing cache and tracker.
    ///
    /// Keys are normalized; URL lists for keys that collide are concatenated.
    pub fn from_parts(cache: ImageCache, tracker: UsageTracker) -> Self {
        let mut normalized: ImageCache = IndexMap::new();
        for (keyword, urls) in cache {
            normalized
                .entry(normalize_keyword(&keyword))
                .or_default()
                .extend(urls);
        }
        let tracker = tracker
            .into_iter()
            .map(|(keyword, index)| (normalize_keyword(&keyword), index))
            .collect();
        ImageResolver {
            cache: normalized,
            tracker,
            backend: None,
        }
    }

    pub fn set_backend(&mut self, backend: Option<Arc<dyn ImageBackend>>) {
        self.backend = backend;
    }

    /// Generates one image per keyword occurrence on a bounded worker pool.
    ///
    /// Results are grouped by normalized keyword in input order. If every
    /// request fails, or the pool cannot start, the cache is left empty and
    /// slides fall back to on-demand generation through the same backend.
    pub fn pre_generate(keywords: &[String], backend: Arc<dyn ImageBackend>, max_workers: usize) -> Self {
        let mut resolver = ImageResolver::with_backend(Arc::clone(&backend));
        if keywords.is_empty() {
            log::info!("No images to pre-generate");
            return resolver;
        }

        log::info!(
            "Pre-generating {} images with {} workers",
            keywords.len(),
            max_workers.max(1)
        );
        let pool = match ThreadPoolBuilder::new().num_threads(max_workers.max(1)).build() {
            Ok(pool) => pool,
            Err(e) => {
                log::error!("{}", ImageError::WorkerPool(e.to_string()));
                return resolver;
            }
        };

        let results: Vec<(String, Result<String, ImageError>)> = pool.install(|| {
            keywords
                .par_iter()
                .map(|keyword| (normalize_keyword(keyword), generate_contained(backend.as_ref(), keyword)))
                .collect()
        });

        let mut failures = 0usize;
        for (keyword, result) in results {
            match result {
                Ok(url) => resolver.cache.entry(keyword).or_default().push(url),
                Err(e) => {
                    failures += 1;
                    log::warn!("Failed to pre-generate image for '{}': {}", keyword, e);
                }
            }
        }

        if resolver.cache.is_empty() {
            log::error!(
                "Image pre-generation failed for all {} keywords; images will be generated on demand",
                failures
            );
            return resolver;
        }

        resolver.tracker = resolver.cache.keys().map(|k| (k.clone(), 0)).collect();
        log::info!(
            "Pre-generated images for {} unique keywords ({} images, {} failures)",
            resolver.cache.len(),
            keywords.len() - failures,
            failures
        );
        resolver
    }

    /// Returns the next URL for `keyword` and advances its round-robin index.
    ///
    /// On a cache miss the backend, if any, is asked for a single image; a
    /// backend failure yields `None`.
    pub fn resolve(&mut self, keyword: &str) -> Option<String> {
        let key = normalize_keyword(keyword);
        if key.is_empty() {
            return None;
        }

        if let Some(urls) = self.cache.get(&key).filter(|urls| !urls.is_empty()) {
            let index = self.tracker.get(&key).copied().unwrap_or(0);
            let url = urls[index % urls.len()].clone();
            self.tracker.insert(key, (index + 1) % urls.len());
            return Some(url);
        }

        let backend = self.backend.as_ref()?;
        log::warn!(
            "Image for keyword '{}' not found in cache, generating on demand",
            key
        );
        match generate_contained(backend.as_ref(), &key) {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("Failed to generate image for keyword '{}': {}", key, e);
                None
            }
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn tracker_snapshot(&self) -> UsageTracker {
        self.tracker.clone()
    }

    /// Restores a snapshot taken with [`ImageResolver::tracker_snapshot`].
    pub fn reset_tracker(&mut self, snapshot: UsageTracker) {
        self.tracker = snapshot;
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }
}

/// Calls the backend, turning a panic into [`ImageError::Panicked`].
fn generate_contained(backend: &dyn ImageBackend, keyword: &str) -> Result<String, ImageError> {
    catch_unwind(AssertUnwindSafe(|| backend.generate(keyword))).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|m| m.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        log::warn!("Image backend panicked for '{}': {}", keyword, message);
        Err(ImageError::Panicked(message))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache_of(entries: &[(&str, &[&str])]) -> ImageCache {
        entries
            .iter()
            .map(|(k, urls)| (k.to_string(), urls.iter().map(|u| u.to_string()).collect()))
            .collect()
    }

    #[test]
    fn resolve_cycles_through_urls() {
        let mut resolver =
            ImageResolver::from_parts(cache_of(&[("Shield", &["a", "b", "c"])]), IndexMap::new());
        let got: Vec<_> = (0..5).filter_map(|_| resolver.resolve(" SHIELD ")).collect();
        assert_eq!(got, vec!["a", "b", "c", "a", "b"]);
        assert_eq!(resolver.tracker()["shield"], 2);
    }

    #[test]
    fn tracker_snapshot_restores_rotation() {
        let mut resolver =
            ImageResolver::from_parts(cache_of(&[("lock", &["1", "2"])]), IndexMap::new());
        let snapshot = resolver.tracker_snapshot();
        let first: Vec<_> = (0..3).filter_map(|_| resolver.resolve("lock")).collect();
        resolver.reset_tracker(snapshot);
        let second: Vec<_> = (0..3).filter_map(|_| resolver.resolve("lock")).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn miss_without_backend_is_none() {
        let mut resolver = ImageResolver::new();
        assert_eq!(resolver.resolve("anything"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn miss_with_backend_generates_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let backend = move |keyword: &str| -> Result<String> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("gen:{}", keyword))
        };
        let mut resolver = ImageResolver::with_backend(Arc::new(backend));
        assert_eq!(resolver.resolve("Rocket").as_deref(), Some("gen:rocket"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backend_failure_is_swallowed() {
        let backend = |_: &str| -> Result<String> { Err(ImageError::EmptyKeyword) };
        let mut resolver = ImageResolver::with_backend(Arc::new(backend));
        assert_eq!(resolver.resolve("x"), None);
    }

    #[test]
    fn backend_panic_is_a_miss() {
        let backend = |_: &str| -> Result<String> { panic!("backend exploded") };
        let mut resolver = ImageResolver::with_backend(Arc::new(backend));
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve("x")));
        assert_eq!(outcome.ok(), Some(None));
    }

    #[test]
    fn panicking_workers_do_not_sink_pre_generation() {
        let backend = |keyword: &str| -> Result<String> {
            if keyword == "boom" {
                panic!("worker exploded");
            }
            Ok(format!("url:{}", keyword))
        };
        let keywords: Vec<String> = ["boom", "calm"].iter().map(|s| s.to_string()).collect();
        let resolver = ImageResolver::pre_generate(&keywords, Arc::new(backend), 2);
        assert_eq!(resolver.cache().len(), 1);
        assert_eq!(resolver.cache()["calm"], vec!["url:calm".to_string()]);

        let all_panic = |_: &str| -> Result<String> { panic!("down") };
        let resolver = ImageResolver::pre_generate(&keywords, Arc::new(all_panic), 2);
        assert!(resolver.is_empty());
    }

    #[test]
    fn pre_generate_keeps_duplicates_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        let backend = move |keyword: &str| -> Result<String> {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}-{}", keyword.trim().to_lowercase(), n))
        };
        let keywords: Vec<String> = ["Shield", "lock", "shield "].iter().map(|s| s.to_string()).collect();
        let resolver = ImageResolver::pre_generate(&keywords, Arc::new(backend), 4);
        assert_eq!(resolver.cache().len(), 2);
        assert_eq!(resolver.cache()["shield"].len(), 2);
        assert_eq!(resolver.tracker()["shield"], 0);
        assert_eq!(resolver.tracker()["lock"], 0);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn total_pre_generation_failure_leaves_empty_cache() {
        let backend = |_: &str| -> Result<String> {
            Err(ImageError::Unavailable("offline".to_string()))
        };
        let keywords = vec!["a".to_string(), "b".to_string()];
        let resolver = ImageResolver::pre_generate(&keywords, Arc::new(backend), 2);
        assert!(resolver.is_empty());
        assert!(resolver.tracker().is_empty());
        assert!(resolver.has_backend());
    }
}
