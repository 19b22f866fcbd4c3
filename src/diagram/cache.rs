//! Success cache for rendered diagrams.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{DiagramError, DiagramKind, DiagramRenderer};

/// Rendered image references keyed by diagram kind and source text.
///
/// Lives as long as its owner, typically the whole process. There is no
/// eviction; documents hold a handful of diagrams.
#[derive(Debug, Default)]
pub struct DiagramCache {
    entries: RwLock<HashMap<DiagramKind, HashMap<String, String>>>,
}

impl DiagramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DiagramKind, source: &str) -> Option<String> {
        self.entries
            .read()
            .get(&kind)
            .and_then(|by_source| by_source.get(source))
            .cloned()
    }

    pub fn put(&self, kind: DiagramKind, source: impl Into<String>, image: impl Into<String>) {
        self.entries
            .write()
            .entry(kind)
            .or_default()
            .insert(source.into(), image.into());
    }

    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Wraps a renderer so each diagram is rendered at most once.
///
/// Only successful results are stored. A failed render is retried on the
/// next call.
#[derive(Debug)]
pub struct CachedRenderer<R> {
    inner: R,
    cache: Arc<DiagramCache>,
}

impl<R: DiagramRenderer> CachedRenderer<R> {
    pub fn new(inner: R) -> Self {
        Self::with_cache(inner, Arc::new(DiagramCache::new()))
    }

    /// Shares an existing cache, e.g. between several renderers.
    pub fn with_cache(inner: R, cache: Arc<DiagramCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<DiagramCache> {
        &self.cache
    }
}

impl<R: DiagramRenderer> DiagramRenderer for CachedRenderer<R> {
    fn render(&self, kind: DiagramKind, source: &str) -> Result<String, DiagramError> {
        if let Some(image) = self.cache.get(kind, source) {
            tracing::debug!(%kind, "Diagram cache hit");
            return Ok(image);
        }

        let image = self.inner.render(kind, source)?;
        self.cache.put(kind, source, image.clone());
        Ok(image)
    }
}
