//! Resource loading facade
//!
//! Loads the knowledge base and the replacement rules together for the reply
//! processor and supports a forced reload.

use std::sync::Arc;

use domain::{KnowledgeBaseSnapshot, ReplacementRuleSet};
use tracing::{info, instrument};

use super::{KnowledgeBaseService, KnowledgeBaseSettings, ReplacementService};
use crate::{
    error::ApplicationError,
    ports::{CachePort, CacheStats, RangeSpec, RowSourcePort},
};

/// Everything the reply processor needs from the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    /// Knowledge base snapshot
    pub knowledge_base: KnowledgeBaseSnapshot,
    /// Replacement rules, possibly empty
    pub replacements: ReplacementRuleSet,
}

/// Loads both resources through one shared cache
#[derive(Debug)]
pub struct ResourceService {
    cache: Arc<dyn CachePort>,
    knowledge_base: KnowledgeBaseService,
    replacements: ReplacementService,
}

impl ResourceService {
    /// Create a resource service; both loaders share `cache` and `source`
    #[must_use]
    pub fn new(
        cache: Arc<dyn CachePort>,
        source: Arc<dyn RowSourcePort>,
        knowledge_base: KnowledgeBaseSettings,
        replacements_range: RangeSpec,
    ) -> Self {
        Self {
            knowledge_base: KnowledgeBaseService::new(
                Arc::clone(&cache),
                Arc::clone(&source),
                knowledge_base,
            ),
            replacements: ReplacementService::new(Arc::clone(&cache), source, replacements_range),
            cache,
        }
    }

    /// Knowledge base loader
    pub const fn knowledge_base(&self) -> &KnowledgeBaseService {
        &self.knowledge_base
    }

    /// Replacement rules loader
    pub const fn replacements(&self) -> &ReplacementService {
        &self.replacements
    }

    /// Load both resources
    ///
    /// Fails only when the knowledge base cannot be loaded and nothing is
    /// cached; replacements degrade to an empty set.
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self) -> Result<Resources, ApplicationError> {
        let knowledge_base = self.knowledge_base.load().await?;
        let replacements = self.replacements.load().await;

        info!(
            entries = knowledge_base.entry_count,
            ignore_keywords = knowledge_base.ignore_keywords.len(),
            ignore_domains = knowledge_base.ignore_domains.len(),
            replacements = replacements.len(),
            "Resources ready"
        );
        Ok(Resources {
            knowledge_base,
            replacements,
        })
    }

    /// Drop every cached entry, then load again from the source
    ///
    /// Clearing also discards stale copies, so a failing source after a
    /// reload has nothing to fall back on.
    #[instrument(skip(self), level = "debug")]
    pub async fn reload(&self) -> Result<Resources, ApplicationError> {
        self.cache.clear().await;
        info!("Cache cleared, reloading resources");
        self.load().await
    }

    /// Statistics of the shared cache
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        error::SourceError,
        ports::{MockRowSourcePort, Row, keys},
        testing::FakeCache,
    };

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(ToString::to_string).collect()
    }

    fn rows_for(range: &RangeSpec) -> Vec<Row> {
        if range.sheet == "Istruzioni" {
            vec![
                row(&["Categoria", "Domanda", "Risposta"]),
                row(&["Orari", "Messa", "Ore 18:30"]),
            ]
        } else {
            vec![row(&["Da", "A"]), row(&["ciao", "Buongiorno"])]
        }
    }

    fn service(cache: Arc<FakeCache>, source: MockRowSourcePort) -> ResourceService {
        ResourceService::new(
            cache,
            Arc::new(source),
            KnowledgeBaseSettings::default(),
            RangeSpec::new("Sostituzioni", 'A', 'B'),
        )
    }

    #[tokio::test]
    async fn load_returns_both_resources() {
        let mut source = MockRowSourcePort::new();
        source.expect_fetch_range().times(2).returning(|range| Ok(rows_for(range)));
        let service = service(Arc::new(FakeCache::default()), source);

        let resources = service.load().await.unwrap();
        assert_eq!(resources.knowledge_base.entry_count, 1);
        assert_eq!(resources.replacements.get("ciao"), Some("Buongiorno"));

        let stats = service.cache_stats().await;
        assert_eq!(stats.keys, vec![keys::KNOWLEDGE_BASE, keys::REPLACEMENTS]);
    }

    #[tokio::test]
    async fn replacements_failure_does_not_fail_load() {
        let mut source = MockRowSourcePort::new();
        source.expect_fetch_range().returning(|range| {
            if range.sheet == "Istruzioni" {
                Ok(rows_for(range))
            } else {
                Err(SourceError::Unavailable("sheet missing".to_string()))
            }
        });
        let service = service(Arc::new(FakeCache::default()), source);

        let resources = service.load().await.unwrap();
        assert!(resources.replacements.is_empty());
    }

    #[tokio::test]
    async fn reload_clears_and_fetches_again() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fetches);
        let mut source = MockRowSourcePort::new();
        source.expect_fetch_range().returning(move |range| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(rows_for(range))
        });
        let service = service(Arc::new(FakeCache::default()), source);

        service.load().await.unwrap();
        service.load().await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        service.reload().await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn reload_with_failing_source_has_no_fallback() {
        let mut calls = 0;
        let mut source = MockRowSourcePort::new();
        source.expect_fetch_range().returning(move |range| {
            calls += 1;
            if calls <= 2 {
                Ok(rows_for(range))
            } else {
                Err(SourceError::Unavailable("offline".to_string()))
            }
        });
        let service = service(Arc::new(FakeCache::default()), source);

        service.load().await.unwrap();
        assert!(service.reload().await.is_err());
    }
}
