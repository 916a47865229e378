//! Knowledge base loading service
//!
//! Reads the instructions sheet, turns rows into a formatted document plus
//! ignore lists and keeps the result in the shared cache. When the sheet
//! cannot be read, the last snapshot ever stored is served instead.

use std::{collections::BTreeSet, sync::Arc};

use chrono::Utc;
use domain::{IgnoreItem, KnowledgeBaseEntry, KnowledgeBaseSnapshot};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{ApplicationError, SourceError},
    ports::{CachePort, CachePortExt, RangeSpec, Row, RowSourcePort, keys},
};

/// Default sheet holding the knowledge base
pub const DEFAULT_KNOWLEDGE_BASE_SHEET: &str = "Istruzioni";

/// Default minimum document length before a warning is logged
const DEFAULT_MIN_DOCUMENT_CHARS: usize = 100;

/// Settings for [`KnowledgeBaseService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseSettings {
    /// Three-column range: category, question, answer
    pub range: RangeSpec,
    /// Category phrases that turn a row into ignore-list items
    pub ignore_markers: Vec<String>,
    /// Statically configured keywords merged into every snapshot
    pub ignore_keywords: Vec<String>,
    /// Statically configured addresses and domains merged into every snapshot
    pub ignore_domains: Vec<String>,
    /// Documents shorter than this are logged as suspicious
    pub min_document_chars: usize,
}

impl Default for KnowledgeBaseSettings {
    fn default() -> Self {
        Self {
            range: RangeSpec::new(DEFAULT_KNOWLEDGE_BASE_SHEET, 'A', 'C'),
            ignore_markers: vec!["da non processare".to_string(), "da ignorare".to_string()],
            ignore_keywords: Vec::new(),
            ignore_domains: Vec::new(),
            min_document_chars: DEFAULT_MIN_DOCUMENT_CHARS,
        }
    }
}

/// Rows of the instructions sheet after classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedKnowledgeBase {
    /// Knowledge base entries in sheet order
    pub entries: Vec<KnowledgeBaseEntry>,
    /// Keywords collected from ignore-marker rows
    pub ignore_keywords: Vec<String>,
    /// Addresses and domains collected from ignore-marker rows
    pub ignore_domains: Vec<String>,
    /// Rows skipped for having fewer than three cells or a blank category
    pub malformed_rows: usize,
}

/// Classify instruction rows; the first row is the header and is skipped
///
/// A row whose lower-cased category contains one of `ignore_markers`
/// contributes its comma-separated answer items to the ignore lists instead
/// of becoming an entry.
pub fn parse_knowledge_base_rows(rows: &[Row], ignore_markers: &[String]) -> ParsedKnowledgeBase {
    let markers: Vec<String> = ignore_markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect();

    let mut parsed = ParsedKnowledgeBase::default();
    for row in rows.iter().skip(1) {
        let [category, question, answer, ..] = row.as_slice() else {
            parsed.malformed_rows += 1;
            continue;
        };
        if category.trim().is_empty() {
            parsed.malformed_rows += 1;
            continue;
        }

        let category_lower = category.to_lowercase();
        if markers.iter().any(|m| category_lower.contains(m.as_str())) {
            for item in IgnoreItem::parse_list(answer) {
                match item {
                    IgnoreItem::Keyword(keyword) => parsed.ignore_keywords.push(keyword),
                    IgnoreItem::Sender(sender) => parsed.ignore_domains.push(sender),
                }
            }
            continue;
        }

        parsed
            .entries
            .push(KnowledgeBaseEntry::new(category, question, answer));
    }
    parsed
}

/// Service that loads the knowledge base through the cache
pub struct KnowledgeBaseService {
    cache: Arc<dyn CachePort>,
    source: Arc<dyn RowSourcePort>,
    settings: KnowledgeBaseSettings,
}

impl std::fmt::Debug for KnowledgeBaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBaseService")
            .field("cache", &self.cache)
            .field("source", &"<RowSourcePort>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl KnowledgeBaseService {
    /// Create a new knowledge base service
    #[must_use]
    pub fn new(
        cache: Arc<dyn CachePort>,
        source: Arc<dyn RowSourcePort>,
        settings: KnowledgeBaseSettings,
    ) -> Self {
        Self {
            cache,
            source,
            settings,
        }
    }

    /// Get the service settings
    pub const fn settings(&self) -> &KnowledgeBaseSettings {
        &self.settings
    }

    /// Load the knowledge base snapshot
    ///
    /// Serves a fresh cached snapshot when there is one, otherwise rebuilds it
    /// from the row source. If rebuilding fails the last stored snapshot is
    /// returned even if expired; the error only surfaces when nothing was ever
    /// stored.
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self) -> Result<KnowledgeBaseSnapshot, ApplicationError> {
        if let Some(snapshot) = self
            .cache
            .get::<KnowledgeBaseSnapshot>(keys::KNOWLEDGE_BASE)
            .await
        {
            debug!(entries = snapshot.entry_count, "Knowledge base served from cache");
            return Ok(snapshot);
        }

        match self.refresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                if let Some(stale) = self
                    .cache
                    .get_stale::<KnowledgeBaseSnapshot>(keys::KNOWLEDGE_BASE)
                    .await
                {
                    warn!(
                        error = %e,
                        loaded_at = %stale.loaded_at,
                        "Knowledge base source failed, serving stale snapshot"
                    );
                    return Ok(stale);
                }
                error!(error = %e, "Knowledge base source failed and nothing is cached");
                Err(e.into())
            },
        }
    }

    async fn refresh(&self) -> Result<KnowledgeBaseSnapshot, SourceError> {
        let range = &self.settings.range;
        let rows = self.source.fetch_range(range).await?;
        if rows.is_empty() {
            return Err(SourceError::Empty {
                range: range.to_string(),
            });
        }

        let parsed = parse_knowledge_base_rows(&rows, &self.settings.ignore_markers);
        if parsed.malformed_rows > 0 {
            debug!(
                malformed_rows = parsed.malformed_rows,
                "Skipped malformed knowledge base rows"
            );
        }

        let ignore_keywords = merge(parsed.ignore_keywords, &self.settings.ignore_keywords);
        let ignore_domains = merge(parsed.ignore_domains, &self.settings.ignore_domains);
        let snapshot = KnowledgeBaseSnapshot::new(
            &parsed.entries,
            ignore_keywords,
            ignore_domains,
            Utc::now(),
        );

        if snapshot.is_shorter_than(self.settings.min_document_chars) {
            warn!(
                chars = snapshot.document_chars(),
                min_chars = self.settings.min_document_chars,
                entries = snapshot.entry_count,
                "Knowledge base document is unusually short"
            );
        }

        self.cache.set(keys::KNOWLEDGE_BASE, &snapshot).await;
        info!(
            entries = snapshot.entry_count,
            ignore_keywords = snapshot.ignore_keywords.len(),
            ignore_domains = snapshot.ignore_domains.len(),
            "Knowledge base loaded from source"
        );
        Ok(snapshot)
    }
}

fn merge(extracted: Vec<String>, configured: &[String]) -> BTreeSet<String> {
    extracted
        .into_iter()
        .chain(configured.iter().map(|item| item.trim().to_string()))
        .filter(|item| !item.is_empty())
        .collect()
}
