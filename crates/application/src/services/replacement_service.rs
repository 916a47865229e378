//! Replacement rules loading service
//!
//! Replacements are a nice-to-have: any failure yields an empty rule set and
//! never blocks the reply pipeline.

use std::sync::Arc;

use domain::{InsertOutcome, ReplacementRuleSet};
use tracing::{debug, info, instrument, warn};

use crate::ports::{CachePort, CachePortExt, RangeSpec, Row, RowSourcePort, keys};

/// Default sheet holding the replacement rules
pub const DEFAULT_REPLACEMENTS_SHEET: &str = "Sostituzioni";

/// Build a rule set from replacement rows; the first row is the header
///
/// Rows with fewer than two non-blank cells are skipped, as are rows whose
/// texts are identical. A later row for the same text wins.
pub fn parse_replacement_rows(rows: &[Row]) -> ReplacementRuleSet {
    let mut rules = ReplacementRuleSet::new();
    for row in rows.iter().skip(1) {
        let [find, replace, ..] = row.as_slice() else {
            continue;
        };
        match rules.insert(find, replace) {
            InsertOutcome::Redundant => {
                debug!(text = %find.trim(), "Skipping replacement that maps text to itself");
            },
            InsertOutcome::Overwritten => {
                debug!(text = %find.trim(), "Replacement redefined by a later row");
            },
            InsertOutcome::Unmatchable => {
                warn!(text = %find.trim(), "Skipping replacement that cannot be matched");
            },
            InsertOutcome::Inserted | InsertOutcome::Blank => {},
        }
    }
    rules
}

/// Service that loads replacement rules through the cache
pub struct ReplacementService {
    cache: Arc<dyn CachePort>,
    source: Arc<dyn RowSourcePort>,
    range: RangeSpec,
}

impl std::fmt::Debug for ReplacementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplacementService")
            .field("cache", &self.cache)
            .field("source", &"<RowSourcePort>")
            .field("range", &self.range)
            .finish()
    }
}

impl ReplacementService {
    /// Create a new replacement service
    #[must_use]
    pub fn new(cache: Arc<dyn CachePort>, source: Arc<dyn RowSourcePort>, range: RangeSpec) -> Self {
        Self {
            cache,
            source,
            range,
        }
    }

    /// Two-column range the rules are read from
    pub const fn range(&self) -> &RangeSpec {
        &self.range
    }

    /// Load the replacement rules; never fails
    ///
    /// An empty set is cached like any other. A source failure is not cached,
    /// so the next call tries the source again.
    #[instrument(skip(self), level = "debug")]
    pub async fn load(&self) -> ReplacementRuleSet {
        if let Some(rules) = self
            .cache
            .get::<ReplacementRuleSet>(keys::REPLACEMENTS)
            .await
        {
            debug!(rules = rules.len(), "Replacements served from cache");
            return rules;
        }

        let rows = match self.source.fetch_range(&self.range).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Could not load replacements (non-critical), continuing without");
                return ReplacementRuleSet::new();
            },
        };

        let rules = parse_replacement_rows(&rows);
        self.cache.set(keys::REPLACEMENTS, &rules).await;
        info!(rules = rules.len(), "Replacements loaded from source");
        rules
    }
}
