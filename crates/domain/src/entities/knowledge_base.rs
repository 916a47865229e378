//! Knowledge base entries and the cached snapshot built from them

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IgnoreList;

/// Header line that opens every rendered entry
pub const ENTRY_HEADER: &str = "--- Informazione ---";

/// A single category/question/answer fact from the instructions sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseEntry {
    /// Category column (e.g. "Orari")
    pub category: String,
    /// Question or topic column
    pub question: String,
    /// Answer or detail column
    pub answer: String,
}

impl KnowledgeBaseEntry {
    /// Create an entry, trimming every field
    pub fn new(
        category: impl AsRef<str>,
        question: impl AsRef<str>,
        answer: impl AsRef<str>,
    ) -> Self {
        Self {
            category: category.as_ref().trim().to_string(),
            question: question.as_ref().trim().to_string(),
            answer: answer.as_ref().trim().to_string(),
        }
    }

    /// Entries without an answer are not rendered
    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Render the entry as a document block
    pub fn render(&self) -> String {
        format!(
            "\n{ENTRY_HEADER}\nCategoria: {}\nArgomento: {}\nDettagli: {}",
            self.category, self.question, self.answer
        )
    }
}

/// One item of an ignore row, classified by the presence of `@`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreItem {
    /// Plain keyword matched against subject and body
    Keyword(String),
    /// Address or domain matched against the sender
    Sender(String),
}

impl IgnoreItem {
    /// Split a comma-separated answer cell into classified items
    ///
    /// Blank items (e.g. from a trailing comma) are dropped.
    pub fn parse_list(answer: &str) -> impl Iterator<Item = Self> + '_ {
        answer
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                if item.contains('@') {
                    Self::Sender(item.to_string())
                } else {
                    Self::Keyword(item.to_string())
                }
            })
    }
}

/// Render the knowledge base document from its entries
///
/// ```
/// use domain::{KnowledgeBaseEntry, format_knowledge_base};
///
/// let entries = vec![KnowledgeBaseEntry::new("Orari", "Messa feriale", "Ore 18:30")];
/// let document = format_knowledge_base(&entries);
/// assert!(document.contains("Dettagli: Ore 18:30"));
/// ```
pub fn format_knowledge_base(entries: &[KnowledgeBaseEntry]) -> String {
    entries
        .iter()
        .filter(|entry| entry.has_answer())
        .map(KnowledgeBaseEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formatted knowledge base plus the ignore lists extracted alongside it
///
/// This is the value stored in the cache under `"knowledge_base"`; it must
/// survive a JSON round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseSnapshot {
    /// Formatted document used to ground replies
    pub document: String,
    /// Keywords that suppress automated processing
    pub ignore_keywords: BTreeSet<String>,
    /// Sender addresses and domains that suppress automated processing
    pub ignore_domains: BTreeSet<String>,
    /// When the snapshot was built from the row source
    pub loaded_at: DateTime<Utc>,
    /// Number of rendered entries
    pub entry_count: usize,
}

impl KnowledgeBaseSnapshot {
    /// Build a snapshot from parsed entries and merged ignore lists
    pub fn new(
        entries: &[KnowledgeBaseEntry],
        ignore_keywords: BTreeSet<String>,
        ignore_domains: BTreeSet<String>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document: format_knowledge_base(entries),
            ignore_keywords,
            ignore_domains,
            loaded_at,
            entry_count: entries.iter().filter(|e| e.has_answer()).count(),
        }
    }

    /// Document length in characters
    pub fn document_chars(&self) -> usize {
        self.document.chars().count()
    }

    /// Whether the document is shorter than the given number of characters
    pub fn is_shorter_than(&self, min_chars: usize) -> bool {
        self.document_chars() < min_chars
    }

    /// Matcher over the snapshot's ignore lists
    pub fn ignore_list(&self) -> IgnoreList {
        IgnoreList::from_snapshot(self)
    }
}
