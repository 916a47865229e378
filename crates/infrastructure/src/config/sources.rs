//! Spreadsheet and knowledge base configuration

use application::{
    KnowledgeBaseSettings, RangeSpec,
    services::{DEFAULT_KNOWLEDGE_BASE_SHEET, DEFAULT_REPLACEMENTS_SHEET},
};
use serde::{Deserialize, Serialize};

/// Location of the spreadsheet tabs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Tab holding categories, questions and answers
    #[serde(default = "default_knowledge_base_sheet")]
    pub knowledge_base_sheet: String,

    /// Tab holding find/replace pairs
    #[serde(default = "default_replacements_sheet")]
    pub replacements_sheet: String,
}

fn default_knowledge_base_sheet() -> String {
    DEFAULT_KNOWLEDGE_BASE_SHEET.to_string()
}

fn default_replacements_sheet() -> String {
    DEFAULT_REPLACEMENTS_SHEET.to_string()
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            knowledge_base_sheet: default_knowledge_base_sheet(),
            replacements_sheet: default_replacements_sheet(),
        }
    }
}

impl SheetsConfig {
    /// Columns A-C of the knowledge base tab
    #[must_use]
    pub fn knowledge_base_range(&self) -> RangeSpec {
        RangeSpec::new(&self.knowledge_base_sheet, 'A', 'C')
    }

    /// Columns A-B of the replacements tab
    #[must_use]
    pub fn replacements_range(&self) -> RangeSpec {
        RangeSpec::new(&self.replacements_sheet, 'A', 'B')
    }
}

/// Knowledge base parsing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseAppConfig {
    /// Category phrases marking a row as an ignore-list row
    #[serde(default = "default_ignore_markers")]
    pub ignore_markers: Vec<String>,

    /// Keywords merged into every snapshot
    #[serde(default = "default_ignore_keywords")]
    pub ignore_keywords: Vec<String>,

    /// Sender domains merged into every snapshot
    #[serde(default = "default_ignore_domains")]
    pub ignore_domains: Vec<String>,

    /// Shorter documents are logged as suspicious
    #[serde(default = "default_min_document_chars")]
    pub min_document_chars: usize,
}

fn default_ignore_markers() -> Vec<String> {
    KnowledgeBaseSettings::default().ignore_markers
}

fn default_ignore_keywords() -> Vec<String> {
    [
        "newsletter",
        "unsubscribe",
        "cancella iscrizione",
        "gestisci la tua iscrizione",
        "mailing list",
        "inviato con mailup",
        "messaggio inviato con",
        "bollette",
        "avvisi di pagamento",
        "ricevuta",
        "bonifico",
        "spedizione",
        "avviso di sicurezza",
        "necrologio",
        "non rispondere a questo messaggio",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_ignore_domains() -> Vec<String> {
    [
        "amazon.com",
        "paypal.com",
        "ebay.com",
        "subito.it",
        "mailchimp.com",
        "mailup.com",
        "sendinblue.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_min_document_chars() -> usize {
    100
}

impl Default for KnowledgeBaseAppConfig {
    fn default() -> Self {
        Self {
            ignore_markers: default_ignore_markers(),
            ignore_keywords: default_ignore_keywords(),
            ignore_domains: default_ignore_domains(),
            min_document_chars: default_min_document_chars(),
        }
    }
}

impl KnowledgeBaseAppConfig {
    /// Loader settings for the given knowledge base range
    #[must_use]
    pub fn settings(&self, range: RangeSpec) -> KnowledgeBaseSettings {
        KnowledgeBaseSettings {
            range,
            ignore_markers: self.ignore_markers.clone(),
            ignore_keywords: self.ignore_keywords.clone(),
            ignore_domains: self.ignore_domains.clone(),
            min_document_chars: self.min_document_chars,
        }
    }
}
