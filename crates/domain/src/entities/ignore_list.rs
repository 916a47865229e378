//! Ignore-list matching for inbound messages
//!
//! Keywords match anywhere in the subject or body. Sender entries containing
//! `@` match one exact address; entries without `@` match a domain and all of
//! its subdomains.

use std::fmt;

use super::KnowledgeBaseSnapshot;

/// Why a message matched the ignore list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreMatch {
    /// A keyword occurs in the subject or body
    Keyword(String),
    /// The sender address is listed exactly
    Address(String),
    /// The sender domain (or a parent domain) is listed
    Domain(String),
}

impl fmt::Display for IgnoreMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "keyword '{k}'"),
            Self::Address(a) => write!(f, "sender '{a}'"),
            Self::Domain(d) => write!(f, "sender domain '{d}'"),
        }
    }
}

/// Lower-cased keyword and sender lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    keywords: Vec<String>,
    senders: Vec<String>,
}

impl IgnoreList {
    /// Build a matcher; blank entries are dropped
    pub fn new<K, S>(keywords: K, senders: S) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        fn normalize<I>(items: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            items
                .into_iter()
                .map(|item| item.as_ref().trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        }

        Self {
            keywords: normalize(keywords),
            senders: normalize(senders),
        }
    }

    /// Matcher over a knowledge base snapshot's ignore lists
    pub fn from_snapshot(snapshot: &KnowledgeBaseSnapshot) -> Self {
        Self::new(&snapshot.ignore_keywords, &snapshot.ignore_domains)
    }

    /// Number of keyword entries
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Number of sender entries
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Check a message against the lists; keywords are checked first
    pub fn matches(&self, subject: &str, body: &str, sender: &str) -> Option<IgnoreMatch> {
        let text = format!("{subject} {body}").to_lowercase();
        if let Some(keyword) = self.keywords.iter().find(|k| text.contains(k.as_str())) {
            return Some(IgnoreMatch::Keyword(keyword.clone()));
        }

        let address = bare_address(sender).to_lowercase();
        let domain = address.rsplit_once('@').map_or("", |(_, domain)| domain);

        self.senders.iter().find_map(|entry| {
            if entry.contains('@') {
                (address == *entry).then(|| IgnoreMatch::Address(entry.clone()))
            } else {
                let is_subdomain = domain
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'));
                (domain == entry || is_subdomain).then(|| IgnoreMatch::Domain(entry.clone()))
            }
        })
    }
}

/// Extract the bare address from a `From` header value
///
/// ```
/// use domain::bare_address;
///
/// assert_eq!(bare_address("Mario Rossi <mario@example.com>"), "mario@example.com");
/// assert_eq!(bare_address(" mario@example.com "), "mario@example.com");
/// ```
pub fn bare_address(sender: &str) -> &str {
    let sender = sender.trim();
    match (sender.rfind('<'), sender.rfind('>')) {
        (Some(open), Some(close)) if open < close => sender[open + 1..close].trim(),
        _ => sender,
    }
}
