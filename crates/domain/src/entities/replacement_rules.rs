//! Text replacement rules applied to generated replies

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Replace every occurrence of `find` with `replace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    /// Text to look for
    pub find: String,
    /// Text to substitute
    pub replace: String,
}

/// Result of inserting a rule into a [`ReplacementRuleSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New rule appended
    Inserted,
    /// Existing rule for the same text got a new substitution
    Overwritten,
    /// Find and replace texts are identical; nothing stored
    Redundant,
    /// Find or replace text is blank; nothing stored
    Blank,
    /// Find text could not be compiled into a matcher; nothing stored
    Unmatchable,
}

impl InsertOutcome {
    /// Whether the set changed
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Inserted | Self::Overwritten)
    }
}

/// Ordered mapping from text to find to text to substitute
///
/// Keys are unique and keep their first-insertion position; a later rule for
/// the same key overwrites the substitution in place. Rules whose find and
/// replace texts are equal (case-sensitive) are never stored.
///
/// Each rule carries its compiled matcher, built once on insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ReplacementRule>", into = "Vec<ReplacementRule>")]
pub struct ReplacementRuleSet {
    rules: Vec<ReplacementRule>,
    matchers: Vec<Regex>,
}

/// Literal, Unicode case-insensitive matcher for `find`
fn literal_matcher(find: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(find))
        .case_insensitive(true)
        .build()
        .ok()
}

impl PartialEq for ReplacementRuleSet {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for ReplacementRuleSet {}

impl ReplacementRuleSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            rules: Vec::new(),
            matchers: Vec::new(),
        }
    }

    /// Insert a rule, trimming both texts
    pub fn insert(&mut self, find: &str, replace: &str) -> InsertOutcome {
        let (find, replace) = (find.trim(), replace.trim());
        if find.is_empty() || replace.is_empty() {
            return InsertOutcome::Blank;
        }
        if find == replace {
            return InsertOutcome::Redundant;
        }

        if let Some(rule) = self.rules.iter_mut().find(|rule| rule.find == find) {
            replace.clone_into(&mut rule.replace);
            return InsertOutcome::Overwritten;
        }

        let Some(matcher) = literal_matcher(find) else {
            return InsertOutcome::Unmatchable;
        };
        self.rules.push(ReplacementRule {
            find: find.to_string(),
            replace: replace.to_string(),
        });
        self.matchers.push(matcher);
        InsertOutcome::Inserted
    }

    /// Substitution for a find text
    pub fn get(&self, find: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.find == find)
            .map(|rule| rule.replace.as_str())
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in application order
    pub fn iter(&self) -> impl Iterator<Item = &ReplacementRule> {
        self.rules.iter()
    }

    /// Apply every rule in order, matching case-insensitively
    ///
    /// Each rule sees the output of the previous one. Case folding follows
    /// Unicode, so `è` also matches `È`. Replacement texts are inserted
    /// verbatim.
    ///
    /// ```
    /// use domain::ReplacementRuleSet;
    ///
    /// let mut rules = ReplacementRuleSet::new();
    /// rules.insert("ciao", "Buongiorno");
    /// assert_eq!(rules.apply("Ciao Maria, CIAO!"), "Buongiorno Maria, Buongiorno!");
    /// ```
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .zip(&self.matchers)
            .fold(text.to_string(), |output, (rule, matcher)| {
                matcher
                    .replace_all(&output, NoExpand(&rule.replace))
                    .into_owned()
            })
    }
}

impl From<Vec<ReplacementRule>> for ReplacementRuleSet {
    fn from(rules: Vec<ReplacementRule>) -> Self {
        let mut set = Self::new();
        for rule in rules {
            set.insert(&rule.find, &rule.replace);
        }
        set
    }
}

impl From<ReplacementRuleSet> for Vec<ReplacementRule> {
    fn from(set: ReplacementRuleSet) -> Self {
        set.rules
    }
}
