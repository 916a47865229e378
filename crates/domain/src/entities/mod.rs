//! Domain entities

mod admission;
mod ignore_list;
mod knowledge_base;
mod notification;
mod replacement_rules;

pub use admission::{AdmissionDecision, AdmissionReason};
pub use ignore_list::{IgnoreList, IgnoreMatch, bare_address};
pub use knowledge_base::{
    ENTRY_HEADER, IgnoreItem, KnowledgeBaseEntry, KnowledgeBaseSnapshot, format_knowledge_base,
};
pub use notification::NotificationEvent;
pub use replacement_rules::{InsertOutcome, ReplacementRule, ReplacementRuleSet};
