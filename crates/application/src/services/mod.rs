//! Application services - Use case implementations

mod admission_service;
mod knowledge_base_service;
mod replacement_service;
mod resource_service;

pub use admission_service::{AdmissionService, AdmissionSettings};
pub use knowledge_base_service::{
    DEFAULT_KNOWLEDGE_BASE_SHEET, KnowledgeBaseService, KnowledgeBaseSettings,
    ParsedKnowledgeBase, parse_knowledge_base_rows,
};
pub use replacement_service::{
    DEFAULT_REPLACEMENTS_SHEET, ReplacementService, parse_replacement_rows,
};
pub use resource_service::{ResourceService, Resources};
