//! Error taxonomy for the learning domain.
//!
//! Lookup misses are not errors: navigator and catalog queries return
//! `Option` instead.

use thiserror::Error;

/// Malformed construction input for catalog data or a progress record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} {field} is required")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} {field} must be positive")]
    NonPositive {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Module {0} must have at least one topic")]
    EmptyModule(String),

    #[error("Curriculum must have at least one module")]
    EmptyCatalog,

    #[error("Duplicate module ID: {0}")]
    DuplicateModuleId(String),

    #[error("Duplicate topic ID: {0}")]
    DuplicateTopicId(String),

    #[error("Cannot have current topic without current module")]
    TopicWithoutModule,

    #[error("Note topic ID cannot be empty")]
    EmptyNoteKey,

    #[error("Note for topic {0} exceeds maximum length")]
    NoteTooLong(String),
}

/// Rejected progress operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("{0} is required")]
    InvalidArgument(&'static str),

    #[error("No topics available to start learning")]
    NoContentAvailable,

    #[error("Invalid learning path: {module_id}/{topic_id}")]
    InvalidPath { module_id: String, topic_id: String },

    #[error("Topic not found: {0}")]
    UnknownTopic(String),
}

/// Failure at the storage boundary.
///
/// Only writes surface this; a failed load falls back to a fresh record.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to save user progress: {0}")]
    Save(String),

    #[error("Failed to reset user progress: {0}")]
    Reset(String),
}

impl PersistenceError {
    /// The failed action without storage details, safe to show to a user.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Save(_) => "Failed to save user progress",
            Self::Reset(_) => "Failed to reset user progress",
        }
    }
}

/// Anything a learning use case can fail with.
#[derive(Debug, Error)]
pub enum LearningError {
    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
