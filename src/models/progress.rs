use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProgressError, ValidationError};
use crate::sanitize::{sanitize_note, MAX_NOTE_LENGTH};

/// One learner's state, as an immutable value.
///
/// Every `with_*` method returns a new record with `last_accessed` refreshed;
/// callers replace the old value wholesale and persist the new one.
///
/// # Invariants
/// - `current_topic` is only set together with `current_module`
/// - note keys are non-blank, note bodies are non-blank and at most
///   [`MAX_NOTE_LENGTH`] characters
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    completed_topics: BTreeSet<String>,
    current_module: Option<String>,
    current_topic: Option<String>,
    notes: BTreeMap<String, String>,
    last_accessed: DateTime<Utc>,
}

/// The storage representation of a [`ProgressRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProgress {
    pub completed_topics: Vec<String>,
    pub current_module: Option<String>,
    pub current_topic: Option<String>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    pub last_accessed: DateTime<Utc>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRecord {
    /// A fresh record: nothing completed, no position, no notes.
    pub fn new() -> Self {
        Self {
            completed_topics: BTreeSet::new(),
            current_module: None,
            current_topic: None,
            notes: BTreeMap::new(),
            last_accessed: Utc::now(),
        }
    }

    pub fn from_parts(
        completed_topics: impl IntoIterator<Item = String>,
        current_module: Option<String>,
        current_topic: Option<String>,
        notes: BTreeMap<String, String>,
        last_accessed: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if current_topic.is_some() && current_module.is_none() {
            return Err(ValidationError::TopicWithoutModule);
        }
        for (topic_id, note) in &notes {
            if topic_id.trim().is_empty() {
                return Err(ValidationError::EmptyNoteKey);
            }
            if note.chars().count() > MAX_NOTE_LENGTH {
                return Err(ValidationError::NoteTooLong(topic_id.clone()));
            }
        }

        Ok(Self {
            completed_topics: completed_topics.into_iter().collect(),
            current_module,
            current_topic,
            notes,
            last_accessed,
        })
    }

    pub fn completed_topics(&self) -> &BTreeSet<String> {
        &self.completed_topics
    }

    pub fn current_module(&self) -> Option<&str> {
        self.current_module.as_deref()
    }

    pub fn current_topic(&self) -> Option<&str> {
        self.current_topic.as_deref()
    }

    /// Both halves of the current position, if a topic is selected.
    pub fn current_position(&self) -> Option<(&str, &str)> {
        Some((self.current_module()?, self.current_topic()?))
    }

    pub fn notes(&self) -> &BTreeMap<String, String> {
        &self.notes
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    /// The note for a topic, or an empty string.
    pub fn note_for_topic(&self, topic_id: &str) -> &str {
        self.notes.get(topic_id).map(String::as_str).unwrap_or("")
    }

    pub fn is_topic_completed(&self, topic_id: &str) -> bool {
        self.completed_topics.contains(topic_id)
    }

    pub fn has_started(&self) -> bool {
        self.current_module.is_some()
    }

    pub fn with_completed_topic(&self, topic_id: &str) -> Result<Self, ProgressError> {
        if topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Topic ID"));
        }

        let mut next = self.touched();
        next.completed_topics.insert(topic_id.to_string());
        Ok(next)
    }

    /// Set the current position.
    ///
    /// Only checks for blank ids; catalog membership is checked by
    /// [`crate::operations::ProgressService::move_to`].
    pub fn with_current_position(
        &self,
        module_id: &str,
        topic_id: &str,
    ) -> Result<Self, ProgressError> {
        if module_id.trim().is_empty() || topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Module ID and Topic ID"));
        }

        let mut next = self.touched();
        next.current_module = Some(module_id.to_string());
        next.current_topic = Some(topic_id.to_string());
        Ok(next)
    }

    /// Store a sanitized note. A note that is blank after sanitizing removes
    /// the entry instead.
    pub fn with_note(&self, topic_id: &str, note: &str) -> Result<Self, ProgressError> {
        if topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Topic ID"));
        }

        let safe = sanitize_note(note);
        let mut next = self.touched();
        if safe.trim().is_empty() {
            next.notes.remove(topic_id);
        } else {
            next.notes.insert(topic_id.to_string(), safe);
        }
        Ok(next)
    }

    pub fn without_note(&self, topic_id: &str) -> Self {
        let mut next = self.touched();
        next.notes.remove(topic_id);
        next
    }

    pub fn to_serializable(&self) -> StoredProgress {
        StoredProgress {
            completed_topics: self.completed_topics.iter().cloned().collect(),
            current_module: self.current_module.clone(),
            current_topic: self.current_topic.clone(),
            notes: self.notes.clone(),
            last_accessed: self.last_accessed,
        }
    }

    pub fn from_serializable(stored: StoredProgress) -> Result<Self, ValidationError> {
        Self::from_parts(
            stored.completed_topics,
            stored.current_module,
            stored.current_topic,
            stored.notes,
            stored.last_accessed,
        )
    }

    fn touched(&self) -> Self {
        Self {
            last_accessed: Utc::now(),
            ..self.clone()
        }
    }
}
