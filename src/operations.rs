//! Catalog-aware progress operations.
//!
//! [`ProgressRecord`] only checks its own invariants. Anything that depends on
//! the curriculum (does this topic exist, where does the session start) is
//! decided here, so every caller gets the same checks.

use crate::error::ProgressError;
use crate::models::ProgressRecord;
use crate::navigator::CurriculumNavigator;

#[derive(Debug, Clone)]
pub struct ProgressService {
    navigator: CurriculumNavigator,
}

impl ProgressService {
    pub fn new(navigator: CurriculumNavigator) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &CurriculumNavigator {
        &self.navigator
    }

    /// Position the learner on the first topic of the curriculum.
    pub fn start_learning_session(
        &self,
        progress: &ProgressRecord,
    ) -> Result<ProgressRecord, ProgressError> {
        let first = self
            .navigator
            .first_topic()
            .ok_or(ProgressError::NoContentAvailable)?;
        progress.with_current_position(&first.module_id, &first.topic_id)
    }

    /// Move to a position after checking it exists in the catalog.
    pub fn move_to(
        &self,
        progress: &ProgressRecord,
        module_id: &str,
        topic_id: &str,
    ) -> Result<ProgressRecord, ProgressError> {
        if module_id.trim().is_empty() || topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Module ID and Topic ID"));
        }
        if !self.navigator.validate_learning_path(module_id, topic_id) {
            return Err(ProgressError::InvalidPath {
                module_id: module_id.to_string(),
                topic_id: topic_id.to_string(),
            });
        }
        progress.with_current_position(module_id, topic_id)
    }

    /// Mark a topic completed. Ids unknown to the catalog are rejected.
    pub fn complete_topic(
        &self,
        progress: &ProgressRecord,
        topic_id: &str,
    ) -> Result<ProgressRecord, ProgressError> {
        if topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Topic ID"));
        }
        if self.navigator.find_topic_by_id(topic_id).is_none() {
            return Err(ProgressError::UnknownTopic(topic_id.to_string()));
        }
        progress.with_completed_topic(topic_id)
    }

    /// Store a note for a topic in the catalog.
    pub fn save_note(
        &self,
        progress: &ProgressRecord,
        topic_id: &str,
        note: &str,
    ) -> Result<ProgressRecord, ProgressError> {
        if topic_id.trim().is_empty() {
            return Err(ProgressError::InvalidArgument("Topic ID"));
        }
        if self.navigator.find_topic_by_id(topic_id).is_none() {
            return Err(ProgressError::UnknownTopic(topic_id.to_string()));
        }
        progress.with_note(topic_id, note)
    }

    /// The record moved one topic forward, or `None` without a position or
    /// at the end of the curriculum.
    pub fn advance(&self, progress: &ProgressRecord) -> Option<ProgressRecord> {
        let (module_id, topic_id) = progress.current_position()?;
        let next = self.navigator.next_topic(module_id, topic_id)?;
        progress
            .with_current_position(&next.module_id, &next.topic_id)
            .ok()
    }

    /// The record moved one topic back, or `None` at the start.
    pub fn retreat(&self, progress: &ProgressRecord) -> Option<ProgressRecord> {
        let (module_id, topic_id) = progress.current_position()?;
        let prev = self.navigator.previous_topic(module_id, topic_id)?;
        progress
            .with_current_position(&prev.module_id, &prev.topic_id)
            .ok()
    }
}
