//! The learning flow: read the stored record, derive a new one, write it back.
//!
//! Overlapping calls are not coordinated. Two concurrent mutations each read
//! the same record and the later save wins.

use serde::{Deserialize, Serialize};

use crate::analytics::{
    AvailableTopic, LearningState, LearningStatistics, ProgressAnalytics, SessionInfo,
};
use crate::error::LearningError;
use crate::models::{ProgressRecord, StoredProgress};
use crate::navigator::{CurriculumNavigator, TopicRef};
use crate::operations::ProgressService;
use crate::store::ProgressRepository;

/// Everything a progress screen needs in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressOverview {
    pub progress: StoredProgress,
    pub state: LearningState,
    pub overall_progress: u32,
    pub statistics: LearningStatistics,
    pub session_info: SessionInfo,
    pub recommended: Option<TopicRef>,
}

pub struct LearningService<R> {
    repository: R,
    operations: ProgressService,
    analytics: ProgressAnalytics,
}

impl<R: ProgressRepository> LearningService<R> {
    pub fn new(repository: R, navigator: CurriculumNavigator) -> Self {
        Self {
            repository,
            operations: ProgressService::new(navigator.clone()),
            analytics: ProgressAnalytics::new(navigator),
        }
    }

    pub fn navigator(&self) -> &CurriculumNavigator {
        self.operations.navigator()
    }

    pub fn analytics(&self) -> &ProgressAnalytics {
        &self.analytics
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn progress(&self) -> ProgressRecord {
        self.repository.get()
    }

    fn commit(&self, progress: ProgressRecord) -> Result<ProgressRecord, LearningError> {
        self.repository.save(&progress)?;
        Ok(progress)
    }

    /// Position the learner on the first topic.
    pub fn start_learning(&self) -> Result<ProgressRecord, LearningError> {
        let current = self.repository.get();
        let next = self.operations.start_learning_session(&current)?;
        tracing::info!(
            module = next.current_module().unwrap_or_default(),
            topic = next.current_topic().unwrap_or_default(),
            "Started learning"
        );
        self.commit(next)
    }

    /// Jump to a topic. Rejected, with nothing saved, if the path is not in
    /// the catalog.
    pub fn select_topic(
        &self,
        module_id: &str,
        topic_id: &str,
    ) -> Result<ProgressRecord, LearningError> {
        let current = self.repository.get();
        let next = self.operations.move_to(&current, module_id, topic_id)?;
        tracing::debug!(module_id, topic_id, "Selected topic");
        self.commit(next)
    }

    pub fn complete_topic(&self, topic_id: &str) -> Result<ProgressRecord, LearningError> {
        let current = self.repository.get();
        let next = self.operations.complete_topic(&current, topic_id)?;
        tracing::info!(topic_id, "Completed topic");
        self.commit(next)
    }

    /// Complete whatever topic is currently selected.
    ///
    /// Returns `Ok(None)` without saving when there is no current position.
    pub fn complete_current_topic(&self) -> Result<Option<ProgressRecord>, LearningError> {
        let current = self.repository.get();
        let Some(topic_id) = current.current_topic().map(str::to_string) else {
            return Ok(None);
        };
        let next = self.operations.complete_topic(&current, &topic_id)?;
        tracing::info!(topic_id = %topic_id, "Completed current topic");
        self.commit(next).map(Some)
    }

    /// Save a note for a catalog topic. An empty note removes it.
    pub fn save_note(&self, topic_id: &str, note: &str) -> Result<ProgressRecord, LearningError> {
        let current = self.repository.get();
        let next = self.operations.save_note(&current, topic_id, note)?;
        self.commit(next)
    }

    /// Deleting is not catalog-checked, so notes on retired topics can be
    /// removed.
    pub fn delete_note(&self, topic_id: &str) -> Result<ProgressRecord, LearningError> {
        let current = self.repository.get();
        self.commit(current.without_note(topic_id))
    }

    /// Move forward one topic. Returns `false`, leaving the stored record
    /// untouched, at the end of the curriculum or without a position.
    pub fn navigate_next(&self) -> Result<bool, LearningError> {
        let current = self.repository.get();
        match self.operations.advance(&current) {
            Some(next) => {
                self.commit(next)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn navigate_previous(&self) -> Result<bool, LearningError> {
        let current = self.repository.get();
        match self.operations.retreat(&current) {
            Some(prev) => {
                self.commit(prev)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn overview(&self) -> ProgressOverview {
        let progress = self.repository.get();
        ProgressOverview {
            state: self.analytics.learning_state(&progress),
            overall_progress: self.analytics.calculate_overall_progress(&progress),
            statistics: self.analytics.learning_statistics(&progress),
            session_info: self.analytics.session_info(&progress),
            recommended: self.analytics.recommended_next_topic(&progress),
            progress: progress.to_serializable(),
        }
    }

    pub fn recommended_next_topic(&self) -> Option<TopicRef> {
        self.analytics
            .recommended_next_topic(&self.repository.get())
    }

    pub fn available_topics(&self) -> Vec<AvailableTopic> {
        self.analytics.available_topics(&self.repository.get())
    }

    pub fn reset_progress(&self) -> Result<(), LearningError> {
        self.repository.reset()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgressError;
    use crate::navigator::tests::two_module_navigator;
    use crate::store::{InMemoryStore, KvProgressRepository};

    fn service() -> LearningService<KvProgressRepository<InMemoryStore>> {
        LearningService::new(
            KvProgressRepository::new(InMemoryStore::new()),
            two_module_navigator(),
        )
    }

    #[test]
    fn start_persists_the_first_position() {
        let svc = service();
        svc.start_learning().unwrap();
        assert_eq!(svc.progress().current_position(), Some(("A", "a1")));
        assert!(svc.repository().exists());
    }

    #[test]
    fn invalid_selection_leaves_state_unchanged() {
        let svc = service();
        svc.start_learning().unwrap();

        let err = svc.select_topic("A", "b1").unwrap_err();
        assert!(matches!(
            err,
            LearningError::Progress(ProgressError::InvalidPath { .. })
        ));
        assert_eq!(svc.progress().current_position(), Some(("A", "a1")));
    }

    #[test]
    fn navigation_reports_boundaries() {
        let svc = service();
        assert!(!svc.navigate_next().unwrap());
        assert!(!svc.repository().exists());

        svc.select_topic("B", "b1").unwrap();
        assert!(!svc.navigate_next().unwrap());
        assert!(svc.navigate_previous().unwrap());
        assert_eq!(svc.progress().current_position(), Some(("A", "a2")));
    }

    #[test]
    fn complete_current_requires_a_position() {
        let svc = service();
        assert!(svc.complete_current_topic().unwrap().is_none());

        svc.start_learning().unwrap();
        let done = svc.complete_current_topic().unwrap().unwrap();
        assert!(done.is_topic_completed("a1"));
        assert_eq!(svc.recommended_next_topic(), Some(TopicRef::new("A", "a2")));
    }

    #[test]
    fn notes_round_trip_through_storage() {
        let svc = service();
        svc.save_note("a1", "<remember>").unwrap();
        assert_eq!(svc.progress().note_for_topic("a1"), "&lt;remember&gt;");

        svc.delete_note("a1").unwrap();
        assert_eq!(svc.progress().note_for_topic("a1"), "");
    }

    #[test]
    fn notes_for_unknown_topics_are_rejected() {
        let svc = service();
        let err = svc.save_note("no-such-topic", "hello").unwrap_err();
        assert!(matches!(
            err,
            LearningError::Progress(ProgressError::UnknownTopic(_))
        ));
        assert!(svc.progress().notes().is_empty());
        assert!(!svc.repository().exists());
    }

    #[test]
    fn overview_reflects_stored_progress() {
        let svc = service();
        svc.start_learning().unwrap();
        svc.complete_topic("a1").unwrap();

        let overview = svc.overview();
        assert_eq!(overview.state, LearningState::InProgress);
        assert_eq!(overview.overall_progress, 33);
        assert_eq!(overview.statistics.completed_topics, 1);
        assert!(overview.session_info.can_resume);
        assert_eq!(overview.recommended, Some(TopicRef::new("A", "a2")));
    }

    #[test]
    fn reset_returns_to_not_started() {
        let svc = service();
        svc.start_learning().unwrap();
        svc.reset_progress().unwrap();
        assert_eq!(svc.overview().state, LearningState::NotStarted);
    }
}
