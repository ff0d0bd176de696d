//! Statistics derived from the catalog and a progress record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ProgressRecord;
use crate::navigator::{CurriculumNavigator, TopicRef};

/// Where a learner is in the overall flow. Derived on read, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    NotStarted,
    InProgress,
    Complete,
}

impl LearningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStatistics {
    pub total_topics: usize,
    pub completed_topics: usize,
    pub remaining_topics: usize,
    /// Percentage, 0-100.
    pub completion_rate: u32,
    /// Hours left across uncompleted topics, one decimal place.
    pub estimated_remaining_hours: f64,
    pub total_notes: usize,
}

/// Titles of the current position, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTitles {
    pub module_title: String,
    pub topic_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub can_resume: bool,
    pub last_accessed_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_position: Option<PositionTitles>,
}

/// A topic the learner can open, flagged with its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableTopic {
    pub module_id: String,
    pub topic_id: String,
    pub title: String,
    pub is_recommended: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressAnalytics {
    navigator: CurriculumNavigator,
}

impl ProgressAnalytics {
    pub fn new(navigator: CurriculumNavigator) -> Self {
        Self { navigator }
    }

    /// Completed topics that exist in the catalog. Stale ids left over from an
    /// older curriculum are ignored.
    fn completed_in_catalog(&self, progress: &ProgressRecord) -> usize {
        self.navigator
            .topics_in_order()
            .filter(|loc| progress.is_topic_completed(loc.topic.id()))
            .count()
    }

    pub fn calculate_overall_progress(&self, progress: &ProgressRecord) -> u32 {
        let total = self.navigator.total_topic_count();
        if total == 0 {
            return 0;
        }
        percentage(self.completed_in_catalog(progress), total)
    }

    /// Zero for unknown modules.
    pub fn calculate_module_progress(&self, progress: &ProgressRecord, module_id: &str) -> u32 {
        self.navigator
            .module_by_id(module_id)
            .map(|m| m.calculate_progress(progress.completed_topics()).round() as u32)
            .unwrap_or(0)
    }

    /// Where the learner should continue.
    ///
    /// A completed current topic points to the next one, an unfinished one is
    /// resumed in place, and without a position the first topic is suggested.
    pub fn recommended_next_topic(&self, progress: &ProgressRecord) -> Option<TopicRef> {
        match progress.current_position() {
            Some((module_id, topic_id)) if progress.is_topic_completed(topic_id) => {
                self.navigator.next_topic(module_id, topic_id)
            }
            Some((module_id, topic_id)) => Some(TopicRef::new(module_id, topic_id)),
            None => self.navigator.first_topic(),
        }
    }

    pub fn learning_statistics(&self, progress: &ProgressRecord) -> LearningStatistics {
        let total_topics = self.navigator.total_topic_count();
        let completed_topics = self.completed_in_catalog(progress);

        let remaining_minutes: u64 = self
            .navigator
            .topics_in_order()
            .filter(|loc| !progress.is_topic_completed(loc.topic.id()))
            .map(|loc| u64::from(loc.topic.duration()))
            .sum();
        let remaining_hours = remaining_minutes as f64 / 60.0;

        LearningStatistics {
            total_topics,
            completed_topics,
            remaining_topics: total_topics - completed_topics,
            completion_rate: self.calculate_overall_progress(progress),
            estimated_remaining_hours: (remaining_hours * 10.0).round() / 10.0,
            total_notes: progress.notes().len(),
        }
    }

    pub fn session_info(&self, progress: &ProgressRecord) -> SessionInfo {
        self.session_info_at(progress, Utc::now())
    }

    pub fn session_info_at(&self, progress: &ProgressRecord, now: DateTime<Utc>) -> SessionInfo {
        let current_position = progress
            .current_position()
            .and_then(|(_, topic_id)| self.navigator.find_topic_by_id(topic_id))
            .map(|loc| PositionTitles {
                module_title: loc.module.title().to_string(),
                topic_title: loc.topic.title().to_string(),
            });

        SessionInfo {
            can_resume: progress.has_started(),
            last_accessed_formatted: format_last_accessed(progress.last_accessed(), now),
            current_position,
        }
    }

    pub fn available_topics(&self, progress: &ProgressRecord) -> Vec<AvailableTopic> {
        let recommended = self.recommended_next_topic(progress);

        self.navigator
            .topics_in_order()
            .map(|loc| AvailableTopic {
                module_id: loc.module.id().to_string(),
                topic_id: loc.topic.id().to_string(),
                title: loc.topic.title().to_string(),
                is_recommended: recommended.as_ref().is_some_and(|r| {
                    r.module_id == loc.module.id() && r.topic_id == loc.topic.id()
                }),
                is_completed: progress.is_topic_completed(loc.topic.id()),
            })
            .collect()
    }

    pub fn learning_state(&self, progress: &ProgressRecord) -> LearningState {
        let total = self.navigator.total_topic_count();
        if total > 0 && self.completed_in_catalog(progress) == total {
            LearningState::Complete
        } else if progress.has_started() {
            LearningState::InProgress
        } else {
            LearningState::NotStarted
        }
    }
}

fn percentage(part: usize, whole: usize) -> u32 {
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// Render a timestamp relative to `now` in whole elapsed days.
pub fn format_last_accessed(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - date).num_days() {
        d if d <= 0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::tests::two_module_navigator;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn analytics() -> ProgressAnalytics {
        ProgressAnalytics::new(two_module_navigator())
    }

    fn completed(ids: &[&str]) -> ProgressRecord {
        ids.iter().fold(ProgressRecord::new(), |p, id| {
            p.with_completed_topic(id).unwrap()
        })
    }

    #[test]
    fn overall_progress_is_monotonic_and_bounded() {
        let a = analytics();
        let mut progress = ProgressRecord::new();
        let mut last = a.calculate_overall_progress(&progress);
        assert_eq!(last, 0);

        for id in ["a1", "stale-id", "a2", "b1", "a1"] {
            progress = progress.with_completed_topic(id).unwrap();
            let now = a.calculate_overall_progress(&progress);
            assert!(now >= last);
            assert!(now <= 100);
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn overall_progress_rounds() {
        assert_eq!(analytics().calculate_overall_progress(&completed(&["a1"])), 33);
        assert_eq!(analytics().calculate_overall_progress(&completed(&["a1", "a2"])), 67);
    }

    #[test]
    fn module_progress() {
        let a = analytics();
        let p = completed(&["a1"]);
        assert_eq!(a.calculate_module_progress(&p, "A"), 50);
        assert_eq!(a.calculate_module_progress(&p, "B"), 0);
        assert_eq!(a.calculate_module_progress(&p, "nope"), 0);
    }

    #[test]
    fn recommends_first_topic_before_starting() {
        assert_eq!(
            analytics().recommended_next_topic(&ProgressRecord::new()),
            Some(TopicRef::new("A", "a1"))
        );
    }

    #[test]
    fn recommends_resuming_an_unfinished_topic() {
        let p = ProgressRecord::new().with_current_position("A", "a2").unwrap();
        assert_eq!(
            analytics().recommended_next_topic(&p),
            Some(TopicRef::new("A", "a2"))
        );
    }

    #[test]
    fn recommends_the_next_topic_after_completion() {
        let p = ProgressRecord::new()
            .with_current_position("A", "a1")
            .unwrap()
            .with_completed_topic("a1")
            .unwrap();
        assert_eq!(
            analytics().recommended_next_topic(&p),
            Some(TopicRef::new("A", "a2"))
        );

        let finished = ProgressRecord::new()
            .with_current_position("B", "b1")
            .unwrap()
            .with_completed_topic("b1")
            .unwrap();
        assert_eq!(analytics().recommended_next_topic(&finished), None);
    }

    #[test]
    fn statistics() {
        let p = completed(&["a2"]).with_note("a1", "hi").unwrap();
        let stats = analytics().learning_statistics(&p);
        assert_eq!(
            stats,
            LearningStatistics {
                total_topics: 3,
                completed_topics: 1,
                remaining_topics: 2,
                completion_rate: 33,
                estimated_remaining_hours: 1.5,
                total_notes: 1,
            }
        );
    }

    #[test]
    fn remaining_hours_round_to_one_decimal() {
        // a2 (45) + b1 (60) = 105 minutes = 1.75 hours
        let stats = analytics().learning_statistics(&completed(&["a1"]));
        assert_eq!(stats.estimated_remaining_hours, 1.8);
    }

    #[test]
    fn relative_dates() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(format_last_accessed(now - Duration::hours(3), now), "today");
        assert_eq!(format_last_accessed(now - Duration::hours(30), now), "yesterday");
        assert_eq!(format_last_accessed(now - Duration::days(4), now), "4 days ago");
        assert_eq!(format_last_accessed(now - Duration::days(10), now), "2026-02-28");
        assert_eq!(format_last_accessed(now + Duration::hours(1), now), "today");
    }

    #[test]
    fn session_info_resolves_titles() {
        let now = Utc::now();
        let p = ProgressRecord::from_parts(
            Vec::new(),
            Some("B".into()),
            Some("b1".into()),
            BTreeMap::new(),
            now - Duration::days(1),
        )
        .unwrap();

        let info = analytics().session_info_at(&p, now);
        assert!(info.can_resume);
        assert_eq!(info.last_accessed_formatted, "yesterday");
        assert_eq!(
            info.current_position,
            Some(PositionTitles {
                module_title: "Module B".into(),
                topic_title: "Title b1".into(),
            })
        );

        let fresh = analytics().session_info(&ProgressRecord::new());
        assert!(!fresh.can_resume);
        assert!(fresh.current_position.is_none());
    }

    #[test]
    fn available_topics_flag_recommendation() {
        let p = ProgressRecord::new()
            .with_current_position("A", "a1")
            .unwrap()
            .with_completed_topic("a1")
            .unwrap();
        let topics = analytics().available_topics(&p);

        assert_eq!(topics.len(), 3);
        assert!(topics[0].is_completed && !topics[0].is_recommended);
        assert!(topics[1].is_recommended && !topics[1].is_completed);
        assert!(!topics[2].is_recommended);
    }

    #[test]
    fn learning_state_is_derived() {
        let a = analytics();
        assert_eq!(a.learning_state(&ProgressRecord::new()), LearningState::NotStarted);

        let started = ProgressRecord::new().with_current_position("A", "a1").unwrap();
        assert_eq!(a.learning_state(&started), LearningState::InProgress);

        let done = ["a1", "a2", "b1"]
            .iter()
            .fold(started, |p, id| p.with_completed_topic(id).unwrap());
        assert_eq!(a.learning_state(&done), LearningState::Complete);
    }

    #[test]
    fn remaining_hours_with_very_long_topics() {
        use crate::models::{Catalog, Difficulty, ModuleDefinition, TopicDefinition};

        let topic = |id: &str| TopicDefinition {
            id: id.into(),
            title: id.into(),
            description: "desc".into(),
            content: "content".into(),
            code_example: None,
            duration: 3_000_000_000,
        };
        let catalog = Catalog::from_definitions(vec![ModuleDefinition {
            id: "long".into(),
            title: "Long".into(),
            description: "desc".into(),
            difficulty: Difficulty::Advanced,
            estimated_hours: 1.0,
            topics: vec![topic("t1"), topic("t2")],
        }])
        .unwrap();

        let stats = ProgressAnalytics::new(CurriculumNavigator::new(catalog))
            .learning_statistics(&ProgressRecord::new());
        assert_eq!(stats.estimated_remaining_hours, 100_000_000.0);
    }
}
