//! Read-only traversal of the curriculum.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Catalog, Difficulty, Module, Topic};

/// A (module, topic) position in the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRef {
    pub module_id: String,
    pub topic_id: String,
}

impl TopicRef {
    pub fn new(module_id: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            topic_id: topic_id.into(),
        }
    }

    fn of(module: &Module, topic: &Topic) -> Self {
        Self::new(module.id(), topic.id())
    }
}

/// A topic together with the module that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TopicLocation<'a> {
    pub module: &'a Module,
    pub topic: &'a Topic,
}

/// Number of modules per difficulty level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub beginner: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

impl DifficultyCounts {
    pub fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }
}

/// Queries over a shared [`Catalog`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CurriculumNavigator {
    catalog: Arc<Catalog>,
}

impl CurriculumNavigator {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn modules(&self) -> &[Module] {
        self.catalog.modules()
    }

    pub fn module_by_id(&self, module_id: &str) -> Option<&Module> {
        self.modules().iter().find(|m| m.id() == module_id)
    }

    fn module_index(&self, module_id: &str) -> Option<usize> {
        self.modules().iter().position(|m| m.id() == module_id)
    }

    /// Scan modules in catalog order for the topic.
    pub fn find_topic_by_id(&self, topic_id: &str) -> Option<TopicLocation<'_>> {
        self.modules().iter().find_map(|module| {
            module
                .topic_by_id(topic_id)
                .map(|topic| TopicLocation { module, topic })
        })
    }

    /// The topic after the given one, crossing into the next module when
    /// `topic_id` is the last topic of its module.
    ///
    /// Returns `None` at the end of the curriculum or when the position does
    /// not exist in the catalog.
    pub fn next_topic(&self, module_id: &str, topic_id: &str) -> Option<TopicRef> {
        let idx = self.module_index(module_id)?;
        let module = &self.modules()[idx];
        module.topic_index(topic_id)?;

        if let Some(next) = module.next_topic(topic_id) {
            return Some(TopicRef::of(module, next));
        }

        let next_module = self.modules().get(idx + 1)?;
        next_module
            .first_topic()
            .map(|topic| TopicRef::of(next_module, topic))
    }

    /// Mirror of [`Self::next_topic`].
    pub fn previous_topic(&self, module_id: &str, topic_id: &str) -> Option<TopicRef> {
        let idx = self.module_index(module_id)?;
        let module = &self.modules()[idx];
        module.topic_index(topic_id)?;

        if let Some(prev) = module.previous_topic(topic_id) {
            return Some(TopicRef::of(module, prev));
        }

        let prev_module = self.modules().get(idx.checked_sub(1)?)?;
        prev_module
            .last_topic()
            .map(|topic| TopicRef::of(prev_module, topic))
    }

    pub fn first_topic(&self) -> Option<TopicRef> {
        let module = self.modules().first()?;
        module.first_topic().map(|topic| TopicRef::of(module, topic))
    }

    pub fn last_topic(&self) -> Option<TopicRef> {
        let module = self.modules().last()?;
        module.last_topic().map(|topic| TopicRef::of(module, topic))
    }

    /// True iff the module exists and contains the topic.
    pub fn validate_learning_path(&self, module_id: &str, topic_id: &str) -> bool {
        self.module_by_id(module_id)
            .and_then(|m| m.topic_by_id(topic_id))
            .is_some()
    }

    pub fn total_topic_count(&self) -> usize {
        self.modules().iter().map(|m| m.topics().len()).sum()
    }

    pub fn total_estimated_hours(&self) -> f64 {
        self.modules().iter().map(Module::estimated_hours).sum()
    }

    pub fn module_count_by_difficulty(&self) -> DifficultyCounts {
        self.modules()
            .iter()
            .fold(DifficultyCounts::default(), |mut counts, m| {
                match m.difficulty() {
                    Difficulty::Beginner => counts.beginner += 1,
                    Difficulty::Intermediate => counts.intermediate += 1,
                    Difficulty::Advanced => counts.advanced += 1,
                }
                counts
            })
    }

    /// Every topic in traversal order.
    pub fn topics_in_order(&self) -> impl Iterator<Item = TopicLocation<'_>> {
        self.modules()
            .iter()
            .flat_map(|module| {
                module
                    .topics()
                    .iter()
                    .map(move |topic| TopicLocation { module, topic })
            })
    }
}
