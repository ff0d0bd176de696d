use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::topic::{require, Topic, TopicDefinition};
use crate::error::ValidationError;

/// An ordered group of topics. Topic order defines traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    id: String,
    title: String,
    description: String,
    topics: Vec<Topic>,
    difficulty: Difficulty,
    estimated_hours: f64,
}

/// The difficulty level of a module.
///
/// - `Beginner`: No prior knowledge assumed
/// - `Intermediate`: Builds on the beginner modules
/// - `Advanced`: Tuning and internals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Raw module data as authored in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_hours: f64,
    pub topics: Vec<TopicDefinition>,
}

impl Module {
    pub fn create(def: ModuleDefinition) -> Result<Self, ValidationError> {
        require("Module", "ID", &def.id)?;
        require("Module", "title", &def.title)?;
        require("Module", "description", &def.description)?;
        if def.topics.is_empty() {
            return Err(ValidationError::EmptyModule(def.id));
        }
        if !(def.estimated_hours > 0.0) {
            return Err(ValidationError::NonPositive {
                entity: "Module",
                field: "estimated hours",
            });
        }

        let topics = def
            .topics
            .into_iter()
            .map(Topic::create)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: def.id,
            title: def.title,
            description: def.description,
            topics,
            difficulty: def.difficulty,
            estimated_hours: def.estimated_hours,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn estimated_hours(&self) -> f64 {
        self.estimated_hours
    }

    pub fn topic_by_id(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id() == topic_id)
    }

    pub fn topic_index(&self, topic_id: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.id() == topic_id)
    }

    /// The topic after `topic_id` within this module.
    pub fn next_topic(&self, topic_id: &str) -> Option<&Topic> {
        let idx = self.topic_index(topic_id)?;
        self.topics.get(idx + 1)
    }

    /// The topic before `topic_id` within this module.
    pub fn previous_topic(&self, topic_id: &str) -> Option<&Topic> {
        let idx = self.topic_index(topic_id)?;
        idx.checked_sub(1).and_then(|i| self.topics.get(i))
    }

    pub fn first_topic(&self) -> Option<&Topic> {
        self.topics.first()
    }

    pub fn last_topic(&self) -> Option<&Topic> {
        self.topics.last()
    }

    /// Sum of topic durations in minutes.
    pub fn total_duration(&self) -> u64 {
        self.topics.iter().map(|t| u64::from(t.duration())).sum()
    }

    /// Unrounded percentage of this module's topics present in `completed`.
    pub fn calculate_progress(&self, completed: &BTreeSet<String>) -> f64 {
        let done = self
            .topics
            .iter()
            .filter(|t| completed.contains(t.id()))
            .count();
        done as f64 / self.topics.len() as f64 * 100.0
    }
}
