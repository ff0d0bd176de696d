use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use super::module::{Module, ModuleDefinition};
use crate::error::ValidationError;

const BUILTIN_CURRICULUM: &str = include_str!("../../curriculum/jvm.json");

/// The full, ordered curriculum.
///
/// Built once at startup and never mutated. Module ids and topic ids are
/// unique across the whole catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    modules: Vec<Module>,
}

impl Catalog {
    pub fn new(modules: Vec<Module>) -> Result<Self, ValidationError> {
        if modules.is_empty() {
            return Err(ValidationError::EmptyCatalog);
        }

        let mut module_ids = HashSet::new();
        let mut topic_ids = HashSet::new();
        for module in &modules {
            if !module_ids.insert(module.id()) {
                return Err(ValidationError::DuplicateModuleId(module.id().to_string()));
            }
            for topic in module.topics() {
                if !topic_ids.insert(topic.id()) {
                    return Err(ValidationError::DuplicateTopicId(topic.id().to_string()));
                }
            }
        }

        Ok(Self { modules })
    }

    pub fn from_definitions(defs: Vec<ModuleDefinition>) -> Result<Self, ValidationError> {
        let modules = defs
            .into_iter()
            .map(Module::create)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(modules)
    }

    /// Parse a JSON array of module definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<ModuleDefinition> =
            serde_json::from_str(json).context("Failed to parse curriculum")?;
        Ok(Self::from_definitions(defs)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read curriculum from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid curriculum in {}", path.display()))
    }

    /// The curriculum bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CURRICULUM)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, TopicDefinition};

    fn topic(id: &str) -> TopicDefinition {
        TopicDefinition {
            id: id.into(),
            title: id.into(),
            description: "desc".into(),
            content: "content".into(),
            code_example: None,
            duration: 10,
        }
    }

    fn module(id: &str, topics: &[&str]) -> ModuleDefinition {
        ModuleDefinition {
            id: id.into(),
            title: id.into(),
            description: "desc".into(),
            difficulty: Difficulty::Beginner,
            estimated_hours: 1.0,
            topics: topics.iter().map(|t| topic(t)).collect(),
        }
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(
            Catalog::from_definitions(vec![]).unwrap_err(),
            ValidationError::EmptyCatalog
        );
    }

    #[test]
    fn rejects_duplicate_module_ids() {
        let err = Catalog::from_definitions(vec![module("A", &["a1"]), module("A", &["a2"])])
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateModuleId("A".into()));
    }

    #[test]
    fn rejects_topic_ids_duplicated_across_modules() {
        let err = Catalog::from_definitions(vec![module("A", &["x"]), module("B", &["x"])])
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateTopicId("x".into()));
    }

    #[test]
    fn builtin_curriculum_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.modules().len(), 4);
        assert_eq!(catalog.modules()[0].id(), "jvm-overview");
    }

    #[test]
    fn from_json_reports_validation_failures() {
        let json = r#"[{
            "id": "A", "title": "A", "description": "d",
            "difficulty": "beginner", "estimated_hours": 1, "topics": []
        }]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("at least one topic"));
    }
}
