use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::sanitize::escape_text;

/// A single unit of learning content.
///
/// Topics are immutable once constructed. Ids are unique across the whole
/// catalog, which is enforced by [`super::Catalog`].
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    id: String,
    title: String,
    description: String,
    content: String,
    code_example: Option<String>,
    /// Minutes.
    duration: u32,
}

/// Raw topic data as authored in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub code_example: Option<String>,
    /// Minutes. Signed so that authoring mistakes surface as validation errors.
    pub duration: i64,
}

impl Topic {
    pub fn create(def: TopicDefinition) -> Result<Self, ValidationError> {
        require("Topic", "ID", &def.id)?;
        require("Topic", "title", &def.title)?;
        require("Topic", "description", &def.description)?;
        require("Topic", "content", &def.content)?;
        let duration = u32::try_from(def.duration)
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ValidationError::NonPositive {
                entity: "Topic",
                field: "duration",
            })?;

        Ok(Self {
            id: def.id,
            title: def.title,
            description: def.description,
            content: def.content,
            code_example: def.code_example,
            duration,
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

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn code_example(&self) -> Option<&str> {
        self.code_example.as_deref()
    }

    /// Duration in minutes.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Content with markup metacharacters escaped.
    pub fn safe_content(&self) -> String {
        escape_text(&self.content)
    }

    pub fn safe_code_example(&self) -> Option<String> {
        self.code_example.as_deref().map(escape_text)
    }
}

pub(crate) fn require(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> TopicDefinition {
        TopicDefinition {
            id: "heap".into(),
            title: "Heap".into(),
            description: "Where objects live".into(),
            content: "Objects are <allocated> here".into(),
            code_example: Some("new Object();".into()),
            duration: 25,
        }
    }

    #[test]
    fn creates_a_valid_topic() {
        let topic = Topic::create(definition()).unwrap();
        assert_eq!(topic.id(), "heap");
        assert_eq!(topic.duration(), 25);
        assert_eq!(topic.code_example(), Some("new Object();"));
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut def = definition();
        def.title = "   ".into();
        assert_eq!(
            Topic::create(def).unwrap_err(),
            ValidationError::MissingField {
                entity: "Topic",
                field: "title"
            }
        );
    }

    #[test]
    fn rejects_non_positive_duration() {
        for duration in [0, -5] {
            let mut def = definition();
            def.duration = duration;
            assert!(matches!(
                Topic::create(def),
                Err(ValidationError::NonPositive { field: "duration", .. })
            ));
        }
    }

    #[test]
    fn safe_content_escapes_markup() {
        let topic = Topic::create(definition()).unwrap();
        assert_eq!(topic.safe_content(), "Objects are &lt;allocated&gt; here");
    }
}
