use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::SharedLearning;
use crate::analytics::AvailableTopic;
use crate::error::{LearningError, ProgressError};
use crate::learning::ProgressOverview;
use crate::models::{Difficulty, ProgressRecord, StoredProgress, Topic};
use crate::navigator::{DifficultyCounts, TopicRef};

type ApiError = (StatusCode, String);

// ============================================================
// Error Handling
// ============================================================

/// Map a rejected operation to a client error, and a storage failure to a
/// sanitized 500. Storage details are only logged.
fn learning_error(e: LearningError) -> ApiError {
    match e {
        LearningError::Progress(e) => progress_error(e),
        LearningError::Persistence(e) => {
            tracing::error!("Persistence error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.summary().to_string())
        }
    }
}

fn progress_error(e: ProgressError) -> ApiError {
    let status = match &e {
        ProgressError::InvalidArgument(_) | ProgressError::InvalidPath { .. } => {
            StatusCode::BAD_REQUEST
        }
        ProgressError::UnknownTopic(_) => StatusCode::NOT_FOUND,
        ProgressError::NoContentAvailable => StatusCode::CONFLICT,
    };
    tracing::warn!("Rejected progress operation: {}", e);
    (status, e.to_string())
}

// ============================================================
// Request / Response Types
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_hours: f64,
    pub topic_count: usize,
    /// Percentage of this module's topics completed.
    pub progress: u32,
}

/// A topic as listed inside a module, text escaped for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub code_example: Option<String>,
    pub duration: u32,
    pub completed: bool,
}

impl TopicSummary {
    fn new(topic: &Topic, progress: &ProgressRecord) -> Self {
        Self {
            id: topic.id().to_string(),
            title: topic.title().to_string(),
            description: topic.description().to_string(),
            content: topic.safe_content(),
            code_example: topic.safe_code_example(),
            duration: topic.duration(),
            completed: progress.is_topic_completed(topic.id()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_hours: f64,
    pub progress: u32,
    pub topics: Vec<TopicSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDetail {
    pub module_id: String,
    pub module_title: String,
    pub id: String,
    pub title: String,
    pub description: String,
    /// Content with markup metacharacters escaped.
    pub content: String,
    pub code_example: Option<String>,
    pub duration: u32,
    pub completed: bool,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_topics: usize,
    pub total_estimated_hours: f64,
    pub modules_by_difficulty: DifficultyCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInput {
    pub module_id: String,
    pub topic_id: String,
}

/// Omitting `topic_id` completes the current topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteTopicInput {
    #[serde(default)]
    pub topic_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    pub note: String,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Catalog
// ============================================================

pub async fn list_modules(State(svc): State<SharedLearning>) -> Json<Vec<ModuleSummary>> {
    let progress = svc.progress();
    let modules = svc
        .navigator()
        .modules()
        .iter()
        .map(|m| ModuleSummary {
            id: m.id().to_string(),
            title: m.title().to_string(),
            description: m.description().to_string(),
            difficulty: m.difficulty(),
            estimated_hours: m.estimated_hours(),
            topic_count: m.topics().len(),
            progress: svc.analytics().calculate_module_progress(&progress, m.id()),
        })
        .collect();
    Json(modules)
}

pub async fn get_module(
    State(svc): State<SharedLearning>,
    Path(id): Path<String>,
) -> Result<Json<ModuleDetail>, ApiError> {
    let module = svc
        .navigator()
        .module_by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, "Module not found".to_string()))?;
    let progress = svc.progress();

    Ok(Json(ModuleDetail {
        id: module.id().to_string(),
        title: module.title().to_string(),
        description: module.description().to_string(),
        difficulty: module.difficulty(),
        estimated_hours: module.estimated_hours(),
        progress: svc.analytics().calculate_module_progress(&progress, module.id()),
        topics: module
            .topics()
            .iter()
            .map(|t| TopicSummary::new(t, &progress))
            .collect(),
    }))
}

pub async fn get_topic(
    State(svc): State<SharedLearning>,
    Path(id): Path<String>,
) -> Result<Json<TopicDetail>, ApiError> {
    let loc = svc
        .navigator()
        .find_topic_by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, "Topic not found".to_string()))?;
    let progress = svc.progress();

    Ok(Json(TopicDetail {
        module_id: loc.module.id().to_string(),
        module_title: loc.module.title().to_string(),
        id: loc.topic.id().to_string(),
        title: loc.topic.title().to_string(),
        description: loc.topic.description().to_string(),
        content: loc.topic.safe_content(),
        code_example: loc.topic.safe_code_example(),
        duration: loc.topic.duration(),
        completed: progress.is_topic_completed(&id),
        note: progress.note_for_topic(&id).to_string(),
    }))
}

pub async fn list_available_topics(
    State(svc): State<SharedLearning>,
) -> Json<Vec<AvailableTopic>> {
    Json(svc.available_topics())
}

pub async fn catalog_stats(State(svc): State<SharedLearning>) -> Json<CatalogStats> {
    let nav = svc.navigator();
    Json(CatalogStats {
        total_topics: nav.total_topic_count(),
        total_estimated_hours: nav.total_estimated_hours(),
        modules_by_difficulty: nav.module_count_by_difficulty(),
    })
}

// ============================================================
// Progress
// ============================================================

pub async fn get_progress(State(svc): State<SharedLearning>) -> Json<ProgressOverview> {
    Json(svc.overview())
}

pub async fn reset_progress(
    State(svc): State<SharedLearning>,
) -> Result<StatusCode, ApiError> {
    svc.reset_progress().map_err(learning_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_learning(
    State(svc): State<SharedLearning>,
) -> Result<Json<StoredProgress>, ApiError> {
    svc.start_learning()
        .map(|p| Json(p.to_serializable()))
        .map_err(learning_error)
}

pub async fn select_topic(
    State(svc): State<SharedLearning>,
    Json(input): Json<PositionInput>,
) -> Result<Json<StoredProgress>, ApiError> {
    svc.select_topic(&input.module_id, &input.topic_id)
        .map(|p| Json(p.to_serializable()))
        .map_err(learning_error)
}

pub async fn navigate_next(
    State(svc): State<SharedLearning>,
) -> Result<Json<StoredProgress>, ApiError> {
    if svc.navigate_next().map_err(learning_error)? {
        Ok(Json(svc.progress().to_serializable()))
    } else {
        Err((StatusCode::CONFLICT, "No next topic".to_string()))
    }
}

pub async fn navigate_previous(
    State(svc): State<SharedLearning>,
) -> Result<Json<StoredProgress>, ApiError> {
    if svc.navigate_previous().map_err(learning_error)? {
        Ok(Json(svc.progress().to_serializable()))
    } else {
        Err((StatusCode::CONFLICT, "No previous topic".to_string()))
    }
}

pub async fn complete_topic(
    State(svc): State<SharedLearning>,
    Json(input): Json<CompleteTopicInput>,
) -> Result<Json<StoredProgress>, ApiError> {
    let progress = match input.topic_id {
        Some(topic_id) => svc.complete_topic(&topic_id).map_err(learning_error)?,
        None => svc
            .complete_current_topic()
            .map_err(learning_error)?
            .ok_or((StatusCode::CONFLICT, "No topic selected".to_string()))?,
    };
    Ok(Json(progress.to_serializable()))
}

pub async fn get_recommendation(State(svc): State<SharedLearning>) -> Json<Option<TopicRef>> {
    Json(svc.recommended_next_topic())
}

// ============================================================
// Notes
// ============================================================

pub async fn save_note(
    State(svc): State<SharedLearning>,
    Path(topic_id): Path<String>,
    Json(input): Json<NoteInput>,
) -> Result<Json<StoredProgress>, ApiError> {
    svc.save_note(&topic_id, &input.note)
        .map(|p| Json(p.to_serializable()))
        .map_err(learning_error)
}

pub async fn delete_note(
    State(svc): State<SharedLearning>,
    Path(topic_id): Path<String>,
) -> Result<Json<StoredProgress>, ApiError> {
    svc.delete_note(&topic_id)
        .map(|p| Json(p.to_serializable()))
        .map_err(learning_error)
}
