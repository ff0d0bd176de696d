mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::learning::LearningService;
use crate::store::ProgressRepository;

pub use handlers::{
    CatalogStats, CompleteTopicInput, ModuleDetail, ModuleSummary, NoteInput, PositionInput,
    TopicDetail, TopicSummary,
};

/// The learning service as shared router state.
pub type SharedLearning = Arc<LearningService<Box<dyn ProgressRepository>>>;

pub fn create_router(service: LearningService<Box<dyn ProgressRepository>>) -> Router {
    let api = Router::new()
        // Catalog
        .route("/modules", get(handlers::list_modules))
        .route("/modules/{id}", get(handlers::get_module))
        .route("/topics", get(handlers::list_available_topics))
        .route("/topics/{id}", get(handlers::get_topic))
        .route("/catalog/stats", get(handlers::catalog_stats))
        // Progress
        .route("/progress", get(handlers::get_progress))
        .route("/progress", delete(handlers::reset_progress))
        .route("/progress/start", post(handlers::start_learning))
        .route("/progress/position", put(handlers::select_topic))
        .route("/progress/next", post(handlers::navigate_next))
        .route("/progress/previous", post(handlers::navigate_previous))
        .route("/progress/completed", post(handlers::complete_topic))
        .route("/recommendation", get(handlers::get_recommendation))
        // Notes
        .route("/notes/{topic_id}", put(handlers::save_note))
        .route("/notes/{topic_id}", delete(handlers::delete_note))
        // Health
        .route("/health", get(handlers::health));

    let state: SharedLearning = Arc::new(service);

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
