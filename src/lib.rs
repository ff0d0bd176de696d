//! Curriculum navigation and learning progress tracking.
//!
//! A fixed [`models::Catalog`] of modules and topics is traversed with a
//! [`navigator::CurriculumNavigator`]. A learner's state is an immutable
//! [`models::ProgressRecord`], changed through [`operations::ProgressService`]
//! and summarized by [`analytics::ProgressAnalytics`]. Records are persisted
//! through a [`store::ProgressRepository`]; [`learning::LearningService`] ties
//! these together for the CLI and the HTTP API.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod learning;
pub mod models;
pub mod navigator;
pub mod operations;
pub mod sanitize;
pub mod store;
