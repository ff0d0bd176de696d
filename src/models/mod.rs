//! Domain models for learnpath.
//!
//! # Core Concepts
//!
//! ## Reference Data
//!
//! - [`Catalog`]: The ordered curriculum, validated once at startup.
//! - [`Module`]: An ordered group of topics with a [`Difficulty`].
//! - [`Topic`]: A single unit of content with a duration in minutes.
//!
//! ## Learner State
//!
//! - [`ProgressRecord`]: Completed topics, current position, notes and last
//!   access time. Immutable; every change yields a new record.
//! - [`StoredProgress`]: The persisted form of a record.

mod catalog;
mod module;
mod progress;
mod topic;

pub use catalog::*;
pub use module::*;
pub use progress::*;
pub use topic::*;
