//! Recipe Execution Module
//!
//! Provides the engine that cooks a recipe: sequential step execution,
//! execution logging, and resuming from a previous run's state.
//!
//! # Architecture
//!
//! - [`engine`]: Recipe construction and the cook loop
//! - [`resume`]: Resume point computation from a previous state
//! - [`step`]: Individual step execution and action recording

pub mod engine;
pub mod resume;
pub mod step;

pub use engine::{with_state, Recipe, RecipeOption};
pub use resume::ResumePoint;
