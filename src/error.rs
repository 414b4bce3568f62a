//! Error Types
//!
//! Errors surfaced while building a recipe, cooking it, or persisting
//! its execution state.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::recipe::registry::StepError;

/// Errors returned by recipe construction, execution and state persistence.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The definition declares a recipe format tag this crate does not read.
    #[error("unsupported recipe kind: {0:?}")]
    UnsupportedRecipeKind(String),

    /// A step declares a step format tag this crate does not read.
    #[error("unsupported step kind: {kind:?} (step '{name}')")]
    UnsupportedStepKind { name: String, kind: String },

    /// The definition could not be decoded.
    #[error("failed to decode recipe definition: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// Reading the definition or the initial input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A step function failed. The step's own message is kept as-is.
    #[error(transparent)]
    Step(#[from] StepError),

    #[error("state file '{}': {source}", path.display())]
    StateIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("state file '{}' is malformed: {source}", path.display())]
    StateFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RecipeError {
    /// Returns true for either format-tag rejection.
    pub fn is_unsupported_kind(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedRecipeKind(_) | Self::UnsupportedStepKind { .. }
        )
    }
}

/// Result alias used across the crate.
pub type Result<T, E = RecipeError> = std::result::Result<T, E>;
