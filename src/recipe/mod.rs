//! Recipe Definition Module
//!
//! Provides data structures and utilities for defining, decoding and
//! validating recipes, the step function registry, and the execution
//! state that makes a recipe resumable.
//!
//! # Structure
//!
//! - [`model`]: Definitions and bound steps
//! - [`parser`]: YAML decoding and loading
//! - [`validator`]: Format tag checks and lint warnings
//! - [`registry`]: Step functions and the name to function map
//! - [`state`]: Execution log and state files

pub mod model;
pub mod parser;
pub mod registry;
pub mod state;
pub mod validator;

pub use model::{RecipeDefinition, Step, StepDefinition, RECIPE_KIND, STEP_KIND};
pub use parser::{load_definition, parse_definition, read_definition};
pub use registry::{StepError, StepFunc, StepFuncMap};
pub use state::{Action, State};
pub use validator::validate_definition;
