//! doit - Resumable Step Pipelines
//!
//! Runs a recipe, an ordered list of named steps declared in YAML, by
//! feeding each step's output to the next. Every step that runs is
//! logged, so a run that fails part way can be saved and resumed from
//! the failed step instead of starting over.
//!
//! # Architecture
//!
//! The library is organized into three main modules:
//!
//! - [`recipe`]: Definitions, decoding, validation, step registry and state
//! - [`execution`]: Recipe construction, the cook loop and resuming
//! - [`steps`]: Built-in step functions and embedded recipes
//!
//! # Example
//!
//! ```rust,no_run
//! use doit::{with_state, Recipe, State, StepFuncMap};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = StepFuncMap::new()
//!         .with("Lower", |input: &[u8]| Ok(input.to_ascii_lowercase()));
//!
//!     let definition = std::fs::read_to_string("recipe.yaml")?;
//!     let mut options = Vec::new();
//!     if let Ok(state) = State::load("recipe.state") {
//!         options.push(with_state(state));
//!     }
//!
//!     let mut recipe = Recipe::new(definition.as_bytes(), &registry, options)?;
//!     match recipe.cook(std::io::stdin()) {
//!         Ok(output) => println!("{}", String::from_utf8_lossy(&output)),
//!         Err(e) => {
//!             recipe.state().save("recipe.state")?;
//!             return Err(e.into());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod recipe;
pub mod steps;

// Re-export commonly used types
pub use error::{RecipeError, Result};
pub use execution::{with_state, Recipe, RecipeOption};
pub use recipe::{Action, RecipeDefinition, State, StepError, StepFunc, StepFuncMap};
pub use steps::{builtin_recipe, builtin_registry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "doit";
