//! Recipe Data Model
//!
//! Decoded recipe definitions and the bound steps built from them.
//!
//! # Example YAML Format
//!
//! ```yaml
//! kind: recipe/v1
//! name: hello world
//! steps:
//!   - kind: step/v1
//!     name: HelloFunc
//!   - kind: step/v1
//!     name: WorldFunc
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::registry::{StepError, StepFunc};

/// Format tag a recipe definition must declare.
pub const RECIPE_KIND: &str = "recipe/v1";

/// Format tag every step definition must declare.
pub const STEP_KIND: &str = "step/v1";

/// One step as written in a recipe definition.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDefinition {
    /// Format tag, expected to equal [`STEP_KIND`]
    #[serde(default)]
    pub kind: String,

    /// Name used to look up the step function
    #[serde(default)]
    pub name: String,
}

impl StepDefinition {
    /// Creates a step definition with the current format tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: STEP_KIND.to_string(),
            name: name.into(),
        }
    }
}

/// A recipe definition as decoded from YAML, before validation.
///
/// Missing keys decode to empty values so that an absent `kind` is
/// reported as an unsupported kind rather than a decode failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDefinition {
    /// Format tag, expected to equal [`RECIPE_KIND`]
    #[serde(default)]
    pub kind: String,

    /// Human-readable recipe name
    #[serde(default)]
    pub name: String,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl RecipeDefinition {
    /// Creates a definition with the current format tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: RECIPE_KIND.to_string(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step by name.
    pub fn with_step(mut self, name: impl Into<String>) -> Self {
        self.steps.push(StepDefinition::new(name));
        self
    }
}

/// A validated step bound to its step function.
#[derive(Clone)]
pub struct Step {
    pub kind: String,
    pub name: String,
    func: Option<StepFunc>,
}

impl Step {
    pub(crate) fn bind(definition: StepDefinition, func: Option<StepFunc>) -> Self {
        Self {
            kind: definition.kind,
            name: definition.name,
            func,
        }
    }

    /// Returns true if a step function was found for this step's name.
    pub fn is_bound(&self) -> bool {
        self.func.is_some()
    }

    /// Runs the step function on `input`.
    ///
    /// A step without a registered function fails here, not when the
    /// recipe is built.
    pub fn call(&self, input: &[u8]) -> Result<Vec<u8>, StepError> {
        match &self.func {
            Some(func) => func(input),
            None => Err(StepError::Unbound(self.name.clone())),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_definition_builder() {
        let def = RecipeDefinition::new("test")
            .with_step("a")
            .with_step("b");

        assert_eq!(def.kind, RECIPE_KIND);
        assert_eq!(def.steps.len(), 2);
        assert_eq!(def.steps[1], StepDefinition::new("b"));
        assert_eq!(def.steps[1].kind, STEP_KIND);
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let def: RecipeDefinition = serde_yaml::from_str("name: bare").unwrap();
        assert_eq!(def.kind, "");
        assert_eq!(def.name, "bare");
        assert!(def.steps.is_empty());
    }

    #[test]
    fn test_bound_step_calls_function() {
        let func: StepFunc = Arc::new(|input: &[u8]| {
            Ok::<Vec<u8>, StepError>(input.iter().rev().copied().collect())
        });
        let step = Step::bind(StepDefinition::new("reverse"), Some(func));

        assert!(step.is_bound());
        assert_eq!(step.call(b"abc").unwrap(), b"cba");
    }

    #[test]
    fn test_unbound_step_fails_on_call() {
        let step = Step::bind(StepDefinition::new("ghost"), None);

        assert!(!step.is_bound());
        match step.call(b"x") {
            Err(StepError::Unbound(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected unbound error, got {:?}", other),
        }
    }

    #[test]
    fn test_step_debug_hides_function() {
        let step = Step::bind(StepDefinition::new("ghost"), None);
        let debug = format!("{:?}", step);
        assert!(debug.contains("ghost"));
        assert!(debug.contains("bound: false"));
    }
}
