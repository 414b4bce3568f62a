//! Recipe Execution Engine
//!
//! Builds a validated [`Recipe`] from a definition and a step function
//! map, then cooks it: each step's output becomes the next step's input,
//! and every step that runs is recorded in the recipe's [`State`].
//!
//! Execution is sequential and fail-fast. The first failing step ends
//! the cook; the caller saves [`Recipe::state`] and builds a new recipe
//! with [`with_state`] to resume from that step.

use std::io::Read;

use log::{info, warn};

use super::resume::{check_state_shape, ResumePoint};
use super::step::execute_step;
use crate::error::Result;
use crate::recipe::model::{RecipeDefinition, Step};
use crate::recipe::parser::read_definition;
use crate::recipe::registry::StepFuncMap;
use crate::recipe::state::State;
use crate::recipe::validator::{lint_definition, validate_definition};

/// Option accepted when building a recipe.
#[derive(Debug, Clone)]
pub enum RecipeOption {
    /// Resume from a previous run's state.
    WithState(State),
}

/// Seeds a recipe with the state of an earlier, failed run.
///
/// A cook resumes from the state's first failed step. Its log keeps the
/// successful actions that came before that step.
pub fn with_state(state: State) -> RecipeOption {
    RecipeOption::WithState(state)
}

/// A validated, ordered pipeline of bound steps.
///
/// # Example
///
/// ```rust
/// use doit::{Recipe, StepFuncMap};
///
/// let registry = StepFuncMap::new()
///     .with("Shout", |input: &[u8]| Ok(input.to_ascii_uppercase()));
///
/// let yaml = "kind: recipe/v1\nname: shout\nsteps:\n- kind: step/v1\n  name: Shout\n";
/// let mut recipe = Recipe::new(yaml.as_bytes(), &registry, []).unwrap();
///
/// let output = recipe.cook(&b"spam"[..]).unwrap();
/// assert_eq!(output, b"SPAM");
/// assert_eq!(recipe.state().len(), 1);
/// ```
#[derive(Debug)]
pub struct Recipe {
    kind: String,
    name: String,
    steps: Vec<Step>,
    prev_state: Option<State>,
    state: State,
}

impl Recipe {
    /// Decodes a YAML definition from `definition` and builds a recipe.
    ///
    /// Fails if the definition cannot be decoded or declares an
    /// unsupported recipe or step kind. Step names missing from
    /// `registry` do not fail here; such steps fail when they run.
    pub fn new(
        definition: impl Read,
        registry: &StepFuncMap,
        options: impl IntoIterator<Item = RecipeOption>,
    ) -> Result<Self> {
        let definition = read_definition(definition)?;
        Self::from_definition(definition, registry, options)
    }

    /// Builds a recipe from an already decoded definition.
    pub fn from_definition(
        definition: RecipeDefinition,
        registry: &StepFuncMap,
        options: impl IntoIterator<Item = RecipeOption>,
    ) -> Result<Self> {
        validate_definition(&definition)?;
        lint_definition(&definition, registry);

        let mut prev_state = None;
        for option in options {
            match option {
                RecipeOption::WithState(state) => prev_state = Some(state),
            }
        }

        let steps = definition
            .steps
            .into_iter()
            .map(|step| {
                let func = registry.get(&step.name);
                Step::bind(step, func)
            })
            .collect();

        Ok(Self {
            kind: definition.kind,
            name: definition.name,
            steps,
            prev_state,
            state: State::new(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The state this recipe was seeded with, if any.
    pub fn previous_state(&self) -> Option<&State> {
        self.prev_state.as_ref()
    }

    /// Names of steps with no registered function, in declared order.
    pub fn unbound_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| !s.is_bound())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Runs the recipe on `input`.
    ///
    /// The input is read to the end before any step runs. Execution
    /// starts at the resume point computed from the seeded state (or at
    /// the first step) and stops at the first failing step, whose error
    /// is returned unchanged. The log of this call replaces any log from
    /// an earlier call. When resuming, it starts with the seeded state's
    /// successful actions ahead of the resume point, so a saved log always
    /// describes the whole run.
    pub fn cook(&mut self, mut input: impl Read) -> Result<Vec<u8>> {
        self.state = State::new();

        let mut initial = Vec::new();
        input.read_to_end(&mut initial)?;

        if let Some(prev) = &self.prev_state {
            let mismatches = check_state_shape(prev, &self.steps);
            if mismatches > 0 {
                warn!(
                    "Resuming recipe '{}' from a state with {} mismatched actions",
                    self.name, mismatches
                );
            }
        }

        let resume = ResumePoint::from_state(self.prev_state.as_ref(), initial);
        if resume.is_fresh_start() {
            info!(
                "Cooking recipe '{}' ({} steps)",
                self.name,
                self.steps.len()
            );
        } else {
            info!(
                "Resuming recipe '{}' at step {} of {}",
                self.name,
                resume.step_index,
                self.steps.len()
            );
        }

        self.state = State {
            actions: resume.history,
        };

        let mut payload = resume.input;
        let mut ran = 0;
        for (index, step) in self.steps.iter().enumerate().skip(resume.step_index) {
            let (action, result) = execute_step(index, step, payload);
            self.state.record(action);
            ran += 1;
            payload = result?;
        }

        info!(
            "Recipe '{}' finished ({} steps run, {} bytes out)",
            self.name,
            ran,
            payload.len()
        );
        Ok(payload)
    }

    /// The log built by the most recent [`cook`](Self::cook).
    ///
    /// Empty before the first cook, and after a cook whose input could
    /// not be read.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Consumes the recipe and returns its log.
    pub fn into_state(self) -> State {
        self.state
    }
}
