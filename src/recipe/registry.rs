//! Step Function Registry
//!
//! Maps step names found in a recipe definition to the functions that
//! implement them. The map is plain data handed to recipe construction;
//! nothing is registered globally.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Failure reported by a step function.
#[derive(Debug, Error)]
pub enum StepError {
    /// Free-form failure message.
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The step's name had no registered function when the recipe was built.
    #[error("no step function registered for step '{0}'")]
    Unbound(String),
}

impl From<String> for StepError {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for StepError {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// A step transformation: consumes the whole input payload and produces a
/// new output payload.
pub type StepFunc = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, StepError> + Send + Sync>;

/// Name to step function mapping supplied by the embedding program.
#[derive(Clone, Default)]
pub struct StepFuncMap {
    funcs: HashMap<String, StepFunc>,
}

impl StepFuncMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, StepError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Arc::new(func));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, StepError> + Send + Sync + 'static,
    {
        self.register(name, func);
        self
    }

    /// Looks up the function registered for `name`.
    pub fn get(&self, name: &str) -> Option<StepFunc> {
        self.funcs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

impl fmt::Debug for StepFuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepFuncMap")
            .field("names", &self.names())
            .finish()
    }
}
