//! Recipe Execution State
//!
//! The execution log written while a recipe cooks. A failed run's state
//! is saved by the caller and handed back to the next recipe, which
//! resumes from the failed step instead of starting over.
//!
//! State files are pretty-printed JSON. Payloads that are valid UTF-8
//! are written as strings and anything else as an array of byte values.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};

/// Directory for default state files, taken from `DOIT_STATE_DIR`.
pub static STATE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("DOIT_STATE_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".doit"))
});

/// Record of one step execution.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    /// Position of the step in the recipe
    pub step_index: usize,

    /// Name of the step that ran
    pub step_name: String,

    /// Exact bytes the step received
    #[serde(default, with = "payload")]
    pub input: Vec<u8>,

    /// Exact bytes the step produced (empty on failure)
    #[serde(default, with = "payload")]
    pub output: Vec<u8>,

    /// Failure message, empty on success
    #[serde(default)]
    pub error: String,
}

impl Action {
    pub fn succeeded(&self) -> bool {
        self.error.is_empty()
    }

    pub fn failed(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Ordered log of the actions taken by a cook and the runs it resumed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl State {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the first failed action, the one a resume restarts from.
    pub fn failed_action(&self) -> Option<&Action> {
        self.actions.iter().find(|a| a.failed())
    }

    /// Output of the most recent successful action before any failure.
    pub fn last_output(&self) -> Option<&[u8]> {
        self.actions
            .iter()
            .take_while(|a| a.succeeded())
            .last()
            .map(|a| a.output.as_slice())
    }

    /// Default state file for a recipe: `{STATE_DIR}/{stem}.state`.
    pub fn default_path(recipe: &str) -> PathBuf {
        let stem = Path::new(recipe)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("recipe");

        STATE_DIR.join(format!("{}.state", stem))
    }

    /// Saves the state to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RecipeError::StateIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| {
            RecipeError::StateFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(|source| RecipeError::StateIo {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved recipe state to {}", path.display());
        Ok(())
    }

    /// Loads state from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|source| RecipeError::StateIo {
            path: path.to_path_buf(),
            source,
        })?;
        let state: State =
            serde_json::from_str(&content).map_err(|source| RecipeError::StateFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Loaded recipe state from {} ({} actions)",
            path.display(),
            state.len()
        );
        Ok(state)
    }

    /// Deletes the state file at `path`. A missing file is not an error.
    pub fn delete(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path).map_err(|source| RecipeError::StateIo {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Deleted state file: {}", path.display());
        }
        Ok(())
    }
}

/// Serde adapter for step payloads.
mod payload {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match std::str::from_utf8(bytes) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(bytes),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let val = Value::deserialize(deserializer)?;
        match val {
            Value::Null => Ok(Vec::new()),
            Value::String(s) => Ok(s.into_bytes()),
            Value::Array(arr) => arr
                .into_iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| de::Error::custom("Expected byte value in array"))
                })
                .collect(),
            _ => Err(de::Error::custom("Expected string or array of bytes")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn action(index: usize, name: &str, input: &[u8], output: &[u8], error: &str) -> Action {
        Action {
            step_index: index,
            step_name: name.to_string(),
            input: input.to_vec(),
            output: output.to_vec(),
            error: error.to_string(),
        }
    }

    fn failed_run() -> State {
        let mut state = State::new();
        state.record(action(0, "Step1", b"spam", b"spam", ""));
        state.record(action(1, "Step2", b"spam", b"", "temporary short circuit"));
        state
    }

    #[test]
    fn test_state_creation() {
        let state = State::new();
        assert!(state.is_empty());
        assert!(state.failed_action().is_none());
        assert!(state.last_output().is_none());
    }

    #[test]
    fn test_failed_action_and_last_output() {
        let state = failed_run();

        assert_eq!(state.len(), 2);
        assert_eq!(state.failed_action().unwrap().step_index, 1);
        assert_eq!(state.last_output(), Some(&b"spam"[..]));
    }

    #[test]
    fn test_last_output_ignores_actions_after_failure() {
        let mut state = State::new();
        state.record(action(0, "a", b"in", b"first", ""));
        state.record(action(1, "b", b"first", b"", "boom"));
        state.record(action(2, "c", b"x", b"later", ""));

        assert_eq!(state.last_output(), Some(&b"first"[..]));
    }

    #[test]
    fn test_text_payload_serialized_as_string() {
        let json = serde_json::to_string(&failed_run()).unwrap();
        assert!(json.contains("\"input\":\"spam\""));
        assert!(json.contains("\"error\":\"\""));
    }

    #[test]
    fn test_state_serialization_roundtrip() {
        let mut state = failed_run();
        state.record(action(2, "Binary", &[0xff, 0x00, 0xfe], &[], ""));

        let json = serde_json::to_string_pretty(&state).unwrap();
        let loaded: State = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.actions[2].input, vec![0xff, 0x00, 0xfe]);
        assert!(loaded.actions[0].error.is_empty());
    }

    #[test]
    fn test_invalid_payload_rejected() {
        let json = r#"{"actions":[{"step_index":0,"step_name":"a","input":[300],"output":"","error":""}]}"#;
        assert!(serde_json::from_str::<State>(json).is_err());
    }

    #[test]
    fn test_state_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("test.state");

        let state = failed_run();
        state.save(&path).unwrap();
        assert!(path.exists());

        let loaded = State::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_state_load_nonexistent() {
        let result = State::load("/nonexistent/path/recipe.state");
        assert!(matches!(result, Err(RecipeError::StateIo { .. })));
    }

    #[test]
    fn test_state_load_malformed() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.state");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            State::load(&path),
            Err(RecipeError::StateFormat { .. })
        ));
    }

    #[test]
    fn test_state_delete() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("test.state");
        State::new().save(&path).unwrap();

        State::delete(&path).unwrap();
        assert!(!path.exists());

        // Deleting again is fine
        assert!(State::delete(&path).is_ok());
    }

    #[test]
    fn test_default_path_uses_stem() {
        let path = State::default_path("recipes/third_times_the_charm.yaml");
        assert!(path.ends_with("third_times_the_charm.state"));

        let path = State::default_path("hello_world");
        assert!(path.ends_with("hello_world.state"));
    }
}
