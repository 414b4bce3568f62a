//! Resume Point
//!
//! Works out where a cook starts when the recipe was built from a
//! previous run's state.

use log::{debug, info, warn};

use crate::recipe::model::Step;
use crate::recipe::state::{Action, State};

/// Step index and input a cook starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub step_index: usize,
    pub input: Vec<u8>,

    /// Successful actions a resumed log keeps ahead of the new ones
    pub history: Vec<Action>,
}

impl ResumePoint {
    /// Start of the recipe with the caller's input.
    pub fn start(input: Vec<u8>) -> Self {
        Self {
            step_index: 0,
            input,
            history: Vec::new(),
        }
    }

    /// Reads the resume point out of `previous`.
    ///
    /// The first failed action sets the step index; anything logged after
    /// it is ignored. The output of the last successful action before that
    /// point replaces `initial` as the carried input. With no failure the
    /// index stays at 0 and the new log starts empty.
    pub fn from_state(previous: Option<&State>, initial: Vec<u8>) -> Self {
        let Some(previous) = previous else {
            return Self::start(initial);
        };

        let step_index = previous.failed_action().map_or(0, |a| a.step_index);

        let input = match previous.last_output() {
            Some(output) => {
                debug!("Carrying previous output ({} bytes)", output.len());
                output.to_vec()
            }
            None => initial,
        };

        let history = previous
            .actions()
            .iter()
            .take_while(|a| a.succeeded())
            .filter(|a| a.step_index < step_index)
            .cloned()
            .collect();

        Self {
            step_index,
            input,
            history,
        }
    }

    pub fn is_fresh_start(&self) -> bool {
        self.step_index == 0
    }
}

/// Warns about previous actions that do not line up with `steps`.
///
/// The resumed log is trusted as-is; this only reports mismatches.
pub fn check_state_shape(previous: &State, steps: &[Step]) -> usize {
    let mut mismatches = 0;

    for action in previous.actions() {
        match steps.get(action.step_index) {
            Some(step) if step.name == action.step_name => {}
            Some(step) => {
                warn!(
                    "Saved action for step {} names '{}' but the recipe has '{}'",
                    action.step_index, action.step_name, step.name
                );
                mismatches += 1;
            }
            None => {
                warn!(
                    "Saved action for step {} '{}' is beyond the recipe's {} steps",
                    action.step_index,
                    action.step_name,
                    steps.len()
                );
                mismatches += 1;
            }
        }
    }

    if mismatches == 0 && !previous.is_empty() {
        info!("Saved state matches the recipe ({} actions)", previous.len());
    }
    mismatches
}
