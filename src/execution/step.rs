//! Individual Step Execution
//!
//! Runs one bound step on a materialised input payload and builds the
//! [`Action`] that records it. The payload is kept twice: one copy for
//! the log and one handed on as the next step's input.

use std::time::Instant;

use log::{debug, error};

use crate::recipe::model::Step;
use crate::recipe::registry::StepError;
use crate::recipe::state::Action;

/// Executes `step` on `input`.
///
/// Returns the action to record together with the step's result. On
/// success the output bytes appear both in the action and in the
/// returned payload; on failure the action's output is empty and its
/// error holds the step's message.
pub fn execute_step(
    step_index: usize,
    step: &Step,
    input: Vec<u8>,
) -> (Action, Result<Vec<u8>, StepError>) {
    debug!(
        "Step {} '{}' received {} bytes",
        step_index,
        step.name,
        input.len()
    );

    let started = Instant::now();
    let result = step.call(&input);
    let elapsed = started.elapsed();

    let (output, message) = match &result {
        Ok(output) => {
            debug!(
                "Step {} '{}' produced {} bytes in {:.2?}",
                step_index,
                step.name,
                output.len(),
                elapsed
            );
            (output.clone(), String::new())
        }
        Err(e) => {
            error!("Step {} '{}' failed: {}", step_index, step.name, e);
            (Vec::new(), e.to_string())
        }
    };

    let action = Action {
        step_index,
        step_name: step.name.clone(),
        input,
        output,
        error: message,
    };

    (action, result)
}
