//! Greeting Steps
//!
//! String templating steps used by the `hello_world` recipe.

use log::debug;

use crate::recipe::registry::StepError;

/// `x` becomes `Hello, x!`.
pub fn hello(input: &[u8]) -> Result<Vec<u8>, StepError> {
    let text = String::from_utf8_lossy(input);
    debug!("+ Hello");
    Ok(format!("Hello, {}!", text).into_bytes())
}

/// `x` becomes `World says, "x"`.
pub fn world(input: &[u8]) -> Result<Vec<u8>, StepError> {
    let text = String::from_utf8_lossy(input);
    debug!("+ World");
    Ok(format!("World says, \"{}\"", text).into_bytes())
}
