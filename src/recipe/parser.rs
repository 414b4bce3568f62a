//! Recipe Parser
//!
//! Decodes recipe definitions from YAML. Decoding only produces the
//! structural form; format tags are checked by the validator and step
//! functions are bound when the recipe is built.

use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use super::model::RecipeDefinition;
use crate::error::{RecipeError, Result};

/// Decodes a recipe definition from YAML text.
pub fn parse_definition(yaml: &str) -> Result<RecipeDefinition> {
    debug!("Decoding recipe definition ({} bytes)", yaml.len());

    let definition: RecipeDefinition = serde_yaml::from_str(yaml)?;

    debug!(
        "Decoded recipe '{}' with {} steps",
        definition.name,
        definition.steps.len()
    );
    Ok(definition)
}

/// Decodes a recipe definition from any reader.
///
/// Only a failing reader is an I/O error; bytes that are not valid UTF-8
/// YAML are a decode error.
pub fn read_definition(mut reader: impl Read) -> Result<RecipeDefinition> {
    let mut yaml = Vec::new();
    reader.read_to_end(&mut yaml)?;
    debug!("Decoding recipe definition ({} bytes)", yaml.len());

    let definition: RecipeDefinition = serde_yaml::from_slice(&yaml)?;
    Ok(definition)
}

/// Loads a recipe definition from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use doit::recipe::load_definition;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let definition = load_definition("recipe.yaml")?;
///     println!("Loaded {} steps", definition.steps.len());
///     Ok(())
/// }
/// ```
pub fn load_definition(path: impl AsRef<Path>) -> Result<RecipeDefinition> {
    let path = path.as_ref();
    info!("Loading recipe from: {}", path.display());

    let yaml = fs::read_to_string(path).map_err(RecipeError::Io)?;
    parse_definition(&yaml)
}
