//! Recipe Validation
//!
//! Checks the format tags of a decoded definition. Other oddities
//! (empty recipes, repeated step names, names with no registered
//! function) are reported as warnings and never reject the recipe.

use std::collections::HashSet;

use log::{debug, info, warn};

use super::model::{RecipeDefinition, RECIPE_KIND, STEP_KIND};
use super::registry::StepFuncMap;
use crate::error::{RecipeError, Result};

/// Validates the recipe and step format tags.
///
/// The recipe tag is checked first, then each step in declared order;
/// the first mismatch is returned.
pub fn validate_definition(definition: &RecipeDefinition) -> Result<()> {
    info!(
        "Validating recipe '{}' with {} steps",
        definition.name,
        definition.steps.len()
    );

    if definition.kind != RECIPE_KIND {
        return Err(RecipeError::UnsupportedRecipeKind(definition.kind.clone()));
    }

    for step in &definition.steps {
        if step.kind != STEP_KIND {
            return Err(RecipeError::UnsupportedStepKind {
                name: step.name.clone(),
                kind: step.kind.clone(),
            });
        }
    }

    Ok(())
}

/// Logs warnings for a definition that is valid but likely mistaken.
///
/// Returns the names of steps with no registered function, in declared
/// order.
pub fn lint_definition(definition: &RecipeDefinition, registry: &StepFuncMap) -> Vec<String> {
    if definition.steps.is_empty() {
        warn!("Recipe '{}' has no steps", definition.name);
    }

    let mut seen = HashSet::new();
    let mut unbound = Vec::new();

    for (index, step) in definition.steps.iter().enumerate() {
        if !seen.insert(step.name.as_str()) {
            debug!("Step '{}' appears more than once (index {})", step.name, index);
        }

        if !registry.contains(&step.name) {
            warn!(
                "Step {} '{}' has no registered function and will fail when reached",
                index, step.name
            );
            unbound.push(step.name.clone());
        }
    }

    unbound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::model::StepDefinition;
    use crate::recipe::registry::StepError;

    fn identity(input: &[u8]) -> std::result::Result<Vec<u8>, StepError> {
        Ok(input.to_vec())
    }

    #[test]
    fn test_valid_definition() {
        let def = RecipeDefinition::new("ok").with_step("a");
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_empty_definition_is_valid() {
        let def = RecipeDefinition::new("empty");
        assert!(validate_definition(&def).is_ok());
    }

    #[test]
    fn test_wrong_recipe_kind() {
        let mut def = RecipeDefinition::new("old").with_step("a");
        def.kind = "recipe/v0".to_string();

        match validate_definition(&def) {
            Err(RecipeError::UnsupportedRecipeKind(kind)) => assert_eq!(kind, "recipe/v0"),
            other => panic!("expected unsupported recipe kind, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_recipe_kind() {
        let def = RecipeDefinition::default();
        assert!(matches!(
            validate_definition(&def),
            Err(RecipeError::UnsupportedRecipeKind(kind)) if kind.is_empty()
        ));
    }

    #[test]
    fn test_recipe_kind_checked_before_steps() {
        let mut def = RecipeDefinition::default();
        def.steps.push(StepDefinition {
            kind: "step/v9".to_string(),
            name: "a".to_string(),
        });

        assert!(matches!(
            validate_definition(&def),
            Err(RecipeError::UnsupportedRecipeKind(_))
        ));
    }

    #[test]
    fn test_first_bad_step_reported() {
        let mut def = RecipeDefinition::new("steps").with_step("good");
        def.steps.push(StepDefinition {
            kind: "step/v2".to_string(),
            name: "first_bad".to_string(),
        });
        def.steps.push(StepDefinition {
            kind: "".to_string(),
            name: "second_bad".to_string(),
        });

        match validate_definition(&def) {
            Err(RecipeError::UnsupportedStepKind { name, kind }) => {
                assert_eq!(name, "first_bad");
                assert_eq!(kind, "step/v2");
            }
            other => panic!("expected unsupported step kind, got {:?}", other),
        }
    }

    #[test]
    fn test_lint_reports_unbound() {
        let registry = StepFuncMap::new().with("known", identity);
        let def = RecipeDefinition::new("lint")
            .with_step("known")
            .with_step("missing")
            .with_step("known");

        assert_eq!(lint_definition(&def, &registry), vec!["missing".to_string()]);
    }

    #[test]
    fn test_lint_all_bound() {
        let registry = StepFuncMap::new().with("a", identity);
        let def = RecipeDefinition::new("lint").with_step("a");
        assert!(lint_definition(&def, &registry).is_empty());
    }
}
