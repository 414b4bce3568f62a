//! Built-in Steps and Recipes
//!
//! Step functions shipped with the `doit` binary and the recipe
//! definitions compiled into it.

pub mod filesystem;
pub mod greeting;

use crate::recipe::registry::StepFuncMap;

/// Recipe definitions embedded in the binary, by name.
pub const BUILTIN_RECIPES: &[(&str, &str)] = &[
    (
        "hello_world",
        include_str!("../../recipes/hello_world.yaml"),
    ),
    (
        "third_times_the_charm",
        include_str!("../../recipes/third_times_the_charm.yaml"),
    ),
];

/// Returns the embedded definition for a built-in recipe name.
pub fn builtin_recipe(name: &str) -> Option<&'static str> {
    BUILTIN_RECIPES
        .iter()
        .find(|(recipe, _)| *recipe == name)
        .map(|(_, yaml)| *yaml)
}

/// Maps the names used by the built-in recipes to their functions.
pub fn builtin_registry() -> StepFuncMap {
    StepFuncMap::new()
        .with("HelloFunc", greeting::hello)
        .with("WorldFunc", greeting::world)
        .with(
            "MkdirAndSucceedIfItDidNotAlreadyExist",
            filesystem::mkdir_unless_exists,
        )
        .with(
            "CreateFileInDirAndSucceedTheThirdTime",
            filesystem::create_file_until_third,
        )
        .with("Tada", filesystem::tada)
}
