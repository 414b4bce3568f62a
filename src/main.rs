//! doit CLI Entry Point
//!
//! Cooks a built-in or file-based recipe, saving its state on failure so
//! the next invocation resumes where the last one stopped.
//!
//! # Usage
//!
//! ```bash
//! # Run a built-in recipe
//! doit hello_world Mike
//!
//! # Keep re-running until it succeeds (resumes each time)
//! doit third_times_the_charm /tmp/charm
//!
//! # Run a recipe file, reading input from stdin
//! echo spam | doit my_recipe.yaml
//!
//! # Ignore any saved state
//! doit third_times_the_charm /tmp/charm --fresh
//! ```

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info, warn};

use doit::recipe::{RECIPE_KIND, STEP_KIND};
use doit::steps::BUILTIN_RECIPES;
use doit::{builtin_recipe, builtin_registry, with_state, Recipe, State};
use doit::{APP_NAME, VERSION};

/// Input argument that means "read standard input".
const STDIN_MARKER: &str = "-";

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default, PartialEq)]
struct Config {
    recipe: Option<String>,
    input: Option<String>,
    state_path: Option<PathBuf>,
    fresh: bool,
    list: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| match record.level() {
            log::Level::Warn | log::Level::Error => {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    eprintln!();
    eprintln!("{} v{}", APP_NAME.bold(), VERSION);
    eprintln!("Resumable Step Pipelines");
    eprintln!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: doit [OPTIONS] <RECIPE> [INPUT]");
    println!();
    println!("Arguments:");
    println!("  <RECIPE>            Built-in recipe name or path to a recipe YAML file");
    println!("  [INPUT]             Initial input (default: read from stdin, or use '-')");
    println!();
    println!("Options:");
    println!("  --state PATH        State file (default: $DOIT_STATE_DIR/<recipe>.state)");
    println!("  --fresh             Discard any saved state before running");
    println!("  --list              List built-in recipes and step functions");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!("Examples:");
    println!("  doit hello_world Mike");
    println!("  doit third_times_the_charm /tmp/charm");
    println!("  echo spam | doit my_recipe.yaml --state my_recipe.state");
}

/// Prints built-in recipes and registered step functions.
fn print_builtins() {
    println!("Built-in recipes:");
    for (name, _) in BUILTIN_RECIPES {
        println!("  {}", name);
    }
    println!();
    println!("Step functions:");
    for name in builtin_registry().names() {
        println!("  {}", name);
    }
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut positional_index = 0;
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--fresh" => {
                config.fresh = true;
            }
            "--list" => {
                config.list = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--state" => {
                i += 1;
                if i >= args.len() {
                    return Err("--state requires a path argument".to_string());
                }
                config.state_path = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') && arg != STDIN_MARKER => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                match positional_index {
                    0 => config.recipe = Some(arg.clone()),
                    1 => config.input = Some(arg.clone()),
                    _ => return Err(format!("Unexpected argument: {}", arg)),
                }
                positional_index += 1;
            }
        }
        i += 1;
    }

    if config.recipe.is_none() && !config.list {
        return Err("Missing <RECIPE> argument".to_string());
    }

    Ok(config)
}

/// Resolves a recipe argument to its YAML source.
fn read_recipe_source(recipe: &str) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(yaml) = builtin_recipe(recipe) {
        info!("Using built-in recipe: {}", recipe);
        return Ok(yaml.to_string());
    }

    let path = Path::new(recipe);
    if !path.is_file() {
        return Err(format!(
            "'{}' is neither a built-in recipe nor a readable file (try --list)",
            recipe
        )
        .into());
    }

    info!("Loading recipe from: {}", path.display());
    Ok(fs::read_to_string(path)?)
}

/// Reads the initial input from the argument or standard input.
fn read_input(input: Option<&str>) -> io::Result<Vec<u8>> {
    match input {
        Some(text) if text != STDIN_MARKER => Ok(text.as_bytes().to_vec()),
        _ => {
            info!("Reading input from stdin");
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Loads saved state unless a fresh run was requested.
fn prepare_state(state_path: &Path, fresh: bool) -> Result<Option<State>, Box<dyn std::error::Error>> {
    if !state_path.exists() {
        info!("Starting fresh recipe execution");
        return Ok(None);
    }

    if fresh {
        info!("Discarding saved state (--fresh)");
        State::delete(state_path)?;
        return Ok(None);
    }

    let state = State::load(state_path)?;
    if let Some(failed) = state.failed_action() {
        info!(
            "Resuming after failure at step {} '{}': {}",
            failed.step_index, failed.step_name, failed.error
        );
    }
    Ok(Some(state))
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(config.verbose);

    if config.list {
        print_builtins();
        return Ok(());
    }

    print_banner();

    let recipe_arg = config.recipe.as_deref().unwrap_or_default();
    let source = read_recipe_source(recipe_arg)?;

    let state_path = config
        .state_path
        .clone()
        .unwrap_or_else(|| State::default_path(recipe_arg));
    info!("State file: {}", state_path.display());

    let previous = prepare_state(&state_path, config.fresh)?;
    let options: Vec<_> = previous.map(with_state).into_iter().collect();

    let registry = builtin_registry();
    let mut recipe = Recipe::new(source.as_bytes(), &registry, options).map_err(|e| {
        if e.is_unsupported_kind() {
            error!(
                "This build reads kind '{}' recipes with kind '{}' steps",
                RECIPE_KIND, STEP_KIND
            );
        }
        e
    })?;

    let unbound = recipe.unbound_steps();
    if !unbound.is_empty() {
        warn!("Steps without a built-in function: {}", unbound.join(", "));
    }

    let input = read_input(config.input.as_deref())?;

    match recipe.cook(input.as_slice()) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&output)?;
            writeln!(stdout)?;

            State::delete(&state_path)?;
            eprintln!("{}", "Recipe completed successfully".green());
            Ok(())
        }
        Err(e) => {
            error!("Recipe '{}' failed: {}", recipe.name(), e);
            recipe.state().save(&state_path)?;
            eprintln!(
                "{} re-run the same command to resume from the failed step",
                "State saved;".yellow()
            );
            Err(e.into())
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("doit")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_recipe_and_input() {
        let config = parse_arguments(&args(&["hello_world", "Mike"])).unwrap();
        assert_eq!(config.recipe.as_deref(), Some("hello_world"));
        assert_eq!(config.input.as_deref(), Some("Mike"));
        assert!(!config.fresh);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_arguments(&args(&[
            "recipe.yaml",
            "--state",
            "/tmp/r.state",
            "--fresh",
            "-v",
            "-",
        ]))
        .unwrap();

        assert_eq!(config.state_path, Some(PathBuf::from("/tmp/r.state")));
        assert!(config.fresh);
        assert!(config.verbose);
        assert_eq!(config.input.as_deref(), Some(STDIN_MARKER));
    }

    #[test]
    fn test_parse_missing_recipe() {
        assert!(parse_arguments(&args(&[])).is_err());
        assert!(parse_arguments(&args(&["--list"])).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_arguments(&args(&["r", "--state"])).is_err());
        assert!(parse_arguments(&args(&["r", "--bogus"])).is_err());
        assert!(parse_arguments(&args(&["r", "in", "extra"])).is_err());
    }

    #[test]
    fn test_read_input_from_argument() {
        assert_eq!(read_input(Some("spam")).unwrap(), b"spam");
    }

    #[test]
    fn test_read_recipe_source() {
        assert!(read_recipe_source("hello_world").unwrap().contains("HelloFunc"));
        assert!(read_recipe_source("/nonexistent/recipe.yaml").is_err());
    }

    #[test]
    fn test_prepare_state() {
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("r.state");
        assert!(prepare_state(&path, false).unwrap().is_none());

        State::default().save(&path).unwrap();
        assert!(prepare_state(&path, false).unwrap().is_some());

        assert!(prepare_state(&path, true).unwrap().is_none());
        assert!(!path.exists());
    }
}
