//! Filesystem Steps
//!
//! Steps used by the `third_times_the_charm` recipe. Together they show
//! a recipe that only completes after being resumed twice: the second
//! step keeps failing until its directory holds three files.

use std::fs;
use std::io;
use std::path::Path;

use log::info;

use crate::recipe::registry::StepError;

/// Number of files the directory must hold before the second step passes.
const FILES_NEEDED: usize = 3;

/// Creates the directory named by the input and outputs its path.
///
/// Fails if the directory already exists.
pub fn mkdir_unless_exists(input: &[u8]) -> Result<Vec<u8>, StepError> {
    info!("+ MkdirAndSucceedIfItDidNotAlreadyExist");
    let directory = utf8(input)?;

    if Path::new(directory).is_dir() {
        return Err(format!("directory {:?} already exists", directory).into());
    }

    create_private_dir(Path::new(directory))?;
    Ok(directory.as_bytes().to_vec())
}

/// Adds a new `spam*` file to the directory named by the input.
///
/// Fails until the directory holds at least three entries, then outputs
/// `dir,first,second,third` with entries sorted by name.
pub fn create_file_until_third(input: &[u8]) -> Result<Vec<u8>, StepError> {
    info!("+ CreateFileInDirAndSucceedTheThirdTime");
    let directory = utf8(input)?;

    tempfile::Builder::new()
        .prefix("spam")
        .tempfile_in(directory)?
        .keep()
        .map_err(|e| e.error)?;

    let entries = sorted_entries(Path::new(directory))?;
    if entries.len() < FILES_NEEDED {
        return Err(format!(
            "Not succeeding until we've written {} files. Currently {}.",
            FILES_NEEDED,
            entries.len()
        )
        .into());
    }

    Ok(format!("{},{},{},{}", directory, entries[0], entries[1], entries[2]).into_bytes())
}

/// Reads `dir,a,b,c` and reports the three files written to `dir`.
pub fn tada(input: &[u8]) -> Result<Vec<u8>, StepError> {
    info!("+ Tada");
    let text = utf8(input)?;
    let parts: Vec<&str> = text.split(',').collect();

    if parts.len() < 4 {
        return Err(format!(
            "expected 4 comma-separated values, got {}: {:?}",
            parts.len(),
            text
        )
        .into());
    }

    Ok(format!(
        "Tada! Wrote [{:?},{:?},{:?}] to {:?}",
        parts[1], parts[2], parts[3], parts[0]
    )
    .into_bytes())
}

fn utf8(input: &[u8]) -> Result<&str, StepError> {
    std::str::from_utf8(input)
        .map_err(|e| StepError::Message(format!("input is not valid UTF-8: {}", e)))
}

fn create_private_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(path)
}

fn sorted_entries(directory: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
