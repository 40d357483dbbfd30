//! Locating external executables.

use std::path::{Path, PathBuf};
use std::process::Output;

use crate::error::{Error, Result};

/// Resolve an executable by name, either inside `dir` or on `PATH`.
pub fn resolve_binary(name: &str, dir: Option<&Path>) -> Result<PathBuf> {
    let found = match dir {
        Some(dir) => {
            let cwd = std::env::current_dir()?;
            which::which_in(name, Some(dir), cwd)
        }
        None => which::which(name),
    };

    found.map_err(|_| match dir {
        Some(dir) => {
            Error::BackendUnavailable(format!("{} not found in {}", name, dir.display()))
        }
        None => Error::BackendUnavailable(format!("{} not found on PATH", name)),
    })
}

/// Accept an explicit path to an executable file.
pub fn require_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(Error::BackendUnavailable(format!(
            "{} does not exist or is not a file",
            path.display()
        )))
    }
}

/// Condense a failed command's stderr into one line.
pub fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let summary = stderr.split_whitespace().collect::<Vec<_>>().join(" ");
    if summary.is_empty() {
        format!("exited with {}", output.status)
    } else {
        summary
    }
}
