//! Shared scaffolding for each codec crate's standalone `compress`/
//! `decompress` CLI binary, generalized from the teacher's per-module
//! `CliArgs`/`CliError`/`validate` pattern (`rle_module`'s and
//! `delta_module`'s `cli_parse.rs`) so the five codec CLIs don't each
//! hand-roll the same path validation.

use std::path::{Path, PathBuf};

/// Errors encountered validating CLI-supplied file paths, before any
/// codec logic runs.
#[derive(Debug)]
pub enum CliError {
    /// The specified input file could not be found.
    InputFileNotFound(PathBuf),
    /// The specified input path exists, but is not a file.
    InputNotFile(PathBuf),
    /// The parent directory for the output file does not exist.
    OutputParentDirNotFound(PathBuf),
    /// The parent path for the output file exists, but is not a directory.
    OutputParentNotDir(PathBuf),
    /// An error originating directly from the argument parsing library.
    Clap(clap::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InputFileNotFound(p) => {
                write!(f, "input file does not exist: {}", p.display())
            }
            CliError::InputNotFile(p) => write!(f, "input path is not a file: {}", p.display()),
            CliError::OutputParentDirNotFound(p) => {
                write!(f, "output directory does not exist: {}", p.display())
            }
            CliError::OutputParentNotDir(p) => {
                write!(f, "output parent is not a directory: {}", p.display())
            }
            CliError::Clap(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<clap::Error> for CliError {
    fn from(e: clap::Error) -> Self {
        CliError::Clap(e)
    }
}

/// Confirms `input` exists and is a file, and that `output`'s parent
/// directory (if any) exists and is a directory.
pub fn validate_paths(input: &Path, output: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::InputFileNotFound(input.to_path_buf()));
    }
    if !input.is_file() {
        return Err(CliError::InputNotFile(input.to_path_buf()));
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(CliError::OutputParentDirNotFound(parent.to_path_buf()));
        }
        if !parent.is_dir() {
            return Err(CliError::OutputParentNotDir(parent.to_path_buf()));
        }
    }
    Ok(())
}
