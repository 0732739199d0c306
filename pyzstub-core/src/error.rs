//! Error types for launching and bundling

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Empty argument vector: the program name is missing")]
    EmptyArgv,

    #[error("Argument {index} contains an interior NUL character")]
    InteriorNul { index: usize },

    #[error("Too many arguments: {count}")]
    TooManyArguments { count: usize },
}

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Input validation
    #[error("'{}' is not a zip application (no end-of-central-directory record)", path.display())]
    NotAnArchive { path: PathBuf },

    #[error("Output '{}' already exists. Pass --force to overwrite.", path.display())]
    OutputExists { path: PathBuf },

    #[error("Output '{}' is the same file as one of the inputs", path.display())]
    SameFile { path: PathBuf },

    // Inspection
    #[error("No zip payload found in '{}'", path.display())]
    NoPayload { path: PathBuf },
}

impl BundleError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BundleError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Launching is infallible once the entry point is reached, so this only
/// covers the argument preparation that precedes it.
pub type LaunchResult<T> = Result<T, LaunchError>;
pub type BundleResult<T> = Result<T, BundleError>;
