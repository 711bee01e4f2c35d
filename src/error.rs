// park/src/error.rs
//! Error taxonomy for store operations. Every variant maps to exit code 1 at the CLI.
//! `Corrupt` wraps either the JSON error or the rule a well-formed line broke.

use std::{
    io,
    path::PathBuf
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkError {
    #[error("invalid bookmark name {name:?}: {reason}")]
    InvalidName {
        name: String,
        reason: &'static str,
    },

    #[error("cannot bookmark {path}: {reason}")]
    InvalidPath {
        path: PathBuf,
        reason: String,
    },

    #[error("no bookmark named {0:?}")]
    NotFound(String),

    /// The entry is kept; removal is left to the user.
    #[error(
        "bookmark {name:?} points to {path}, which is no longer a directory \
         (remove it with `park --delete {name}` or `park --prune`)"
    )]
    Stale {
        name: String,
        path: PathBuf,
    },

    #[error(
        "bookmark store {path} is corrupt at line {line}; \
         inspect or delete the file to continue"
    )]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read bookmark store {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write bookmark store {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ParkError>;
