// park/src/bookmark.rs
//! One parked directory. This is the JSONL unit of the store file.

use serde::{
    Deserialize,
    Serialize
};
use std::path::{
    Path,
    PathBuf
};
use crate::error::{
    ParkError,
    Result
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    pub name: String,
    pub path: PathBuf,
}

impl Bookmark {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Names are typed bare on a shell command line, so anything that would need
/// quoting or could be read as a flag or a path is refused.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.starts_with('-') {
        Some("name must not start with '-'")
    } else if name.contains(['/', '\\']) {
        Some("name must not contain a path separator")
    } else if name.chars().any(char::is_whitespace) {
        Some("name must not contain whitespace")
    } else if name.chars().any(char::is_control) {
        Some("name must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ParkError::InvalidName { name: name.to_string(), reason }),
        None => Ok(()),
    }
}

/// A stored path must be absolute UTF-8 with no control characters, so each
/// bookmark stays on one `name<TAB>path` line when listed.
pub fn validate_path(path: &Path) -> Result<()> {
    let reason = match path.to_str() {
        None => Some("path is not valid UTF-8"),
        Some(s) if s.chars().any(char::is_control) => Some("path must not contain control characters"),
        Some(_) if !path.is_absolute() => Some("path is not absolute"),
        Some(_) => None,
    };

    match reason {
        Some(reason) => Err(ParkError::InvalidPath { path: path.to_path_buf(), reason: reason.into() }),
        None => Ok(()),
    }
}
