// park/src/paths.rs
//! Where the bookmark store lives.
//!
//! Resolution order:
//! 1. an explicit path (`--store`, or `PARK_STORE` which clap folds into the same flag)
//! 2. `<config_dir>/park/bookmarks.jsonl` (`~/.config/park/bookmarks.jsonl` on Linux)

use anyhow::{
    anyhow,
    Result
};
use std::path::PathBuf;

pub const STORE_ENV: &str = "PARK_STORE";
pub const APP_DIR: &str = "park";
pub const STORE_FILE: &str = "bookmarks.jsonl";

pub fn store_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(p);
    }
    default_store_path()
}

pub fn default_store_path() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("cannot determine the user config directory; set {STORE_ENV}"))?;
    Ok(dir.join(APP_DIR).join(STORE_FILE))
}
