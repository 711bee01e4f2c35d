// park/src/store.rs
//! The bookmark store: a name → directory map persisted as JSONL.
//!
//! Every CLI invocation loads the file, applies at most one mutation and saves.
//! Saves go through a temp file in the same directory followed by a rename, so
//! readers only ever see the old file or the new one. Two processes racing on
//! a mutation resolve last-writer-wins for the whole file; there is no locking.

use std::{
    collections::BTreeMap,
    fs,
    io::{
        self,
        Write
    },
    path::{
        Path,
        PathBuf
    }
};
use tempfile::NamedTempFile;
use tracing::{
    debug,
    info,
    warn
};
use crate::{
    bookmark::{
        validate_name,
        validate_path,
        Bookmark
    },
    error::{
        ParkError,
        Result
    },
    util
};

#[derive(Debug, Clone)]
pub struct Store {
    file: PathBuf,
    entries: BTreeMap<String, PathBuf>,
}

impl Store {
    /// Read the store at `file`. A missing file is an empty store.
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        let text = match fs::read_to_string(&file) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = %file.display(), "no store file yet, starting empty");
                return Ok(Self { file, entries: BTreeMap::new() });
            }
            Err(source) => return Err(ParkError::Read { path: file, source }),
        };
        let entries = parse(&file, &text)?;
        debug!(file = %file.display(), count = entries.len(), "loaded bookmark store");
        Ok(Self { file, entries })
    }

    /// Location this store reads from and writes to.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the current entries atomically.
    pub fn save(&self) -> Result<()> {
        let staged = self.stage()?;
        self.commit(staged)
    }

    /// First half of `save`: the full contents written and synced to a temp file
    /// next to the store. Nothing is visible at `file()` until `commit`.
    pub fn stage(&self) -> Result<NamedTempFile> {
        let dir = parent_dir(&self.file);
        fs::create_dir_all(dir).map_err(|source| self.write_err(source))?;

        let body = render(&self.entries).map_err(|e| self.write_err(io::Error::other(e)))?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.write_err(source))?;
        tmp.write_all(body.as_bytes()).map_err(|source| self.write_err(source))?;
        tmp.as_file().sync_all().map_err(|source| self.write_err(source))?;
        Ok(tmp)
    }

    /// Second half of `save`: rename the staged file over the store.
    pub fn commit(&self, staged: NamedTempFile) -> Result<()> {
        staged
            .persist(&self.file)
            .map_err(|e| self.write_err(e.error))?;
        debug!(file = %self.file.display(), count = self.entries.len(), "saved bookmark store");
        Ok(())
    }

    /// Insert or overwrite `name`. Relative paths are taken from the current
    /// directory. Returns the absolute path that was stored.
    pub fn add(&mut self, name: &str, path: &Path) -> Result<PathBuf> {
        validate_name(name)?;
        let abs = if path.is_absolute() {
            util::normalize(path)
        } else {
            let cwd = std::env::current_dir().map_err(|e| ParkError::InvalidPath {
                path: path.to_path_buf(),
                reason: format!("current directory unavailable: {e}"),
            })?;
            util::absolutize(path, &cwd)
        };
        validate_path(&abs)?;

        let mut next = self.entries.clone();
        if let Some(prev) = next.insert(name.to_string(), abs.clone()) {
            info!(bookmark = name, from = %prev.display(), to = %abs.display(), "overwriting bookmark");
        } else {
            info!(bookmark = name, path = %abs.display(), "adding bookmark");
        }
        self.replace(next)?;
        Ok(abs)
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        if !self.entries.contains_key(name) {
            return Err(ParkError::NotFound(name.to_string()));
        }
        let mut next = self.entries.clone();
        next.remove(name);
        self.replace(next)?;
        info!(bookmark = name, "deleted bookmark");
        Ok(())
    }

    /// All bookmarks ordered by name. Call again to restart.
    pub fn list(&self) -> impl Iterator<Item = (&str, &Path)> + '_ {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_path()))
    }

    pub fn clear(&mut self) -> Result<()> {
        self.replace(BTreeMap::new())?;
        info!("cleared all bookmarks");
        Ok(())
    }

    /// Look up `name` for a jump. The entry must still point at a directory;
    /// a stale entry is reported, never removed.
    pub fn resolve(&self, name: &str) -> Result<&Path> {
        let path = self
            .entries
            .get(name)
            .ok_or_else(|| ParkError::NotFound(name.to_string()))?;
        if !path.is_dir() {
            return Err(ParkError::Stale { name: name.to_string(), path: path.clone() });
        }
        Ok(path)
    }

    /// Remove every bookmark whose target is gone. Saves only when something changed.
    pub fn prune(&mut self) -> Result<Vec<Bookmark>> {
        let (stale, live): (BTreeMap<_, _>, BTreeMap<_, _>) = self
            .entries
            .iter()
            .map(|(n, p)| (n.clone(), p.clone()))
            .partition(|(_, p)| !p.is_dir());

        if stale.is_empty() {
            return Ok(Vec::new());
        }
        self.replace(live)?;
        let removed: Vec<Bookmark> = stale.into_iter().map(|(n, p)| Bookmark::new(n, p)).collect();
        info!(count = removed.len(), "pruned stale bookmarks");
        Ok(removed)
    }

    /* ----------------------------- helpers ----------------------------- */

    /// Persist `next`, then adopt it. On failure memory still matches disk.
    fn replace(&mut self, next: BTreeMap<String, PathBuf>) -> Result<()> {
        let prev = std::mem::replace(&mut self.entries, next);
        if let Err(e) = self.save() {
            self.entries = prev;
            return Err(e);
        }
        Ok(())
    }

    fn write_err(&self, source: io::Error) -> ParkError {
        ParkError::Write { path: self.file.clone(), source }
    }
}

fn parent_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn parse(file: &Path, text: &str) -> Result<BTreeMap<String, PathBuf>> {
    let mut entries = BTreeMap::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let corrupt = |source: Box<dyn std::error::Error + Send + Sync>| ParkError::Corrupt {
            path: file.to_path_buf(),
            line: i + 1,
            source,
        };
        let b: Bookmark = serde_json::from_str(line).map_err(|e| corrupt(e.into()))?;
        validate_name(&b.name)
            .and_then(|()| validate_path(&b.path))
            .map_err(|e| corrupt(e.into()))?;
        if entries.insert(b.name.clone(), b.path).is_some() {
            warn!(bookmark = %b.name, line = i + 1, "duplicate bookmark in store, later line wins");
        }
    }
    Ok(entries)
}

fn render(entries: &BTreeMap<String, PathBuf>) -> serde_json::Result<String> {
    let mut out = String::new();
    for (name, path) in entries {
        out.push_str(&serde_json::to_string(&Bookmark::new(name.as_str(), path.as_path()))?);
        out.push('\n');
    }
    Ok(out)
}
