//! Durable profile repository.
//!
//! [`ProfileStore`] owns two JSON documents under the storage directory:
//! - `environments.json` holds every saved [`Profile`] in insertion order.
//! - `history.json` holds the last [`MAX_HISTORY`] switches, oldest first.
//!
//! Every mutation loads the full document, applies the change in memory and
//! writes the whole document back through a temp file + rename, so a failed
//! write never leaves a half-written file behind. Preconditions (duplicate
//! name, unknown name) are checked before anything is written.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::paths::Paths;
use crate::profile::{HistoryEntry, NewProfile, Profile};

/// Number of switches kept in the history log
pub const MAX_HISTORY: usize = 100;

/// Contents of environments.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Environments {
    #[serde(default)]
    environments: Vec<Profile>,
}

/// Contents of history.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct History {
    #[serde(default)]
    switches: Vec<HistoryEntry>,
}

impl History {
    fn push(&mut self, entry: HistoryEntry) {
        self.switches.push(entry);
        if self.switches.len() > MAX_HISTORY {
            let excess = self.switches.len() - MAX_HISTORY;
            self.switches.drain(..excess);
            debug!(dropped = excess, "truncated switch history");
        }
    }
}

/// Profile repository backed by the files in [`Paths`]
#[derive(Debug, Clone)]
pub struct ProfileStore {
    paths: Paths,
}

impl ProfileStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Create the storage directory and empty documents if missing.
    ///
    /// Returns `true` when the environments document was created by this call.
    /// Existing documents are never touched.
    pub fn initialize(&self) -> Result<bool> {
        fs::create_dir_all(&self.paths.base_dir)
            .map_err(|e| StoreError::io(&self.paths.base_dir, e))?;

        let mut created = false;
        if !self.paths.environments_file.exists() {
            write_document(&self.paths.environments_file, &Environments::default())?;
            info!(path = ?self.paths.environments_file, "created environments file");
            created = true;
        }
        if !self.paths.history_file.exists() {
            write_document(&self.paths.history_file, &History::default())?;
            debug!(path = ?self.paths.history_file, "created history file");
        }
        Ok(created)
    }

    /// Save a new profile.
    ///
    /// Fails with [`StoreError::DuplicateName`] if any stored profile has the
    /// same name ignoring case.
    pub fn add_profile(&self, new: NewProfile) -> Result<Profile> {
        let mut doc: Environments = read_document(&self.paths.environments_file)?;

        if doc.environments.iter().any(|p| p.matches_name(&new.name)) {
            return Err(StoreError::DuplicateName(new.name));
        }

        let project_path = resolve_path(&new.project_path)?;
        let profile = Profile {
            name: new.name,
            project_path,
            interpreter_env: new.interpreter_env,
            runtime_version: new.runtime_version,
            variables: new.variables,
            commands: new.commands,
            description: new.description,
            created_at: Utc::now(),
            last_used_at: None,
            use_count: 0,
        };

        doc.environments.push(profile.clone());
        write_document(&self.paths.environments_file, &doc)?;
        info!(name = %profile.name, path = ?profile.project_path, "added environment");

        Ok(profile)
    }

    /// Find a profile by name, ignoring case
    pub fn get_profile(&self, name: &str) -> Result<Option<Profile>> {
        let doc: Environments = read_document(&self.paths.environments_file)?;
        Ok(doc.environments.into_iter().find(|p| p.matches_name(name)))
    }

    /// All profiles in stored order, optionally narrowed by a case-insensitive
    /// substring of name, description or project path.
    pub fn list_profiles(&self, filter: Option<&str>) -> Result<Vec<Profile>> {
        let doc: Environments = read_document(&self.paths.environments_file)?;
        let profiles = match filter {
            Some(needle) if !needle.is_empty() => doc
                .environments
                .into_iter()
                .filter(|p| p.matches_filter(needle))
                .collect(),
            _ => doc.environments,
        };
        Ok(profiles)
    }

    /// Remove a profile permanently, returning what was removed
    pub fn delete_profile(&self, name: &str) -> Result<Profile> {
        let mut doc: Environments = read_document(&self.paths.environments_file)?;

        let index = doc
            .environments
            .iter()
            .position(|p| p.matches_name(name))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let removed = doc.environments.remove(index);
        write_document(&self.paths.environments_file, &doc)?;
        info!(name = %removed.name, "deleted environment");

        Ok(removed)
    }

    /// Record a switch: bump the usage statistics and append to the history.
    ///
    /// The history entry carries the same timestamp as `last_used_at` and the
    /// stored name, not the case variant passed in, so `switch DEMO` is
    /// logged as `demo` when that is how the profile was saved.
    ///
    /// Both documents are loaded before either is written; a read or parse
    /// failure leaves both files untouched.
    pub fn record_use(&self, name: &str) -> Result<Profile> {
        let mut doc: Environments = read_document(&self.paths.environments_file)?;
        let mut history: History = read_document(&self.paths.history_file)?;

        let profile = doc
            .environments
            .iter_mut()
            .find(|p| p.matches_name(name))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let now = Utc::now();
        profile.last_used_at = Some(now);
        profile.use_count += 1;
        let updated = profile.clone();

        write_document(&self.paths.environments_file, &doc)?;
        history.push(HistoryEntry {
            environment_name: updated.name.clone(),
            timestamp: now,
        });
        write_document(&self.paths.history_file, &history)?;

        info!(name = %updated.name, uses = updated.use_count, "recorded switch");
        Ok(updated)
    }

    /// The most recent `limit` switches, oldest first
    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut history: History = read_document(&self.paths.history_file)?;
        let skip = history.switches.len().saturating_sub(limit);
        Ok(history.switches.split_off(skip))
    }
}

/// Resolve a project path against the current directory.
///
/// Existing paths are canonicalized. For paths that do not exist yet, `.` and
/// `..` are folded lexically and the longest existing ancestor is
/// canonicalized, with the missing tail appended as-is.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    if let Ok(resolved) = fs::canonicalize(path) {
        return Ok(resolved);
    }

    let absolute = std::path::absolute(path).map_err(|e| StoreError::io(path, e))?;
    let normalized = normalize_lexically(&absolute);

    for ancestor in normalized.ancestors().skip(1) {
        if let (Ok(base), Ok(rest)) =
            (fs::canonicalize(ancestor), normalized.strip_prefix(ancestor))
        {
            return Ok(base.join(rest));
        }
    }
    Ok(normalized)
}

/// Drop `.` components and let `..` remove the previous one. `..` at the root
/// stays at the root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Read a document, returning the default if the file doesn't exist
fn read_document<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    debug!(?path, bytes = content.len(), "loaded document");
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a document atomically: write to a temp file, then rename
fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let content = serde_json::to_string_pretty(doc).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(|e| StoreError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;

    debug!(?path, bytes = content.len(), "wrote document");
    Ok(())
}
