//! Tracked State Persistence
//!
//! The label set recorded after the last successful reconciliation cycle,
//! persisted between runs the way an orchestrating engine would persist it

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RepoId;
use crate::error::Result;
use crate::label::{Label, LabelSet};

/// Default state file path, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = ".gh-labelset.state.json";

/// State recorded after the last successful cycle
///
/// Supplied as the "previous" side of the next cycle's diff and overwritten
/// with the newly projected set once that cycle completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedState {
    /// Repository the labels belong to (the resource's tracking key)
    pub repository: String,

    /// Whether the last cycle took ownership of the full remote set
    pub authoritative: bool,

    /// Labels tracked at the end of the last cycle
    pub labels: Vec<Label>,
}

impl TrackedState {
    /// State for a repository that has never been reconciled
    pub fn empty(repo: &RepoId, authoritative: bool) -> Self {
        Self {
            repository: repo.to_string(),
            authoritative,
            labels: Vec::new(),
        }
    }

    /// The tracked labels as a name-keyed set
    pub fn label_set(&self) -> LabelSet {
        self.labels.iter().cloned().collect()
    }
}

/// Load tracked state from a file
///
/// # Returns
/// `None` if the file does not exist (first cycle)
///
/// # Errors
/// If the file exists but cannot be read or parsed
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<Option<TrackedState>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let state: TrackedState = serde_json::from_str(&content)?;
    Ok(Some(state))
}

/// Persist tracked state to a file
///
/// # Errors
/// If serialization or the write fails
pub fn save_state<P: AsRef<Path>>(path: P, state: &TrackedState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Remove the state file after a destroy
///
/// A missing file is not an error.
pub fn remove_state<P: AsRef<Path>>(path: P) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
