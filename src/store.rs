//! Result persistence
//!
//! Results are stored exactly as produced, keyed by an opaque company or
//! session identifier. A save failure never touches the in-memory result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::simulation::SimulationResult;

/// Storage backend for simulation results
pub trait ResultStore {
    /// Insert or replace the result stored under `scenario_key`
    fn save(&mut self, scenario_key: &str, result: &SimulationResult) -> Result<()>;

    /// Fetch the result stored under `scenario_key`, if any
    fn load(&self, scenario_key: &str) -> Result<Option<SimulationResult>>;
}

/// A stored result with its bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResult {
    pub scenario_key: String,
    pub saved_at: DateTime<Utc>,
    pub result: SimulationResult,
}

/// Keys become file names: `[A-Za-z0-9_-]` pass through, every other byte
/// is written as `%XX`
///
/// The mapping is one-to-one, so distinct keys never share a record.
fn encode_key(scenario_key: &str) -> Result<String> {
    if scenario_key.trim().is_empty() {
        return Err(Error::InvalidKey(scenario_key.to_string()));
    }

    let mut key = String::with_capacity(scenario_key.len());
    for byte in scenario_key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            key.push(char::from(byte));
        } else {
            let _ = write!(key, "%{:02X}", byte);
        }
    }
    Ok(key)
}

/// In-process store, mainly for tests and single-session tools
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, SavedResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResultStore for MemoryStore {
    fn save(&mut self, scenario_key: &str, result: &SimulationResult) -> Result<()> {
        let key = encode_key(scenario_key)?;
        self.entries.insert(
            key,
            SavedResult {
                scenario_key: scenario_key.to_string(),
                saved_at: Utc::now(),
                result: result.clone(),
            },
        );
        Ok(())
    }

    fn load(&self, scenario_key: &str) -> Result<Option<SimulationResult>> {
        let key = encode_key(scenario_key)?;
        Ok(self.entries.get(&key).map(|saved| saved.result.clone()))
    }
}

/// One JSON file per scenario under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, scenario_key: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", encode_key(scenario_key)?)))
    }

    /// Load with bookkeeping (save time) included
    pub fn load_saved(&self, scenario_key: &str) -> Result<Option<SavedResult>> {
        let path = self.path_for(scenario_key)?;
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl ResultStore for JsonFileStore {
    fn save(&mut self, scenario_key: &str, result: &SimulationResult) -> Result<()> {
        let path = self.path_for(scenario_key)?;
        let saved = SavedResult {
            scenario_key: scenario_key.to_string(),
            saved_at: Utc::now(),
            result: result.clone(),
        };

        // Write then rename so a failed save leaves the old record intact
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&saved)?)?;
        fs::rename(&tmp, &path)?;

        log::info!("saved result {} to {}", saved.scenario_key, path.display());
        Ok(())
    }

    fn load(&self, scenario_key: &str) -> Result<Option<SimulationResult>> {
        Ok(self.load_saved(scenario_key)?.map(|saved| saved.result))
    }
}
