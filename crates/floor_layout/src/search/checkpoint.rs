//! Destinations for periodic search snapshots.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::search::output::SolutionSet;

/// Receives checkpoint snapshots from the engine.
///
/// A failed write is reported and skipped; it never aborts the search.
pub trait CheckpointSink {
    /// Persists `snapshot` and returns a short description of where it went.
    fn write(&mut self, snapshot: &SolutionSet) -> Result<String>;
}

/// Writes each snapshot as pretty JSON, replacing the previous one.
///
/// The file is first written next to the target and then renamed over it, so readers
/// only ever see complete snapshots.
#[derive(Clone, Debug)]
pub struct JsonCheckpointWriter {
    path: PathBuf,
}

impl JsonCheckpointWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CheckpointSink for JsonCheckpointWriter {
    fn write(&mut self, snapshot: &SolutionSet) -> Result<String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = snapshot.to_json_pretty()?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(self.path.display().to_string())
    }
}

/// Keeps every snapshot in memory.
#[derive(Clone, Debug, Default)]
pub struct VecCheckpoints {
    snapshots: Vec<SolutionSet>,
}

impl VecCheckpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[SolutionSet] {
        &self.snapshots
    }
}

impl CheckpointSink for VecCheckpoints {
    fn write(&mut self, snapshot: &SolutionSet) -> Result<String> {
        self.snapshots.push(snapshot.clone());
        Ok(format!("memory #{}", self.snapshots.len()))
    }
}
