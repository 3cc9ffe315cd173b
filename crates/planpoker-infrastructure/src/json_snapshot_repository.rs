//! JSON-file snapshot persistence.

use anyhow::{Context, Result};
use planpoker_core::snapshot::{Snapshot, SnapshotRepository};
use std::fs;
use std::path::{Path, PathBuf};

/// Persists the store snapshot as one pretty-printed JSON file.
///
/// The whole snapshot is rewritten on every save; there is no partial
/// update and no schema versioning. Reading is forgiving by contract:
/// a missing or unreadable file loads as the default empty snapshot.
pub struct JsonSnapshotRepository {
    file_path: PathBuf,
}

impl JsonSnapshotRepository {
    /// Creates a repository backed by the given file path.
    ///
    /// The file and its parent directories are created lazily on the
    /// first save.
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Creates a repository at the default location
    /// (`~/.planpoker/snapshot.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Ok(Self::new(home_dir.join(".planpoker").join("snapshot.json")))
    }

    fn read_snapshot(&self) -> Result<Snapshot> {
        let json = fs::read_to_string(&self.file_path)
            .context(format!("Failed to read snapshot file: {:?}", self.file_path))?;
        let snapshot: Snapshot =
            serde_json::from_str(&json).context("Failed to deserialize snapshot")?;
        Ok(snapshot)
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self) -> Snapshot {
        if !self.file_path.exists() {
            return Snapshot::default();
        }
        match self.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(
                    "Discarding unreadable snapshot {:?}: {error:#}",
                    self.file_path
                );
                Snapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }
        let json =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        fs::write(&self.file_path, json)
            .context(format!("Failed to write snapshot file: {:?}", self.file_path))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context(format!(
                "Failed to delete snapshot file: {:?}",
                self.file_path
            ))?;
        }
        Ok(())
    }
}
