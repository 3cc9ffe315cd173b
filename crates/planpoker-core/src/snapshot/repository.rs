//! Snapshot repository trait.
//!
//! Defines the interface for durable snapshot persistence.

use super::model::Snapshot;
use anyhow::Result;

/// An abstract adapter for persisting the store snapshot.
///
/// This trait decouples the session store from the specific storage
/// mechanism (a JSON file, a key-value store, an in-memory fake in tests).
/// The store writes through it after every mutation and reads through it
/// once at startup.
///
/// # Implementation Notes
///
/// Persistence is best-effort: a failed `save` is logged by the store and
/// otherwise ignored, and `load` must swallow missing or corrupt data by
/// returning the default empty snapshot. In-memory state stays
/// authoritative either way.
pub trait SnapshotRepository: Send {
    /// Loads the persisted snapshot.
    ///
    /// Returns the default empty snapshot when no data exists or the data
    /// is unreadable; corruption is never surfaced to the caller.
    fn load(&self) -> Snapshot;

    /// Persists the given snapshot, replacing whatever was stored before.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Removes the persisted snapshot entirely.
    fn clear(&self) -> Result<()>;
}
