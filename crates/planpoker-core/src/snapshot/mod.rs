//! Snapshot persistence module.
//!
//! - `model`: the flat durable snapshot of all store state (`Snapshot`)
//! - `repository`: the persistence adapter seam (`SnapshotRepository`)

mod model;
mod repository;

pub use model::Snapshot;
pub use repository::SnapshotRepository;
