//! Infrastructure implementations for the planpoker core.
//!
//! Provides the durable side of the [`planpoker_core::snapshot::SnapshotRepository`]
//! seam: a JSON snapshot file on the local filesystem.

pub mod json_snapshot_repository;

pub use json_snapshot_repository::JsonSnapshotRepository;
