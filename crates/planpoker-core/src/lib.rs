//! Planning-poker estimation core.
//!
//! This crate holds the authoritative state for estimation sessions: the
//! entities (sessions, participants, stories, votes), the voting state
//! machine, and the pure result aggregator. Persistence and presentation
//! are external collaborators; the store talks to the former through the
//! [`snapshot::SnapshotRepository`] trait and to the latter through its
//! public operations and read accessors.

pub mod error;
pub mod id;
pub mod participant;
pub mod results;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod story;
pub mod vote;

// Re-export common types
pub use error::PokerError;
pub use store::SessionStore;
