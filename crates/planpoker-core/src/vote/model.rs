//! Vote domain model.

use serde::{Deserialize, Serialize};

/// One participant's submission for one story in the current round.
///
/// At most one live vote exists per (story, participant) pair; casting
/// again replaces the earlier vote. Whether a story's round counts as
/// "revealed" is always derived from its vote set, never stored on the
/// story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Unique vote identifier
    pub id: String,
    /// The story being voted on
    pub story_id: String,
    /// The participant who cast the vote
    pub participant_id: String,
    /// Chosen card value; empty means not yet cast
    pub value: String,
    /// Whether this vote has been turned face up
    pub revealed: bool,
    /// Submission timestamp (unix milliseconds)
    pub timestamp: i64,
}
