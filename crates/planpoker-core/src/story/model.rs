//! Story domain model.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a story.
///
/// `Pending → Voting → Estimated`, with a reset back-edge
/// `Voting → Voting` and an orchestration back-edge `Estimated → Voting`
/// (a finished story can be put up for another round). `Estimated` holds
/// exactly when a final estimate is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    Pending,
    Voting,
    Estimated,
}

/// One estimable work item, owned by exactly one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Identifier; either an externally supplied business key (e.g. a
    /// ticket number) or generated
    pub id: String,
    /// The session this story belongs to
    pub session_id: String,
    /// Short title
    pub title: String,
    /// Free-text description, may be empty
    pub description: String,
    /// Lifecycle state
    pub status: StoryStatus,
    /// Agreed estimate; set exactly when `status` is `Estimated`
    pub final_estimate: Option<String>,
    /// Creation timestamp (unix milliseconds)
    pub created_at: i64,
}
