//! Participant domain model.

use serde::{Deserialize, Serialize};

/// The role a participant plays in the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Developer,
    #[serde(rename = "QA")]
    Qa,
    #[serde(rename = "PO")]
    Po,
    #[serde(rename = "SM")]
    Sm,
}

/// A voting member of exactly one session.
///
/// Participants live independently of the story lifecycle; removing one
/// cascades to the votes that participant cast across all stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier
    pub id: String,
    /// Display name (no uniqueness constraint)
    pub name: String,
    /// Team role
    pub role: ParticipantRole,
    /// The session this participant belongs to
    pub session_id: String,
}
