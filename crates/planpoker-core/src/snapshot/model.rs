//! Durable snapshot model.

use crate::participant::Participant;
use crate::session::Session;
use crate::story::Story;
use crate::vote::Vote;
use serde::{Deserialize, Serialize};

/// The full store state as one flat structure, written after every
/// mutation and read back at startup.
///
/// There is no schema versioning; every field defaults when absent, so a
/// partial or older snapshot still deserializes into something usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub active_session_id: Option<String>,
    #[serde(default)]
    pub active_story_id: Option<String>,
}
