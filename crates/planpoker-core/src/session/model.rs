//! Session domain model.

use super::deck::CardType;
use serde::{Deserialize, Serialize};

/// One estimation workshop grouping participants and stories.
///
/// Sessions are created whole and never mutated afterwards; deleting one
/// cascades to its participants, stories and those stories' votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Name of the sprint being estimated
    pub sprint_name: String,
    /// Display name of the facilitator running the workshop
    pub facilitator: String,
    /// The card deck this session votes with
    pub card_type: CardType,
    /// Creation timestamp (unix milliseconds)
    pub created_at: i64,
    /// Whether the session is open for estimation
    pub active: bool,
}
