//! The authoritative in-memory session store.
//!
//! `SessionStore` owns all sessions, participants, stories and votes, plus
//! the two cursor values (active session, active story). Every mutation
//! runs to completion synchronously: validate, mutate (cascades computed
//! up front), write the snapshot through the persistence adapter
//! (best-effort), then notify subscribers. Exactly one logical actor
//! drives the store, so there is no locking and no interleaving.

mod voting;

pub use voting::{PendingSwitch, VotingStart};

use crate::error::{PokerError, Result};
use crate::id::new_id;
use crate::participant::{Participant, ParticipantRole};
use crate::session::{CardType, Session};
use crate::snapshot::{Snapshot, SnapshotRepository};
use crate::story::{Story, StoryStatus};
use crate::vote::Vote;

type ChangeListener = Box<dyn Fn() + Send>;

/// Current timestamp in unix milliseconds.
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The owning store for all estimation state.
///
/// Constructed either empty ([`SessionStore::new`]) or hydrated from a
/// persistence adapter ([`SessionStore::with_repository`]). The
/// presentation layer holds the store by reference, issues commands, and
/// re-reads through the accessors after any mutating call.
pub struct SessionStore {
    sessions: Vec<Session>,
    participants: Vec<Participant>,
    stories: Vec<Story>,
    votes: Vec<Vote>,
    active_session_id: Option<String>,
    active_story_id: Option<String>,
    /// Transient two-phase state for switching the story mid-voting.
    /// Never persisted.
    pending_switch: PendingSwitch,
    repository: Option<Box<dyn SnapshotRepository>>,
    listeners: Vec<ChangeListener>,
}

impl SessionStore {
    /// Creates an empty store with no persistence adapter.
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            participants: Vec::new(),
            stories: Vec::new(),
            votes: Vec::new(),
            active_session_id: None,
            active_story_id: None,
            pending_switch: PendingSwitch::None,
            repository: None,
            listeners: Vec::new(),
        }
    }

    /// Creates a store hydrated from the given persistence adapter.
    ///
    /// The adapter's `load` contract guarantees a usable snapshot even
    /// when nothing was stored or the stored data is corrupt, so this
    /// never fails.
    pub fn with_repository(repository: Box<dyn SnapshotRepository>) -> Self {
        let snapshot = repository.load();
        let mut store = Self::new();
        store.repository = Some(repository);
        store.apply_snapshot(snapshot);
        store
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.sessions = snapshot.sessions;
        self.participants = snapshot.participants;
        self.stories = snapshot.stories;
        self.votes = snapshot.votes;
        self.active_session_id = snapshot.active_session_id;
        self.active_story_id = snapshot.active_story_id;
    }

    /// Returns the current state as a flat snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            sessions: self.sessions.clone(),
            participants: self.participants.clone(),
            stories: self.stories.clone(),
            votes: self.votes.clone(),
            active_session_id: self.active_session_id.clone(),
            active_story_id: self.active_story_id.clone(),
        }
    }

    /// Registers a listener invoked after every completed mutation.
    ///
    /// Listeners receive no payload; subscribers re-read whatever state
    /// they render.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs the post-mutation sequence: persist, then notify.
    fn committed(&mut self) {
        self.persist();
        for listener in &self.listeners {
            listener();
        }
    }

    /// Best-effort snapshot write. A failure is logged and swallowed;
    /// in-memory state stays authoritative for the rest of the process.
    fn persist(&self) {
        if let Some(repository) = &self.repository {
            if let Err(error) = repository.save(&self.snapshot()) {
                tracing::warn!("Failed to persist snapshot (state kept in memory): {error:#}");
            }
        }
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    /// Creates a new session and makes it the active one.
    ///
    /// The new session immediately becomes the active session, and the
    /// active story is cleared.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `sprint_name` or `facilitator` is
    /// empty after trimming.
    pub fn create_session(
        &mut self,
        sprint_name: &str,
        facilitator: &str,
        card_type: CardType,
    ) -> Result<Session> {
        let sprint_name = sprint_name.trim();
        let facilitator = facilitator.trim();
        if sprint_name.is_empty() {
            return Err(PokerError::validation("sprint name must not be empty"));
        }
        if facilitator.is_empty() {
            return Err(PokerError::validation("facilitator must not be empty"));
        }

        let session = Session {
            id: new_id(),
            sprint_name: sprint_name.to_string(),
            facilitator: facilitator.to_string(),
            card_type,
            created_at: now_millis(),
            active: true,
        };
        self.sessions.push(session.clone());
        self.active_session_id = Some(session.id.clone());
        self.active_story_id = None;
        self.committed();
        Ok(session)
    }

    /// Deletes a session and everything it owns.
    ///
    /// Cascades to the session's participants, its stories, and those
    /// stories' votes. Clears both cursors when the deleted session was
    /// the active one. Deleting an unknown id is a no-op.
    pub fn delete_session(&mut self, session_id: &str) {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return;
        }

        // Compute the full affected id set before mutating anything, so
        // the cascade cannot be applied partially.
        let story_ids: Vec<String> = self
            .stories
            .iter()
            .filter(|s| s.session_id == session_id)
            .map(|s| s.id.clone())
            .collect();

        self.sessions.retain(|s| s.id != session_id);
        self.participants.retain(|p| p.session_id != session_id);
        self.stories.retain(|s| s.session_id != session_id);
        self.votes.retain(|v| !story_ids.contains(&v.story_id));

        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = None;
            self.active_story_id = None;
        }
        self.committed();
    }

    /// Moves the active-session cursor.
    ///
    /// Switching sessions always clears the active story; no story is in
    /// focus right after a switch.
    pub fn set_active_session(&mut self, session_id: Option<&str>) {
        self.active_session_id = session_id.map(str::to_string);
        self.active_story_id = None;
        self.committed();
    }

    // ============================================================================
    // Participants
    // ============================================================================

    /// Adds a participant to a session. Names need not be unique.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name, or a not-found error
    /// when the session does not exist.
    pub fn add_participant(
        &mut self,
        name: &str,
        role: ParticipantRole,
        session_id: &str,
    ) -> Result<Participant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PokerError::validation("participant name must not be empty"));
        }
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(PokerError::not_found("session", session_id));
        }

        let participant = Participant {
            id: new_id(),
            name: name.to_string(),
            role,
            session_id: session_id.to_string(),
        };
        self.participants.push(participant.clone());
        self.committed();
        Ok(participant)
    }

    /// Removes a participant and every vote they cast, across all
    /// stories. Removing an unknown id is a no-op.
    pub fn remove_participant(&mut self, participant_id: &str) {
        if !self.participants.iter().any(|p| p.id == participant_id) {
            return;
        }
        self.participants.retain(|p| p.id != participant_id);
        self.votes.retain(|v| v.participant_id != participant_id);
        self.committed();
    }

    // ============================================================================
    // Stories
    // ============================================================================

    /// Adds a story to a session.
    ///
    /// When `explicit_id` is given it is used verbatim, so business keys
    /// like ticket numbers can serve as story ids; otherwise an id is
    /// generated. The story starts `Pending` with no estimate.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title, or a not-found
    /// error when the session does not exist.
    pub fn add_story(
        &mut self,
        session_id: &str,
        title: &str,
        description: &str,
        explicit_id: Option<&str>,
    ) -> Result<Story> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PokerError::validation("story title must not be empty"));
        }
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(PokerError::not_found("session", session_id));
        }

        let story = Story {
            id: explicit_id.map(str::to_string).unwrap_or_else(new_id),
            session_id: session_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            status: StoryStatus::Pending,
            final_estimate: None,
            created_at: now_millis(),
        };
        self.stories.push(story.clone());
        self.committed();
        Ok(story)
    }

    /// Removes a story and its votes; clears the active-story cursor if
    /// it pointed here. Removing an unknown id is a no-op.
    pub fn remove_story(&mut self, story_id: &str) {
        if !self.stories.iter().any(|s| s.id == story_id) {
            return;
        }
        self.stories.retain(|s| s.id != story_id);
        self.votes.retain(|v| v.story_id != story_id);
        if self.active_story_id.as_deref() == Some(story_id) {
            self.active_story_id = None;
        }
        self.committed();
    }

    /// Sets a story's status, keeping status and estimate in lockstep: a
    /// story only carries an estimate while `Estimated`.
    fn set_story_status(&mut self, story_id: &str, status: StoryStatus) {
        if let Some(story) = self.stories.iter_mut().find(|s| s.id == story_id) {
            story.status = status;
            if status != StoryStatus::Estimated {
                story.final_estimate = None;
            }
        }
    }

    // ============================================================================
    // Read accessors
    // ============================================================================

    /// All sessions, newest first.
    pub fn sessions(&self) -> Vec<Session> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    pub fn get_session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Participants of one session, in insertion order.
    pub fn get_session_participants(&self, session_id: &str) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|p| p.session_id == session_id)
            .collect()
    }

    /// Stories of one session, in insertion order.
    pub fn get_session_stories(&self, session_id: &str) -> Vec<&Story> {
        self.stories
            .iter()
            .filter(|s| s.session_id == session_id)
            .collect()
    }

    /// Live votes on one story (the current round).
    pub fn get_story_votes(&self, story_id: &str) -> Vec<&Vote> {
        self.votes
            .iter()
            .filter(|v| v.story_id == story_id)
            .collect()
    }

    pub fn get_active_session(&self) -> Option<&Session> {
        let active_id = self.active_session_id.as_deref()?;
        self.get_session(active_id)
    }

    pub fn get_active_story(&self) -> Option<&Story> {
        let active_id = self.active_story_id.as_deref()?;
        self.stories.iter().find(|s| s.id == active_id)
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session_id.as_deref()
    }

    pub fn active_story_id(&self) -> Option<&str> {
        self.active_story_id.as_deref()
    }

    /// Whether a story's round is face up: true iff the story has at
    /// least one vote and every vote is revealed. Always derived from the
    /// vote set, never stored.
    pub fn is_revealed(&self, story_id: &str) -> bool {
        let mut votes = self
            .votes
            .iter()
            .filter(|v| v.story_id == story_id)
            .peekable();
        votes.peek().is_some() && votes.all(|v| v.revealed)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
