//! Story voting orchestration.
//!
//! The voting state machine on top of the store: starting a round,
//! casting and revealing votes, resetting, committing a final estimate
//! and advancing through the backlog. A session has at most one story in
//! voting at a time; moving the round to a different story mid-voting is
//! a two-phase command so in-flight votes are never discarded silently.

use super::{now_millis, SessionStore};
use crate::error::{PokerError, Result};
use crate::id::new_id;
use crate::story::{Story, StoryStatus};
use crate::vote::Vote;

/// Transient two-phase state for moving the voting round to another
/// story while one is already active.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingSwitch {
    /// No switch awaiting confirmation.
    #[default]
    None,
    /// A switch to the named story was requested and is waiting for
    /// [`SessionStore::confirm_story_switch`] or
    /// [`SessionStore::cancel_story_switch`].
    Requested { target_story_id: String },
}

/// Outcome of [`SessionStore::start_voting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VotingStart {
    /// The story is now in voting and is the active story.
    Started,
    /// A different story is currently active; nothing was mutated. The
    /// switch is pending until confirmed or cancelled.
    NeedsConfirmation { active_story_id: String },
}

impl SessionStore {
    /// Puts a story up for voting.
    ///
    /// If no story is active (or the story is already the active one)
    /// the switch happens immediately. If a *different* story is active,
    /// its in-flight votes would be discarded, so the command stops and
    /// records a pending switch instead; the caller must confirm or
    /// cancel.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the story does not exist.
    pub fn start_voting(&mut self, story_id: &str) -> Result<VotingStart> {
        if !self.stories.iter().any(|s| s.id == story_id) {
            return Err(PokerError::not_found("story", story_id));
        }

        if let Some(active_id) = self.active_story_id.clone() {
            if active_id != story_id {
                self.pending_switch = PendingSwitch::Requested {
                    target_story_id: story_id.to_string(),
                };
                return Ok(VotingStart::NeedsConfirmation {
                    active_story_id: active_id,
                });
            }
        }

        self.switch_to(story_id);
        Ok(VotingStart::Started)
    }

    /// Executes the pending story switch, discarding the previous active
    /// story's votes and reverting it to `Pending`. No-op when nothing
    /// is pending.
    pub fn confirm_story_switch(&mut self) {
        if let PendingSwitch::Requested { target_story_id } =
            std::mem::take(&mut self.pending_switch)
        {
            self.switch_to(&target_story_id);
        }
    }

    /// Drops the pending story switch, leaving the current round
    /// untouched. No-op when nothing is pending.
    pub fn cancel_story_switch(&mut self) {
        self.pending_switch = PendingSwitch::None;
    }

    /// The current pending-switch state.
    pub fn pending_switch(&self) -> &PendingSwitch {
        &self.pending_switch
    }

    /// Moves the voting round to `story_id`. The previous active story,
    /// if different, loses its votes and reverts to `Pending`.
    fn switch_to(&mut self, story_id: &str) {
        if let Some(previous_id) = self.active_story_id.take() {
            if previous_id != story_id {
                self.votes.retain(|v| v.story_id != previous_id);
                self.set_story_status(&previous_id, StoryStatus::Pending);
            }
        }
        self.set_story_status(story_id, StoryStatus::Voting);
        self.active_story_id = Some(story_id.to_string());
        self.committed();
    }

    /// Casts (or replaces) a participant's vote on a story.
    ///
    /// An upsert keyed on (story, participant): the prior vote for the
    /// pair, if any, is replaced by a fresh one with a new id and
    /// timestamp. A vote cast while the story's round is already face up
    /// lands revealed, so a late vote never flips the board back to
    /// hidden.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the story or participant does not
    /// exist, and a validation error when they belong to different
    /// sessions.
    pub fn cast_vote(
        &mut self,
        story_id: &str,
        participant_id: &str,
        value: &str,
    ) -> Result<Vote> {
        let Some(story) = self.stories.iter().find(|s| s.id == story_id) else {
            return Err(PokerError::not_found("story", story_id));
        };
        let Some(participant) = self.participants.iter().find(|p| p.id == participant_id) else {
            return Err(PokerError::not_found("participant", participant_id));
        };
        if story.session_id != participant.session_id {
            return Err(PokerError::validation(
                "participant and story belong to different sessions",
            ));
        }

        let revealed = self.is_revealed(story_id);
        self.votes
            .retain(|v| !(v.story_id == story_id && v.participant_id == participant_id));
        let vote = Vote {
            id: new_id(),
            story_id: story_id.to_string(),
            participant_id: participant_id.to_string(),
            value: value.to_string(),
            revealed,
            timestamp: now_millis(),
        };
        self.votes.push(vote.clone());
        self.committed();
        Ok(vote)
    }

    /// Turns every vote on the story face up. Status is unchanged;
    /// revealing an unknown or vote-less story is a no-op.
    pub fn reveal_votes(&mut self, story_id: &str) {
        for vote in self.votes.iter_mut().filter(|v| v.story_id == story_id) {
            vote.revealed = true;
        }
        self.committed();
    }

    /// Starts a fresh round: deletes every vote on the story and forces
    /// its status to `Voting`, regardless of what it was before.
    pub fn reset_votes(&mut self, story_id: &str) {
        self.votes.retain(|v| v.story_id != story_id);
        self.set_story_status(story_id, StoryStatus::Voting);
        self.committed();
    }

    /// Records the agreed estimate and finishes the story's round.
    ///
    /// The story moves to `Estimated` and, if it was the active story,
    /// the active-story cursor is cleared. Estimating an unknown story
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the estimate is empty after
    /// trimming.
    pub fn set_final_estimate(&mut self, story_id: &str, estimate: &str) -> Result<()> {
        let estimate = estimate.trim();
        if estimate.is_empty() {
            return Err(PokerError::validation("final estimate must not be empty"));
        }
        let Some(story) = self.stories.iter_mut().find(|s| s.id == story_id) else {
            return Ok(());
        };
        story.final_estimate = Some(estimate.to_string());
        story.status = StoryStatus::Estimated;
        if self.active_story_id.as_deref() == Some(story_id) {
            self.active_story_id = None;
        }
        self.committed();
        Ok(())
    }

    /// Moves the round to the next story in the session's insertion
    /// order.
    ///
    /// When `staged_estimate` is given it is committed to the current
    /// story first (which then moves to `Estimated`); otherwise the
    /// current story keeps its status. The next story starts a clean
    /// round: votes cleared, status `Voting`, cursor moved. Returns the
    /// new active story, or `None` (no-op) when there is no active story
    /// or no story after it.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a staged estimate is empty after
    /// trimming.
    pub fn advance_to_next_story(&mut self, staged_estimate: Option<&str>) -> Result<Option<Story>> {
        let Some(current_id) = self.active_story_id.clone() else {
            return Ok(None);
        };
        let Some(current) = self.stories.iter().find(|s| s.id == current_id) else {
            return Ok(None);
        };

        let session_id = current.session_id.clone();
        let ordered: Vec<String> = self
            .stories
            .iter()
            .filter(|s| s.session_id == session_id)
            .map(|s| s.id.clone())
            .collect();
        let next_id = ordered
            .iter()
            .position(|id| *id == current_id)
            .and_then(|index| ordered.get(index + 1))
            .cloned();
        let Some(next_id) = next_id else {
            return Ok(None);
        };

        if let Some(estimate) = staged_estimate {
            let estimate = estimate.trim();
            if estimate.is_empty() {
                return Err(PokerError::validation("final estimate must not be empty"));
            }
            if let Some(story) = self.stories.iter_mut().find(|s| s.id == current_id) {
                story.final_estimate = Some(estimate.to_string());
                story.status = StoryStatus::Estimated;
            }
        }

        self.votes.retain(|v| v.story_id != next_id);
        self.set_story_status(&next_id, StoryStatus::Voting);
        self.active_story_id = Some(next_id.clone());
        self.committed();
        Ok(self.stories.iter().find(|s| s.id == next_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, ParticipantRole};
    use crate::session::CardType;

    struct Fixture {
        store: SessionStore,
        session_id: String,
        ann: Participant,
        bob: Participant,
    }

    fn fixture() -> Fixture {
        let mut store = SessionStore::new();
        let session = store
            .create_session("Sprint 12", "Dana", CardType::Fibonacci)
            .unwrap();
        let ann = store
            .add_participant("Ann", ParticipantRole::Developer, &session.id)
            .unwrap();
        let bob = store
            .add_participant("Bob", ParticipantRole::Qa, &session.id)
            .unwrap();
        Fixture {
            store,
            session_id: session.id,
            ann,
            bob,
        }
    }

    impl Fixture {
        fn add_story(&mut self, title: &str) -> Story {
            self.store
                .add_story(&self.session_id, title, "", None)
                .unwrap()
        }
    }

    #[test]
    fn test_start_voting_moves_story_to_voting() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");

        let outcome = fx.store.start_voting(&story.id).unwrap();

        assert_eq!(outcome, VotingStart::Started);
        assert_eq!(fx.store.active_story_id(), Some(story.id.as_str()));
        assert_eq!(
            fx.store.get_active_story().unwrap().status,
            StoryStatus::Voting
        );
    }

    #[test]
    fn test_start_voting_on_unknown_story_fails() {
        let mut fx = fixture();
        assert!(fx.store.start_voting("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_switching_stories_mid_voting_needs_confirmation() {
        let mut fx = fixture();
        let story_a = fx.add_story("Story A");
        let story_b = fx.add_story("Story B");
        fx.store.start_voting(&story_a.id).unwrap();
        fx.store.cast_vote(&story_a.id, &fx.ann.id, "5").unwrap();

        let outcome = fx.store.start_voting(&story_b.id).unwrap();

        assert_eq!(
            outcome,
            VotingStart::NeedsConfirmation {
                active_story_id: story_a.id.clone()
            }
        );
        // Nothing changed yet.
        assert_eq!(fx.store.active_story_id(), Some(story_a.id.as_str()));
        assert_eq!(fx.store.get_story_votes(&story_a.id).len(), 1);
        assert_eq!(
            fx.store.pending_switch(),
            &PendingSwitch::Requested {
                target_story_id: story_b.id.clone()
            }
        );
    }

    #[test]
    fn test_confirming_switch_discards_votes_and_reverts_story() {
        let mut fx = fixture();
        let story_a = fx.add_story("Story A");
        let story_b = fx.add_story("Story B");
        fx.store.start_voting(&story_a.id).unwrap();
        fx.store.cast_vote(&story_a.id, &fx.ann.id, "5").unwrap();
        fx.store.start_voting(&story_b.id).unwrap();

        fx.store.confirm_story_switch();

        assert!(fx.store.get_story_votes(&story_a.id).is_empty());
        let stories = fx.store.get_session_stories(&fx.session_id);
        assert_eq!(stories[0].status, StoryStatus::Pending);
        assert_eq!(stories[1].status, StoryStatus::Voting);
        assert_eq!(fx.store.active_story_id(), Some(story_b.id.as_str()));
        assert_eq!(fx.store.pending_switch(), &PendingSwitch::None);
    }

    #[test]
    fn test_cancelling_switch_leaves_round_untouched() {
        let mut fx = fixture();
        let story_a = fx.add_story("Story A");
        let story_b = fx.add_story("Story B");
        fx.store.start_voting(&story_a.id).unwrap();
        fx.store.cast_vote(&story_a.id, &fx.ann.id, "5").unwrap();
        fx.store.start_voting(&story_b.id).unwrap();

        fx.store.cancel_story_switch();

        assert_eq!(fx.store.active_story_id(), Some(story_a.id.as_str()));
        assert_eq!(fx.store.get_story_votes(&story_a.id).len(), 1);
        assert_eq!(fx.store.pending_switch(), &PendingSwitch::None);

        // Confirming now is a no-op.
        fx.store.confirm_story_switch();
        assert_eq!(fx.store.active_story_id(), Some(story_a.id.as_str()));
    }

    #[test]
    fn test_cast_vote_is_an_upsert_per_participant() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();

        let first = fx.store.cast_vote(&story.id, &fx.ann.id, "3").unwrap();
        let second = fx.store.cast_vote(&story.id, &fx.ann.id, "8").unwrap();

        let votes = fx.store.get_story_votes(&story.id);
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, "8");
        assert_ne!(first.id, second.id);
        assert!(second.timestamp >= first.timestamp);
    }

    #[test]
    fn test_cast_vote_checks_references() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        assert!(fx
            .store
            .cast_vote("missing", &fx.ann.id, "3")
            .unwrap_err()
            .is_not_found());
        assert!(fx
            .store
            .cast_vote(&story.id, "missing", "3")
            .unwrap_err()
            .is_not_found());

        // Participant from another session cannot vote here.
        let other = fx
            .store
            .create_session("Sprint 13", "Eve", CardType::Size)
            .unwrap();
        let outsider = fx
            .store
            .add_participant("Zed", ParticipantRole::Sm, &other.id)
            .unwrap();
        assert!(fx
            .store
            .cast_vote(&story.id, &outsider.id, "3")
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_is_revealed_is_derived_from_the_vote_set() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();

        // No votes: not revealed.
        assert!(!fx.store.is_revealed(&story.id));

        fx.store.cast_vote(&story.id, &fx.ann.id, "3").unwrap();
        fx.store.cast_vote(&story.id, &fx.bob.id, "5").unwrap();
        assert!(!fx.store.is_revealed(&story.id));

        fx.store.reveal_votes(&story.id);
        assert!(fx.store.is_revealed(&story.id));
        assert_eq!(
            fx.store.get_active_story().unwrap().status,
            StoryStatus::Voting
        );
    }

    #[test]
    fn test_late_vote_after_reveal_stays_revealed() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();
        fx.store.cast_vote(&story.id, &fx.ann.id, "3").unwrap();
        fx.store.reveal_votes(&story.id);

        // Bob votes after the reveal; the board stays face up.
        fx.store.cast_vote(&story.id, &fx.bob.id, "5").unwrap();
        assert!(fx.store.is_revealed(&story.id));

        // After a reset the next round starts hidden again.
        fx.store.reset_votes(&story.id);
        fx.store.cast_vote(&story.id, &fx.ann.id, "3").unwrap();
        assert!(!fx.store.is_revealed(&story.id));
    }

    #[test]
    fn test_reset_votes_clears_votes_and_forces_voting() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();
        fx.store.cast_vote(&story.id, &fx.ann.id, "3").unwrap();
        fx.store.set_final_estimate(&story.id, "5").unwrap();
        assert_eq!(
            fx.store.get_session_stories(&fx.session_id)[0].status,
            StoryStatus::Estimated
        );

        fx.store.reset_votes(&story.id);

        let stories = fx.store.get_session_stories(&fx.session_id);
        assert!(fx.store.get_story_votes(&story.id).is_empty());
        assert_eq!(stories[0].status, StoryStatus::Voting);
        assert_eq!(stories[0].final_estimate, None);
    }

    #[test]
    fn test_final_estimate_finishes_the_round() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();
        fx.store.cast_vote(&story.id, &fx.ann.id, "5").unwrap();

        fx.store.set_final_estimate(&story.id, "5").unwrap();

        let stories = fx.store.get_session_stories(&fx.session_id);
        assert_eq!(stories[0].status, StoryStatus::Estimated);
        assert_eq!(stories[0].final_estimate.as_deref(), Some("5"));
        assert_eq!(fx.store.active_story_id(), None);
    }

    #[test]
    fn test_final_estimate_validation_and_missing_story() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        assert!(fx
            .store
            .set_final_estimate(&story.id, "  ")
            .unwrap_err()
            .is_validation());
        // Unknown story: silently ignored.
        fx.store.set_final_estimate("missing", "5").unwrap();
    }

    #[test]
    fn test_advance_commits_staged_estimate_and_starts_next_round() {
        let mut fx = fixture();
        let story_a = fx.add_story("Story A");
        let story_b = fx.add_story("Story B");
        fx.store.start_voting(&story_a.id).unwrap();
        fx.store.cast_vote(&story_a.id, &fx.ann.id, "5").unwrap();
        // Stale votes on B from an earlier round.
        fx.store.cast_vote(&story_b.id, &fx.bob.id, "13").unwrap();

        let next = fx.store.advance_to_next_story(Some("5")).unwrap().unwrap();

        assert_eq!(next.id, story_b.id);
        assert_eq!(next.status, StoryStatus::Voting);
        assert_eq!(fx.store.active_story_id(), Some(story_b.id.as_str()));
        assert!(fx.store.get_story_votes(&story_b.id).is_empty());

        let stories = fx.store.get_session_stories(&fx.session_id);
        assert_eq!(stories[0].status, StoryStatus::Estimated);
        assert_eq!(stories[0].final_estimate.as_deref(), Some("5"));
    }

    #[test]
    fn test_advance_without_staged_estimate_keeps_current_status() {
        let mut fx = fixture();
        let story_a = fx.add_story("Story A");
        let _story_b = fx.add_story("Story B");
        fx.store.start_voting(&story_a.id).unwrap();

        fx.store.advance_to_next_story(None).unwrap().unwrap();

        let stories = fx.store.get_session_stories(&fx.session_id);
        assert_eq!(stories[0].status, StoryStatus::Voting);
        assert_eq!(stories[0].final_estimate, None);
    }

    #[test]
    fn test_advance_with_no_next_story_is_a_noop() {
        let mut fx = fixture();
        let story = fx.add_story("Only story");
        fx.store.start_voting(&story.id).unwrap();

        assert_eq!(fx.store.advance_to_next_story(Some("8")).unwrap(), None);
        // Last story keeps voting; nothing was committed.
        assert_eq!(fx.store.active_story_id(), Some(story.id.as_str()));
        assert_eq!(
            fx.store.get_active_story().unwrap().final_estimate,
            None
        );
    }

    #[test]
    fn test_advance_without_active_story_is_a_noop() {
        let mut fx = fixture();
        fx.add_story("Story A");
        assert_eq!(fx.store.advance_to_next_story(None).unwrap(), None);
    }

    #[test]
    fn test_estimated_story_can_return_to_voting() {
        let mut fx = fixture();
        let story = fx.add_story("Story A");
        fx.store.start_voting(&story.id).unwrap();
        fx.store.set_final_estimate(&story.id, "8").unwrap();

        let outcome = fx.store.start_voting(&story.id).unwrap();

        assert_eq!(outcome, VotingStart::Started);
        let active = fx.store.get_active_story().unwrap();
        assert_eq!(active.status, StoryStatus::Voting);
        assert_eq!(active.final_estimate, None);
    }
}
