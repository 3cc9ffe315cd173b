//! Participant domain module.

mod model;

pub use model::{Participant, ParticipantRole};
