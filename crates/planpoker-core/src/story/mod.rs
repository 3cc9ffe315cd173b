//! Story domain module.

mod model;

pub use model::{Story, StoryStatus};
