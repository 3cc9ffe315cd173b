//! Vote domain module.

mod model;

pub use model::Vote;
