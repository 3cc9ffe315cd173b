//! Session domain module.
//!
//! - `model`: the session entity (`Session`)
//! - `deck`: card deck types and their permissible vote values

mod deck;
mod model;

pub use deck::{CardType, FIBONACCI_CARDS, SIZE_CARDS};
pub use model::Session;
