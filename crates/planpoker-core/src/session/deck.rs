//! Card decks.
//!
//! A session votes with exactly one deck; the deck fixes the set of
//! permissible vote values and how results are aggregated.

use serde::{Deserialize, Serialize};

/// Vote values of the fibonacci deck.
pub const FIBONACCI_CARDS: &[&str] = &["1", "2", "3", "5", "8", "13", "21"];

/// Vote values of the t-shirt size deck, in ordinal order.
pub const SIZE_CARDS: &[&str] = &["S", "M", "L", "XL"];

/// The card deck a session estimates with.
///
/// `Fibonacci` values are numeric and support an average; `Size` values
/// are ordinal labels compared under `S < M < L < XL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Fibonacci,
    Size,
}

impl CardType {
    /// Returns the permissible vote values for this deck.
    pub fn cards(&self) -> &'static [&'static str] {
        match self {
            CardType::Fibonacci => FIBONACCI_CARDS,
            CardType::Size => SIZE_CARDS,
        }
    }
}
