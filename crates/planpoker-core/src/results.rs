//! Result aggregation.
//!
//! A pure function from a story's vote set to summary statistics. The
//! store never calls this itself; the presentation layer does, with
//! whatever vote set it just read.

use crate::session::{CardType, SIZE_CARDS};
use crate::vote::Vote;
use serde::Serialize;

/// Summary statistics over one story's current voting round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteSummary {
    /// Mean of the numeric votes, one decimal place. Fibonacci only.
    pub average: Option<f64>,
    /// Most common value; ties keep the first-encountered value
    pub mode: Option<String>,
    /// Smallest cast value under the deck's ordering
    pub min: Option<String>,
    /// Largest cast value under the deck's ordering
    pub max: Option<String>,
    /// Whether every cast vote chose the same value
    pub consensus: bool,
    /// Value to number of voters, in first-encountered order
    pub distribution: Vec<(String, u32)>,
    /// Number of cast (non-empty) votes
    pub voted_count: usize,
    /// Total participants, echoed so callers can show "N of M voted"
    pub total_participants: usize,
}

impl VoteSummary {
    fn empty(total_participants: usize) -> Self {
        Self {
            average: None,
            mode: None,
            min: None,
            max: None,
            consensus: false,
            distribution: Vec::new(),
            voted_count: 0,
            total_participants,
        }
    }
}

/// Aggregates the votes of one story into a [`VoteSummary`].
///
/// Only votes with a non-empty value count as cast. With zero cast votes
/// every statistic is empty and there is no consensus. For the fibonacci
/// deck, non-numeric values are excluded from average/min/max but still
/// appear in the distribution; for the size deck, values are compared
/// under `S < M < L < XL` with unknown values ranking last.
pub fn summarize_votes(
    votes: &[Vote],
    total_participants: usize,
    card_type: CardType,
) -> VoteSummary {
    let cast: Vec<&Vote> = votes.iter().filter(|v| !v.value.is_empty()).collect();
    let voted_count = cast.len();

    if voted_count == 0 {
        return VoteSummary::empty(total_participants);
    }

    let mut distribution: Vec<(String, u32)> = Vec::new();
    for vote in &cast {
        match distribution.iter_mut().find(|(value, _)| *value == vote.value) {
            Some((_, count)) => *count += 1,
            None => distribution.push((vote.value.clone(), 1)),
        }
    }

    // Highest count wins; on a tie the first-encountered value stays.
    let mut mode = distribution[0].0.clone();
    let mut best_count = distribution[0].1;
    for (value, count) in &distribution[1..] {
        if *count > best_count {
            best_count = *count;
            mode = value.clone();
        }
    }

    let consensus = distribution.len() == 1;

    let (average, min, max) = match card_type {
        CardType::Fibonacci => {
            let numeric: Vec<i64> = cast
                .iter()
                .filter_map(|v| v.value.parse::<i64>().ok())
                .collect();
            let average = if numeric.is_empty() {
                None
            } else {
                let mean = numeric.iter().sum::<i64>() as f64 / numeric.len() as f64;
                // One decimal place, half rounds away from zero
                Some((mean * 10.0).round() / 10.0)
            };
            let min = numeric.iter().min().map(i64::to_string);
            let max = numeric.iter().max().map(i64::to_string);
            (average, min, max)
        }
        CardType::Size => {
            let mut values: Vec<&str> = cast.iter().map(|v| v.value.as_str()).collect();
            // Stable sort, so unknown values keep their original order
            values.sort_by_key(|value| size_rank(value));
            let min = values.first().map(|v| v.to_string());
            let max = values.last().map(|v| v.to_string());
            (None, min, max)
        }
    };

    VoteSummary {
        average,
        mode: Some(mode),
        min,
        max,
        consensus,
        distribution,
        voted_count,
        total_participants,
    }
}

/// Ordinal rank of a size card; values outside the deck sort last.
fn size_rank(value: &str) -> usize {
    SIZE_CARDS
        .iter()
        .position(|card| *card == value)
        .unwrap_or(usize::MAX)
}
