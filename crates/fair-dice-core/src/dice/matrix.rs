//! Pairwise win probabilities between dice.

use super::die::Die;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Exact outcome counts of one die against another over all face pairs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinOdds {
    /// Pairs where the first die's face is strictly greater
    pub wins: u64,
    /// Pairs with equal faces
    pub ties: u64,
    /// All face pairs
    pub total: u64,
}

impl WinOdds {
    /// Count strict wins and ties of `a` against `b`
    pub fn between(a: &Die, b: &Die) -> Self {
        let mut wins = 0;
        let mut ties = 0;
        for &x in a.faces() {
            for &y in b.faces() {
                match x.cmp(&y) {
                    Ordering::Greater => wins += 1,
                    Ordering::Equal => ties += 1,
                    Ordering::Less => {}
                }
            }
        }

        Self {
            wins,
            ties,
            total: (a.count() * b.count()) as u64,
        }
    }

    pub fn probability(&self) -> f64 {
        self.wins as f64 / self.total as f64
    }

    pub fn tie_rate(&self) -> f64 {
        self.ties as f64 / self.total as f64
    }

    /// Compare win probabilities exactly, without floating point
    pub fn cmp_probability(&self, other: &WinOdds) -> Ordering {
        let lhs = self.wins as u128 * other.total as u128;
        let rhs = other.wins as u128 * self.total as u128;
        lhs.cmp(&rhs)
    }
}

/// P(die i beats die j) for every ordered pair `i != j`.
///
/// Built once per game and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMatrix {
    cells: Vec<Vec<Option<WinOdds>>>,
}

impl ProbabilityMatrix {
    pub fn build(dice: &[Die]) -> Self {
        let cells = dice
            .iter()
            .enumerate()
            .map(|(i, a)| {
                dice.iter()
                    .enumerate()
                    .map(|(j, b)| (i != j).then(|| WinOdds::between(a, b)))
                    .collect()
            })
            .collect();

        Self { cells }
    }

    /// Number of dice
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Odds of die `i` against die `j`; `None` for self pairs or bad indices
    pub fn odds(&self, i: usize, j: usize) -> Option<WinOdds> {
        self.cells.get(i)?.get(j).copied().flatten()
    }

    /// P(die `i` beats die `j`)
    pub fn probability(&self, i: usize, j: usize) -> Option<f64> {
        self.odds(i, j).map(|o| o.probability())
    }

    /// Rows of the full table, self pairs as `None`
    pub fn rows(&self) -> impl Iterator<Item = &[Option<WinOdds>]> {
        self.cells.iter().map(Vec::as_slice)
    }
}
