//! Die selection for the machine player.

use super::matrix::ProbabilityMatrix;
use crate::error::DiceError;
use crate::protocol::Player;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How to pick a die when the opponent has not chosen yet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpeningStrategy {
    /// Lowest available index
    #[default]
    FirstAvailable,
    /// Die whose worst reply still leaves the best win probability
    Minimax,
}

impl FromStr for OpeningStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-available" => Ok(OpeningStrategy::FirstAvailable),
            "minimax" => Ok(OpeningStrategy::Minimax),
            other => Err(format!(
                "unknown opening strategy {:?} (expected first-available or minimax)",
                other
            )),
        }
    }
}

impl fmt::Display for OpeningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpeningStrategy::FirstAvailable => write!(f, "first-available"),
            OpeningStrategy::Minimax => write!(f, "minimax"),
        }
    }
}

/// Which die each player has claimed this round
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
    available: BTreeSet<usize>,
    computer: Option<usize>,
    user: Option<usize>,
}

impl SelectionState {
    /// All `dice_count` dice free, nothing claimed
    pub fn new(dice_count: usize) -> Self {
        Self {
            available: (0..dice_count).collect(),
            computer: None,
            user: None,
        }
    }

    /// Dice still free to claim, in index order
    pub fn available(&self) -> Vec<usize> {
        self.available.iter().copied().collect()
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.available.contains(&index)
    }

    pub fn claimed_by(&self, player: Player) -> Option<usize> {
        match player {
            Player::Computer => self.computer,
            Player::User => self.user,
        }
    }

    /// Claim `index` for `player`, removing it from the pool
    pub fn claim(&mut self, player: Player, index: usize) -> Result<(), DiceError> {
        if self.claimed_by(player).is_some() {
            return Err(DiceError::ProtocolSequence(format!(
                "{} already chose a die this round",
                player
            )));
        }
        if !self.available.remove(&index) {
            return Err(DiceError::ProtocolSequence(format!(
                "die {} is not available",
                index
            )));
        }

        match player {
            Player::Computer => self.computer = Some(index),
            Player::User => self.user = Some(index),
        }
        Ok(())
    }
}

/// Pick the machine's die.
///
/// Against a known opponent die this is the argmax of the win probability,
/// ties going to the lowest index. Without one, `opening` decides.
pub fn select_best(
    available: &[usize],
    opponent: Option<usize>,
    matrix: &ProbabilityMatrix,
    opening: OpeningStrategy,
) -> Result<usize, DiceError> {
    let mut candidates: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&d| Some(d) != opponent && d < matrix.len())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let first = *candidates
        .first()
        .ok_or_else(|| DiceError::ProtocolSequence("no die left to choose".into()))?;

    match (opponent, opening) {
        (Some(opp), _) => {
            let mut best = first;
            let mut best_odds = matrix.odds(first, opp);
            for &d in &candidates[1..] {
                let odds = matrix.odds(d, opp);
                if let (Some(o), Some(b)) = (odds, best_odds) {
                    if o.cmp_probability(&b) == Ordering::Greater {
                        best = d;
                        best_odds = odds;
                    }
                }
            }
            Ok(best)
        }
        (None, OpeningStrategy::FirstAvailable) => Ok(first),
        (None, OpeningStrategy::Minimax) => Ok(minimax_opening(&candidates, matrix)),
    }
}

/// Die maximizing the worst-case win probability over every possible reply
fn minimax_opening(candidates: &[usize], matrix: &ProbabilityMatrix) -> usize {
    let worst = |d: usize| {
        candidates
            .iter()
            .filter_map(|&reply| matrix.odds(d, reply))
            .min_by(|a, b| a.cmp_probability(b))
    };

    let mut best = candidates[0];
    let mut best_worst = worst(best);
    for &d in &candidates[1..] {
        let w = worst(d);
        let better = match (w, best_worst) {
            (Some(w), Some(b)) => w.cmp_probability(&b) == Ordering::Greater,
            _ => false,
        };
        if better {
            best = d;
            best_worst = w;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Die;

    fn die(faces: &[u32]) -> Die {
        Die::new(faces.to_vec()).unwrap()
    }

    fn classic_matrix() -> ProbabilityMatrix {
        ProbabilityMatrix::build(&[
            die(&[2, 2, 4, 4, 9, 9]),
            die(&[1, 1, 6, 6, 8, 8]),
            die(&[3, 3, 5, 5, 7, 7]),
        ])
    }

    #[test]
    fn test_select_counter_die() {
        let m = classic_matrix();
        let all = [0, 1, 2];

        // A beats B, B beats C, C beats A
        assert_eq!(select_best(&all, Some(1), &m, OpeningStrategy::default()).unwrap(), 0);
        assert_eq!(select_best(&all, Some(2), &m, OpeningStrategy::default()).unwrap(), 1);
        assert_eq!(select_best(&all, Some(0), &m, OpeningStrategy::default()).unwrap(), 2);
    }

    #[test]
    fn test_opponent_die_is_never_selected() {
        let m = classic_matrix();
        let picked = select_best(&[1, 2], Some(1), &m, OpeningStrategy::Minimax).unwrap();
        assert_eq!(picked, 2);
    }

    #[test]
    fn test_equal_odds_go_to_lowest_index() {
        let m = ProbabilityMatrix::build(&[
            die(&[5, 5]),
            die(&[5, 5]),
            die(&[1, 9]),
        ]);
        // Both 0 and 1 beat die 2 exactly half the time
        assert_eq!(
            m.odds(0, 2).unwrap().cmp_probability(&m.odds(1, 2).unwrap()),
            Ordering::Equal
        );
        assert_eq!(select_best(&[0, 1], Some(2), &m, OpeningStrategy::default()).unwrap(), 0);
        assert_eq!(select_best(&[1, 0], Some(2), &m, OpeningStrategy::default()).unwrap(), 0);
    }

    #[test]
    fn test_first_available_opening() {
        let m = classic_matrix();
        assert_eq!(select_best(&[0, 1, 2], None, &m, OpeningStrategy::FirstAvailable).unwrap(), 0);
        assert_eq!(select_best(&[1, 2], None, &m, OpeningStrategy::FirstAvailable).unwrap(), 1);
    }

    #[test]
    fn test_minimax_opening_avoids_dominated_die() {
        // Die 0 loses to everything; die 2 dominates
        let m = ProbabilityMatrix::build(&[
            die(&[1, 1, 1]),
            die(&[2, 4, 6]),
            die(&[5, 5, 5]),
        ]);
        assert_eq!(select_best(&[0, 1, 2], None, &m, OpeningStrategy::Minimax).unwrap(), 2);
    }

    #[test]
    fn test_no_candidates_is_an_error() {
        let m = classic_matrix();
        assert!(matches!(
            select_best(&[], None, &m, OpeningStrategy::default()),
            Err(DiceError::ProtocolSequence(_))
        ));
        assert!(matches!(
            select_best(&[1], Some(1), &m, OpeningStrategy::default()),
            Err(DiceError::ProtocolSequence(_))
        ));
    }

    #[test]
    fn test_claim_removes_die_from_pool() {
        let mut state = SelectionState::new(3);
        state.claim(Player::User, 1).unwrap();

        assert_eq!(state.available(), vec![0, 2]);
        assert_eq!(state.claimed_by(Player::User), Some(1));
        assert!(state.claim(Player::Computer, 1).is_err());

        state.claim(Player::Computer, 2).unwrap();
        assert_eq!(state.available(), vec![0]);
    }

    #[test]
    fn test_claim_twice_is_rejected() {
        let mut state = SelectionState::new(4);
        state.claim(Player::Computer, 0).unwrap();
        assert!(matches!(
            state.claim(Player::Computer, 3),
            Err(DiceError::ProtocolSequence(_))
        ));
        assert!(state.is_available(3));
    }

    #[test]
    fn test_opening_strategy_parsing() {
        assert_eq!("minimax".parse(), Ok(OpeningStrategy::Minimax));
        assert_eq!("first-available".parse(), Ok(OpeningStrategy::FirstAvailable));
        assert!("random".parse::<OpeningStrategy>().is_err());
        assert_eq!(OpeningStrategy::Minimax.to_string(), "minimax");
    }
}
