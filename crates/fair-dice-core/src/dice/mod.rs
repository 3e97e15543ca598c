//! Dice, win probabilities and die selection.

mod die;
mod matrix;
mod strategy;

pub use die::{parse_dice, Die, Face};
pub use matrix::{ProbabilityMatrix, WinOdds};
pub use strategy::{select_best, OpeningStrategy, SelectionState};
