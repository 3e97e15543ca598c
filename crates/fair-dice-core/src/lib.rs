//! Fair Dice Core Library
//!
//! This crate provides the commit-reveal randomness, the win-probability
//! matrix and the die-selection logic for a two-player game of
//! non-transitive dice.

pub mod crypto;
pub mod dice;
pub mod error;
pub mod protocol;

pub use crypto::{Commitment, CommittedSecret, EntropySource, RevealedResult, RngEntropy, SecretKey};
pub use dice::{Die, OpeningStrategy, ProbabilityMatrix, WinOdds};
pub use error::{DiceError, InputError};
pub use protocol::{Counterpart, GameConfig, GameSession, Player, RoundOutcome, RoundReport};
