//! Error types for the fair dice game.

use thiserror::Error;

/// Usage example shown next to every input validation error.
pub const USAGE_EXAMPLE: &str = "fair-dice play 2,2,4,4,9,9 1,1,6,6,8,8 3,3,5,5,7,7";

/// Minimum number of dice a game needs.
pub const MIN_DICE: usize = 3;

/// Errors from parsing the dice given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("at least 3 dice are required, got {count}")]
    TooFewDice { count: usize },

    #[error("die #{index} is malformed: {reason}")]
    MalformedDie { index: usize, reason: String },

    #[error("die #{index} has a face that is not a non-negative integer: {face:?}")]
    NonIntegerFace { index: usize, face: String },
}

impl InputError {
    /// Corrective guidance for the user.
    pub fn hint(&self) -> &'static str {
        match self {
            InputError::TooFewDice { .. } => {
                "Pass one argument per die; a game needs three or more dice."
            }
            InputError::MalformedDie { .. } => {
                "Write each die as comma-separated faces from 0 to 4294967295, with no empty entries."
            }
            InputError::NonIntegerFace { .. } => {
                "Faces must be whole numbers greater than or equal to zero."
            }
        }
    }

    /// A command line that would have been accepted.
    pub fn example(&self) -> &'static str {
        USAGE_EXAMPLE
    }
}

/// Errors from the core game logic
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Secure randomness could not be obtained. There is no fallback source.
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// An internal ordering or range invariant was broken by the caller.
    #[error("protocol sequence violation: {0}")]
    ProtocolSequence(String),

    /// The user asked to leave. Not a failure.
    #[error("aborted by user")]
    UserAbort,
}

impl DiceError {
    pub fn is_abort(&self) -> bool {
        matches!(self, DiceError::UserAbort)
    }
}
