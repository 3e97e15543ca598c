//! Dice and their parsing from command-line specs.

use crate::error::{InputError, MIN_DICE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Face value of a die
pub type Face = u32;

/// A die: ordered, non-empty list of faces
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Die(Vec<Face>);

impl Die {
    /// Create from faces. Returns `None` when `faces` is empty.
    pub fn new(faces: Vec<Face>) -> Option<Self> {
        if faces.is_empty() {
            None
        } else {
            Some(Self(faces))
        }
    }

    /// Parse one comma-separated spec. `index` is only used in error messages.
    pub fn parse(spec: &str, index: usize) -> Result<Self, InputError> {
        if spec.trim().is_empty() {
            return Err(InputError::MalformedDie {
                index,
                reason: "no faces given".to_string(),
            });
        }

        let faces = spec
            .split(',')
            .map(|token| {
                let token = token.trim();
                if token.is_empty() {
                    return Err(InputError::MalformedDie {
                        index,
                        reason: format!("empty face in {:?}", spec),
                    });
                }
                token.parse::<Face>().map_err(|e| match e.kind() {
                    IntErrorKind::PosOverflow => InputError::MalformedDie {
                        index,
                        reason: format!("face {} exceeds the largest face {}", token, Face::MAX),
                    },
                    _ => InputError::NonIntegerFace {
                        index,
                        face: token.to_string(),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(faces))
    }

    pub fn faces(&self) -> &[Face] {
        &self.0
    }

    /// Number of faces
    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// Face at `index`, as picked by a fair roll
    pub fn face(&self, index: usize) -> Option<Face> {
        self.0.get(index).copied()
    }
}

impl FromStr for Die {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Die::parse(s, 1)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, face) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", face)?;
        }
        write!(f, "]")
    }
}

/// Parse every die spec, numbering dice from 1 in messages.
pub fn parse_dice<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Die>, InputError> {
    if specs.len() < MIN_DICE {
        return Err(InputError::TooFewDice { count: specs.len() });
    }

    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| Die::parse(spec.as_ref(), i + 1))
        .collect()
}
