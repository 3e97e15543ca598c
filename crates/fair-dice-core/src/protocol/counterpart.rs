//! The other party in every exchange.

use super::messages::{NumberRequest, RoundEvent};
use crate::dice::{Die, ProbabilityMatrix};
use crate::error::DiceError;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Dice the counterpart may pick from
#[derive(Clone, Copy, Debug)]
pub struct DieRequest<'a> {
    pub dice: &'a [Die],
    /// Indices still free, in order
    pub available: &'a [usize],
    /// The computer's die if it already chose
    pub opponent: Option<usize>,
    pub matrix: &'a ProbabilityMatrix,
}

/// Trait for the party answering the computer's commitments
///
/// Implementations can be:
/// - an interactive console for a human player
/// - ScriptedCounterpart for testing
///
/// Returning `DiceError::UserAbort` from either choice ends the session
/// immediately; the pending secret is dropped unrevealed.
#[async_trait]
pub trait Counterpart: Send {
    /// Pick a number in `[0, request.modulus - 1]` after seeing the digest
    async fn choose_number(&mut self, request: &NumberRequest) -> Result<u64, DiceError>;

    /// Pick one of `request.available`
    async fn choose_die(&mut self, request: &DieRequest<'_>) -> Result<usize, DiceError>;

    /// Observe progress
    fn notify(&mut self, event: &RoundEvent);
}

/// Counterpart replaying canned answers. Aborts once a queue runs dry.
#[derive(Clone, Debug, Default)]
pub struct ScriptedCounterpart {
    numbers: VecDeque<u64>,
    dice: VecDeque<usize>,
    events: Vec<RoundEvent>,
    requests: Vec<NumberRequest>,
}

impl ScriptedCounterpart {
    pub fn new(
        numbers: impl IntoIterator<Item = u64>,
        dice: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
            dice: dice.into_iter().collect(),
            events: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Events seen so far
    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Number requests seen so far
    pub fn requests(&self) -> &[NumberRequest] {
        &self.requests
    }
}

#[async_trait]
impl Counterpart for ScriptedCounterpart {
    async fn choose_number(&mut self, request: &NumberRequest) -> Result<u64, DiceError> {
        self.requests.push(request.clone());
        self.numbers.pop_front().ok_or(DiceError::UserAbort)
    }

    async fn choose_die(&mut self, _request: &DieRequest<'_>) -> Result<usize, DiceError> {
        self.dice.pop_front().ok_or(DiceError::UserAbort)
    }

    fn notify(&mut self, event: &RoundEvent) {
        self.events.push(event.clone());
    }
}
