//! Protocol types, messages and the round orchestrator.

mod counterpart;
mod messages;
mod round;
mod types;

pub use counterpart::{Counterpart, DieRequest, ScriptedCounterpart};
pub use messages::{ExchangePurpose, FairRollRecord, NumberRequest, RoundEvent, RoundReport};
pub use round::{GameConfig, GameSession, RoundPhase};
pub use types::{Player, RoundOutcome, Score, SessionId};
