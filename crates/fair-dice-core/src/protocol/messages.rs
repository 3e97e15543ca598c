//! Protocol messages exchanged with the counterpart, and the audit trail.

use crate::crypto::{Commitment, RevealedResult, SecretKey};
use crate::dice::{Die, Face};
use crate::protocol::{Player, RoundOutcome, SessionId};
use serde::{Deserialize, Serialize};

/// What a fair-random exchange decides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangePurpose {
    /// Who picks a die first
    FirstMove,
    /// Face index for `player`'s die
    Roll { player: Player },
}

/// Phase 1: published digest, asking the counterpart for a number
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NumberRequest {
    pub purpose: ExchangePurpose,
    pub digest: Commitment,
    /// The counterpart must answer in `[0, modulus - 1]`
    pub modulus: u64,
}

/// Phase 2: everything needed to audit one exchange after the reveal
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairRollRecord {
    pub purpose: ExchangePurpose,
    pub modulus: u64,
    pub digest: Commitment,
    pub secret: u64,
    pub key: SecretKey,
    pub counterpart_value: u64,
    pub joint_value: u64,
}

impl FairRollRecord {
    pub fn revealed(&self) -> RevealedResult {
        RevealedResult {
            value: self.secret,
            key: self.key.clone(),
        }
    }

    /// Recheck the digest and the combination
    pub fn verify(&self) -> bool {
        self.modulus > 0
            && self.secret < self.modulus
            && self.revealed().verify(&self.digest)
            && crate::crypto::combine(self.secret, self.counterpart_value, self.modulus)
                .map(|joint| joint == self.joint_value)
                .unwrap_or(false)
    }
}

/// Progress notifications for the counterpart to display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    FirstMoveDecided { first: Player },
    DieChosen { player: Player, index: usize },
    Revealed { record: FairRollRecord },
    Rolled { player: Player, face: Face },
    Completed { report: RoundReport },
}

/// Outcome of one finished round
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub session_id: SessionId,
    pub round: u32,
    pub first_mover: Player,
    pub computer_die: usize,
    pub user_die: usize,
    pub computer_faces: Die,
    pub user_faces: Die,
    pub computer_face: Face,
    pub user_face: Face,
    pub outcome: RoundOutcome,
    /// Every fair-random exchange of the round, in order
    pub exchanges: Vec<FairRollRecord>,
}

impl RoundReport {
    /// One-line JSON form for audit output
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Whether every exchange in the round checks out
    pub fn verify(&self) -> bool {
        self.exchanges.iter().all(FairRollRecord::verify)
    }
}
