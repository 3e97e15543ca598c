//! Round orchestration: first move, die selection, fair rolls, verdict.

use super::counterpart::{Counterpart, DieRequest};
use super::messages::{ExchangePurpose, FairRollRecord, NumberRequest, RoundEvent, RoundReport};
use super::types::{Player, RoundOutcome, Score, SessionId};
use crate::crypto::{combine, CommittedSecret, EntropySource};
use crate::dice::{select_best, Die, Face, OpeningStrategy, ProbabilityMatrix, SelectionState};
use crate::error::{DiceError, InputError, MIN_DICE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Session settings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Rounds to play; `None` plays until the counterpart aborts
    pub rounds: Option<u32>,
    /// Machine's pick when it chooses before the user
    pub opening: OpeningStrategy,
    /// Re-run the first-move exchange every round instead of once per session
    pub redecide_first_move: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: Some(1),
            opening: OpeningStrategy::default(),
            redecide_first_move: true,
        }
    }
}

/// Where a round currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    AwaitingFirstMoveDecision,
    AwaitingDieSelection(Player),
    AwaitingRoll(Player),
    RoundComplete,
}

/// Mutable state threaded through one round
#[derive(Clone, Debug)]
struct RoundContext {
    round: u32,
    phase: RoundPhase,
    first_mover: Option<Player>,
    selection: SelectionState,
    computer_face: Option<Face>,
    user_face: Option<Face>,
    exchanges: Vec<FairRollRecord>,
}

impl RoundContext {
    fn new(round: u32, dice_count: usize, first_mover: Option<Player>) -> Self {
        let phase = match first_mover {
            Some(player) => RoundPhase::AwaitingDieSelection(player),
            None => RoundPhase::AwaitingFirstMoveDecision,
        };

        Self {
            round,
            phase,
            first_mover,
            selection: SelectionState::new(dice_count),
            computer_face: None,
            user_face: None,
            exchanges: Vec::new(),
        }
    }

    fn face(&self, player: Player) -> Option<Face> {
        match player {
            Player::Computer => self.computer_face,
            Player::User => self.user_face,
        }
    }

    fn set_face(&mut self, player: Player, face: Face) {
        match player {
            Player::Computer => self.computer_face = Some(face),
            Player::User => self.user_face = Some(face),
        }
    }

    fn missing(what: &str) -> DiceError {
        DiceError::ProtocolSequence(format!("round completed without {}", what))
    }
}

/// A game over a fixed set of dice, possibly spanning several rounds
pub struct GameSession {
    id: SessionId,
    dice: Vec<Die>,
    matrix: ProbabilityMatrix,
    config: GameConfig,
    entropy: Box<dyn EntropySource>,
    score: Score,
    rounds_played: u32,
    first_mover: Option<Player>,
}

impl GameSession {
    pub fn new(
        dice: Vec<Die>,
        config: GameConfig,
        entropy: Box<dyn EntropySource>,
    ) -> Result<Self, DiceError> {
        if dice.len() < MIN_DICE {
            return Err(InputError::TooFewDice { count: dice.len() }.into());
        }

        let matrix = ProbabilityMatrix::build(&dice);
        let id = SessionId::new();
        info!(session = %id, dice = dice.len(), ?config, "Created game session");

        Ok(Self {
            id,
            dice,
            matrix,
            config,
            entropy,
            score: Score::default(),
            rounds_played: 0,
            first_mover: None,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn matrix(&self) -> &ProbabilityMatrix {
        &self.matrix
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Whether the configured number of rounds has been played
    pub fn is_finished(&self) -> bool {
        self.config
            .rounds
            .is_some_and(|limit| self.rounds_played >= limit)
    }

    /// Play rounds until finished. An abort ends the session early.
    pub async fn play(&mut self, counterpart: &mut dyn Counterpart) -> Result<Score, DiceError> {
        while !self.is_finished() {
            self.play_round(counterpart).await?;
        }
        Ok(self.score)
    }

    /// Drive one round through every phase
    pub async fn play_round(
        &mut self,
        counterpart: &mut dyn Counterpart,
    ) -> Result<RoundReport, DiceError> {
        let cached = if self.config.redecide_first_move {
            None
        } else {
            self.first_mover
        };
        let mut ctx = RoundContext::new(self.rounds_played + 1, self.dice.len(), cached);
        info!(session = %self.id, round = ctx.round, "Round started");

        loop {
            match ctx.phase {
                RoundPhase::AwaitingFirstMoveDecision => {
                    // Joint bit 0 means the user matched the secret bit
                    let joint = self
                        .fair_random(ExchangePurpose::FirstMove, 2, counterpart, &mut ctx)
                        .await?;
                    let first = if joint == 0 {
                        Player::User
                    } else {
                        Player::Computer
                    };

                    ctx.first_mover = Some(first);
                    self.first_mover = Some(first);
                    counterpart.notify(&RoundEvent::FirstMoveDecided { first });
                    ctx.phase = RoundPhase::AwaitingDieSelection(first);
                }
                RoundPhase::AwaitingDieSelection(player) => {
                    let index = self.choose_die(player, counterpart, &ctx).await?;
                    ctx.selection.claim(player, index)?;
                    debug!(%player, index, die = %self.dice[index], "Die chosen");
                    counterpart.notify(&RoundEvent::DieChosen { player, index });

                    ctx.phase = if ctx.selection.claimed_by(player.opponent()).is_none() {
                        RoundPhase::AwaitingDieSelection(player.opponent())
                    } else {
                        RoundPhase::AwaitingRoll(ctx.first_mover.unwrap_or(player.opponent()))
                    };
                }
                RoundPhase::AwaitingRoll(player) => {
                    let index = ctx
                        .selection
                        .claimed_by(player)
                        .ok_or_else(|| RoundContext::missing("a die to roll"))?;
                    let modulus = self.dice[index].count() as u64;
                    let joint = self
                        .fair_random(ExchangePurpose::Roll { player }, modulus, counterpart, &mut ctx)
                        .await?;
                    let face = self.dice[index]
                        .face(joint as usize)
                        .ok_or_else(|| RoundContext::missing("a face in range"))?;

                    ctx.set_face(player, face);
                    debug!(%player, face, "Rolled");
                    counterpart.notify(&RoundEvent::Rolled { player, face });

                    ctx.phase = if ctx.face(player.opponent()).is_none() {
                        RoundPhase::AwaitingRoll(player.opponent())
                    } else {
                        RoundPhase::RoundComplete
                    };
                }
                RoundPhase::RoundComplete => break,
            }
        }

        let report = self.finish_round(ctx)?;
        counterpart.notify(&RoundEvent::Completed {
            report: report.clone(),
        });
        Ok(report)
    }

    async fn choose_die(
        &self,
        player: Player,
        counterpart: &mut dyn Counterpart,
        ctx: &RoundContext,
    ) -> Result<usize, DiceError> {
        let available = ctx.selection.available();
        match player {
            Player::Computer => select_best(
                &available,
                ctx.selection.claimed_by(Player::User),
                &self.matrix,
                self.config.opening,
            ),
            Player::User => {
                let request = DieRequest {
                    dice: &self.dice,
                    available: &available,
                    opponent: ctx.selection.claimed_by(Player::Computer),
                    matrix: &self.matrix,
                };
                counterpart.choose_die(&request).await
            }
        }
    }

    /// Commit, collect the counterpart's number, reveal, combine.
    async fn fair_random(
        &mut self,
        purpose: ExchangePurpose,
        modulus: u64,
        counterpart: &mut dyn Counterpart,
        ctx: &mut RoundContext,
    ) -> Result<u64, DiceError> {
        if modulus == 0 {
            return Err(DiceError::ProtocolSequence(
                "fair random range is empty".into(),
            ));
        }

        let committed = CommittedSecret::commit(self.entropy.as_mut(), 0, modulus - 1)?;
        let request = NumberRequest {
            purpose,
            digest: committed.digest(),
            modulus,
        };

        // Dropping `committed` on abort discards the secret unrevealed
        let counterpart_value = counterpart.choose_number(&request).await?;
        if counterpart_value >= modulus {
            return Err(DiceError::ProtocolSequence(format!(
                "counterpart value {} outside [0, {}]",
                counterpart_value,
                modulus - 1
            )));
        }

        let revealed = committed.reveal();
        let joint_value = combine(revealed.value, counterpart_value, modulus)?;
        let record = FairRollRecord {
            purpose,
            modulus,
            digest: request.digest,
            secret: revealed.value,
            key: revealed.key,
            counterpart_value,
            joint_value,
        };

        debug!(?purpose, joint_value, "Fair random exchange complete");
        counterpart.notify(&RoundEvent::Revealed {
            record: record.clone(),
        });
        ctx.exchanges.push(record);
        Ok(joint_value)
    }

    fn finish_round(&mut self, ctx: RoundContext) -> Result<RoundReport, DiceError> {
        let computer_die = ctx
            .selection
            .claimed_by(Player::Computer)
            .ok_or_else(|| RoundContext::missing("a computer die"))?;
        let user_die = ctx
            .selection
            .claimed_by(Player::User)
            .ok_or_else(|| RoundContext::missing("a user die"))?;
        let computer_face = ctx
            .computer_face
            .ok_or_else(|| RoundContext::missing("a computer roll"))?;
        let user_face = ctx
            .user_face
            .ok_or_else(|| RoundContext::missing("a user roll"))?;
        let first_mover = ctx
            .first_mover
            .ok_or_else(|| RoundContext::missing("a first mover"))?;

        let outcome = RoundOutcome::judge(user_face, computer_face);
        self.score.record(outcome);
        self.rounds_played += 1;

        info!(
            session = %self.id,
            round = ctx.round,
            computer_face,
            user_face,
            %outcome,
            "Round complete"
        );

        Ok(RoundReport {
            session_id: self.id,
            round: ctx.round,
            first_mover,
            computer_die,
            user_die,
            computer_faces: self.dice[computer_die].clone(),
            user_faces: self.dice[user_die].clone(),
            computer_face,
            user_face,
            outcome,
            exchanges: ctx.exchanges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ScriptedEntropy;
    use crate::dice::parse_dice;
    use crate::protocol::ScriptedCounterpart;

    fn classic() -> Vec<Die> {
        parse_dice(&["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]).unwrap()
    }

    fn session(words: Vec<u64>, config: GameConfig) -> GameSession {
        GameSession::new(classic(), config, Box::new(ScriptedEntropy::new(words))).unwrap()
    }

    #[test]
    fn test_session_requires_three_dice() {
        let dice = classic().into_iter().take(2).collect();
        let result = GameSession::new(
            dice,
            GameConfig::default(),
            Box::new(ScriptedEntropy::default()),
        );
        assert!(matches!(
            result,
            Err(DiceError::InvalidInput(InputError::TooFewDice { count: 2 }))
        ));
    }

    #[tokio::test]
    async fn test_computer_moves_first_when_bits_differ() {
        // secret bit 0, user bit 1 -> joint 1 -> computer first
        let mut game = session(vec![0, 0, 0], GameConfig::default());
        let mut user = ScriptedCounterpart::new([1, 0, 0], [1]);

        let report = game.play_round(&mut user).await.unwrap();
        assert_eq!(report.first_mover, Player::Computer);
        // First-available opening takes die 0, user then takes die 1
        assert_eq!(report.computer_die, 0);
        assert_eq!(report.user_die, 1);
    }

    #[tokio::test]
    async fn test_events_follow_phase_order() {
        let mut game = session(vec![1, 0, 0], GameConfig::default());
        let mut user = ScriptedCounterpart::new([1, 0, 0], [2]);

        game.play_round(&mut user).await.unwrap();

        let kinds: Vec<&str> = user
            .events()
            .iter()
            .map(|e| match e {
                RoundEvent::FirstMoveDecided { .. } => "first",
                RoundEvent::DieChosen { .. } => "die",
                RoundEvent::Revealed { .. } => "reveal",
                RoundEvent::Rolled { .. } => "roll",
                RoundEvent::Completed { .. } => "done",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["reveal", "first", "die", "die", "reveal", "roll", "reveal", "roll", "done"]
        );
    }

    #[tokio::test]
    async fn test_abort_mid_round_leaves_score_untouched() {
        let mut game = session(vec![0, 0, 0], GameConfig::default());
        // Answers the first move, then aborts at die selection
        let mut user = ScriptedCounterpart::new([0], []);

        let err = game.play_round(&mut user).await.unwrap_err();
        assert!(err.is_abort());
        assert_eq!(game.score().rounds(), 0);
        assert!(!game.is_finished());
    }

    #[tokio::test]
    async fn test_out_of_range_answer_is_rejected_before_reveal() {
        let mut game = session(vec![0], GameConfig::default());
        let mut user = ScriptedCounterpart::new([2], []);

        let err = game.play_round(&mut user).await.unwrap_err();
        assert!(matches!(err, DiceError::ProtocolSequence(_)));
        assert!(user.events().is_empty());
    }

    #[tokio::test]
    async fn test_first_move_decided_once_when_configured() {
        let config = GameConfig {
            rounds: Some(2),
            redecide_first_move: false,
            ..GameConfig::default()
        };
        // Round 1: bit + two rolls. Round 2: two rolls only.
        let mut game = session(vec![0, 0, 0, 0, 0], config);
        let mut user = ScriptedCounterpart::new([0, 0, 0, 0, 0], [0, 0]);

        let score = game.play(&mut user).await.unwrap();
        assert_eq!(score.rounds(), 2);
        assert!(game.is_finished());

        let first_move_requests = user
            .requests()
            .iter()
            .filter(|r| r.purpose == ExchangePurpose::FirstMove)
            .count();
        assert_eq!(first_move_requests, 1);
    }

    #[tokio::test]
    async fn test_first_move_redecided_every_round_by_default() {
        let config = GameConfig {
            rounds: Some(2),
            ..GameConfig::default()
        };
        let mut game = session(vec![0; 6], config);
        let mut user = ScriptedCounterpart::new([0; 6], [0, 0]);

        game.play(&mut user).await.unwrap();

        let first_move_requests = user
            .requests()
            .iter()
            .filter(|r| r.purpose == ExchangePurpose::FirstMove)
            .count();
        assert_eq!(first_move_requests, 2);
    }
}
