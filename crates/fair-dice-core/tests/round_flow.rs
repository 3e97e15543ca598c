//! Integration tests for the full round flow.
//!
//! These tests drive complete rounds with injected secrets and scripted
//! user answers, then audit every exchange the way an observer would.

use fair_dice_core::{
    crypto::{Commitment, RngEntropy, ScriptedEntropy},
    dice::{parse_dice, OpeningStrategy},
    protocol::{
        ExchangePurpose, GameConfig, GameSession, Player, RoundEvent, RoundOutcome,
        ScriptedCounterpart,
    },
    DiceError,
};

fn classic_specs() -> [&'static str; 3] {
    ["2,2,4,4,9,9", "1,1,6,6,8,8", "3,3,5,5,7,7"]
}

/// Injected secret 2 and user answer 3 over six faces land on face index 5
#[tokio::test]
async fn test_forced_roll_selects_face_index_five() {
    let dice = parse_dice(&classic_specs()).unwrap();

    // Secrets: first-move bit 1, user roll 2, computer roll 0
    let entropy = ScriptedEntropy::new([1, 2, 0]);
    let mut game = GameSession::new(dice, GameConfig::default(), Box::new(entropy)).unwrap();

    // Answers: bit 1 (matches -> user first), 3 for the user roll, 4 for the computer roll
    let mut user = ScriptedCounterpart::new([1, 3, 4], [1]);

    let report = game.play_round(&mut user).await.unwrap();

    assert_eq!(report.first_mover, Player::User);
    assert_eq!(report.user_die, 1);
    // Die A beats die B
    assert_eq!(report.computer_die, 0);

    let user_roll = &report.exchanges[1];
    assert_eq!(user_roll.purpose, ExchangePurpose::Roll { player: Player::User });
    assert_eq!(user_roll.modulus, 6);
    assert_eq!(user_roll.secret, 2);
    assert_eq!(user_roll.counterpart_value, 3);
    assert_eq!(user_roll.joint_value, 5);
    assert_eq!(report.user_face, 8);

    let computer_roll = &report.exchanges[2];
    assert_eq!(computer_roll.joint_value, 4);
    assert_eq!(report.computer_face, 9);

    assert_eq!(report.outcome, RoundOutcome::Loss);
    assert_eq!(game.score().losses, 1);
    assert!(game.is_finished());
}

/// Every published digest matches what is later revealed
#[tokio::test]
async fn test_digests_published_before_answers_verify_after_reveal() {
    let dice = parse_dice(&classic_specs()).unwrap();
    let mut game =
        GameSession::new(dice, GameConfig::default(), Box::new(RngEntropy::os())).unwrap();
    let mut user = ScriptedCounterpart::new([0, 5, 5], [2]);

    let report = game.play_round(&mut user).await.unwrap();

    let published: Vec<Commitment> = user.requests().iter().map(|r| r.digest).collect();
    assert_eq!(published.len(), report.exchanges.len());
    for (digest, record) in published.iter().zip(&report.exchanges) {
        assert_eq!(*digest, record.digest);
        assert!(record.revealed().verify(digest));
    }
    assert!(report.verify());
}

/// The computer always answers the user's die with its best counter
#[tokio::test]
async fn test_computer_counters_user_die() {
    // user die -> computer counter
    for (user_die, counter) in [(0usize, 2usize), (1, 0), (2, 1)] {
        let dice = parse_dice(&classic_specs()).unwrap();
        // Secret bit 0, answer 0: user moves first
        let entropy = ScriptedEntropy::new([0, 0, 0]);
        let mut game = GameSession::new(dice, GameConfig::default(), Box::new(entropy)).unwrap();
        let mut user = ScriptedCounterpart::new([0, 0, 0], [user_die]);

        let report = game.play_round(&mut user).await.unwrap();
        assert_eq!(report.computer_die, counter, "user chose {}", user_die);
    }
}

#[tokio::test]
async fn test_minimax_opening_when_computer_moves_first() {
    let dice = parse_dice(&["1,1,1", "2,4,6", "5,5,5"]).unwrap();
    let config = GameConfig {
        opening: OpeningStrategy::Minimax,
        ..GameConfig::default()
    };
    // Secret bit 1, answer 0: computer moves first
    let entropy = ScriptedEntropy::new([1, 0, 0]);
    let mut game = GameSession::new(dice, config, Box::new(entropy)).unwrap();
    let mut user = ScriptedCounterpart::new([0, 0, 0], [1]);

    let report = game.play_round(&mut user).await.unwrap();
    assert_eq!(report.first_mover, Player::Computer);
    assert_eq!(report.computer_die, 2);
    assert_eq!(report.outcome, RoundOutcome::Loss);
}

/// Abort while a roll secret is committed: nothing is revealed for it
#[tokio::test]
async fn test_abort_discards_pending_commitment() {
    let dice = parse_dice(&classic_specs()).unwrap();
    let entropy = ScriptedEntropy::new([0, 3]);
    let mut game = GameSession::new(dice, GameConfig::default(), Box::new(entropy)).unwrap();
    // First move answered, die chosen, then the user quits at the roll prompt
    let mut user = ScriptedCounterpart::new([0], [0]);

    let err = game.play_round(&mut user).await.unwrap_err();
    assert!(matches!(err, DiceError::UserAbort));

    // The roll digest was shown, but no reveal or roll followed it
    assert_eq!(user.requests().len(), 2);
    let reveals = user
        .events()
        .iter()
        .filter(|e| matches!(e, RoundEvent::Revealed { .. }))
        .count();
    assert_eq!(reveals, 1);
    assert!(!user
        .events()
        .iter()
        .any(|e| matches!(e, RoundEvent::Rolled { .. } | RoundEvent::Completed { .. })));
    assert_eq!(game.score().rounds(), 0);
}

#[tokio::test]
async fn test_randomness_failure_is_fatal() {
    let dice = parse_dice(&classic_specs()).unwrap();
    let mut game = GameSession::new(
        dice,
        GameConfig::default(),
        Box::new(ScriptedEntropy::default()),
    )
    .unwrap();
    let mut user = ScriptedCounterpart::new([0, 0, 0], [0]);

    let err = game.play_round(&mut user).await.unwrap_err();
    assert!(matches!(err, DiceError::RandomnessUnavailable(_)));
    assert!(user.requests().is_empty());
}

#[tokio::test]
async fn test_multi_round_session_tallies_score() {
    let dice = parse_dice(&classic_specs()).unwrap();
    let config = GameConfig {
        rounds: Some(3),
        ..GameConfig::default()
    };
    // Per round: first-move bit 0, user roll, computer roll
    let entropy = ScriptedEntropy::new([0, 4, 0, 0, 0, 0, 0, 4, 0]);
    let mut game = GameSession::new(dice, config, Box::new(entropy)).unwrap();
    // Answering 0 matches every first-move bit, so the user always picks first
    let mut user = ScriptedCounterpart::new([0; 9], [0, 1, 2]);

    let score = game.play(&mut user).await.unwrap();
    assert_eq!(score.rounds(), 3);
    // 9 vs 3, 1 vs 2, 7 vs 1
    assert_eq!((score.wins, score.losses, score.ties), (2, 1, 0));

    let reports: Vec<_> = user
        .events()
        .iter()
        .filter_map(|e| match e {
            RoundEvent::Completed { report } => Some(report),
            _ => None,
        })
        .collect();
    let rounds: Vec<u32> = reports.iter().map(|r| r.round).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
    assert!(reports.iter().all(|r| r.first_mover == Player::User));
    let outcomes: Vec<RoundOutcome> = reports.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![RoundOutcome::Win, RoundOutcome::Loss, RoundOutcome::Win]
    );
}

#[tokio::test]
async fn test_report_json_line() {
    let dice = parse_dice(&classic_specs()).unwrap();
    let entropy = ScriptedEntropy::new([1, 2, 0]);
    let mut game = GameSession::new(dice, GameConfig::default(), Box::new(entropy)).unwrap();
    let mut user = ScriptedCounterpart::new([1, 3, 4], [1]);

    let report = game.play_round(&mut user).await.unwrap();
    let line = report.to_json_line().unwrap();
    assert!(!line.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["outcome"], "loss");
    assert_eq!(value["user_faces"], serde_json::json!([1, 1, 6, 6, 8, 8]));
    assert_eq!(value["exchanges"].as_array().unwrap().len(), 3);
}
