//! Interactive console counterpart reading the user's answers from stdin.

use crate::render;
use async_trait::async_trait;
use fair_dice_core::protocol::{
    Counterpart, DieRequest, ExchangePurpose, NumberRequest, RoundEvent, RoundOutcome,
};
use fair_dice_core::{DiceError, Die, Player, ProbabilityMatrix};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// One line of user input, interpreted
#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Pick(u64),
    Help,
    Exit,
    Invalid,
}

fn interpret(line: &str, max: u64) -> Answer {
    match line.trim() {
        "?" => Answer::Help,
        "x" | "X" => Answer::Exit,
        other => match other.parse::<u64>() {
            Ok(n) if n <= max => Answer::Pick(n),
            _ => Answer::Invalid,
        },
    }
}

/// Menu entries for the free dice, with the odds against the computer's die once it is known
fn die_options(request: &DieRequest<'_>) -> Vec<(u64, String)> {
    request
        .available
        .iter()
        .map(|&i| {
            let label = match request
                .opponent
                .and_then(|opponent| request.matrix.probability(i, opponent))
            {
                Some(p) => format!("{} (wins {:.1}% against mine)", request.dice[i], p * 100.0),
                None => request.dice[i].to_string(),
            };
            (i as u64, label)
        })
        .collect()
}

pub struct ConsoleCounterpart {
    lines: Lines<BufReader<Stdin>>,
    dice: Vec<Die>,
    matrix: ProbabilityMatrix,
    json: bool,
}

impl ConsoleCounterpart {
    pub fn new(dice: Vec<Die>, matrix: ProbabilityMatrix, json: bool) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            dice,
            matrix,
            json,
        }
    }

    /// Show the menu until the user picks a listed option, asks to exit, or input ends
    async fn prompt(&mut self, options: &[(u64, String)]) -> Result<u64, DiceError> {
        let max = options.iter().map(|(n, _)| *n).max().unwrap_or(0);
        loop {
            for (n, label) in options {
                println!("{} - {}", n, label);
            }
            println!("X - exit");
            println!("? - help");
            print!("Your selection: ");
            if let Err(e) = std::io::stdout().flush() {
                warn!("Failed to flush prompt: {}", e);
            }

            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Err(DiceError::UserAbort),
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    return Err(DiceError::UserAbort);
                }
            };

            match interpret(&line, max) {
                Answer::Pick(n) if options.iter().any(|(o, _)| *o == n) => return Ok(n),
                Answer::Exit => return Err(DiceError::UserAbort),
                Answer::Help => println!("{}", render::help(&self.dice, &self.matrix)),
                Answer::Pick(_) | Answer::Invalid => {
                    println!("Invalid selection {:?}, try again.", line.trim())
                }
            }
        }
    }
}

#[async_trait]
impl Counterpart for ConsoleCounterpart {
    async fn choose_number(&mut self, request: &NumberRequest) -> Result<u64, DiceError> {
        let top = request.modulus - 1;
        match request.purpose {
            ExchangePurpose::FirstMove => {
                println!("Let's determine who makes the first move.");
                println!(
                    "I selected a random value in the range 0..{} (HMAC={}).",
                    top, request.digest
                );
                println!("Try to guess my selection.");
            }
            ExchangePurpose::Roll { player } => {
                match player {
                    Player::Computer => println!("It's time for my roll."),
                    Player::User => println!("It's time for your roll."),
                }
                println!(
                    "I selected a random value in the range 0..{} (HMAC={}).",
                    top, request.digest
                );
                println!("Add your number modulo {}.", request.modulus);
            }
        }

        let options: Vec<(u64, String)> = (0..request.modulus).map(|n| (n, n.to_string())).collect();
        self.prompt(&options).await
    }

    async fn choose_die(&mut self, request: &DieRequest<'_>) -> Result<usize, DiceError> {
        println!("Choose your dice:");
        let options = die_options(request);
        let picked = self.prompt(&options).await?;
        Ok(picked as usize)
    }

    fn notify(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::Revealed { record } => {
                println!("My number is {} (KEY={}).", record.secret, record.key);
                if let ExchangePurpose::Roll { .. } = record.purpose {
                    println!(
                        "The fair number generation result is {} + {} = {} (mod {}).",
                        record.secret, record.counterpart_value, record.joint_value, record.modulus
                    );
                }
            }
            RoundEvent::FirstMoveDecided { first } => match first {
                Player::User => println!("You guessed it. You make the first move."),
                Player::Computer => println!("I make the first move."),
            },
            RoundEvent::DieChosen { player, index } => {
                let die = &self.dice[*index];
                match player {
                    Player::Computer => println!("I choose the {} dice.", die),
                    Player::User => println!("You choose the {} dice.", die),
                }
            }
            RoundEvent::Rolled { player, face } => match player {
                Player::Computer => println!("My roll result is {}.", face),
                Player::User => println!("Your roll result is {}.", face),
            },
            RoundEvent::Completed { report } => {
                let (user, computer) = (report.user_face, report.computer_face);
                match report.outcome {
                    RoundOutcome::Win => println!("You win ({} > {})!", user, computer),
                    RoundOutcome::Loss => println!("I win ({} > {})!", computer, user),
                    RoundOutcome::Tie => println!("It's a tie ({} = {})!", user, computer),
                }
                if self.json {
                    match report.to_json_line() {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!("Failed to encode round report: {}", e),
                    }
                }
            }
        }
    }
}
