//! Fair Dice
//!
//! Console game of non-transitive dice where every random decision is made
//! through commit-reveal, so neither side can bias it.

mod console;
mod render;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use console::ConsoleCounterpart;
use fair_dice_core::dice::parse_dice;
use fair_dice_core::{
    Commitment, DiceError, GameConfig, GameSession, OpeningStrategy, ProbabilityMatrix,
    RngEntropy, SecretKey,
};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Fair Dice: non-transitive dice with provably fair rolls
#[derive(Parser, Debug)]
#[command(name = "fair-dice", version)]
#[command(about = "Play non-transitive dice against the computer with commit-reveal fair rolls")]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. "debug" or "fair_dice_core=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play against the computer
    Play(PlayArgs),

    /// Print the win probability table for a set of dice
    Table {
        /// Dice as comma-separated faces, e.g. 2,2,4,4,9,9
        #[arg(allow_hyphen_values = true)]
        dice: Vec<String>,
    },

    /// Check a revealed number and key against a published HMAC
    Verify {
        /// Revealed key, hex
        #[arg(long)]
        key: String,

        /// Revealed number
        #[arg(long)]
        value: u64,

        /// HMAC shown before you answered, hex
        #[arg(long)]
        digest: String,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Rounds to play; 0 plays until you exit
    #[arg(short, long, default_value_t = 1)]
    rounds: u32,

    /// Computer's pick when it chooses first: first-available or minimax
    #[arg(long, default_value_t = OpeningStrategy::FirstAvailable)]
    opening: OpeningStrategy,

    /// Decide the first mover once for the whole session
    #[arg(long)]
    decide_once: bool,

    /// Print each round's audit record as a JSON line
    #[arg(long)]
    json: bool,

    /// Dice as comma-separated faces, e.g. 2,2,4,4,9,9
    #[arg(allow_hyphen_values = true)]
    dice: Vec<String>,
}

impl PlayArgs {
    fn config(&self) -> GameConfig {
        GameConfig {
            rounds: (self.rounds > 0).then_some(self.rounds),
            opening: self.opening,
            redecide_first_move: !self.decide_once,
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

async fn play(args: PlayArgs) -> anyhow::Result<()> {
    let dice = parse_dice(&args.dice).map_err(DiceError::from)?;
    let mut session = GameSession::new(dice, args.config(), Box::new(RngEntropy::os()))?;
    let mut console = ConsoleCounterpart::new(
        session.dice().to_vec(),
        session.matrix().clone(),
        args.json,
    );

    info!(session = %session.id(), rounds = args.rounds, "Starting game");
    let result = session.play(&mut console).await;

    let score = session.score();
    if score.rounds() > 1 || result.is_err() {
        println!(
            "Score after {} round(s): you {} - {} me, {} tie(s).",
            score.rounds(),
            score.wins,
            score.losses,
            score.ties
        );
    }

    result?;
    Ok(())
}

fn table(specs: &[String]) -> anyhow::Result<()> {
    let dice = parse_dice(specs).map_err(DiceError::from)?;
    let matrix = ProbabilityMatrix::build(&dice);
    println!("{}", render::probability_table(&dice, &matrix));
    Ok(())
}

fn verify(key: &str, value: u64, digest: &str) -> anyhow::Result<()> {
    let key = SecretKey::from_hex(key).context("key must be 64 hex characters")?;
    let digest = Commitment::from_hex(digest).context("digest must be 64 hex characters")?;

    if !digest.verify(&key, value) {
        bail!("HMAC mismatch: {} was not committed with this key", value);
    }
    println!("OK: HMAC-SHA3-256(key, \"{}\") = {}", value, digest);
    Ok(())
}

fn exit_code(err: anyhow::Error) -> ExitCode {
    match err.downcast_ref::<DiceError>() {
        Some(DiceError::UserAbort) => {
            println!("Goodbye.");
            ExitCode::SUCCESS
        }
        Some(DiceError::InvalidInput(input)) => {
            eprintln!("Error: {}", input);
            eprintln!("{}", input.hint());
            eprintln!("Example: {}", input.example());
            ExitCode::from(2)
        }
        _ => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Command::Play(args) => play(args).await,
        Command::Table { dice } => table(&dice),
        Command::Verify { key, value, digest } => verify(&key, value, &digest),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code(err),
    }
}
