//! AI simulator CLI — fast in-memory Baloot games for bot evaluation.
//!
//! Runs whole games without any transport or persistence, which makes it
//! the quickest way to pit bot configurations against each other and to
//! smoke-test the engine end to end.

mod output;
mod simulator;
mod types;

use baloot_engine::ai::registry::create_bot;
use baloot_engine::ai::trait_def::BotPlayer;
use clap::{Parser, ValueEnum};
use rand::Rng;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use output::OutputWriter;
use simulator::Simulator;
use types::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BotKind {
    Random,
    Brain,
    Aggressive,
    Cautious,
    Tricky,
}

impl BotKind {
    fn name(self) -> &'static str {
        match self {
            BotKind::Random => "random",
            BotKind::Brain => "brain",
            BotKind::Aggressive => "aggressive",
            BotKind::Cautious => "cautious",
            BotKind::Tricky => "tricky",
        }
    }
}

#[derive(Parser)]
#[command(name = "ai-simulator")]
#[command(about = "Fast in-memory Baloot simulator for bot evaluation")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Bot kind for all seats (shortcut for the per-seat flags)
    #[arg(long, conflicts_with_all = ["seat0", "seat1", "seat2", "seat3"])]
    seats: Option<BotKind>,

    /// Bot kind for seat 0
    #[arg(long, default_value = "brain")]
    seat0: BotKind,

    /// Bot kind for seat 1
    #[arg(long, default_value = "brain")]
    seat1: BotKind,

    /// Bot kind for seat 2
    #[arg(long, default_value = "brain")]
    seat2: BotKind,

    /// Bot kind for seat 3
    #[arg(long, default_value = "brain")]
    seat3: BotKind,

    /// Base seed for deterministic games; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for per-game JSONL results
    #[arg(long)]
    output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let base_seed = args
        .seed
        .unwrap_or_else(|| rand::rng().random::<u64>());
    let kinds = match args.seats {
        Some(kind) => [kind; 4],
        None => [args.seat0, args.seat1, args.seat2, args.seat3],
    };
    info!(games = args.games, seed = base_seed, ?kinds, "simulation starting");

    let mut writer = OutputWriter::new(args.output.as_deref())?;
    let mut summary = RunSummary {
        games: args.games,
        ..RunSummary::default()
    };
    let started = Instant::now();

    for game_no in 0..args.games {
        let seed = base_seed.wrapping_add(u64::from(game_no));
        let bots: [Box<dyn BotPlayer>; 4] = std::array::from_fn(|seat| {
            create_bot(kinds[seat].name(), Some(seed.wrapping_add(seat as u64)))
                .expect("registry knows every BotKind")
        });
        let simulator = Simulator { bots };
        let result = simulator.run_game(game_no, seed);

        if result.winner == "us" {
            summary.us_wins += 1;
        } else {
            summary.them_wins += 1;
        }
        summary.total_rounds += result.rounds_played;
        summary.kaboot_rounds += result.kaboot_rounds;
        summary.khasara_rounds += result.khasara_rounds;
        summary.qayd_rounds += result.qayd_rounds;

        if let Err(err) = writer.write_game(&result) {
            warn!(%err, "failed to write game result");
        }
        info!(
            game = game_no,
            rounds = result.rounds_played,
            us = result.final_us,
            them = result.final_them,
            "game finished"
        );
    }

    summary.elapsed_ms = started.elapsed().as_millis();
    if let Some(path) = writer.finish(&summary)? {
        info!(path = %path.display(), "results written");
    }
    Ok(())
}
