//! chess-adapter - command-line checks for the engine adapters.
//!
//! Runs perft, lists legal moves with their action indices, classifies
//! positions and compares the two backends over the reference battery.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chess_core::{action, Move, Position, STARTPOS};
use clap::{Parser, Subcommand};
use engine_adapter::{AdapterConfig, BackendKind, EngineAdapter, ParityChecker};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-adapter")]
#[command(about = "Validate chess rule backends from the command line")]
struct Cli {
    /// Backend to use: native or third-party. Overrides the config file
    /// and the CHESS_ADAPTER_BACKEND variable.
    #[arg(short, long, global = true)]
    backend: Option<String>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf positions at a depth
    Perft {
        #[arg(short, long)]
        depth: u32,
        #[arg(long, default_value = STARTPOS)]
        fen: String,
        /// Print the count below every root move
        #[arg(long)]
        divide: bool,
    },
    /// List legal moves and their action indices
    Moves {
        #[arg(long, default_value = STARTPOS)]
        fen: String,
        /// Moves to play first, in long algebraic notation
        #[arg(num_args = 0..)]
        moves: Vec<String>,
    },
    /// Report whether the game is over
    Outcome {
        #[arg(long, default_value = STARTPOS)]
        fen: String,
        #[arg(num_args = 0..)]
        moves: Vec<String>,
    },
    /// Compare native and third-party over the reference positions
    Parity {
        /// Deepest perft to compare; defaults to the configured depth
        #[arg(short, long)]
        depth: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AdapterConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AdapterConfig::load()?,
    }
    .with_env_override()
    .with_backend_override(cli.backend);

    let max_depth = config.parity.max_perft_depth;

    match cli.command {
        Commands::Perft { depth, fen, divide } => {
            check_depth(depth, max_depth)?;
            let adapter = config.build()?;
            let position = load_position(&adapter, &fen, &[])?;
            tracing::info!(backend = adapter.name(), depth, "running perft");

            if divide {
                let counts = adapter.perft_divide(&position, depth)?;
                for (mv, count) in &counts {
                    println!("{mv}: {count}");
                }
                println!();
                println!("Moves: {}", counts.len());
                println!("Nodes: {}", counts.iter().map(|(_, n)| n).sum::<u64>());
            } else {
                println!("{}", adapter.perft(&position, depth)?);
            }
        }
        Commands::Moves { fen, moves } => {
            let adapter = config.build()?;
            let position = load_position(&adapter, &fen, &moves)?;
            for mv in adapter.legal_moves(&position)? {
                println!("{mv} {}", action::encode(mv));
            }
        }
        Commands::Outcome { fen, moves } => {
            let adapter = config.build()?;
            let position = load_position(&adapter, &fen, &moves)?;
            let info = adapter.outcome(&position)?;
            println!("{}", adapter.to_notation(&position));
            println!("{info}");
        }
        Commands::Parity { depth } => {
            let depth = depth.unwrap_or(config.parity.perft_depth);
            check_depth(depth, max_depth)?;
            let native = BackendKind::Native.build();
            let third_party = BackendKind::ThirdParty.build();
            let report = ParityChecker::new(&native, &third_party)
                .with_perft_depth(depth)
                .check_battery();
            print!("{report}");
            if !report.is_clean() {
                bail!("{} divergences", report.divergences.len());
            }
        }
    }

    Ok(())
}

fn check_depth(depth: u32, max: u32) -> anyhow::Result<()> {
    if depth > max {
        bail!("perft depth {depth} exceeds the configured maximum of {max}");
    }
    Ok(())
}

/// Parses `fen` and plays `moves` on it.
fn load_position(
    adapter: &dyn EngineAdapter,
    fen: &str,
    moves: &[String],
) -> anyhow::Result<Position> {
    let mut position = adapter.from_notation(fen)?;
    for uci in moves {
        let mv: Move = uci.parse().with_context(|| format!("parsing move '{uci}'"))?;
        position = adapter.apply_move(&position, mv)?;
    }
    Ok(position)
}
