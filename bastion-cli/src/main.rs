use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bastion_core::{Board, Error};
use bastion_engine::{Engine, TimeBudget};

#[derive(Parser)]
#[command(name = "bastion", about = "A Guards & Towers playing engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a position and print the best move found
    Search {
        /// Position to search, in FEN
        fen: String,
        /// Time budget for the move, in milliseconds
        #[arg(long, default_value_t = 1000)]
        ms: u64,
        /// Optional hard cap on the search depth
        #[arg(long)]
        depth: Option<u8>,
    },
    /// Count the leaf nodes of the move generator at a given depth
    Perft {
        /// Position to expand, in FEN
        fen: String,
        depth: usize,
    },
    /// List every legal move of a position, one per line
    Moves {
        /// Position to inspect, in FEN
        fen: String,
    },
}

enum AppError {
    InvalidFen(String),
    Internal(String),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::InvalidFen(msg)) => {
            eprintln!("invalid FEN: {msg}");
            ExitCode::from(1)
        }
        Err(AppError::Internal(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Search { fen, ms, depth } => search(&fen, ms, depth),
        Command::Perft { fen, depth } => {
            let board = parse_board(&fen)?;
            println!("{}", board.perft(depth));
            Ok(())
        }
        Command::Moves { fen } => {
            let board = parse_board(&fen)?;
            for mv in board.legal_moves() {
                println!("{mv}");
            }
            Ok(())
        }
    }
}

fn search(fen: &str, ms: u64, depth: Option<u8>) -> Result<(), AppError> {
    let board = parse_board(fen)?;

    if let Some(winner) = board.is_terminal() {
        println!("game over: {winner} wins");
        return Ok(());
    }

    let mut engine = Engine::new(ms, 1);
    if let Some(depth) = depth {
        engine = engine.with_max_depth(depth);
    }

    let report = engine.search_with_budget(&board, TimeBudget::for_target(ms));

    // The engine falls back to the first legal move on a timeout, so an
    // empty result here means the generator found nothing in a position
    // that is not over: that is a bug, not a user error
    let best_move = report
        .best_move
        .ok_or_else(|| AppError::Internal("no legal moves in a non-terminal position".to_owned()))?;

    println!(
        "bestmove {} score {} depth {} nodes {} time {}",
        best_move,
        report.score.score(),
        report.depth,
        report.nodes,
        report.time_ms
    );

    Ok(())
}

fn parse_board(fen: &str) -> Result<Board, AppError> {
    Board::from_fen(fen).map_err(|err| match err {
        Error::InvalidFen(msg) => AppError::InvalidFen(msg),
        other => AppError::Internal(other.to_string()),
    })
}
