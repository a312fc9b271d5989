use std::time::Instant;

use bastion_core::{Board, Move};
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::evaluation::Evaluation;
use crate::search::{Search, SearchOptions, SearchResult};
use crate::time::{TimeBudget, TimeManager};

/// Everything a front end needs to know about a decided move.
#[derive(Debug, Clone, Copy)]
pub struct MoveReport {
    pub best_move: Option<Move>,
    pub score: Evaluation,
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
}

/// Glue between the clock and the search: owns the time manager and a
/// long-lived `Search`, so the transposition table keeps helping across
/// the moves of a game.
pub struct Engine {
    timer: TimeManager,
    search: Search,
    max_depth: Option<u8>,
}

impl Engine {
    pub fn new(total_time_ms: u64, expected_moves_remaining: u64) -> Self {
        Self {
            timer: TimeManager::new(total_time_ms, expected_moves_remaining),
            search: Search::new(),
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Plays under the game clock: asks the time manager for a slice,
    /// searches, and commits the time actually used.
    pub fn find_best_move(&mut self, board: &Board) -> MoveReport {
        let budget = self.timer.allocate(board);
        let report = self.search_with_budget(board, budget);
        self.timer.commit_move(report.time_ms);
        report
    }

    /// One-shot search with an externally fixed time budget; the game
    /// clock is left untouched.
    pub fn search_with_budget(&mut self, board: &Board, budget: TimeBudget) -> MoveReport {
        let stop_flag = self.timer.start_move(budget.target_ms);
        let started = Instant::now();

        let options = SearchOptions {
            max_depth: self.max_depth,
            detail: budget.detail,
            use_aspiration: !budget.emergency,
            stop_flag,
        };

        let SearchResult { mut best_move, score, depth, nodes } =
            self.search.find_best(board, options);
        let time_ms = started.elapsed().as_millis() as u64;

        // A cancellation before depth 1 completed leaves no move behind;
        // any legal move beats forfeiting on time
        if best_move.is_none() {
            if let Some(&first) = board.legal_moves().first() {
                warn!("search cancelled before depth 1, falling back to the first legal move");
                best_move = Some(first);
            }
        }

        info!(
            best_move = %best_move.map(|mv| mv.to_string()).unwrap_or_else(|| "-".to_owned()),
            score = %score,
            depth,
            nodes,
            time_ms,
            "search finished"
        );

        MoveReport { best_move, score, depth, nodes, time_ms }
    }
}

/// Wire-keyed index of the legal moves, for front ends that submit moves
/// as strings.
pub fn legal_move_map(board: &Board) -> FxHashMap<String, Move> {
    board
        .legal_moves()
        .into_iter()
        .map(|mv| (mv.to_string(), mv))
        .collect()
}
