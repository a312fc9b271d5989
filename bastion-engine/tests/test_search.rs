use std::collections::HashSet;

use bastion_core::Board;
use bastion_engine::{
    evaluate_position, DetailLevel, Engine, Evaluation, Search, SearchOptions, SearchResult,
    TimeBudget,
};

const WIN: i16 = 30_000;

fn board(fen: &str) -> Board {
    Board::from_fen(fen).unwrap()
}

fn search_depth(position: &Board, depth: u8) -> SearchResult {
    let mut search = Search::new();
    search.find_best(
        position,
        SearchOptions { max_depth: Some(depth), ..SearchOptions::default() },
    )
}

fn legal_set(position: &Board) -> HashSet<String> {
    position.legal_moves().iter().map(|mv| mv.to_string()).collect()
}

// The guard is one step away from the target castle: the engine must
// walk in and report a forced win
#[test]
fn mate_in_one_by_castle() {
    let position = board("7/3RG3/7/3BG3/7/7/7 r");
    let result = search_depth(&position, 4);

    let best = result.best_move.unwrap();
    assert_eq!("D6-D7-1", best.to_string());
    assert!(result.score.score() >= WIN - 2, "score was {}", result.score);
    assert!(legal_set(&position).contains(&best.to_string()));
}

// A tall tower can reach out and take the enemy guard outright
#[test]
fn mate_in_one_by_guard_capture() {
    let position = board("3BG3/7/7/3r33/7/7/RG6 r");
    let result = search_depth(&position, 4);

    let best = result.best_move.unwrap();
    assert_eq!("D4-D7-3", best.to_string());
    assert!(result.score.score() >= WIN - 2, "score was {}", result.score);
    assert!(legal_set(&position).contains(&best.to_string()));
}

// Mate scores must come out of the table with the right distance no
// matter which search stored them first
#[test]
fn mate_scores_survive_the_table() {
    let position = board("3BG3/7/7/3r33/7/7/RG6 r");
    let mut search = Search::new();

    let shallow = search.find_best(
        &position,
        SearchOptions { max_depth: Some(3), ..SearchOptions::default() },
    );
    let deep = search.find_best(
        &position,
        SearchOptions { max_depth: Some(6), ..SearchOptions::default() },
    );

    assert_eq!(shallow.score.score(), deep.score.score());
    assert_eq!(shallow.best_move.unwrap(), deep.best_move.unwrap());
    assert_eq!(WIN - 1, deep.score.score());
}

// The opening position is roughly balanced and searches comfortably
// past depth four inside a second
#[test]
fn starting_position_is_balanced() {
    let position = board("3BG3/7/7/7/7/7/3RG3 r");
    let mut engine = Engine::new(1_000, 1).with_max_depth(6);
    let report = engine.search_with_budget(&position, TimeBudget::for_target(1_000));

    assert!(report.depth >= 4, "only reached depth {}", report.depth);
    let best = report.best_move.unwrap();
    assert!(legal_set(&position).contains(&best.to_string()));
    assert!(report.score.score().abs() <= 200, "score was {}", report.score);
}

// Even a tiny budget must produce a legal move: a cancellation before
// depth 1 falls back to the first legal one
#[test]
fn tiny_budgets_still_move() {
    let position = board("6BG/7/7/7/7/b16/RG6 r");
    let mut engine = Engine::new(10, 1);
    let report = engine.search_with_budget(&position, TimeBudget::for_target(10));

    let best = report.best_move.unwrap();
    assert!(legal_set(&position).contains(&best.to_string()));
}

// Quiet positions must not blow up the quiescence search: the tactical
// generator returns guard advances at most, and the search stays sane
#[test]
fn quiet_positions_search_cleanly() {
    let position = board("6BG/7/7/1r12b12/7/7/RG6 r");
    assert!(position.tactical_moves().iter().all(|mv| !mv.is_capture(&position)));

    let result = search_depth(&position, 5);
    let best = result.best_move.unwrap();
    assert!(legal_set(&position).contains(&best.to_string()));
    assert!(!result.score.is_mate());
}

// Two fresh searches of the same position at the same depth must agree
// bit for bit
#[test]
fn search_is_deterministic() {
    let position = board("RG6/1r12b12/7/3b43/7/2r24/6BG b");

    let first = search_depth(&position, 4);
    let second = search_depth(&position, 4);

    assert_eq!(first.best_move.unwrap(), second.best_move.unwrap());
    assert_eq!(first.score.score(), second.score.score());
    assert_eq!(first.depth, second.depth);
}

// On forced lines the full search must agree with a plain reference
// negamax that knows nothing about pruning, tables or quiescence
#[test]
fn forced_scores_match_a_reference_minimax() {
    for fen in ["7/3RG3/7/3BG3/7/7/7 r", "3BG3/7/7/3r33/7/7/RG6 r"] {
        let position = board(fen);
        let reference = reference_negamax(&position, 3, 0);
        let result = search_depth(&position, 3);
        assert_eq!(reference.score(), result.score.score(), "diverged on {fen}");
    }
}

// An engine playing under the clock returns moves that exist, and its
// clock bookkeeping survives a few moves
#[test]
fn clocked_play_stays_legal() {
    let mut engine = Engine::new(2_000, 20);
    let mut position = board("3BG3/7/7/2r1b13/7/7/3RG3 r");

    for _ in 0..3 {
        if position.is_terminal().is_some() {
            break;
        }
        let report = engine.find_best_move(&position);
        let best = report.best_move.unwrap();
        assert!(legal_set(&position).contains(&best.to_string()));
        position = position.make_move(&best).unwrap();
    }
}

///////////////////////////////////////////////////////////////////////////////

// Plain negamax over the full move list, no pruning of any kind; leaf
// nodes use the comprehensive evaluation
fn reference_negamax(position: &Board, depth: u8, ply: usize) -> Evaluation {
    if position.is_terminal().is_some() || depth == 0 {
        return evaluate_position(position, ply, DetailLevel::Comprehensive)
            .relative_to(position.turn_color());
    }

    let mut best = Evaluation::min_val();
    for mv in position.legal_moves() {
        let next = position.make_move(&mv).unwrap();
        let score = -reference_negamax(&next, depth - 1, ply + 1);
        if score > best {
            best = score;
        }
    }
    best
}
