use bastion_core::{Board, Move, Square};
use super::history::HistoryTable;

// Heuristic values of different kinds of moves
// The priorities and assigned score ranges are as follows:
// Move stored in the TT: Max
// Captures using MVV-LVA: [Max - 3100, Max - 1010]
// Primary killer move: Max - 3101
// Secondary killer move: Max - 3102
// History heuristics: rest

pub type MoveScore = i32;

const TT_MOVE: MoveScore = MoveScore::MAX; // Best move stored in the transposition table
const CAPTURE_BASE_VAL: MoveScore = MoveScore::MAX - 3000; // Base value for captures
const PRIMARY_KILLER: MoveScore = CAPTURE_BASE_VAL - 101; // Primary killer move for this ply
const SECONDARY_KILLER: MoveScore = PRIMARY_KILLER - 1; // Secondary killer move for this ply
pub const MAX_HISTORY_VAL: MoveScore = SECONDARY_KILLER - 1;

const GUARD_VALUE: MoveScore = 2000;
const TILE_VALUE: MoveScore = 100;

// Struct to hold a pair of (Move, move heuristical value)
pub struct RatedMove {
    pub mv: Move,
    pub score: MoveScore,
}

// Rates the legal moves for the current position into `rated`, best
// first, given (optionally) the best move stored in the transposition
// table and the killers for the current ply.
pub fn order_moves(
    moves: &[Move],
    board: &Board,
    tt_move: Option<Move>,
    killers: &[Move; 2],
    history: &HistoryTable,
    rated: &mut Vec<RatedMove>,
) {
    rated.clear();
    rated.extend(moves.iter().map(|&mv| rate_move(mv, tt_move, board, killers, history)));
    rated.sort_by_key(|rm| rm.score);
}

// Rating for quiescence expansion: pure MVV-LVA, with non-captures
// (guard advances) trailing behind every capture.
pub fn order_tactical(moves: &[Move], board: &Board, rated: &mut Vec<RatedMove>) {
    rated.clear();
    rated.extend(moves.iter().map(|&mv| {
        let score = victim_value(board, mv.to) - attacker_value(board, &mv) / 10;
        RatedMove { mv, score: -score }
    }));
    rated.sort_by_key(|rm| rm.score);
}

// Takes a move by value and returns a struct with that move
// and its heuristic value according to the consts above
fn rate_move(
    mv: Move,
    tt_move: Option<Move>,
    board: &Board,
    killers: &[Move; 2],
    history: &HistoryTable,
) -> RatedMove {
    let score = if tt_move == Some(mv) {
        TT_MOVE
    } else if mv.is_capture(board) {
        CAPTURE_BASE_VAL + victim_value(board, mv.to) - attacker_value(board, &mv) / 10
    } else if killers[0] == mv {
        PRIMARY_KILLER
    } else if killers[1] == mv {
        SECONDARY_KILLER
    } else {
        history.get_value(&mv, board.turn_color())
    };

    // The move rating is negated so that higher rated moves go first
    RatedMove { mv, score: -score }
}

/// Most Valuable Victim: what currently sits on `square`, as seen by the
/// side to move. Tower values saturate at the guard's value so the
/// capture tier never spills into the TT move's slot.
pub fn victim_value(board: &Board, square: Square) -> MoveScore {
    let enemy = !board.turn_color();
    if board.guard(enemy).contains(square) {
        GUARD_VALUE
    } else {
        (TILE_VALUE * board.height(enemy, square) as MoveScore).min(GUARD_VALUE)
    }
}

// Least Valuable Aggressor: the value of what is being risked by moving
fn attacker_value(board: &Board, mv: &Move) -> MoveScore {
    if board.guard(board.turn_color()).contains(mv.from) {
        GUARD_VALUE
    } else {
        TILE_VALUE * mv.amount as MoveScore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_all(board: &Board, tt_move: Option<Move>, killers: [Move; 2]) -> Vec<Move> {
        let history = HistoryTable::new();
        let mut rated = Vec::new();
        order_moves(&board.legal_moves(), board, tt_move, &killers, &history, &mut rated);
        rated.into_iter().map(|rm| rm.mv).collect()
    }

    #[test]
    fn tt_move_goes_first() {
        let board = Board::from_fen(bastion_core::DEFAULT_FEN).unwrap();
        let tt_move: Move = "D1-D2-1".parse().unwrap();
        let ordered = rate_all(&board, Some(tt_move), [Move::empty(); 2]);
        assert_eq!(tt_move, ordered[0]);
    }

    #[test]
    fn captures_outrank_quiets_and_killers() {
        // A red tower able to take a blue one, with a quiet killer set
        let board = Board::from_fen("3BG3/7/7/7/1b15/1r25/3RG3 r").unwrap();
        let killer: Move = "D1-E1-1".parse().unwrap();
        let ordered = rate_all(&board, None, [killer, Move::empty()]);

        let capture: Move = "B2-B3-1".parse().unwrap();
        assert_eq!(capture, ordered[0]);
        assert_eq!(killer, ordered[1]);
    }

    #[test]
    fn guard_victims_outvalue_tower_victims() {
        // Blue to move: the victims under consideration are red's pieces
        let board = Board::from_fen("3BG3/7/7/2r44/7/7/3RG3 b").unwrap();

        assert_eq!(GUARD_VALUE, victim_value(&board, Square::RED_CASTLE));
        assert_eq!(
            4 * TILE_VALUE,
            victim_value(&board, Square::from_notation("C4").unwrap())
        );
        assert_eq!(0, victim_value(&board, Square::from_notation("A1").unwrap()));
    }
}
