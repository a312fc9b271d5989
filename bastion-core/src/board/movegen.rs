use crate::board::Board;
use crate::game_elements::{Color, Move};

// Orthogonal step directions as (d_file, d_rank)
const DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Fills `moves` with every legal move for the side to play, each exactly
/// once. There is no check concept: the only friendly-piece restrictions
/// are that nothing may land on one's own guard and that a guard may not
/// climb a friendly tower.
pub fn generate(board: &Board, moves: &mut Vec<Move>) {
    moves.clear();
    if board.is_terminal().is_some() {
        return;
    }

    let me = board.turn_color();
    let own_towers = board.towers(me);
    let own_guard = board.guard(me);
    let all_pieces = board.all_pieces();

    // Guard: one square orthogonally, onto anything but a friendly piece
    if let Some(from) = board.guard_square(me) {
        for (d_file, d_rank) in DIRECTIONS {
            if let Some(to) = from.offset(d_file, d_rank, 1) {
                if !own_towers.contains(to) {
                    moves.push(Move::new(from, to, 1));
                }
            }
        }
    }

    // Towers: splitting off k pieces travels exactly k squares down a
    // clear line. The first occupied square ends the ray; landing there
    // stacks on a friendly tower or captures an enemy piece.
    for from in own_towers.squares() {
        let height = board.height(me, from);
        for (d_file, d_rank) in DIRECTIONS {
            for k in 1..=height {
                let Some(to) = from.offset(d_file, d_rank, k) else {
                    break;
                };

                if all_pieces.contains(to) {
                    if !own_guard.contains(to) {
                        moves.push(Move::new(from, to, k));
                    }
                    break;
                }

                moves.push(Move::new(from, to, k));
            }
        }
    }
}

/// The quiescence subset: every capture, plus guard steps that strictly
/// reduce the distance to the target castle. Nothing else.
pub fn generate_tactical(board: &Board, moves: &mut Vec<Move>) {
    moves.clear();
    if board.is_terminal().is_some() {
        return;
    }

    let me = board.turn_color();
    let enemy_pieces = board.occupied_by(!me);
    let all_pieces = board.all_pieces();

    if let Some(from) = board.guard_square(me) {
        let castle = me.target_castle();
        for (d_file, d_rank) in DIRECTIONS {
            if let Some(to) = from.offset(d_file, d_rank, 1) {
                if enemy_pieces.contains(to)
                    || (!all_pieces.contains(to) && to.manhattan(castle) < from.manhattan(castle))
                {
                    moves.push(Move::new(from, to, 1));
                }
            }
        }
    }

    for from in board.towers(me).squares() {
        let height = board.height(me, from);
        for (d_file, d_rank) in DIRECTIONS {
            for k in 1..=height {
                let Some(to) = from.offset(d_file, d_rank, k) else {
                    break;
                };

                if all_pieces.contains(to) {
                    if enemy_pieces.contains(to) {
                        moves.push(Move::new(from, to, k));
                    }
                    break;
                }
            }
        }
    }
}

/// Whether the enemy has a move that lands on this side's guard. Walks
/// the four rays outward from the guard; the first piece on a ray decides:
/// an enemy tower reaches the guard iff it can split off exactly as many
/// pieces as the distance, and an adjacent enemy guard always does.
pub fn guard_in_danger(board: &Board, color: Color) -> bool {
    let Some(at) = board.guard_square(color) else {
        return false;
    };

    let enemy = !color;
    let enemy_guard = board.guard(enemy);
    let enemy_towers = board.towers(enemy);
    let all_pieces = board.all_pieces();

    for (d_file, d_rank) in DIRECTIONS {
        for k in 1..=6u8 {
            let Some(sq) = at.offset(d_file, d_rank, k) else {
                break;
            };

            if !all_pieces.contains(sq) {
                continue;
            }

            if enemy_towers.contains(sq) && board.height(enemy, sq) >= k {
                return true;
            }

            if k == 1 && enemy_guard.contains(sq) {
                return true;
            }

            break;
        }
    }

    false
}
