use std::fmt::Display;
use std::result::Result;

use crate::board::BitBoard;
use crate::errors::Error;
use crate::fen::{read_fen, write_fen, DEFAULT_FEN};
use crate::game_elements::{Color, Color::*, Move, Square};
use crate::zobrist;
use super::movegen;

/// The full game state: guard and tower bitboards per side, stack heights,
/// side to move and the incrementally maintained zobrist key. Boards are
/// cheap to copy; `make_move` returns the successor and leaves the
/// original untouched, which is what the search relies on when branching.
#[derive(Clone, Copy)]
pub struct Board {
    turn: Color,
    guards: [BitBoard; 2],
    towers: [BitBoard; 2],
    heights: [[u8; 49]; 2],
    move_counter: u16,
    zobrist_key: u64,
}

impl Board {
    pub fn from_fen(fen: &str) -> Result<Self, Error> {
        let fen_info = read_fen(fen)?;

        let mut board = Self {
            turn: fen_info.turn,
            guards: fen_info.guards,
            towers: fen_info.towers,
            heights: fen_info.heights,
            move_counter: 0,
            zobrist_key: 0,
        };

        board.create_zobrist_key();
        Ok(board)
    }

    pub fn fen(&self) -> String {
        write_fen(self)
    }

    /// Applies a move, returning the resulting board. The caller is
    /// expected to pass moves produced by the generator; only cheap
    /// invariant checks are performed here, and a violation means the
    /// caller has a bug.
    pub fn make_move(&self, movement: &Move) -> Result<Self, Error> {
        let me = self.turn;
        let enemy = !me;
        let (from, to, amount) = (movement.from, movement.to, movement.amount);

        let moving_guard = self.guards[me.to_index()].contains(from);
        self.check_invariants(movement, moving_guard)?;

        // Copy the current board and make the changes on it
        let mut new_board = *self;

        // Remove whatever the enemy had on the destination square
        if new_board.guards[enemy.to_index()].contains(to) {
            new_board.guards[enemy.to_index()].clear(to);
            new_board.zobrist_key ^= zobrist::get_key_guard(enemy, to);
        } else if new_board.towers[enemy.to_index()].contains(to) {
            let captured_height = new_board.heights[enemy.to_index()][to.index()];
            new_board.towers[enemy.to_index()].clear(to);
            new_board.heights[enemy.to_index()][to.index()] = 0;
            new_board.zobrist_key ^= zobrist::get_key_tower(enemy, to, captured_height);
        }

        if moving_guard {
            new_board.guards[me.to_index()] = BitBoard::from_square(to);
            new_board.zobrist_key ^=
                zobrist::get_key_guard(me, from) ^ zobrist::get_key_guard(me, to);
        } else {
            let mi = me.to_index();

            // Split `amount` pieces off the source tower
            let from_height = new_board.heights[mi][from.index()];
            let remaining = from_height - amount;
            new_board.zobrist_key ^= zobrist::get_key_tower(me, from, from_height);
            new_board.heights[mi][from.index()] = remaining;
            if remaining == 0 {
                new_board.towers[mi].clear(from);
            } else {
                new_board.zobrist_key ^= zobrist::get_key_tower(me, from, remaining);
            }

            // Land them, stacking on top of a friendly tower if present
            let stacked = new_board.heights[mi][to.index()];
            if stacked > 0 {
                new_board.zobrist_key ^= zobrist::get_key_tower(me, to, stacked);
            }
            let new_height = stacked + amount;
            new_board.heights[mi][to.index()] = new_height;
            new_board.towers[mi].set(to);
            new_board.zobrist_key ^= zobrist::get_key_tower(me, to, new_height);
        }

        new_board.turn = enemy;
        new_board.zobrist_key ^= zobrist::get_key_red_turn();
        new_board.move_counter += 1;
        Ok(new_board)
    }

    /// Passes the turn without touching any piece. Used by the search
    /// for null-move pruning; never a legal game move.
    pub fn make_null_move(&self) -> Self {
        let mut new_board = *self;
        new_board.turn = !self.turn;
        new_board.zobrist_key ^= zobrist::get_key_red_turn();
        new_board
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(128);
        movegen::generate(self, &mut moves);
        moves
    }

    pub fn tactical_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(32);
        movegen::generate_tactical(self, &mut moves);
        moves
    }

    /// Fills `moves` with every legal move, exactly once each. The buffer
    /// is cleared first so it can be reused across calls.
    pub fn generate_moves(&self, moves: &mut Vec<Move>) {
        movegen::generate(self, moves);
    }

    /// Captures plus guard steps that close in on the target castle.
    pub fn generate_tactical(&self, moves: &mut Vec<Move>) {
        movegen::generate_tactical(self, moves);
    }

    /// Whether the enemy could take this side's guard if it were allowed
    /// to move right now.
    pub fn guard_in_danger(&self, color: Color) -> bool {
        movegen::guard_in_danger(self, color)
    }

    pub fn is_terminal(&self) -> Option<Color> {
        if self.guards[Blue.to_index()].is_empty()
            || self.guards[Red.to_index()].contains(Square::BLUE_CASTLE)
        {
            Some(Red)
        } else if self.guards[Red.to_index()].is_empty()
            || self.guards[Blue.to_index()].contains(Square::RED_CASTLE)
        {
            Some(Blue)
        } else {
            None
        }
    }

    pub fn turn_color(&self) -> Color {
        self.turn
    }

    pub fn zobrist_key(&self) -> u64 {
        self.zobrist_key
    }

    pub fn move_counter(&self) -> u16 {
        self.move_counter
    }

    pub fn guard(&self, color: Color) -> BitBoard {
        self.guards[color.to_index()]
    }

    pub fn guard_square(&self, color: Color) -> Option<Square> {
        let guard = self.guards[color.to_index()];
        if guard.is_empty() {
            None
        } else {
            Some(guard.first_square())
        }
    }

    pub fn towers(&self, color: Color) -> BitBoard {
        self.towers[color.to_index()]
    }

    pub fn height(&self, color: Color, square: Square) -> u8 {
        self.heights[color.to_index()][square.index()]
    }

    pub fn occupied_by(&self, color: Color) -> BitBoard {
        self.guards[color.to_index()] | self.towers[color.to_index()]
    }

    pub fn all_pieces(&self) -> BitBoard {
        self.occupied_by(Red) | self.occupied_by(Blue)
    }

    pub fn color_on(&self, square: Square) -> Option<Color> {
        if self.occupied_by(Red).contains(square) {
            Some(Red)
        } else if self.occupied_by(Blue).contains(square) {
            Some(Blue)
        } else {
            None
        }
    }

    /// Total number of pieces a side has on the board, guard excluded.
    pub fn tower_material(&self, color: Color) -> u32 {
        self.towers[color.to_index()]
            .squares()
            .map(|sq| self.heights[color.to_index()][sq.index()] as u32)
            .sum()
    }

    ///////////////////////////////////////////////////////////////////////////
    /// Private auxiliary functions

    fn check_invariants(&self, movement: &Move, moving_guard: bool) -> Result<(), Error> {
        let me = self.turn;
        let (from, to, amount) = (movement.from, movement.to, movement.amount);

        let illegal = |reason| Err(Error::IllegalMove { mv: movement.to_string(), reason });

        if moving_guard {
            if amount != 1 {
                return illegal("a guard moves exactly one piece");
            }
            if from.manhattan(to) != 1 {
                return illegal("a guard steps exactly one square orthogonally");
            }
            if self.towers[me.to_index()].contains(to) {
                return illegal("a guard cannot climb a friendly tower");
            }
        } else {
            let height = self.heights[me.to_index()][from.index()];
            if height == 0 {
                return illegal("no piece of the moving side on the source square");
            }
            if amount == 0 || amount > height {
                return illegal("amount out of range for the source tower");
            }
            if from.rank() != to.rank() && from.file() != to.file() {
                return illegal("a tower moves along a rank or a file");
            }
            if from.manhattan(to) != amount {
                return illegal("a tower travels exactly as many squares as pieces moved");
            }
            if self.guards[me.to_index()].contains(to) {
                return illegal("a tower cannot land on its own guard");
            }
        }

        Ok(())
    }

    fn create_zobrist_key(&mut self) {
        // Creates the zobrist key for this board from scratch, assuming that
        // the initial value is 0. This should only be called once, when
        // the board is created. Incremental updates are done by make_move.
        for color in [Red, Blue] {
            for square in self.towers[color.to_index()].squares() {
                let height = self.heights[color.to_index()][square.index()];
                self.zobrist_key ^= zobrist::get_key_tower(color, square, height);
            }

            for square in self.guards[color.to_index()].squares() {
                self.zobrist_key ^= zobrist::get_key_guard(color, square);
            }
        }

        if self.turn == Red {
            self.zobrist_key ^= zobrist::get_key_red_turn();
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        // The default FEN is hard-coded and correct, so we can unwrap safely
        Self::from_fen(DEFAULT_FEN).unwrap()
    }
}

// Debug output is the FEN string: compact, and exactly what a failing
// assertion needs
impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.turn == other.turn
            && self.guards == other.guards
            && self.towers == other.towers
            && self.heights == other.heights
            && self.zobrist_key == other.zobrist_key
    }
}

impl Eq for Board {}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{} to play, move #{}\n", self.turn, self.move_counter + 1)?;
        writeln!(f, "  ┌────┬────┬────┬────┬────┬────┬────┐")?;

        for rank in (0..7u8).rev() {
            let cells = (0..7u8)
                .map(|file| {
                    let sq = Square::from_file_rank(file, rank).unwrap();
                    let token = if self.guards[Red.to_index()].contains(sq) {
                        "RG".to_string()
                    } else if self.guards[Blue.to_index()].contains(sq) {
                        "BG".to_string()
                    } else if self.towers[Red.to_index()].contains(sq) {
                        format!("r{}", self.heights[Red.to_index()][sq.index()])
                    } else if self.towers[Blue.to_index()].contains(sq) {
                        format!("b{}", self.heights[Blue.to_index()][sq.index()])
                    } else {
                        String::new()
                    };
                    format!("{token:^4}")
                })
                .collect::<Vec<String>>()
                .join("│");

            writeln!(f, "{} │{}│", rank + 1, cells)?;

            if rank != 0 {
                writeln!(f, "  ├────┼────┼────┼────┼────┼────┼────┤")?;
            }
        }

        writeln!(f, "  └────┴────┴────┴────┴────┴────┴────┘")?;
        writeln!(f, "    A    B    C    D    E    F    G")?;
        Ok(())
    }
}
