use std::result::Result;

use crate::board::{BitBoard, Board};
use crate::errors::Error;
use crate::game_elements::{Color, Color::*, Square};

/// The initial position: both guards on their own castle squares.
pub const DEFAULT_FEN: &str = "3BG3/7/7/7/7/7/3RG3 r";

/// Raw piece placement read from a FEN string, consumed by `Board::from_fen`.
pub struct FenInfo {
    pub turn: Color,
    pub guards: [BitBoard; 2],
    pub towers: [BitBoard; 2],
    pub heights: [[u8; 49]; 2],
}

/// Parses the Guards & Towers FEN dialect: seven `/`-separated rank
/// fields given from rank 7 down to rank 1, each a sequence of empty-run
/// digits (1..7), tower tokens `r<h>`/`b<h>` and guard tokens `RG`/`BG`,
/// followed by the side to move (`r` or `b`).
pub fn read_fen(fen: &str) -> Result<FenInfo, Error> {
    let fen_parts: Vec<&str> = fen.split_whitespace().collect();

    if fen_parts.len() != 2 {
        return Err(invalid("a FEN must have a board part and a side to move"));
    }

    let mut fen_info = FenInfo {
        turn: Red,
        guards: [BitBoard::default(); 2],
        towers: [BitBoard::default(); 2],
        heights: [[0; 49]; 2],
    };

    // Load the board state, returning an error on any unexpected character
    load_board(fen_parts[0], &mut fen_info)?;

    // Load the current turn
    fen_info.turn = match fen_parts[1] {
        "r" => Red,
        "b" => Blue,
        x => return Err(invalid(format!("the side to move '{x}' is invalid"))),
    };

    Ok(fen_info)
}

/// Renders a board back into the FEN dialect accepted by `read_fen`.
pub fn write_fen(board: &Board) -> String {
    let mut out = String::with_capacity(64);

    for rank in (0..7u8).rev() {
        let mut empties = 0;

        for file in 0..7u8 {
            // The coordinates are in range, so the square always exists
            let square = Square::from_file_rank(file, rank).unwrap();

            let token = if board.guard(Red).contains(square) {
                Some("RG".to_string())
            } else if board.guard(Blue).contains(square) {
                Some("BG".to_string())
            } else if board.towers(Red).contains(square) {
                Some(format!("r{}", board.height(Red, square)))
            } else if board.towers(Blue).contains(square) {
                Some(format!("b{}", board.height(Blue, square)))
            } else {
                None
            };

            match token {
                Some(token) => {
                    if empties > 0 {
                        out.push((b'0' + empties) as char);
                        empties = 0;
                    }
                    out.push_str(&token);
                }
                None => empties += 1,
            }
        }

        if empties > 0 {
            out.push((b'0' + empties) as char);
        }

        if rank > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(match board.turn_color() {
        Red => 'r',
        Blue => 'b',
    });

    out
}

fn load_board(board_info: &str, fen_info: &mut FenInfo) -> Result<(), Error> {
    let rows: Vec<&str> = board_info.split('/').collect();

    if rows.len() != 7 {
        return Err(invalid("the board must have 7 ranks"));
    }

    for (row_i, row_info) in rows.iter().enumerate() {
        let rank = 6 - row_i as u8;
        let mut file = 0u8;
        let mut chars = row_info.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '1'..='7' => {
                    file += ch as u8 - b'0';
                }
                'r' | 'b' => {
                    let color = if ch == 'r' { Red } else { Blue };
                    let height = match chars.next() {
                        Some(h @ '1'..='9') => h as u8 - b'0',
                        _ => {
                            return Err(invalid(format!(
                                "tower token '{ch}' must be followed by a height 1-9"
                            )))
                        }
                    };

                    let square = square_at(file, rank)?;
                    fen_info.towers[color.to_index()].set(square);
                    fen_info.heights[color.to_index()][square.index()] = height;
                    file += 1;
                }
                'R' | 'B' => {
                    if chars.next() != Some('G') {
                        return Err(invalid(format!("unexpected character '{ch}' in a rank")));
                    }

                    let color = if ch == 'R' { Red } else { Blue };
                    if fen_info.guards[color.to_index()].is_not_empty() {
                        return Err(invalid(format!("{color} has more than one guard")));
                    }

                    fen_info.guards[color.to_index()].set(square_at(file, rank)?);
                    file += 1;
                }
                x => return Err(invalid(format!("unexpected character '{x}' in a rank"))),
            }
        }

        if file != 7 {
            return Err(invalid(format!("rank {} does not describe 7 squares", rank + 1)));
        }
    }

    if fen_info.guards[Red.to_index()].is_empty() && fen_info.guards[Blue.to_index()].is_empty() {
        return Err(invalid("at least one guard must be on the board"));
    }

    Ok(())
}

fn square_at(file: u8, rank: u8) -> Result<Square, Error> {
    Square::from_file_rank(file, rank)
        .ok_or_else(|| invalid(format!("rank {} describes more than 7 squares", rank + 1)))
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidFen(msg.into())
}
