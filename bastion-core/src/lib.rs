mod board;
mod errors;
mod fen;
mod game_elements;
mod zobrist;

pub use board::{BitBoard, Board};
pub use errors::Error;
pub use fen::DEFAULT_FEN;
pub use game_elements::{Color, Move, Square};
