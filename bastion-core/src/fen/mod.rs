mod fen_utils;

pub use fen_utils::{read_fen, write_fen, FenInfo, DEFAULT_FEN};
