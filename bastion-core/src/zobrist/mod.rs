mod zobrist_utils;

pub use zobrist_utils::{get_key_guard, get_key_red_turn, get_key_tower};
