use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_elements::{Color, Square};

/*
 The 785 elements in the array are logically distributed as follows:
 - 686 for towers: (color, square, height bucket 1..=7) (0-685)
    - The position of the array for a tower is:
      343 * color + 7 * square + (bucket - 1)
 - 98 for guards: (color, square) (686-783)
 - 1 to signal that red is to move (784)
*/
const HEIGHT_BUCKETS: usize = 7;
const TOWER_KEYS: usize = 2 * 49 * HEIGHT_BUCKETS;
const GUARD_KEYS: usize = 2 * 49;
const N_KEYS: usize = TOWER_KEYS + GUARD_KEYS + 1;

// Fixed seed: the same keys are produced on every process start, so
// hashes stay comparable for as long as a table lives.
const ZOBRIST_SEED: u64 = 0x1B56_CE8A_9F4D_3E27;

lazy_static! {
    static ref ZOBRIST_VALUES: [u64; N_KEYS] = {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut values = [0u64; N_KEYS];
        for value in values.iter_mut() {
            *value = rng.gen();
        }
        values
    };
}

/// Key for a tower of the given height. Heights above the top bucket
/// share its key and are treated as hash-equivalent.
pub fn get_key_tower(color: Color, square: Square, height: u8) -> u64 {
    debug_assert!(height > 0);
    let bucket = (height.min(HEIGHT_BUCKETS as u8) - 1) as usize;
    ZOBRIST_VALUES[color.to_index() * 49 * HEIGHT_BUCKETS + square.index() * HEIGHT_BUCKETS + bucket]
}

pub fn get_key_guard(color: Color, square: Square) -> u64 {
    ZOBRIST_VALUES[TOWER_KEYS + color.to_index() * 49 + square.index()]
}

pub fn get_key_red_turn() -> u64 {
    ZOBRIST_VALUES[TOWER_KEYS + GUARD_KEYS]
}
