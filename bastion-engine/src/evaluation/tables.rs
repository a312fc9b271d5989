use super::EvalScore;

/// Guard racing bonus, indexed by the number of ranks still to cross to
/// reach the target castle. Index 0 only matters transiently: standing on
/// the castle is a terminal position.
pub const GUARD_ADVANCE: [EvalScore; 7] = [240, 180, 110, 65, 35, 15, 0];

/// Centrality bonus per square; the board center is worth the most and
/// the corners nothing.
#[rustfmt::skip]
pub const CENTRALITY: [EvalScore; 49] = [
     0,  2,  4,  6,  4,  2,  0,
     2,  4,  6,  8,  6,  4,  2,
     4,  6,  8, 10,  8,  6,  4,
     6,  8, 10, 12, 10,  8,  6,
     4,  6,  8, 10,  8,  6,  4,
     2,  4,  6,  8,  6,  4,  2,
     0,  2,  4,  6,  4,  2,  0,
];
