use bastion_core::Move;

use crate::evaluation::{EvalScore, Evaluation};
use super::{NodeType, TTEntry};

/// Outcome of a table lookup. A `Hit` may be used as the node result
/// (subject to the caller's PV rules); a `Hint` only helps move ordering.
pub enum Probe {
    Hit { score: Evaluation, node_type: NodeType, mv: Option<Move> },
    Hint(Move),
    Miss,
}

// Two slots per bucket: one keeps the deepest entry ever written to the
// bucket (refreshed when the search age moves on), the other is
// overwritten on every store.
#[derive(Clone, Copy)]
struct Bucket {
    preferred: TTEntry,
    always: TTEntry,
}

/// A fixed-capacity, single-owner transposition table. Entries are only
/// ever evicted by write collisions, never by time.
pub struct TTable {
    buckets: Vec<Bucket>,
    mask: usize,
}

impl TTable {
    /// Builds a table with the given number of buckets, rounded up to a
    /// power of two so lookups reduce to a mask.
    pub fn new(buckets: usize) -> Self {
        let size = buckets.next_power_of_two();
        let empty = Bucket { preferred: TTEntry::unused(), always: TTEntry::unused() };
        Self { buckets: vec![empty; size], mask: size - 1 }
    }

    /// Returns a usable score only when the stored depth is at least the
    /// requested one and the stored bound applies to the given window;
    /// otherwise the stored move, if any, is returned as an ordering hint.
    pub fn probe(
        &self,
        key: u64,
        depth: u8,
        alpha: Evaluation,
        beta: Evaluation,
        ply: usize,
    ) -> Probe {
        let bucket = &self.buckets[key as usize & self.mask];

        for entry in [&bucket.preferred, &bucket.always] {
            if !entry.is_used() || entry.key() != key {
                continue;
            }

            let mv = entry.best_move();

            if entry.depth() >= depth {
                let score = from_tt_score(entry.score(), ply);
                let usable = match entry.node_type() {
                    NodeType::Exact => true,
                    NodeType::Lowerbound => score >= beta,
                    NodeType::Upperbound => score <= alpha,
                };

                if usable {
                    return Probe::Hit { score, node_type: entry.node_type(), mv };
                }
            }

            return match mv {
                Some(mv) => Probe::Hint(mv),
                None => Probe::Miss,
            };
        }

        Probe::Miss
    }

    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        node_type: NodeType,
        score: Evaluation,
        best_move: Option<Move>,
        age: u8,
        ply: usize,
    ) {
        let entry = TTEntry::new(key, depth, to_tt_score(score, ply), node_type, best_move, age);
        let bucket = &mut self.buckets[key as usize & self.mask];

        let preferred = &mut bucket.preferred;
        if !preferred.is_used()
            || preferred.key() == key
            || preferred.age() != age
            || depth >= preferred.depth()
        {
            *preferred = entry;
        } else {
            bucket.always = entry;
        }
    }
}

// Mate scores are stored relative to the storing node, not to the root:
// a `WIN - k` found n plies below the root goes in as `WIN - (k - n)`, so
// a later probe at a different ply can reconstruct its own distance.

fn to_tt_score(score: Evaluation, ply: usize) -> Evaluation {
    if score.is_positive_mate() {
        score + ply as EvalScore
    } else if score.is_negative_mate() {
        score - ply as EvalScore
    } else {
        score
    }
}

fn from_tt_score(score: Evaluation, ply: usize) -> Evaluation {
    if score.is_positive_mate() {
        score - ply as EvalScore
    } else if score.is_negative_mate() {
        score + ply as EvalScore
    } else {
        score
    }
}
