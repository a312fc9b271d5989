mod evaluate;
mod tables;

pub use evaluate::{
    evaluate_position, game_phase, DetailLevel, EvalScore, Evaluation, GamePhase, MATE_THRESHOLD,
    MAX_PLY, WIN,
};
