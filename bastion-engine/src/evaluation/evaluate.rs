use std::fmt::{Display, Formatter};
use std::ops::{Add, Neg, Sub};

use bastion_core::{Board, Color, Color::*, Square};
use super::tables;

pub type EvalScore = i16;

/// Sentinel for a won game. Mate scores are `WIN - ply`, so shorter wins
/// always dominate longer ones.
pub const WIN: EvalScore = 30_000;

/// Deepest ply the search will ever visit.
pub const MAX_PLY: usize = 100;

/// Everything at or beyond this magnitude is a forced win; heuristic
/// terms are clamped strictly below it.
pub const MATE_THRESHOLD: EvalScore = WIN - MAX_PLY as EvalScore;

const HEURISTIC_MAX: i32 = (MATE_THRESHOLD - 1) as i32;

// Component weights. The opening/endgame pairs are blended by the game
// phase, so a value only fully applies at the extremes.
const PIECE_VALUE: i32 = 100;
const ADVANCE_WEIGHT_OPENING: i32 = 1;
const ADVANCE_WEIGHT_ENDGAME: i32 = 2;
const DANGER_PENALTY_OPENING: i32 = 140;
const DANGER_PENALTY_ENDGAME: i32 = 220;
const MOBILITY_WEIGHT: i32 = 2;
const TEMPO_BONUS: i32 = 10;

/// Represents the evaluation of a position, in centipawns from red's
/// perspective. The goal of using a struct instead of an i16 directly is
/// to implement Display, to be able to show the score in a much nicer way
/// (for example, plies to a forced win instead of the raw score).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Evaluation {
    score: EvalScore,
}

/// How much work the evaluator is allowed to do; picked by the time
/// manager based on how pressed the clock is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DetailLevel {
    Emergency,
    Fast,
    Standard,
    Comprehensive,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

// Auxiliary struct to store values that are used in different parts
// of the evaluation, to avoid calculating them multiple times
struct EvalData<'a> {
    board: &'a Board,
    // 0 = pure opening, 256 = pure endgame
    game_phase: i32,
    score_opening: i32,
    score_endgame: i32,
    red_material: i32,
    blue_material: i32,
}

/// Evaluates how favorable a position is for red; positive means red is
/// better. Terminal positions score as forced wins at the given ply, and
/// heuristic scores never reach the mate range.
pub fn evaluate_position(board: &Board, ply: usize, detail: DetailLevel) -> Evaluation {
    if let Some(winner) = board.is_terminal() {
        return match winner {
            Red => Evaluation::win_in(ply),
            Blue => Evaluation::loss_in(ply),
        };
    }

    let mut eval_data = EvalData::new(board);

    calc_material(&mut eval_data);
    calc_guard_race(&mut eval_data);

    if detail >= DetailLevel::Fast {
        calc_guard_safety(&mut eval_data);
    }

    if detail >= DetailLevel::Standard {
        calc_mobility(&mut eval_data);
    }

    if detail >= DetailLevel::Comprehensive {
        calc_central_control(&mut eval_data);
        calc_tempo(&mut eval_data);
    }

    eval_data.compute_score()
}

/// Coarse game phase, used for time allocation: positions empty out and
/// guard races heat up towards the endgame.
pub fn game_phase(board: &Board) -> GamePhase {
    let data = EvalData::new(board);
    match data.game_phase {
        0..=85 => GamePhase::Opening,
        86..=170 => GamePhase::Middlegame,
        _ => GamePhase::Endgame,
    }
}

// Piece count difference; every tile of every tower counts
fn calc_material(eval_data: &mut EvalData) {
    let score = PIECE_VALUE * (eval_data.red_material - eval_data.blue_material);
    eval_data.score_opening += score;
    eval_data.score_endgame += score;
}

// Guard race: the closer a guard is to the target castle, the better.
// Racing matters much more once the board empties out.
fn calc_guard_race(eval_data: &mut EvalData) {
    let board = eval_data.board;
    let score = guard_advance(board, Red) - guard_advance(board, Blue);
    eval_data.score_opening += ADVANCE_WEIGHT_OPENING * score;
    eval_data.score_endgame += ADVANCE_WEIGHT_ENDGAME * score;
}

fn guard_advance(board: &Board, color: Color) -> i32 {
    match board.guard_square(color) {
        // Non-terminal positions always have both guards; be safe anyway
        None => 0,
        Some(at) => {
            let to_go = at.rank().abs_diff(color.target_castle().rank()) as usize;
            tables::GUARD_ADVANCE[to_go] as i32
        }
    }
}

// Penalty for leaving one's guard where the enemy can take it next move
fn calc_guard_safety(eval_data: &mut EvalData) {
    let board = eval_data.board;
    for (color, sign) in [(Red, 1), (Blue, -1)] {
        if board.guard_in_danger(color) {
            eval_data.score_opening -= sign * DANGER_PENALTY_OPENING;
            eval_data.score_endgame -= sign * DANGER_PENALTY_ENDGAME;
        }
    }
}

// Cheap mobility proxy: empty orthogonal neighbors of every tower
fn calc_mobility(eval_data: &mut EvalData) {
    let board = eval_data.board;
    let all_pieces = board.all_pieces();
    let mut score = 0;

    for (color, sign) in [(Red, 1), (Blue, -1)] {
        for square in board.towers(color).squares() {
            for (d_file, d_rank) in [(0, 1), (0, -1), (1, 0), (-1, 0)] {
                if let Some(next) = square.offset(d_file, d_rank, 1) {
                    if !all_pieces.contains(next) {
                        score += sign * MOBILITY_WEIGHT;
                    }
                }
            }
        }
    }

    eval_data.score_opening += score;
    eval_data.score_endgame += score;
}

// Central squares are worth holding; tall towers radiate further, but the
// benefit flattens off quickly
fn calc_central_control(eval_data: &mut EvalData) {
    let board = eval_data.board;
    let mut score = 0;

    for (color, sign) in [(Red, 1), (Blue, -1)] {
        for square in board.towers(color).squares() {
            let reach = (board.height(color, square) as i32).min(3);
            score += sign * reach * pos_score(square);
        }
        if let Some(square) = board.guard_square(color) {
            score += sign * pos_score(square);
        }
    }

    eval_data.score_opening += score;
    eval_data.score_endgame += score / 2;
}

fn calc_tempo(eval_data: &mut EvalData) {
    // Small bonus for having the right to move, only in the early game
    eval_data.score_opening += TEMPO_BONUS * eval_data.board.turn_color().sign() as i32;
}

fn pos_score(square: Square) -> i32 {
    tables::CENTRALITY[square.index()] as i32
}

///////////////////////////////////////////////////////////////////////////////

impl<'a> EvalData<'a> {
    fn new(board: &'a Board) -> Self {
        let red_material = board.tower_material(Red) as i32;
        let blue_material = board.tower_material(Blue) as i32;

        let mut res = Self {
            board,
            red_material,
            blue_material,
            game_phase: 0,
            score_opening: 0,
            score_endgame: 0,
        };
        res.update_game_phase();
        res
    }

    fn compute_score(&self) -> Evaluation {
        // Blend the two phase scores, then clamp into the heuristic range
        // so no positional score is ever mistaken for a forced win
        let blended = (self.score_opening * (256 - self.game_phase)
            + self.score_endgame * self.game_phase)
            / 256;
        Evaluation::new(blended.clamp(-HEURISTIC_MAX, HEURISTIC_MAX) as EvalScore)
    }

    fn update_game_phase(&mut self) {
        // Material draining off the board pushes towards the endgame, and
        // so does either guard leaving its back ranks
        let total = self.red_material + self.blue_material;
        let mut phase = 256 - (256 * total.min(14)) / 14;

        let board = self.board;
        let red_adv = board
            .guard_square(Red)
            .map_or(0, |sq| sq.rank() as i32);
        let blue_adv = board
            .guard_square(Blue)
            .map_or(0, |sq| 6 - sq.rank() as i32);
        phase += 28 * red_adv.max(blue_adv);

        self.game_phase = phase.clamp(0, 256);
    }
}

impl Evaluation {
    pub const fn new(score: EvalScore) -> Self {
        Self { score }
    }

    // The min value is set to i16::MIN + 1, so that -min_val() == max_val()
    // and viceversa. Otherwise, it overflows when swapping its sign
    // and all sort of bad things happen.
    pub const fn min_val() -> Self {
        Self::new(EvalScore::MIN + 1)
    }

    pub const fn max_val() -> Self {
        Self::new(EvalScore::MAX)
    }

    pub const fn win_in(ply: usize) -> Self {
        Self::new(WIN - ply as EvalScore)
    }

    pub const fn loss_in(ply: usize) -> Self {
        Self::new(-WIN + ply as EvalScore)
    }

    pub const fn score(&self) -> EvalScore {
        self.score
    }

    /// Reinterprets a red-perspective score for the given side, which is
    /// what the negamax convention needs.
    pub const fn relative_to(self, color: Color) -> Self {
        Self::new(self.score * color.sign())
    }

    pub fn is_positive_mate(&self) -> bool {
        self.score >= MATE_THRESHOLD
    }

    pub fn is_negative_mate(&self) -> bool {
        self.score <= -MATE_THRESHOLD
    }

    pub fn is_mate(&self) -> bool {
        self.is_positive_mate() || self.is_negative_mate()
    }
}

impl Neg for Evaluation {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.score)
    }
}

impl Sub<EvalScore> for Evaluation {
    type Output = Self;

    fn sub(self, rhs: EvalScore) -> Self::Output {
        Self::new(self.score - rhs)
    }
}

impl Add<EvalScore> for Evaluation {
    type Output = Self;

    fn add(self, rhs: EvalScore) -> Self::Output {
        Self::new(self.score + rhs)
    }
}

impl Sub<Self> for Evaluation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.score - rhs.score)
    }
}

impl Add<Self> for Evaluation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.score + rhs.score)
    }
}

impl PartialOrd<EvalScore> for Evaluation {
    fn partial_cmp(&self, other: &EvalScore) -> Option<std::cmp::Ordering> {
        self.score.partial_cmp(other)
    }
}

impl PartialEq<EvalScore> for Evaluation {
    fn eq(&self, other: &EvalScore) -> bool {
        self.score == *other
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_positive_mate() {
            write!(f, "#{}", WIN - self.score)
        } else if self.is_negative_mate() {
            write!(f, "-#{}", self.score + WIN)
        } else {
            write!(f, "{:+.2}", self.score as f32 / 100.0)
        }
    }
}
