use std::cmp::min;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bastion_core::{Board, Move};
use tracing::{debug, error};

use super::history::HistoryTable;
use super::move_ordering::{order_moves, order_tactical, victim_value, MoveScore, RatedMove};
use crate::evaluation::{evaluate_position, DetailLevel, EvalScore, Evaluation, MAX_PLY};
use crate::transposition::{NodeType, Probe, TTable};

// Number of buckets of the transposition table (two entries each)
const TT_BUCKETS: usize = 1 << 21;

// Number of killer moves to store in each ply
const MAX_KILLERS: usize = 2;

// Depth to reduce a null move search
const NULL_MOVE_REDUCTION: u8 = 2;

// Initial width of the aspiration window, and how often it may fail
// before giving up and re-searching with a full window
const ASP_WINDOW: EvalScore = 25;
const ASP_MAX_FAILS: u32 = 3;

// Move index after which late move reductions kick in, and after which
// they deepen by one more ply
const LMR_MOVES: usize = 4;
const LMR_LATE_MOVES: usize = 8;
const LMR_MIN_DEPTH: u8 = 3;

// Score margins for futility and reverse futility pruning, by depth
const FUTILITY_MARGINS: [EvalScore; 4] = [0, 120, 240, 360];

// Cap on the summed extensions along any single line
const MAX_EXTENSIONS: u8 = 10;

// Quiescence is bounded this many plies past the nominal horizon
const MAX_Q_DEPTH: u8 = 12;

// Margin for delta pruning in quiescence
const Q_DELTA: MoveScore = 150;

// The cancellation flag is re-read every time this many nodes have been
// visited, in addition to the check at every interior node
const STOP_POLL_MASK: u64 = 4095;

// Typedef for the killer moves table
pub type Killers = [[Move; MAX_KILLERS]; MAX_PLY + 2];

// Typedef for the pair (alpha, beta) of score bounds
pub type Bounds = (Evaluation, Evaluation);

/// Per-move knobs: the evaluator detail tier and aspiration switch come
/// from the time manager, the stop flag from its deadline timer.
pub struct SearchOptions {
    pub max_depth: Option<u8>,
    pub detail: DetailLevel,
    pub use_aspiration: bool,
    pub stop_flag: Arc<AtomicBool>,
}

/// What the search found: the move to play, its score from the mover's
/// perspective, the deepest fully completed iteration and the node count.
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Evaluation,
    pub depth: u8,
    pub nodes: u64,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    pub nodes: u64,
    pub quiescence_nodes: u64,
    pub tt_hits: u64,
    pub beta_cutoffs: u64,
}

/// The Search struct owns everything that outlives a single node visit:
/// the transposition table, killers, history and statistics, plus the
/// reusable per-ply move buffers. It persists for a whole game so the
/// table keeps paying off move after move.
pub struct Search {
    tt: TTable,
    killers: Killers,
    history: HistoryTable,
    stats: SearchStats,
    detail: DetailLevel,
    use_aspiration: bool,
    stop: Arc<AtomicBool>,
    aborted: bool,
    age: u8,
    root_move: Option<Move>,
    move_bufs: Vec<Vec<Move>>,
    rated_bufs: Vec<Vec<RatedMove>>,
    quiet_bufs: Vec<Vec<Move>>,
}

impl Search {
    pub fn new() -> Self {
        Self {
            tt: TTable::new(TT_BUCKETS),
            killers: [[Move::empty(); MAX_KILLERS]; MAX_PLY + 2],
            history: HistoryTable::new(),
            stats: SearchStats::default(),
            detail: DetailLevel::Standard,
            use_aspiration: true,
            stop: Arc::new(AtomicBool::new(false)),
            aborted: false,
            age: 0,
            root_move: None,
            move_bufs: (0..MAX_PLY + 2).map(|_| Vec::with_capacity(128)).collect(),
            rated_bufs: (0..MAX_PLY + 2).map(|_| Vec::with_capacity(128)).collect(),
            quiet_bufs: (0..MAX_PLY + 2).map(|_| Vec::with_capacity(64)).collect(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Iterative deepening driver. Every completed depth refines the
    /// aspiration window for the next one; a raised stop flag discards
    /// the iteration in flight and returns the last completed result.
    pub fn find_best(&mut self, board: &Board, options: SearchOptions) -> SearchResult {
        self.age = self.age.wrapping_add(1);
        self.aborted = false;
        self.stop = options.stop_flag;
        self.detail = options.detail;
        self.use_aspiration = options.use_aspiration;
        self.stats = SearchStats::default();

        let max_depth = min(options.max_depth.unwrap_or(MAX_PLY as u8), MAX_PLY as u8);

        let legal_moves = board.legal_moves();
        if legal_moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: Evaluation::loss_in(0),
                depth: 0,
                nodes: 0,
            };
        }

        // If there is only one legal move, return it immediately
        if legal_moves.len() == 1 {
            return SearchResult {
                best_move: Some(legal_moves[0]),
                score: Evaluation::new(0),
                depth: 0,
                nodes: 0,
            };
        }

        let mut best_move = None;
        let mut best_score = Evaluation::new(0);
        let mut completed_depth = 0;

        let mut previous_score = Evaluation::new(0);
        let mut window = ASP_WINDOW;
        let mut fails = 0u32;
        let mut alpha = Evaluation::min_val();
        let mut beta = Evaluation::max_val();

        let mut depth = 1u8;
        while depth <= max_depth {
            self.root_move = None;
            let score = self.negamax(board, depth, 0, (alpha, beta), true, 0);

            // A partial iteration is worthless: keep whatever the last
            // completed one produced
            if self.check_stop() {
                break;
            }

            // Aspiration windows: the score rarely moves much between
            // iterations, so search inside a narrow window around the
            // previous one. A result on or outside an edge is not
            // trustworthy; widen the failing side and redo the depth.
            if score <= alpha {
                fails += 1;
                window = window.saturating_mul(4);
                alpha = if fails >= ASP_MAX_FAILS {
                    Evaluation::min_val()
                } else {
                    previous_score - window
                };
                debug!(depth, fails, "aspiration fail low");
                continue;
            }

            if score >= beta {
                fails += 1;
                window = window.saturating_mul(4);
                beta = if fails >= ASP_MAX_FAILS {
                    Evaluation::max_val()
                } else {
                    previous_score + window
                };
                debug!(depth, fails, "aspiration fail high");
                continue;
            }

            fails = 0;
            window = ASP_WINDOW;

            if let Some(mv) = self.root_move {
                best_move = Some(mv);
                best_score = score;
                completed_depth = depth;
            }

            debug!(depth, score = %score, nodes = self.stats.nodes, "depth completed");

            // A forced win (or loss) is not going to improve, stop here
            if score.is_mate() {
                break;
            }

            previous_score = score;
            if self.use_aspiration {
                alpha = score - window;
                beta = score + window;
            }
            depth += 1;
        }

        SearchResult {
            best_move,
            score: best_score,
            depth: completed_depth,
            nodes: self.stats.nodes,
        }
    }

    fn negamax(
        &mut self,
        board: &Board,
        depth: u8,
        ply: usize,
        (mut alpha, beta): Bounds,
        can_null: bool,
        total_ext: u8,
    ) -> Evaluation {
        self.stats.nodes += 1;

        // Cooperative cancellation: bail out of in-flight nodes without
        // touching the table; the root loop discards the iteration
        if ply > 0 && self.check_stop() {
            return Evaluation::new(0);
        }

        if let Some(winner) = board.is_terminal() {
            return if winner == board.turn_color() {
                Evaluation::win_in(ply)
            } else {
                Evaluation::loss_in(ply)
            };
        }

        if ply >= MAX_PLY {
            return self.evaluate(board, ply);
        }

        if depth == 0 {
            return self.quiesce(board, (alpha, beta), ply, 0);
        }

        // Wider-than-null windows mark the principal variation. The
        // subtraction is widened to avoid overflowing near the infinities.
        let is_pv = (beta.score() as i32 - alpha.score() as i32) != 1;
        let zobrist = board.zobrist_key();

        // Table lookup. A sufficient hit ends the node outright, except
        // at the root (which must produce a move) and in PV nodes, where
        // only exact scores are trusted; anything else seeds ordering.
        let mut tt_move = None;
        match self.tt.probe(zobrist, depth, alpha, beta, ply) {
            Probe::Hit { score, node_type, mv } => {
                self.stats.tt_hits += 1;
                if ply > 0 && (!is_pv || node_type == NodeType::Exact) {
                    return score;
                }
                tt_move = mv;
            }
            Probe::Hint(mv) => tt_move = Some(mv),
            Probe::Miss => {}
        }

        let me = board.turn_color();
        let in_danger = board.guard_in_danger(me);

        // Static pruning gate: never in PV nodes, never with our guard
        // en prise, and only near the horizon
        let mut do_futility = false;
        if !is_pv && !in_danger && (depth as usize) < FUTILITY_MARGINS.len() {
            let eval = self.evaluate(board, ply);

            // Reverse futility: even a margin below the static score
            // still clears beta
            if !beta.is_mate() && eval - FUTILITY_MARGINS[depth as usize] >= beta {
                return eval;
            }

            // Futility: the static score plus a margin cannot reach
            // alpha, so quiet continuations are skipped below
            if !alpha.is_mate() && eval + FUTILITY_MARGINS[depth as usize] <= alpha {
                do_futility = true;
            }
        }

        // Null move pruning: pass the turn, and see if the opponent can
        // improve their position with two moves in a row under a reduced
        // depth search. If they can't, assume they would never allow
        // this position and cut. Needs a tower to move so the position
        // is not a bare guard race, and never twice in a row.
        if can_null && !is_pv && !in_danger && depth > NULL_MOVE_REDUCTION
            && board.towers(me).is_not_empty()
        {
            let null_board = board.make_null_move();
            let score = -self.negamax(
                &null_board,
                depth - NULL_MOVE_REDUCTION - 1,
                ply + 1,
                (-beta, -beta + 1),
                false,
                total_ext,
            );

            if self.aborted {
                return Evaluation::new(0);
            }

            if score >= beta && !score.is_positive_mate() {
                return beta;
            }
        }

        let mut moves = mem::take(&mut self.move_bufs[ply]);
        board.generate_moves(&mut moves);

        // No moves at all: the side to move is trapped and loses
        if moves.is_empty() {
            self.move_bufs[ply] = moves;
            return Evaluation::loss_in(ply);
        }

        let mut rated = mem::take(&mut self.rated_bufs[ply]);
        order_moves(&moves, board, tt_move, &self.killers[ply], &self.history, &mut rated);
        self.move_bufs[ply] = moves;

        let mut quiets = mem::take(&mut self.quiet_bufs[ply]);
        quiets.clear();

        let original_alpha = alpha;
        let mut best_score = Evaluation::min_val();
        let mut best_move = None;
        let mut analyzed = 0usize;

        for i in 0..rated.len() {
            let mv = rated[i].mv;

            let next_board = match board.make_move(&mv) {
                Ok(next_board) => next_board,
                Err(err) => {
                    // A generated move must always apply; skip it and
                    // keep the search alive on the remaining moves
                    error!(%mv, %err, "generated move failed to apply");
                    continue;
                }
            };

            let is_capture = mv.is_capture(board);
            let gives_check = next_board.guard_in_danger(next_board.turn_color());
            let self_check = next_board.guard_in_danger(me);

            // Lines where the mover's own guard ends up attackable are
            // sharp; extend them, within the per-line cap
            let ext = u8::from(self_check && total_ext < MAX_EXTENSIONS);

            if do_futility && analyzed != 0 && !is_capture && !gives_check && ext == 0 {
                continue;
            }

            // Late move reduction: with decent ordering, late quiet
            // moves rarely matter. Never at the root, in PV nodes, for
            // captures, or on extended moves.
            let mut reduction = 0u8;
            if !is_pv
                && !in_danger
                && !is_capture
                && ext == 0
                && depth >= LMR_MIN_DEPTH
                && analyzed >= LMR_MOVES
                && ply != 0
            {
                reduction = 1 + u8::from(analyzed >= LMR_LATE_MOVES);
            }

            let new_depth = depth - 1 + ext;
            let next_ext = total_ext + ext;

            // Principal variation search: the first move gets the full
            // window; later ones a null window at (possibly) reduced
            // depth, re-searched in full when they surprise us
            let mut score;
            if analyzed == 0 {
                score = -self.negamax(&next_board, new_depth, ply + 1, (-beta, -alpha), true, next_ext);
            } else {
                score = -self.negamax(
                    &next_board,
                    new_depth.saturating_sub(reduction),
                    ply + 1,
                    ((-alpha) - 1, -alpha),
                    true,
                    next_ext,
                );

                if score > alpha && (reduction > 0 || is_pv) {
                    score = -self.negamax(&next_board, new_depth, ply + 1, (-beta, -alpha), true, next_ext);
                }
            }

            if self.aborted {
                self.rated_bufs[ply] = rated;
                self.quiet_bufs[ply] = quiets;
                return Evaluation::new(0);
            }

            analyzed += 1;

            if score > best_score {
                best_move = Some(mv);
                best_score = score;
                if ply == 0 {
                    self.root_move = Some(mv);
                }
            }

            if best_score > alpha {
                alpha = best_score;
            }

            if best_score >= beta {
                self.stats.beta_cutoffs += 1;

                // A quiet cutoff move is promoted in the killer slots
                // and the history table; the quiets searched before it
                // are demoted a little
                if !is_capture {
                    self.store_killer(ply, mv);
                    let bonus = (depth as MoveScore) * (depth as MoveScore);
                    self.history.add_bonus(&mv, me, bonus);
                    for quiet in &quiets {
                        self.history.add_bonus(quiet, me, -(depth as MoveScore));
                    }
                }
                break;
            }

            if !is_capture {
                quiets.push(mv);
            }
        }

        self.rated_bufs[ply] = rated;
        self.quiet_bufs[ply] = quiets;

        // Nothing was searchable (every move was skipped): score it like
        // having no moves at all, without polluting the table
        if best_move.is_none() {
            return Evaluation::loss_in(ply);
        }

        let node_type = if best_score >= beta {
            NodeType::Lowerbound
        } else if best_score > original_alpha {
            NodeType::Exact
        } else {
            NodeType::Upperbound
        };

        self.tt.store(zobrist, depth, node_type, best_score, best_move, self.age, ply);
        best_score
    }

    // The quiescence search only expands captures and guard advances, so
    // the static evaluation is never taken in the middle of an exchange.
    fn quiesce(
        &mut self,
        board: &Board,
        (mut alpha, beta): Bounds,
        ply: usize,
        qdepth: u8,
    ) -> Evaluation {
        self.stats.nodes += 1;
        self.stats.quiescence_nodes += 1;

        // Re-read the flag every 4096 nodes. Using a power of 2 makes
        // this a bitwise AND instead of a modulo.
        if self.stats.nodes & STOP_POLL_MASK == 0 {
            self.check_stop();
        }
        if self.aborted {
            return Evaluation::new(0);
        }

        let stand_pat = self.evaluate(board, ply);

        // Terminal positions evaluate as mates and generate nothing, so
        // they fall out through the stand-pat path
        if ply >= MAX_PLY || qdepth >= MAX_Q_DEPTH {
            return stand_pat;
        }

        if stand_pat >= beta {
            return stand_pat;
        }

        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = mem::take(&mut self.move_bufs[ply]);
        board.generate_tactical(&mut moves);
        let mut rated = mem::take(&mut self.rated_bufs[ply]);
        order_tactical(&moves, board, &mut rated);
        self.move_bufs[ply] = moves;

        let mut best_score = stand_pat;

        for i in 0..rated.len() {
            let mv = rated[i].mv;

            // Delta pruning: even winning this victim plus a safety
            // margin cannot lift the score back to alpha
            let gain = victim_value(board, mv.to) + Q_DELTA;
            if (stand_pat.score() as MoveScore) + gain <= alpha.score() as MoveScore {
                continue;
            }

            let next_board = match board.make_move(&mv) {
                Ok(next_board) => next_board,
                Err(err) => {
                    error!(%mv, %err, "tactical move failed to apply");
                    continue;
                }
            };

            let score = -self.quiesce(&next_board, (-beta, -alpha), ply + 1, qdepth + 1);

            if self.aborted {
                self.rated_bufs[ply] = rated;
                return Evaluation::new(0);
            }

            if score > best_score {
                best_score = score;
            }

            if best_score > alpha {
                alpha = best_score;
            }

            if best_score >= beta {
                break;
            }
        }

        self.rated_bufs[ply] = rated;
        best_score
    }

    fn evaluate(&self, board: &Board, ply: usize) -> Evaluation {
        evaluate_position(board, ply, self.detail).relative_to(board.turn_color())
    }

    fn store_killer(&mut self, ply: usize, mv: Move) {
        if self.killers[ply][0] != mv {
            self.killers[ply][1] = self.killers[ply][0];
            self.killers[ply][0] = mv;
        }
    }

    fn check_stop(&mut self) -> bool {
        if !self.aborted && self.stop.load(Ordering::Relaxed) {
            self.aborted = true;
        }
        self.aborted
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            detail: DetailLevel::Standard,
            use_aspiration: true,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }
}
