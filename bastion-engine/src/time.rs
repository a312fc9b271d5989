use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bastion_core::Board;
use tracing::warn;

use crate::evaluation::{game_phase, DetailLevel, GamePhase};

// Never think for less than this, outside of emergencies
const MIN_TARGET_MS: u64 = 50;

// Below this remaining clock, every allocation is an emergency
const EMERGENCY_RESERVE_MS: u64 = 1000;
const EMERGENCY_CAP_MS: u64 = 200;

/// What the clock grants for one move: a wall-time target and the
/// evaluator tier that fits it. Emergencies also switch off aspiration
/// windows, whose re-searches are a luxury.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    pub target_ms: u64,
    pub detail: DetailLevel,
    pub emergency: bool,
}

impl TimeBudget {
    /// Budget for an externally fixed per-move time.
    pub fn for_target(target_ms: u64) -> Self {
        let emergency = target_ms < MIN_TARGET_MS;
        Self {
            target_ms,
            detail: if emergency { DetailLevel::Emergency } else { detail_for(target_ms) },
            emergency,
        }
    }
}

/// Tracks the game clock and slices it into per-move budgets. The only
/// concurrent piece of the whole engine lives here: `start_move` arms a
/// timer thread that raises the cancellation flag at the deadline, and
/// the search polls that flag cooperatively.
pub struct TimeManager {
    remaining_ms: u64,
    expected_moves: u64,
}

impl TimeManager {
    pub fn new(total_ms: u64, expected_moves_remaining: u64) -> Self {
        Self {
            remaining_ms: total_ms,
            expected_moves: expected_moves_remaining.max(1),
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    /// Decides how long to think on this position: an even share of the
    /// remaining clock, scaled by how demanding the position looks.
    pub fn allocate(&self, board: &Board) -> TimeBudget {
        if self.remaining_ms < EMERGENCY_RESERVE_MS {
            let target = (self.remaining_ms / 4).min(EMERGENCY_CAP_MS).max(1);
            warn!(remaining_ms = self.remaining_ms, target_ms = target, "emergency time allocation");
            return TimeBudget {
                target_ms: target,
                detail: DetailLevel::Emergency,
                emergency: true,
            };
        }

        let base = self.remaining_ms / self.expected_moves;

        // Complexity factor in [0.5, 1.5]: tactical positions and late
        // guard races deserve extra thought, early shuffling less
        let mut factor = 1.0f64;
        if board.tactical_moves().iter().any(|mv| mv.is_capture(board)) {
            factor += 0.3;
        }
        factor += match game_phase(board) {
            GamePhase::Opening => -0.2,
            GamePhase::Middlegame => 0.0,
            GamePhase::Endgame => 0.2,
        };
        let factor = factor.clamp(0.5, 1.5);

        let floor = MIN_TARGET_MS.max(self.remaining_ms / 40);
        let ceiling = self.remaining_ms / 4;
        let target = ((base as f64 * factor) as u64).clamp(floor, ceiling);

        TimeBudget {
            target_ms: target,
            detail: detail_for(target),
            emergency: false,
        }
    }

    /// Arms the deadline timer for one move. The returned flag flips to
    /// true once the target time has elapsed and never flips back; each
    /// move gets a fresh flag so stale timers cannot cancel later moves.
    pub fn start_move(&self, target_ms: u64) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        let timer_flag = Arc::clone(&flag);

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(target_ms));
            timer_flag.store(true, Ordering::Release);
        });

        flag
    }

    /// Accounts for the time actually spent once the move is committed.
    pub fn commit_move(&mut self, elapsed_ms: u64) {
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        self.expected_moves = (self.expected_moves - 1).max(1);
    }
}

fn detail_for(target_ms: u64) -> DetailLevel {
    match target_ms {
        0..=149 => DetailLevel::Fast,
        150..=599 => DetailLevel::Standard,
        _ => DetailLevel::Comprehensive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_respects_the_clamps() {
        let board = Board::default();
        let manager = TimeManager::new(60_000, 30);

        let budget = manager.allocate(&board);
        assert!(budget.target_ms >= 1_500); // remaining / 40
        assert!(budget.target_ms <= 15_000); // remaining / 4
        assert!(!budget.emergency);
    }

    #[test]
    fn low_clock_triggers_emergency_mode() {
        let board = Board::default();
        let manager = TimeManager::new(600, 10);

        let budget = manager.allocate(&board);
        assert!(budget.emergency);
        assert_eq!(DetailLevel::Emergency, budget.detail);
        assert!(budget.target_ms <= 200);
    }

    #[test]
    fn committing_time_decrements_the_clock() {
        let mut manager = TimeManager::new(1_000, 2);
        manager.commit_move(400);
        assert_eq!(600, manager.remaining_ms());

        // The expected move count bottoms out at one
        manager.commit_move(100);
        manager.commit_move(100);
        assert_eq!(400, manager.remaining_ms());
    }

    #[test]
    fn the_deadline_timer_raises_the_flag() {
        let manager = TimeManager::new(10_000, 10);
        let flag = manager.start_move(20);
        assert!(!flag.load(Ordering::Acquire));

        thread::sleep(Duration::from_millis(100));
        assert!(flag.load(Ordering::Acquire));
    }
}
