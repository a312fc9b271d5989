use dashmap::DashMap;
use rayon::prelude::*;
use crate::Board;

type PerftCache = DashMap<(u64, usize), u64>;

impl Board {
    pub fn perft(&self, depth: usize) -> u64 {
        self._perft(depth, true, &DashMap::new())
    }

    pub fn perft_with_cache(&self, depth: usize, cache: &PerftCache) -> u64 {
        self._perft(depth, true, cache)
    }

    fn _perft(&self, depth: usize, multithread: bool, cache: &PerftCache) -> u64 {
        if depth == 0 {
            return 1;
        }

        let key = self.zobrist_key();
        if let Some(res) = cache.get(&(key, depth)) {
            return *res;
        }

        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }

        let res = if multithread {
            moves
                .into_par_iter()
                .map(|mv| self.make_move(&mv).unwrap()._perft(depth - 1, false, cache))
                .sum()
        } else {
            moves
                .into_iter()
                .map(|mv| self.make_move(&mv).unwrap()._perft(depth - 1, false, cache))
                .sum()
        };

        cache.insert((key, depth), res);
        res
    }
}
