use super::move_ordering::{MoveScore, MAX_HISTORY_VAL};
use bastion_core::{Color, Move};

// Stores quiet-move evaluation data indexed by [color][from][to]
pub struct HistoryTable {
    data: [[[MoveScore; 49]; 49]; 2],
}

impl HistoryTable {
    pub fn new() -> Self {
        Self { data: [[[0; 49]; 49]; 2] }
    }

    pub fn get_value(&self, mv: &Move, color: Color) -> MoveScore {
        self.data[color.to_index()][mv.from.index()][mv.to.index()]
    }

    pub fn add_bonus(&mut self, mv: &Move, color: Color, bonus: MoveScore) {
        let value = &mut self.data[color.to_index()][mv.from.index()][mv.to.index()];
        *value += bonus;

        // If we reach the maximum history value, scale down the whole table
        if *value > MAX_HISTORY_VAL {
            self.age();
        }
    }

    pub fn age(&mut self) {
        self.data.iter_mut().for_each(|color| {
            color.iter_mut().for_each(|from_mat| {
                from_mat.iter_mut().for_each(|val| {
                    *val >>= 1;
                })
            })
        });
    }
}
