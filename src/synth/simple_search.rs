use crate::program::Program;

use super::Synthesizer;

/// This synthesizer simply tries a fixed list of programs, in order.
pub struct SimpleSearch<M> {
    db: Vec<Program<M>>,
    last_tried: usize,
}

impl<M> SimpleSearch<M> {
    pub fn new(db: Vec<Program<M>>) -> Self {
        Self {
            db,
            last_tried: 0,
        }
    }

    /// How many programs were handed out so far.
    pub fn tried(&self) -> usize {
        self.last_tried
    }
}

impl<M> Synthesizer<M> for SimpleSearch<M> {
    fn next_program(&mut self) -> Option<Program<M>> {
        let res = self.db.get(self.last_tried)?.clone();
        self.last_tried += 1;

        Some(res)
    }
}
