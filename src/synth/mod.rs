pub mod simple_search;
pub mod brute_enum;

use crate::learning::DataSample;
use crate::program::Program;

/// A synthesizer is an iterator-like structure. It generates new program
/// candidates, and can in addition be provided with the examples the
/// candidates are going to be judged on.
pub trait Synthesizer<M> {
    /// Asks the synthesizer to take an example into account. This is for
    /// potential optimisation of the search, so the synthesizer does not end
    /// up producing programs that "definitely aren't going to work".
    fn learn(&mut self, _sample: &DataSample) {}

    /// Query the synthesizer for a next program to try. The synthesizer
    /// returns `None` once it can no longer provide any new candidate.
    fn next_program(&mut self) -> Option<Program<M>>;
}

impl<M, S: Synthesizer<M> + ?Sized> Synthesizer<M> for &mut S {
    fn learn(&mut self, sample: &DataSample) {
        (**self).learn(sample)
    }

    fn next_program(&mut self) -> Option<Program<M>> {
        (**self).next_program()
    }
}

impl<M, S: Synthesizer<M> + ?Sized> Synthesizer<M> for Box<S> {
    fn learn(&mut self, sample: &DataSample) {
        (**self).learn(sample)
    }

    fn next_program(&mut self) -> Option<Program<M>> {
        (**self).next_program()
    }
}
