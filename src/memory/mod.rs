pub mod calculator;
pub mod collection;
pub mod ignored;
pub mod tape;
pub mod variables;

use std::rc::Rc;

use crate::error::Error;
use crate::instruction::{Action, Condition, ControlTemplate};
use crate::value::Value;

pub use calculator::Calculator;
pub use collection::{MemoryCollection, OutputSelection};
pub use ignored::Ignored;
pub use tape::Tape;
pub use variables::Variables;

/// An execution target. Programs are run against a memory: it is fed the
/// input, the program's instructions act on it and the output is read back.
pub trait Memory: Sized {
    fn input(&mut self, data: Value) -> Result<(), Error>;

    fn output(&mut self) -> Value;

    /// Brings the memory back to its initial state.
    fn reset(&mut self);

    fn actions(&self) -> Vec<Action<Self>> {
        Vec::new()
    }

    fn conditions(&self) -> Vec<Condition<Self>> {
        Vec::new()
    }

    fn control_structures(&self) -> Vec<Rc<dyn ControlTemplate<Self>>> {
        Vec::new()
    }

    /// A snapshot of the instructions the memory currently offers.
    fn vocabulary(&self) -> Vocabulary<Self> {
        Vocabulary {
            actions: self.actions(),
            conditions: self.conditions(),
            control_structures: self.control_structures(),
        }
    }
}

/// Everything a program for a memory `M` can be built from.
pub struct Vocabulary<M> {
    pub actions: Vec<Action<M>>,
    pub conditions: Vec<Condition<M>>,
    pub control_structures: Vec<Rc<dyn ControlTemplate<M>>>,
}

impl<M> Vocabulary<M> {
    pub fn new(
        actions: Vec<Action<M>>,
        conditions: Vec<Condition<M>>,
        control_structures: Vec<Rc<dyn ControlTemplate<M>>>,
    ) -> Self {
        Self {
            actions,
            conditions,
            control_structures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.control_structures.is_empty()
    }
}

impl<M> Default for Vocabulary<M> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

impl<M> Clone for Vocabulary<M> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            conditions: self.conditions.clone(),
            control_structures: self.control_structures.clone(),
        }
    }
}
