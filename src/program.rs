use std::fmt;
use std::ops::{Add, AddAssign};

use crate::instruction::Instruction;

/// Counts executed operations against an optional ceiling. Control
/// structures consult it so that a loop that never ends on its own still
/// gets interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Budget {
    executed: u64,
    limit: Option<u64>,
}

impl Budget {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            executed: 0,
            limit,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn limited(limit: u64) -> Self {
        Self::new(Some(limit))
    }

    pub fn allow_execution(&self) -> bool {
        match self.limit {
            None => true,
            Some(limit) => self.executed < limit,
        }
    }

    pub fn increment(&mut self) {
        self.add(1);
    }

    pub fn add(&mut self, operations: u64) {
        self.executed = self.executed.saturating_add(operations);
    }

    pub fn reset(&mut self) {
        self.executed = 0;
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// An ordered sequence of instructions, possibly nesting further programs
/// inside control structures. Equality is structural.
pub struct Program<M> {
    instructions: Vec<Instruction<M>>,
}

impl<M> Program<M> {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    pub fn instructions(&self) -> &[Instruction<M>] {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut [Instruction<M>] {
        &mut self.instructions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction<M>> {
        self.instructions.iter()
    }

    pub fn push(&mut self, instruction: impl Into<Instruction<M>>) {
        self.instructions.push(instruction.into());
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn execute(&self, memory: &mut M, budget: &mut Budget) {
        for instruction in &self.instructions {
            instruction.execute(memory, budget);
        }
    }
}

impl<M> Default for Program<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Program<M> {
    fn clone(&self) -> Self {
        Self {
            instructions: self.instructions.clone(),
        }
    }
}

impl<M> PartialEq for Program<M> {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions
    }
}

impl<M> From<Vec<Instruction<M>>> for Program<M> {
    fn from(instructions: Vec<Instruction<M>>) -> Self {
        Self { instructions }
    }
}

impl<M, I: Into<Instruction<M>>> FromIterator<I> for Program<M> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<M> Extend<Instruction<M>> for Program<M> {
    fn extend<T: IntoIterator<Item = Instruction<M>>>(&mut self, iter: T) {
        self.instructions.extend(iter);
    }
}

impl<'a, M> IntoIterator for &'a Program<M> {
    type Item = &'a Instruction<M>;
    type IntoIter = std::slice::Iter<'a, Instruction<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<M> Add for Program<M> {
    type Output = Program<M>;

    fn add(mut self, other: Program<M>) -> Program<M> {
        self += other;
        self
    }
}

impl<M> AddAssign for Program<M> {
    fn add_assign(&mut self, other: Program<M>) {
        self.instructions.extend(other.instructions);
    }
}

impl<M> fmt::Debug for Program<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.instructions).finish()
    }
}

impl<M> fmt::Display for Program<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, instruction) in self.instructions.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{instruction}")?;
        }

        Ok(())
    }
}
