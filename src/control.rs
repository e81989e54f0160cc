//! The built-in control structures.

use crate::instruction::{Condition, ControlTemplate};
use crate::program::{Budget, Program};

/// `IF (condition) { body }`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalStatement;

impl<M> ControlTemplate<M> for ConditionalStatement {
    fn needs_condition(&self) -> bool {
        true
    }

    fn keyword(&self) -> &str {
        "IF"
    }

    fn execute(
        &self,
        condition: Option<&Condition<M>>,
        body: &Program<M>,
        memory: &mut M,
        budget: &mut Budget,
    ) {
        let Some(condition) = condition else { return };

        if condition.evaluate(memory, budget) && budget.allow_execution() {
            body.execute(memory, budget);
        }
    }
}

/// `WHILE (condition) { body }`. Nothing but the budget stops a loop whose
/// condition stays true.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhileLoop;

impl<M> ControlTemplate<M> for WhileLoop {
    fn needs_condition(&self) -> bool {
        true
    }

    fn keyword(&self) -> &str {
        "WHILE"
    }

    fn execute(
        &self,
        condition: Option<&Condition<M>>,
        body: &Program<M>,
        memory: &mut M,
        budget: &mut Budget,
    ) {
        let Some(condition) = condition else { return };

        while budget.allow_execution()
            && condition.evaluate(memory, budget)
            && budget.allow_execution()
        {
            body.execute(memory, budget);
        }
    }
}
