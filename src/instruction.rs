use std::fmt;
use std::rc::Rc;

use crate::program::{Budget, Program};
use crate::value::{same, Value};

/// What an action does once invoked.
pub enum Effect<M> {
    /// The wrapper charges a single step before running the callable.
    Plain(Rc<dyn Fn(&mut M)>),
    /// The callable gets the budget and does its own accounting.
    Metered(Rc<dyn Fn(&mut M, &mut Budget)>),
}

impl<M> Clone for Effect<M> {
    fn clone(&self) -> Self {
        match self {
            Effect::Plain(f) => Effect::Plain(f.clone()),
            Effect::Metered(f) => Effect::Metered(f.clone()),
        }
    }
}

/// Same as [`Effect`], but for tests that produce a boolean.
pub enum Predicate<M> {
    Plain(Rc<dyn Fn(&M) -> bool>),
    Metered(Rc<dyn Fn(&M, &mut Budget) -> bool>),
}

impl<M> Clone for Predicate<M> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Plain(f) => Predicate::Plain(f.clone()),
            Predicate::Metered(f) => Predicate::Metered(f.clone()),
        }
    }
}

/// A primitive action on a memory `M`. The signature is what the action
/// is known by: it is used for display and for structural comparison, the
/// closure itself is never looked at.
pub struct Action<M> {
    signature: Value,
    effect: Effect<M>,
}

impl<M> Action<M> {
    pub fn new<F>(signature: Value, f: F) -> Self
    where
        F: Fn(&mut M) + 'static,
    {
        Self {
            signature,
            effect: Effect::Plain(Rc::new(f)),
        }
    }

    pub fn metered<F>(signature: Value, f: F) -> Self
    where
        F: Fn(&mut M, &mut Budget) + 'static,
    {
        Self {
            signature,
            effect: Effect::Metered(Rc::new(f)),
        }
    }

    pub fn signature(&self) -> &Value {
        &self.signature
    }

    pub fn execute(&self, memory: &mut M, budget: &mut Budget) {
        match &self.effect {
            Effect::Plain(f) => {
                budget.increment();
                f(memory)
            },
            Effect::Metered(f) => f(memory, budget),
        }
    }

    /// Turns an action on a part of some bigger memory `N` into an action
    /// on `N`. The action does nothing when `project` finds no part.
    pub fn lift<N, P>(self, prefix: &str, project: P) -> Action<N>
    where
        M: 'static,
        N: 'static,
        P: Fn(&mut N) -> Option<&mut M> + 'static,
    {
        let signature = self.signature.clone().qualified(prefix);

        Action::metered(signature, move |memory: &mut N, budget: &mut Budget| {
            if let Some(part) = project(memory) {
                self.execute(part, budget);
            }
        })
    }

    pub fn same(&self, other: &Self) -> bool {
        same(&self.signature, &other.signature)
    }
}

impl<M> Clone for Action<M> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            effect: self.effect.clone(),
        }
    }
}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.signature)
    }
}

/// A boolean test on a memory `M`.
pub struct Condition<M> {
    signature: Value,
    predicate: Predicate<M>,
}

impl<M> Condition<M> {
    pub fn new<F>(signature: Value, f: F) -> Self
    where
        F: Fn(&M) -> bool + 'static,
    {
        Self {
            signature,
            predicate: Predicate::Plain(Rc::new(f)),
        }
    }

    pub fn metered<F>(signature: Value, f: F) -> Self
    where
        F: Fn(&M, &mut Budget) -> bool + 'static,
    {
        Self {
            signature,
            predicate: Predicate::Metered(Rc::new(f)),
        }
    }

    pub fn signature(&self) -> &Value {
        &self.signature
    }

    pub fn evaluate(&self, memory: &M, budget: &mut Budget) -> bool {
        match &self.predicate {
            Predicate::Plain(f) => {
                budget.increment();
                f(memory)
            },
            Predicate::Metered(f) => f(memory, budget),
        }
    }

    /// See [`Action::lift`]. A missing part reads as `false`.
    pub fn lift<N, P>(self, prefix: &str, project: P) -> Condition<N>
    where
        M: 'static,
        N: 'static,
        P: Fn(&N) -> Option<&M> + 'static,
    {
        let signature = self.signature.clone().qualified(prefix);

        Condition::metered(signature, move |memory: &N, budget: &mut Budget| {
            project(memory).is_some_and(|part| self.evaluate(part, budget))
        })
    }

    pub fn same(&self, other: &Self) -> bool {
        same(&self.signature, &other.signature)
    }
}

impl<M> Clone for Condition<M> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<M> fmt::Debug for Condition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self.signature)
    }
}

/// A kind of control structure. Implementing this trait is all it takes
/// to give the enumerator a new way of nesting programs.
pub trait ControlTemplate<M> {
    /// Whether every instance of the structure is paired with a condition.
    fn needs_condition(&self) -> bool;

    fn keyword(&self) -> &str;

    /// Runs `body` according to the structure's rules. Implementations must
    /// check `budget.allow_execution()` before each run of the body.
    fn execute(
        &self,
        condition: Option<&Condition<M>>,
        body: &Program<M>,
        memory: &mut M,
        budget: &mut Budget,
    );
}

/// An instantiated control structure. Owns its body.
pub struct ControlStructure<M> {
    template: Rc<dyn ControlTemplate<M>>,
    condition: Option<Condition<M>>,
    body: Program<M>,
}

impl<M> ControlStructure<M> {
    pub fn new(
        template: Rc<dyn ControlTemplate<M>>,
        condition: Option<Condition<M>>,
        body: Program<M>,
    ) -> Self {
        Self {
            template,
            condition,
            body,
        }
    }

    pub fn keyword(&self) -> &str {
        self.template.keyword()
    }

    pub fn condition(&self) -> Option<&Condition<M>> {
        self.condition.as_ref()
    }

    pub fn body(&self) -> &Program<M> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Program<M> {
        &mut self.body
    }

    pub fn set_body(&mut self, body: Program<M>) {
        self.body = body;
    }

    pub fn execute(&self, memory: &mut M, budget: &mut Budget) {
        self.template.execute(self.condition.as_ref(), &self.body, memory, budget)
    }

    pub fn same(&self, other: &Self) -> bool {
        let same_condition = match (&self.condition, &other.condition) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same(b),
            _ => false,
        };

        self.keyword() == other.keyword() && same_condition && self.body == other.body
    }
}

impl<M> Clone for ControlStructure<M> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            condition: self.condition.clone(),
            body: self.body.clone(),
        }
    }
}

impl<M> fmt::Debug for ControlStructure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlStructure")
            .field("keyword", &self.keyword())
            .field("condition", &self.condition)
            .field("body", &self.body)
            .finish()
    }
}

impl<M> fmt::Display for ControlStructure<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.keyword())?;
        if let Some(condition) = &self.condition {
            write!(f, "({}) ", condition.signature())?;
        }

        let body = self.body.to_string();
        write!(f, "{{\n\t{}\n}}", body.replace('\n', "\n\t"))
    }
}

pub enum Instruction<M> {
    Action(Action<M>),
    Condition(Condition<M>),
    Control(ControlStructure<M>),
}

impl<M> Instruction<M> {
    pub fn execute(&self, memory: &mut M, budget: &mut Budget) {
        match self {
            Instruction::Action(action) => action.execute(memory, budget),
            Instruction::Condition(condition) => {
                condition.evaluate(memory, budget);
            },
            Instruction::Control(control) => control.execute(memory, budget),
        }
    }
}

impl<M> Clone for Instruction<M> {
    fn clone(&self) -> Self {
        match self {
            Instruction::Action(x) => Instruction::Action(x.clone()),
            Instruction::Condition(x) => Instruction::Condition(x.clone()),
            Instruction::Control(x) => Instruction::Control(x.clone()),
        }
    }
}

impl<M> PartialEq for Instruction<M> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Instruction::Action(a), Instruction::Action(b)) => a.same(b),
            (Instruction::Condition(a), Instruction::Condition(b)) => a.same(b),
            (Instruction::Control(a), Instruction::Control(b)) => a.same(b),
            _ => false,
        }
    }
}

impl<M> fmt::Debug for Instruction<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Action(x) => fmt::Debug::fmt(x, f),
            Instruction::Condition(x) => fmt::Debug::fmt(x, f),
            Instruction::Control(x) => fmt::Debug::fmt(x, f),
        }
    }
}

impl<M> fmt::Display for Instruction<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Action(x) => write!(f, "{}", x.signature()),
            Instruction::Condition(x) => write!(f, "{}", x.signature()),
            Instruction::Control(x) => fmt::Display::fmt(x, f),
        }
    }
}

impl<M> From<Action<M>> for Instruction<M> {
    fn from(x: Action<M>) -> Self {
        Instruction::Action(x)
    }
}

impl<M> From<Condition<M>> for Instruction<M> {
    fn from(x: Condition<M>) -> Self {
        Instruction::Condition(x)
    }
}

impl<M> From<ControlStructure<M>> for Instruction<M> {
    fn from(x: ControlStructure<M>) -> Self {
        Instruction::Control(x)
    }
}
