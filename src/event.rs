use std::collections::HashMap;

use crate::program::Program;
use crate::value::Value;

/// Dispatched right before a program is run, once the memory has been reset
/// and fed the input.
pub const PRE_STRATEGY_EXECUTION: &str = "pre_strategy_execution";

/// What listeners get to see (and touch) before a program runs.
pub struct ExecutionEvent<'a, M> {
    pub memory: &'a mut M,
    pub program: &'a Program<M>,
    pub input: &'a Value,
    pub preprocessed_input: &'a Value,
}

pub type Listener<M> = Box<dyn for<'a> FnMut(&mut ExecutionEvent<'a, M>)>;

/// Listeners keyed by event name, called in registration order.
pub struct EventDispatcher<M> {
    listeners: HashMap<String, Vec<Listener<M>>>,
}

impl<M> EventDispatcher<M> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    pub fn add_event_listener<F>(&mut self, event: impl Into<String>, listener: F)
    where
        F: for<'a> FnMut(&mut ExecutionEvent<'a, M>) + 'static,
    {
        self.listeners
            .entry(event.into())
            .or_default()
            .push(Box::new(listener));
    }

    pub fn dispatch_event(&mut self, event: &str, args: &mut ExecutionEvent<'_, M>) {
        let Some(listeners) = self.listeners.get_mut(event) else { return };

        for listener in listeners {
            listener(&mut *args);
        }
    }
}

impl<M> Default for EventDispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}
