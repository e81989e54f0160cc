#![allow(dead_code)]

use brutesynth::{Action, Condition, Error, Value};
use brutesynth::memory::Memory;

pub fn init_logging() {
    let _ = colog::default_builder()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// A memory with no state, for looking at program structure only.
#[derive(Debug, Default)]
pub struct Null;

impl Memory for Null {
    fn input(&mut self, _data: Value) -> Result<(), Error> {
        Ok(())
    }

    fn output(&mut self) -> Value {
        Value::Unit
    }

    fn reset(&mut self) {}
}

pub fn null_action(name: &str) -> Action<Null> {
    Action::new(Value::call(name), |_: &mut Null| ())
}

pub fn null_condition(name: &str, result: bool) -> Condition<Null> {
    Condition::new(Value::call(name), move |_: &Null| result)
}

/// Counts how many times its action ran.
#[derive(Debug, Default)]
pub struct Hits {
    pub count: u64,
}

impl Memory for Hits {
    fn input(&mut self, _data: Value) -> Result<(), Error> {
        Ok(())
    }

    fn output(&mut self) -> Value {
        Value::Int(self.count as i64)
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

pub fn hit() -> Action<Hits> {
    Action::new(Value::call("hit"), |h: &mut Hits| h.count += 1)
}

pub fn grid(rows: &[&[i64]]) -> Value {
    Value::List(
        rows.iter()
            .map(|row| Value::List(row.iter().map(|x| Value::Int(*x)).collect()))
            .collect(),
    )
}
