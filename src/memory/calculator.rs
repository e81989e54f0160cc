use crate::error::Error;
use crate::instruction::Action;
use crate::value::Value;

use super::Memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Deduct,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Deduct,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Deduct => "deduct",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Never overflows or faults. Dividing by zero gives zero.
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Operation::Add => a.wrapping_add(b),
            Operation::Deduct => a.wrapping_sub(b),
            Operation::Multiply => a.wrapping_mul(b),
            Operation::Divide => floor_div(a, b),
        }
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    if b == 0 {
        return 0;
    }

    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q.wrapping_sub(1)
    } else {
        q
    }
}

/// A pocket calculator: a display, an accumulator and a pending operation.
/// Typing a digit right after an operation starts a new number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculator {
    result: i64,
    displayed: i64,
    fresh: bool,
    operation: Option<Operation>,
}

impl Calculator {
    pub fn new(initial: i64) -> Self {
        Self {
            result: initial,
            displayed: initial,
            fresh: true,
            operation: None,
        }
    }

    pub fn displayed(&self) -> i64 {
        self.displayed
    }

    pub fn type_digit(&mut self, digit: i64) {
        if self.fresh {
            self.displayed = digit;
            self.fresh = false;
        } else {
            self.displayed = self.displayed.wrapping_mul(10).wrapping_add(digit);
        }
    }

    pub fn equal(&mut self) {
        if let Some(op) = self.operation.take() {
            self.displayed = op.apply(self.result, self.displayed);
        }
        self.result = self.displayed;
        self.fresh = true;
    }

    pub fn operate(&mut self, op: Operation) {
        self.equal();
        self.operation = Some(op);
    }

    pub fn add(&mut self) {
        self.operate(Operation::Add)
    }

    pub fn deduct(&mut self) {
        self.operate(Operation::Deduct)
    }

    pub fn multiply(&mut self) {
        self.operate(Operation::Multiply)
    }

    pub fn divide(&mut self) {
        self.operate(Operation::Divide)
    }

    fn load(&mut self, initial: i64) {
        *self = Self::new(initial);
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Memory for Calculator {
    fn input(&mut self, data: Value) -> Result<(), Error> {
        match data {
            Value::Int(x) => self.load(x),
            Value::Unit => self.load(0),
            other => {
                return Err(Error::InvalidInput {
                    target: "calculator",
                    reason: format!("expected an integer, got {other}"),
                })
            },
        }

        Ok(())
    }

    fn output(&mut self) -> Value {
        self.equal();
        Value::Int(self.displayed)
    }

    fn reset(&mut self) {
        self.load(0);
    }

    fn actions(&self) -> Vec<Action<Self>> {
        let digits = (0..10).map(|digit: i64| {
            Action::new(
                Value::call("type").with_arg("digit", digit),
                move |calc: &mut Calculator| calc.type_digit(digit),
            )
        });
        let operations = Operation::ALL.into_iter().map(|op| {
            Action::new(
                Value::call(op.name()),
                move |calc: &mut Calculator| calc.operate(op),
            )
        });

        digits.chain(operations).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_chaining() {
        let mut calc = Calculator::new(3);
        calc.input(Value::Int(8)).unwrap();
        assert_eq!(Value::Int(8), calc.output());
        calc.type_digit(5);
        calc.type_digit(3);
        assert_eq!(Value::Int(53), calc.output());
        calc.add();
        calc.type_digit(4);
        calc.type_digit(0);
        assert_eq!(Value::Int(93), calc.output());
        calc.divide();
        calc.type_digit(3);
        assert_eq!(Value::Int(31), calc.output());
        calc.multiply();
        calc.type_digit(2);
        assert_eq!(Value::Int(62), calc.output());
    }

    #[test]
    fn operation_before_input_is_dropped() {
        let mut calc = Calculator::new(3);
        calc.add();
        calc.input(Value::Int(3)).unwrap();
        calc.multiply();
        calc.type_digit(2);
        calc.add();
        calc.type_digit(1);
        assert_eq!(Value::Int(7), calc.output());
    }

    #[test]
    fn division_is_total() {
        assert_eq!(0, Operation::Divide.apply(7, 0));
        assert_eq!(-4, Operation::Divide.apply(-7, 2));
        assert_eq!(3, Operation::Divide.apply(7, 2));
        assert_eq!(i64::MIN, Operation::Divide.apply(i64::MIN, -1));
    }

    #[test]
    fn rejects_non_integers() {
        let mut calc = Calculator::default();
        assert!(calc.input(Value::from("12")).is_err());
    }
}
