use crate::error::Error;
use crate::value::Value;

use super::Memory;

/// Hands back whatever it was given and offers no instructions. Useful as a
/// stand-in where a memory is required but nothing should be learned.
#[derive(Debug, Clone, PartialEq)]
pub struct Ignored {
    data: Value,
}

impl Ignored {
    pub fn new() -> Self {
        Self { data: Value::Unit }
    }
}

impl Default for Ignored {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for Ignored {
    fn input(&mut self, data: Value) -> Result<(), Error> {
        self.data = data;

        Ok(())
    }

    fn output(&mut self) -> Value {
        self.data.clone()
    }

    fn reset(&mut self) {
        self.data = Value::Unit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_input_through() {
        let mut memory = Ignored::new();
        assert_eq!(Value::Unit, memory.output());

        memory.input(Value::from("abc")).unwrap();
        assert_eq!(Value::from("abc"), memory.output());

        memory.reset();
        assert_eq!(Value::Unit, memory.output());
        assert!(memory.vocabulary().is_empty());
    }
}
