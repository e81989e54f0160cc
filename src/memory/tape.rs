use crate::error::Error;
use crate::instruction::{Action, Condition};
use crate::value::Value;

use super::Memory;

/// An n-dimensional grid of cells holding values in `0..=max_value`, with a
/// pointer to the current cell. The pointer wraps around at the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    max_value: i64,
    shape: Vec<usize>,
    data: Vec<i64>,
    pointer: Vec<usize>,
    selected_value: i64,
}

impl Tape {
    pub fn new(max_value: i64, shape: Vec<usize>) -> Self {
        let size = shape.iter().product();

        Self {
            max_value,
            pointer: vec![0; shape.len()],
            data: vec![0; size],
            shape,
            selected_value: 0,
        }
    }

    pub fn max_value(&self) -> i64 {
        self.max_value
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn pointer(&self) -> &[usize] {
        &self.pointer
    }

    pub fn data(&self) -> &[i64] {
        &self.data
    }

    pub fn selected_value(&self) -> i64 {
        self.selected_value
    }

    /// Positions the pointer. Coordinates beyond the shape wrap around and
    /// missing trailing ones are zero.
    pub fn set_pointer(&mut self, pointer: &[usize]) {
        for (axis, len) in self.shape.iter().enumerate() {
            let at = pointer.get(axis).copied().unwrap_or(0);
            self.pointer[axis] = if *len == 0 { 0 } else { at % len };
        }
    }

    fn offset(&self) -> Option<usize> {
        let mut offset = 0;
        for (at, len) in self.pointer.iter().zip(&self.shape) {
            if at >= len {
                return None;
            }
            offset = offset * len + at;
        }

        Some(offset)
    }

    /// The value under the pointer. An empty tape reads as zero.
    pub fn get(&self) -> i64 {
        self.offset()
            .and_then(|idx| self.data.get(idx).copied())
            .unwrap_or(0)
    }

    pub fn set(&mut self, value: i64) {
        if let Some(idx) = self.offset() {
            if let Some(cell) = self.data.get_mut(idx) {
                *cell = value;
            }
        }
    }

    pub fn select_value(&mut self, value: i64) {
        self.selected_value = value;
    }

    pub fn set_selected(&mut self) {
        self.set(self.selected_value);
    }

    pub fn indicated_value_equals(&self, value: i64) -> bool {
        self.get() == value
    }

    pub fn increment_pointer(&mut self, axis: usize) -> Result<(), Error> {
        let len = self.axis_len(axis)?;
        if len > 0 {
            self.pointer[axis] = (self.pointer[axis] + 1) % len;
        }

        Ok(())
    }

    pub fn decrement_pointer(&mut self, axis: usize) -> Result<(), Error> {
        let len = self.axis_len(axis)?;
        if len > 0 {
            self.pointer[axis] = (self.pointer[axis] + len - 1) % len;
        }

        Ok(())
    }

    fn axis_len(&self, axis: usize) -> Result<usize, Error> {
        self.shape.get(axis).copied().ok_or_else(|| Error::InvalidAxis {
            axis,
            shape: self.shape.clone(),
        })
    }

    fn load(&mut self, shape: Vec<usize>, data: Vec<i64>) {
        self.pointer.resize(shape.len(), 0);
        self.shape = shape;
        self.data = data;
        let pointer = self.pointer.clone();
        self.set_pointer(&pointer);
    }

    fn to_value(&self, axis: usize, offset: usize) -> Value {
        if axis == self.shape.len() {
            return Value::Int(self.data[offset]);
        }

        let len = self.shape[axis];
        Value::List(
            (0..len)
                .map(|idx| self.to_value(axis + 1, offset * len + idx))
                .collect(),
        )
    }
}

/// Flattens a rectangular nested list of integers into its shape and data.
fn flatten(value: &Value) -> Result<(Vec<usize>, Vec<i64>), String> {
    match value {
        Value::Int(x) => Ok((Vec::new(), vec![*x])),
        Value::List(rows) => {
            let mut shape = None;
            let mut data = Vec::new();
            for row in rows {
                let (row_shape, row_data) = flatten(row)?;
                match &shape {
                    None => shape = Some(row_shape),
                    Some(known) if *known == row_shape => (),
                    Some(_) => return Err("rows have different shapes".to_string()),
                }
                data.extend(row_data);
            }

            let mut shape = shape.unwrap_or_default();
            shape.insert(0, rows.len());

            Ok((shape, data))
        },
        other => Err(format!("expected a nested list of integers, got {other}")),
    }
}

impl Memory for Tape {
    fn input(&mut self, data: Value) -> Result<(), Error> {
        let (shape, data) = flatten(&data).map_err(|reason| Error::InvalidInput {
            target: "tape",
            reason,
        })?;
        self.load(shape, data);

        Ok(())
    }

    fn output(&mut self) -> Value {
        self.to_value(0, 0)
    }

    fn reset(&mut self) {
        self.data = vec![0; self.shape.iter().product()];
        self.pointer = vec![0; self.shape.len()];
        self.selected_value = 0;
    }

    fn actions(&self) -> Vec<Action<Self>> {
        let sets = (0..=self.max_value).map(|value| {
            Action::new(
                Value::call("set").with_arg("value", value),
                move |tape: &mut Tape| tape.set(value),
            )
        });
        // Axes may vanish when the tape is fed a lower-dimensional input, in
        // which case moving along them does nothing.
        let increments = (0..self.shape.len()).map(|axis| {
            Action::new(
                Value::call("increment_pointer").with_arg("axis", axis),
                move |tape: &mut Tape| {
                    tape.increment_pointer(axis).ok();
                },
            )
        });
        let decrements = (0..self.shape.len()).map(|axis| {
            Action::new(
                Value::call("decrement_pointer").with_arg("axis", axis),
                move |tape: &mut Tape| {
                    tape.decrement_pointer(axis).ok();
                },
            )
        });

        sets.chain(increments).chain(decrements).collect()
    }

    fn conditions(&self) -> Vec<Condition<Self>> {
        (0..=self.max_value)
            .map(|value| {
                Condition::new(
                    Value::call("indicated_value_equals").with_arg("value", value),
                    move |tape: &Tape| tape.indicated_value_equals(value),
                )
            })
            .collect()
    }
}
