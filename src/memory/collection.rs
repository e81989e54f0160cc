use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Error;
use crate::instruction::{Action, Condition, ControlTemplate};
use crate::value::Value;

use super::Memory;

/// Which elements make up the output of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSelection {
    Single(String),
    /// Outputs are gathered into a [`Value::Map`] keyed by element name.
    Many(Vec<String>),
}

/// Several named memories acting as one. Structured input (a map) is routed
/// to the elements by name, anything else goes to the input element.
pub struct MemoryCollection<E> {
    elements: BTreeMap<String, E>,
    input_element: Option<String>,
    output: OutputSelection,
    additional_actions: Vec<Action<Self>>,
    additional_conditions: Vec<Condition<Self>>,
    additional_control_structures: Vec<Rc<dyn ControlTemplate<Self>>>,
}

impl<E: Memory + 'static> MemoryCollection<E> {
    pub fn new(
        elements: impl IntoIterator<Item = (String, E)>,
        input_element: Option<&str>,
        output: OutputSelection,
    ) -> Result<Self, Error> {
        let elements: BTreeMap<_, _> = elements.into_iter().collect();

        let known = |name: &str| {
            if elements.contains_key(name) {
                Ok(name.to_string())
            } else {
                Err(Error::InvalidElement(name.to_string()))
            }
        };
        let input_element = input_element.map(known).transpose()?;
        match &output {
            OutputSelection::Single(name) => {
                known(name)?;
            },
            OutputSelection::Many(names) => {
                for name in names {
                    known(name)?;
                }
            },
        }

        Ok(Self {
            elements,
            input_element,
            output,
            additional_actions: Vec::new(),
            additional_conditions: Vec::new(),
            additional_control_structures: Vec::new(),
        })
    }

    pub fn with_actions(mut self, actions: Vec<Action<Self>>) -> Self {
        self.additional_actions = actions;
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<Condition<Self>>) -> Self {
        self.additional_conditions = conditions;
        self
    }

    pub fn with_control_structures(
        mut self,
        control_structures: Vec<Rc<dyn ControlTemplate<Self>>>,
    ) -> Self {
        self.additional_control_structures = control_structures;
        self
    }

    pub fn element(&self, name: &str) -> Option<&E> {
        self.elements.get(name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut E> {
        self.elements.get_mut(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&str, &E)> {
        self.elements.iter().map(|(name, e)| (name.as_str(), e))
    }
}

impl<E: Memory + 'static> Memory for MemoryCollection<E> {
    fn input(&mut self, data: Value) -> Result<(), Error> {
        if let Value::Map(routed) = data {
            for (name, part) in routed {
                match self.elements.get_mut(&name) {
                    Some(element) => element.input(part)?,
                    None => return Err(Error::InvalidElement(name)),
                }
            }
            return Ok(());
        }

        let Some(name) = &self.input_element else {
            return Err(Error::NoInputElement);
        };
        match self.elements.get_mut(name) {
            Some(element) => element.input(data),
            None => Err(Error::InvalidElement(name.clone())),
        }
    }

    fn output(&mut self) -> Value {
        match &self.output {
            OutputSelection::Single(name) => self.elements
                .get_mut(name)
                .map_or(Value::Unit, |element| element.output()),
            OutputSelection::Many(names) => {
                let mut result = BTreeMap::new();
                for name in names {
                    if let Some(element) = self.elements.get_mut(name) {
                        result.insert(name.clone(), element.output());
                    }
                }

                Value::Map(result)
            },
        }
    }

    fn reset(&mut self) {
        self.elements.values_mut().for_each(Memory::reset);
    }

    fn actions(&self) -> Vec<Action<Self>> {
        let mut actions = self.additional_actions.clone();
        for (name, element) in &self.elements {
            actions.extend(element.actions().into_iter().map(|action| {
                let key = name.clone();
                action.lift(name, move |c: &mut Self| c.elements.get_mut(&key))
            }));
        }

        actions
    }

    fn conditions(&self) -> Vec<Condition<Self>> {
        let mut conditions = self.additional_conditions.clone();
        for (name, element) in &self.elements {
            conditions.extend(element.conditions().into_iter().map(|condition| {
                let key = name.clone();
                condition.lift(name, move |c: &Self| c.elements.get(&key))
            }));
        }

        conditions
    }

    // NOTE: element control structures run bodies written for the element,
    // so they can't be lifted. Only collection-level ones are offered.
    fn control_structures(&self) -> Vec<Rc<dyn ControlTemplate<Self>>> {
        self.additional_control_structures.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Calculator, Tape};
    use crate::program::Budget;

    fn tapes() -> MemoryCollection<Tape> {
        MemoryCollection::new(
            [
                ("input".to_string(), Tape::new(9, vec![3])),
                ("working".to_string(), Tape::new(5, vec![2, 2])),
                ("output".to_string(), Tape::new(9, vec![3])),
            ],
            Some("input"),
            OutputSelection::Single("output".to_string()),
        )
        .unwrap()
    }

    fn row(xs: &[i64]) -> Value {
        Value::List(xs.iter().map(|x| Value::Int(*x)).collect())
    }

    #[test]
    fn unknown_elements_are_rejected() {
        let res = MemoryCollection::new(
            [("calc".to_string(), Calculator::default())],
            Some("nope"),
            OutputSelection::Single("calc".to_string()),
        );
        assert!(matches!(res, Err(Error::InvalidElement(name)) if name == "nope"));

        let mut collection = tapes();
        let routed = Value::Map([("missing".to_string(), row(&[1]))].into());
        assert!(matches!(collection.input(routed), Err(Error::InvalidElement(_))));
    }

    #[test]
    fn input_is_routed() {
        let mut collection = tapes();
        collection.input(row(&[1, 2])).unwrap();
        assert_eq!(row(&[1, 2]), collection.element_mut("input").unwrap().output());

        let routed = Value::Map([
            ("input".to_string(), row(&[4])),
            ("output".to_string(), row(&[2, 3])),
        ].into());
        collection.input(routed).unwrap();
        assert_eq!(row(&[4]), collection.element_mut("input").unwrap().output());
        assert_eq!(row(&[2, 3]), collection.output());
    }

    #[test]
    fn many_outputs_form_a_map() {
        let mut collection = MemoryCollection::new(
            [
                ("a".to_string(), Calculator::new(1)),
                ("b".to_string(), Calculator::new(2)),
            ],
            None,
            OutputSelection::Many(vec!["a".to_string(), "b".to_string()]),
        )
        .unwrap();
        assert!(matches!(collection.input(Value::Int(3)), Err(Error::NoInputElement)));

        let expected = Value::Map([
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
        ].into());
        assert_eq!(expected, collection.output());
    }

    #[test]
    fn lifted_actions_reach_their_element() {
        let mut collection = MemoryCollection::new(
            [("calc".to_string(), Calculator::default())],
            Some("calc"),
            OutputSelection::Single("calc".to_string()),
        )
        .unwrap();
        let actions = collection.actions();
        let type_seven = actions
            .iter()
            .find(|a| a.signature().to_string() == "calc.type(digit=7)")
            .unwrap();

        let mut budget = Budget::unbounded();
        type_seven.execute(&mut collection, &mut budget);

        assert_eq!(Value::Int(7), collection.output());
        assert_eq!(1, budget.executed());
    }
}
