//! A memory made of typed variables, whose actions are all the well-typed
//! calls of a function library over the variables currently alive.
//!
//! Creating a variable derives every call it makes possible, removing one
//! retracts every call it took part in. The search therefore only ever sees
//! a flat list of actions and never has to reason about types itself.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::error::Error;
use crate::instruction::Action;
use crate::value::Value;

use super::Memory;

pub type VariableId = usize;

/// A type variables can be created with, along with its default value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    name: String,
    default: Value,
}

impl DataType {
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    id: VariableId,
    data_type: String,
    value: Value,
}

impl Variable {
    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// How the variable appears in a call signature: by identity, never by
    /// its current value.
    pub fn reference(&self) -> Value {
        Value::object("Variable", [
            ("id".to_string(), Value::from(self.id)),
            ("type".to_string(), Value::from(self.data_type.as_str())),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotType {
    /// Takes a variable of any type.
    Any,
    Of(String),
}

impl SlotType {
    pub fn of(name: impl Into<String>) -> Self {
        SlotType::Of(name.into())
    }

    pub fn accepts(&self, data_type: &str) -> bool {
        match self {
            SlotType::Any => true,
            SlotType::Of(name) => name == data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    slot: SlotType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, slot: SlotType) -> Self {
        Self {
            name: name.into(),
            slot,
        }
    }
}

pub type FunctionBody = Rc<dyn Fn(&mut [Value]) -> Value>;

/// A typed function the variables can be fed to. The body gets the
/// arguments as a mutable slice and may change them in place. Its result is
/// stored into the variable bound to the return slot, if there is one.
#[derive(Clone)]
pub struct Function {
    name: String,
    params: Vec<Parameter>,
    returns: Option<SlotType>,
    body: FunctionBody,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, params: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(&mut [Value]) -> Value + 'static,
    {
        Self {
            name: name.into(),
            params,
            returns: None,
            body: Rc::new(body),
        }
    }

    pub fn returning(mut self, slot: SlotType) -> Self {
        self.returns = Some(slot);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declared order, then the return slot.
    fn slots(&self) -> impl Iterator<Item = &SlotType> {
        self.params.iter().map(|p| &p.slot).chain(self.returns.as_ref())
    }

    fn slot_count(&self) -> usize {
        self.params.len() + usize::from(self.returns.is_some())
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

/// A function of the library with every slot bound to a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    function: usize,
    bindings: Vec<VariableId>,
}

impl Call {
    pub fn function(&self) -> usize {
        self.function
    }

    /// Bound variables, parameters first, then the return slot.
    pub fn bindings(&self) -> &[VariableId] {
        &self.bindings
    }
}

/// Live variables and the calls derived over them.
#[derive(Debug, Clone, Default)]
struct Pool {
    variables: Vec<Option<Variable>>,
    calls: Vec<Option<Call>>,
    // variable id -> ids of the calls it is bound in
    dependents: Vec<Vec<usize>>,
}

pub struct Variables {
    input_type: String,
    output_type: String,
    types: Vec<DataType>,
    functions: Vec<Function>,
    input: VariableId,
    output: VariableId,
    pool: Pool,
    // What `reset` goes back to: the pool as the caller last left it
    baseline: Pool,
}

impl Variables {
    /// Creates the input and output variables right away: a single one if
    /// both have the same type.
    pub fn new(
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        types: Vec<DataType>,
        functions: Vec<Function>,
    ) -> Result<Self, Error> {
        let mut res = Self {
            input_type: input_type.into(),
            output_type: output_type.into(),
            types,
            functions,
            input: 0,
            output: 0,
            pool: Pool::default(),
            baseline: Pool::default(),
        };

        let input_type = res.input_type.clone();
        let output_type = res.output_type.clone();
        res.input = res.spawn(&input_type, None)?;
        res.output = if input_type == output_type {
            res.input
        } else {
            res.spawn(&output_type, None)?
        };
        res.baseline = res.pool.clone();

        Ok(res)
    }

    pub fn input_id(&self) -> VariableId {
        self.input
    }

    pub fn output_id(&self) -> VariableId {
        self.output
    }

    pub fn get(&self, id: VariableId) -> Option<&Variable> {
        self.pool.variables.get(id).and_then(Option::as_ref)
    }

    /// Live variables in creation order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.pool.variables.iter().flatten()
    }

    /// Live calls in the order they were derived.
    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.pool.calls.iter().flatten()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn is_removable(&self, id: VariableId) -> bool {
        id > self.input.max(self.output) && self.get(id).is_some()
    }

    /// Adds a variable of the named type, holding `value` or the type's
    /// default, and derives every call it can be bound in. The variable
    /// survives [`Memory::reset`].
    pub fn create(&mut self, data_type: &str, value: Option<Value>) -> Result<VariableId, Error> {
        let id = self.spawn(data_type, value)?;
        self.baseline = self.pool.clone();

        Ok(id)
    }

    /// Drops a variable along with every call that used it, for good. The
    /// input and output variables stay. Returns whether anything was removed.
    pub fn remove(&mut self, id: VariableId) -> bool {
        let removed = self.retract(id);
        if removed {
            self.baseline = self.pool.clone();
        }

        removed
    }

    fn spawn(&mut self, data_type: &str, value: Option<Value>) -> Result<VariableId, Error> {
        let ty = self.types.iter()
            .find(|ty| ty.name == data_type)
            .ok_or_else(|| Error::UnknownType(data_type.to_string()))?;

        let id = self.pool.variables.len();
        self.pool.variables.push(Some(Variable {
            id,
            data_type: ty.name.clone(),
            value: value.unwrap_or_else(|| ty.default.clone()),
        }));
        self.pool.dependents.push(Vec::new());

        for function in 0..self.functions.len() {
            for bindings in self.bindings_with(function, id) {
                self.register(Call { function, bindings });
            }
        }

        Ok(id)
    }

    fn retract(&mut self, id: VariableId) -> bool {
        if !self.is_removable(id) {
            return false;
        }

        self.pool.variables[id] = None;
        for call_id in std::mem::take(&mut self.pool.dependents[id]) {
            self.pool.calls[call_id] = None;
        }
        trace!("Removed variable {id}");

        true
    }

    /// Runs a call. Does nothing if one of its variables is gone or no
    /// longer fits its slot.
    pub fn invoke(&mut self, call: &Call) {
        let Some(function) = self.functions.get(call.function) else { return };
        if call.bindings.len() != function.slot_count() {
            return;
        }

        let fits = function.slots()
            .zip(&call.bindings)
            .all(|(slot, id)| self.get(*id).is_some_and(|var| slot.accepts(&var.data_type)));
        if !fits {
            trace!("Skip call {:?}", call);
            return;
        }

        let param_count = function.params.len();
        let mut args: Vec<Value> = call.bindings[..param_count]
            .iter()
            .filter_map(|id| self.get(*id).map(|var| var.value.clone()))
            .collect();

        let result = (function.body)(&mut args);

        for (id, value) in call.bindings.iter().zip(args) {
            if let Some(Some(var)) = self.pool.variables.get_mut(*id) {
                var.value = value;
            }
        }
        if let Some(ret) = call.bindings.get(param_count) {
            if let Some(Some(var)) = self.pool.variables.get_mut(*ret) {
                var.value = result;
            }
        }
    }

    fn register(&mut self, call: Call) {
        let call_id = self.pool.calls.len();
        let distinct: BTreeSet<_> = call.bindings.iter().copied().collect();
        for id in distinct {
            self.pool.dependents[id].push(call_id);
        }

        trace!("Derived call {call_id}: {:?}", call);
        self.pool.calls.push(Some(call));
    }

    /// Every complete binding of `function` in which variable `new` occurs.
    ///
    /// `new` is pinned to each compatible slot in turn. The remaining slots
    /// are filled in order with every compatible live variable, but `new`
    /// itself only goes into slots after the pinned one, so no binding is
    /// produced twice.
    fn bindings_with(&self, function: usize, new: VariableId) -> Vec<Vec<VariableId>> {
        let function = &self.functions[function];
        let slots: Vec<&SlotType> = function.slots().collect();
        let Some(new_type) = self.get(new).map(|v| v.data_type.as_str()) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for pinned in 0..slots.len() {
            if !slots[pinned].accepts(new_type) {
                continue;
            }

            let mut partial = vec![None; function.slot_count()];
            partial[pinned] = Some(new);
            self.fill(&slots, &mut partial, pinned, new, 0, &mut found);
        }

        found
    }

    fn fill(
        &self,
        slots: &[&SlotType],
        partial: &mut [Option<VariableId>],
        pinned: usize,
        new: VariableId,
        from: usize,
        found: &mut Vec<Vec<VariableId>>,
    ) {
        let Some(slot) = (from..partial.len()).find(|idx| partial[*idx].is_none()) else {
            found.push(partial.iter().flatten().copied().collect());
            return;
        };

        let candidates = self.variables()
            .filter(|var| slots[slot].accepts(&var.data_type))
            .filter(|var| var.id != new || slot > pinned)
            .map(|var| var.id)
            .collect::<Vec<_>>();
        for id in candidates {
            partial[slot] = Some(id);
            self.fill(slots, partial, pinned, new, slot + 1, found);
        }
        partial[slot] = None;
    }

    fn call_action(&self, call: &Call) -> Action<Self> {
        let function = &self.functions[call.function];
        let references = call.bindings.iter()
            .map(|id| self.get(*id).map_or(Value::Unit, Variable::reference));
        let names = function.params.iter()
            .map(|p| p.name.clone())
            .chain(function.returns.as_ref().map(|_| "return".to_string()));

        let signature = names.zip(references)
            .fold(Value::call(function.name.clone()), |sig, (name, var)| sig.with_arg(name, var));
        let call = call.clone();

        Action::new(signature, move |vars: &mut Variables| vars.invoke(&call))
    }
}

impl Memory for Variables {
    fn input(&mut self, data: Value) -> Result<(), Error> {
        if let Some(Some(var)) = self.pool.variables.get_mut(self.input) {
            var.value = data;
        }

        Ok(())
    }

    fn output(&mut self) -> Value {
        self.get(self.output)
            .map_or(Value::Unit, |var| var.value.clone())
    }

    /// Forgets the variables created by programs. Those created through
    /// [`Variables::create`] stay, with the ids and values they had, so
    /// calls taken from an earlier vocabulary still bind the same variables.
    /// The input and output go back to their type defaults.
    fn reset(&mut self) {
        self.pool = self.baseline.clone();

        for id in [self.input, self.output] {
            let default = self.get(id)
                .and_then(|var| self.types.iter().find(|ty| ty.name == var.data_type))
                .map(|ty| ty.default.clone());
            if let (Some(default), Some(Some(var))) = (default, self.pool.variables.get_mut(id)) {
                var.value = default;
            }
        }
    }

    /// Calls first, then one `create` per type, then one `remove` per
    /// variable that may be removed.
    fn actions(&self) -> Vec<Action<Self>> {
        let calls = self.calls().map(|call| self.call_action(call));
        let creates = self.types.iter().map(|ty| {
            let name = ty.name.clone();
            Action::new(
                Value::call("create").with_arg("type", name.as_str()),
                move |vars: &mut Variables| {
                    vars.spawn(&name, None).ok();
                },
            )
        });
        let removes = self.variables()
            .filter(|var| self.is_removable(var.id))
            .map(|var| {
                let id = var.id;
                Action::new(
                    Value::call("remove").with_arg("id", id),
                    move |vars: &mut Variables| {
                        vars.retract(id);
                    },
                )
            });

        calls.chain(creates).chain(removes).collect()
    }
}
