mod common;

use std::cell::RefCell;
use std::rc::Rc;

use brutesynth::memory::variables::{DataType, Function, Parameter, SlotType, VariableId};
use brutesynth::memory::{Memory, Variables};
use brutesynth::synth::brute_enum::BruteForce;
use brutesynth::{same, Budget, DataSample, Error, LearnerConfig, SupervisedLearning, Value};

fn var(id: usize, data_type: &str) -> Value {
    Value::object("Variable", [
        ("id".to_string(), Value::from(id)),
        ("type".to_string(), Value::from(data_type)),
    ])
}

fn types() -> Vec<DataType> {
    vec![
        DataType::new("int", Value::Int(0)),
        DataType::new("str", Value::from("")),
        DataType::new("list", Value::List(Vec::new())),
    ]
}

fn param(name: &str, data_type: &str) -> Parameter {
    Parameter::new(name, SlotType::of(data_type))
}

fn list_len() -> Function {
    Function::new("list_len", vec![param("l", "list")], |args| {
        Value::Int(args[0].as_list().map_or(0, |xs| xs.len() as i64))
    })
    .returning(SlotType::of("int"))
}

fn library() -> Vec<Function> {
    vec![
        Function::new("int_type_1", vec![param("a", "int")], |_| Value::Unit),
        Function::new("str_type_a", vec![param("a", "str")], |_| Value::Unit),
        list_len(),
        Function::new(
            "concatenation",
            vec![param("a", "str"), param("b", "int")],
            |args| {
                let a = args[0].as_str().unwrap_or_default();
                let b = args[1].as_int().unwrap_or_default();
                Value::from(format!("{a}{b}"))
            },
        )
        .returning(SlotType::of("str")),
    ]
}

fn signatures(vars: &Variables) -> Value {
    Value::Set(vars.actions().iter().map(|a| a.signature().clone()).collect())
}

fn creates() -> Vec<Value> {
    ["int", "str", "list"]
        .into_iter()
        .map(|ty| Value::call("create").with_arg("type", ty))
        .collect()
}

fn remove(id: usize) -> Value {
    Value::call("remove").with_arg("id", id)
}

#[test]
fn actions_follow_the_variables() {
    let mut vars = Variables::new("int", "int", types(), library()).unwrap();
    assert_eq!(vars.input_id(), vars.output_id());

    let mut expected = vec![Value::call("int_type_1").with_arg("a", var(0, "int"))];
    expected.extend(creates());
    assert!(same(&Value::Set(expected.clone()), &signatures(&vars)));

    let list = vars.create("list", None).unwrap();
    assert_eq!(1, list);
    expected.extend([
        remove(1),
        Value::call("list_len")
            .with_arg("l", var(1, "list"))
            .with_arg("return", var(0, "int")),
    ]);
    assert!(same(&Value::Set(expected.clone()), &signatures(&vars)));
    let with_list = expected.clone();

    let text = vars.create("str", None).unwrap();
    assert_eq!(2, text);
    expected.extend([
        remove(2),
        Value::call("str_type_a").with_arg("a", var(2, "str")),
        Value::call("concatenation")
            .with_arg("a", var(2, "str"))
            .with_arg("b", var(0, "int"))
            .with_arg("return", var(2, "str")),
    ]);
    assert!(same(&Value::Set(expected), &signatures(&vars)));

    assert!(vars.remove(text));
    assert!(same(&Value::Set(with_list), &signatures(&vars)));
    assert!(vars.get(text).is_none());
}

#[test]
fn unused_types_derive_no_calls() {
    let mut types = types();
    types.push(DataType::new("float", Value::Float(0.0)));
    let mut vars = Variables::new("int", "int", types, library()).unwrap();
    let calls = vars.calls().count();
    let actions = vars.actions().len();

    let id = vars.create("float", None).unwrap();
    assert_eq!(calls, vars.calls().count());
    assert_eq!(actions + 1, vars.actions().len());

    assert!(vars.remove(id));
    assert_eq!(actions, vars.actions().len());
}

#[test]
fn calls_run_on_current_values() {
    let mut vars = Variables::new("int", "int", types(), library()).unwrap();
    vars.create("list", Some(Value::List(vec![Value::Int(4), Value::Int(2)])))
        .unwrap();

    let action = vars.actions()
        .into_iter()
        .find(|a| a.signature().to_string().starts_with("list_len"))
        .unwrap();
    action.execute(&mut vars, &mut Budget::unbounded());

    assert_eq!(Value::Int(2), vars.output());
}

#[test]
fn calls_on_removed_variables_do_nothing() {
    let mut vars = Variables::new("int", "int", types(), library()).unwrap();
    let list = vars.create("list", Some(Value::List(vec![Value::Int(1)]))).unwrap();
    let stale = vars.actions()
        .into_iter()
        .find(|a| a.signature().to_string().starts_with("list_len"))
        .unwrap();

    assert!(vars.remove(list));
    let mut budget = Budget::unbounded();
    stale.execute(&mut vars, &mut budget);

    assert_eq!(Value::Int(0), vars.output());
    assert_eq!(1, budget.executed());
}

#[test]
fn input_and_output_stay() {
    let mut vars = Variables::new("list", "int", types(), library()).unwrap();
    assert_ne!(vars.input_id(), vars.output_id());
    assert!(!vars.remove(vars.input_id()));
    assert!(!vars.remove(vars.output_id()));
    assert!(!vars.remove(42));

    let extra = vars.create("int", None).unwrap();
    assert!(vars.remove(extra));
    assert!(!vars.remove(extra));
}

#[test]
fn reset_forgets_what_programs_created() {
    let mut vars = Variables::new("int", "int", types(), library()).unwrap();
    let text = vars.create("str", Some(Value::from("x"))).unwrap();
    vars.input(Value::Int(7)).unwrap();

    let create_list = Value::call("create").with_arg("type", "list");
    let action = vars.actions()
        .into_iter()
        .find(|a| same(a.signature(), &create_list))
        .unwrap();
    action.execute(&mut vars, &mut Budget::unbounded());
    assert_eq!(3, vars.variables().count());

    vars.reset();
    assert_eq!(2, vars.variables().count());
    assert_eq!(Some(&Value::from("x")), vars.get(text).map(|v| v.value()));
    assert_eq!(Value::Int(0), vars.output());
}

#[test]
fn slots_keep_their_type_across_runs() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let measure = Function::new("list_len", vec![param("l", "list")], move |args| {
        log.borrow_mut().push(args[0].clone());
        Value::Int(args[0].as_list().map_or(0, |xs| xs.len() as i64))
    })
    .returning(SlotType::of("int"));

    let mut vars = Variables::new("int", "int", types(), vec![measure]).unwrap();
    vars.create("list", Some(Value::List(vec![Value::Int(9); 3]))).unwrap();
    let exhaustive = BruteForce::from_memory(&vars, 2);
    let short = BruteForce::from_memory(&vars, 2);
    let mut learner = SupervisedLearning::new(vars, LearnerConfig::default());

    // Nothing reaches 4, so every candidate runs, including the ones that
    // create or remove variables before measuring
    let report = learner.fit_with(&[DataSample::new(5i64, 4i64)], exhaustive).unwrap();
    assert!(!report.accepted);

    let data = [DataSample::new(5i64, 3i64), DataSample::new(1i64, 3i64)];
    let report = learner.fit_with(&data, short).unwrap();
    assert!(report.accepted);
    assert_eq!(2, report.evaluated);
    assert_eq!(Some(Value::Int(3)), learner.predict(&Value::Int(0)).unwrap());

    assert!(!seen.borrow().is_empty());
    assert!(seen.borrow().iter().all(|arg| matches!(arg, Value::List(_))));
}

#[test]
fn any_slot_takes_every_variable() {
    let show = Function::new("show", vec![Parameter::new("x", SlotType::Any)], |_| Value::Unit);
    let mut vars = Variables::new("int", "int", types(), vec![show]).unwrap();
    assert_eq!(1, vars.calls().count());

    vars.create("str", None).unwrap();
    vars.create("list", None).unwrap();

    let expected: Vec<Value> = [(0, "int"), (1, "str"), (2, "list")]
        .into_iter()
        .map(|(id, ty)| Value::call("show").with_arg("x", var(id, ty)))
        .collect();
    let calls: Vec<Value> = vars.actions()
        .iter()
        .map(|a| a.signature().clone())
        .filter(|sig| sig.to_string().starts_with("show"))
        .collect();
    assert_eq!(3, vars.calls().count());
    assert!(same(&Value::Set(expected), &Value::Set(calls)));
}

#[test]
fn any_slots_bind_each_pair_once() {
    let pair = Function::new(
        "pair",
        vec![Parameter::new("a", SlotType::Any), Parameter::new("b", SlotType::Any)],
        |_| Value::Unit,
    );
    let mut vars = Variables::new("int", "int", types(), vec![pair]).unwrap();
    vars.create("str", None).unwrap();
    vars.create("list", None).unwrap();

    let mut bindings: Vec<Vec<VariableId>> = vars.calls()
        .map(|call| call.bindings().to_vec())
        .collect();
    bindings.sort();

    let expected: Vec<Vec<VariableId>> = (0..3)
        .flat_map(|a| (0..3).map(move |b| vec![a, b]))
        .collect();
    assert_eq!(expected, bindings);
}

#[test]
fn unknown_types_are_rejected() {
    let res = Variables::new("float", "int", types(), library());
    assert!(matches!(res, Err(Error::UnknownType(name)) if name == "float"));

    let mut vars = Variables::new("int", "int", types(), library()).unwrap();
    assert!(matches!(vars.create("bool", None), Err(Error::UnknownType(_))));
}

#[test]
fn learns_in_place_updates() {
    common::init_logging();

    let increment = Function::new("increment", vec![param("a", "int")], |args| {
        args[0] = Value::Int(args[0].as_int().unwrap_or_default() + 1);
        Value::Unit
    });
    let vars = Variables::new(
        "int",
        "int",
        vec![DataType::new("int", Value::Int(0))],
        vec![increment],
    )
    .unwrap();

    let data = [DataSample::new(1i64, 3i64), DataSample::new(5i64, 7i64)];
    let mut learner = SupervisedLearning::new(vars, LearnerConfig::default());
    let report = learner.fit(&data).unwrap();

    assert!(report.accepted);
    assert_eq!(4, report.evaluated);
    assert_eq!(
        "increment(a=Variable(id=0, type=\"int\"))\nincrement(a=Variable(id=0, type=\"int\"))",
        learner.best_program().unwrap().to_string(),
    );
    assert_eq!(Some(Value::Int(12)), learner.predict(&Value::Int(10)).unwrap());
}

#[test]
fn learns_across_types() {
    let vars = Variables::new("list", "int", types(), vec![list_len()]).unwrap();
    let list = |len: usize| Value::List(vec![Value::Int(9); len]);
    let data = [DataSample::new(list(2), 2i64), DataSample::new(list(1), 1i64)];

    let mut learner = SupervisedLearning::new(vars, LearnerConfig::default());
    let report = learner.fit(&data).unwrap();

    assert!(report.accepted);
    assert_eq!(2, report.evaluated);
    assert_eq!(Some(Value::Int(5)), learner.predict(&list(5)).unwrap());
}
