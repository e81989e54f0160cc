use std::collections::BTreeMap;
use std::fmt;

/// Runtime values flowing in and out of execution targets. The variants
/// double as the closed set of shapes understood by [`same`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// An unordered collection. Element order carries no meaning.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A function together with the arguments captured for it.
    Call {
        function: String,
        args: Vec<(String, Value)>,
    },
    /// An object, described by its class name and its attributes.
    Object {
        class: String,
        attrs: BTreeMap<String, Value>,
    },
}

impl Value {
    /// A bound call without any captured arguments yet.
    pub fn call(function: impl Into<String>) -> Self {
        Value::Call {
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Captures one more argument. Has no effect on anything but a call.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Call { args, .. } = &mut self {
            args.push((name.into(), value.into()));
        }

        self
    }

    /// Prefixes the function name of a call with `prefix.`.
    pub fn qualified(self, prefix: &str) -> Self {
        match self {
            Value::Call { function, args } => Value::Call {
                function: format!("{prefix}.{function}"),
                args,
            },
            other => other,
        }
    }

    pub fn object(
        class: impl Into<String>,
        attrs: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        Value::Object {
            class: class.into(),
            attrs: attrs.into_iter().collect(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Checks if `a` and `b` are the same value, or copies of one another.
///
/// Composite values are compared element by element, so two independently
/// built values are the same exactly when their contents are. Sets match
/// regardless of order and call arguments are matched by name.
pub fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same(x, y))
        },
        (Value::Set(xs), Value::Set(ys)) => same_unordered(xs, ys),
        (Value::Map(xs), Value::Map(ys)) => same_attrs(xs, ys),
        (
            Value::Call { function: f, args: xs },
            Value::Call { function: g, args: ys },
        ) => f == g && same_args(xs, ys),
        (
            Value::Object { class: c, attrs: xs },
            Value::Object { class: d, attrs: ys },
        ) => c == d && same_attrs(xs, ys),
        (a, b) => a == b,
    }
}

fn same_attrs(xs: &BTreeMap<String, Value>, ys: &BTreeMap<String, Value>) -> bool {
    xs.len() == ys.len()
        && xs.iter().all(|(key, x)| ys.get(key).is_some_and(|y| same(x, y)))
}

fn same_args(xs: &[(String, Value)], ys: &[(String, Value)]) -> bool {
    xs.len() == ys.len()
        && xs.iter().all(|(name, x)| {
            ys.iter()
                .find(|(other, _)| other == name)
                .is_some_and(|(_, y)| same(x, y))
        })
}

// Greedy matching is enough here: `same` is an equivalence, so any element
// that matches is as good as any other.
fn same_unordered(xs: &[Value], ys: &[Value]) -> bool {
    if xs.len() != ys.len() {
        return false;
    }

    let mut used = vec![false; ys.len()];
    xs.iter().all(|x| {
        let found = ys.iter()
            .enumerate()
            .find(|(idx, y)| !used[*idx] && same(x, y));

        match found {
            Some((idx, _)) => {
                used[idx] = true;
                true
            },
            None => false,
        }
    })
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Value::Bool(x)
    }
}

impl From<i64> for Value {
    fn from(x: i64) -> Self {
        Value::Int(x)
    }
}

impl From<usize> for Value {
    fn from(x: usize) -> Self {
        Value::Int(x as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Value::Str(x.to_string())
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Value::Str(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self {
        Value::List(xs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(x) => write!(f, "{x}"),
            Value::Int(x) => write!(f, "{x}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(x) => write!(f, "{x:?}"),
            Value::List(xs) => {
                write!(f, "[")?;
                write_joined(f, xs.iter())?;
                write!(f, "]")
            },
            Value::Set(xs) => {
                write!(f, "{{")?;
                write_joined(f, xs.iter())?;
                write!(f, "}}")
            },
            Value::Map(m) => {
                write!(f, "{{")?;
                write_joined(f, m.iter().map(|(k, v)| format!("{k}: {v}")))?;
                write!(f, "}}")
            },
            Value::Call { function, args } if args.is_empty() => write!(f, "{function}"),
            Value::Call { function, args } => {
                write!(f, "{function}(")?;
                write_joined(f, args.iter().map(|(k, v)| format!("{k}={v}")))?;
                write!(f, ")")
            },
            Value::Object { class, attrs } => {
                write!(f, "{class}(")?;
                write_joined(f, attrs.iter().map(|(k, v)| format!("{k}={v}")))?;
                write!(f, ")")
            },
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}
