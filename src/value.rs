//! The runtime value model (spec §3, §4.4).
//!
//! Lists and dicts use `Rc<RefCell<_>>` (spec §9, "Mutable shared
//! containers") — Grizzly has no closures, no custom allocator, and no need
//! to reclaim cycles (the language gives scripts no way to construct one),
//! so plain reference counting is simpler and sufficient. Cloning a `Value`
//! is always cheap: scalars copy, `List`/`Dict` only bump a refcount.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime as ChronoDateTime, FixedOffset};
use indexmap::IndexMap;

use crate::decimal::Decimal;

/// Recursion depth at which structural equality gives up comparing nested
/// contents and falls back to pointer identity, so a cyclic or pathologically
/// deep input cannot hang `==` (spec §3, "must not assume acyclicity").
const EQ_DEPTH_GUARD: u32 = 1000;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<IndexMap<String, Value>>>;

#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Int(i) => i == 0,
            Self::Float(f) => f == 0.0,
        }
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    List(ListRef),
    Dict(DictRef),
    Decimal(Decimal),
    DateTime(ChronoDateTime<FixedOffset>),
}

impl Value {
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn dict(entries: IndexMap<String, Value>) -> Self {
        Self::Dict(Rc::new(RefCell::new(entries)))
    }

    #[must_use]
    pub fn empty_dict() -> Self {
        Self::dict(IndexMap::new())
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Number(Number::Int(value))
    }

    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }

    /// Type name as returned by the `type()` builtin (spec §4.3).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Null => "null",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Decimal(_) => "decimal",
            Self::DateTime(_) => "datetime",
        }
    }

    /// Truthiness rules (spec §3): null is false; bool is itself; number is
    /// false iff zero; string/list/dict are false iff empty; datetime is
    /// always true; decimal is false iff zero.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => !n.is_zero(),
            Self::String(s) => !s.is_empty(),
            Self::List(list) => !list.borrow().is_empty(),
            Self::Dict(dict) => !dict.borrow().is_empty(),
            Self::Decimal(d) => !d.is_zero(),
            Self::DateTime(_) => true,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for the empty string, list, dict (used by `VALUE_EMPTY` access
    /// tracking, spec §3 "Access records").
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::List(list) => list.borrow().is_empty(),
            Self::Dict(dict) => dict.borrow().is_empty(),
            _ => false,
        }
    }

    /// The `str(...)` builtin's conversion (also used for `print`,
    /// string-key coercion of non-string dict keys, and diagnostics).
    #[must_use]
    pub fn py_str(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Self::Null => "None".to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::DateTime(dt) => dt.to_rfc3339(),
            Self::List(list) => {
                let items: Vec<String> = list.borrow().iter().map(Value::py_repr).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Dict(dict) => {
                let items: Vec<String> =
                    dict.borrow().iter().map(|(k, v)| format!("{k:?}: {}", v.py_repr())).collect();
                format!("{{{}}}", items.join(", "))
            }
        }
    }

    fn py_repr(&self) -> String {
        match self {
            Self::String(s) => format!("{s:?}"),
            other => other.py_str(),
        }
    }

    /// Structural equality under script `==` semantics (spec §4.3):
    /// numeric values compare across int/double tag, `"42" == 42` coerces by
    /// parsing the string (a parse failure means unequal, never a raise),
    /// and values of unrelated kinds are simply unequal rather than an
    /// error (raising is reserved for ordering comparisons).
    #[must_use]
    pub fn py_eq(&self, other: &Self) -> bool {
        self.py_eq_depth(other, 0)
    }

    fn py_eq_depth(&self, other: &Self, depth: u32) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(*a, *b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp_value(b) == Ordering::Equal,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::String(s), Self::Number(_)) | (Self::Number(_), Self::String(s)) => {
                let parsed = s.trim().parse::<f64>().ok();
                let number = if let Self::Number(n) = self { *n } else if let Self::Number(n) = other { *n } else { unreachable!() };
                parsed.is_some_and(|p| p == number.to_f64())
            }
            (Self::List(a), Self::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                if depth >= EQ_DEPTH_GUARD {
                    return Rc::ptr_eq(a, b);
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.py_eq_depth(y, depth + 1))
            }
            (Self::Dict(a), Self::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                if depth >= EQ_DEPTH_GUARD {
                    return Rc::ptr_eq(a, b);
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| v.py_eq_depth(bv, depth + 1)))
            }
            _ => false,
        }
    }

    /// Ordering comparison for `< > <= >=` (spec §4.3): numbers compare by
    /// value, strings by code point, bools false<true; mismatched kinds
    /// return `None`, which the caller turns into a runtime type error.
    #[must_use]
    pub fn py_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => numbers_cmp(*a, *b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp_value(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Sequence length for the `len()` builtin and `VALUE_EMPTY` tracking.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::List(list) => Some(list.borrow().len()),
            Self::Dict(dict) => Some(dict.borrow().len()),
            _ => None,
        }
    }
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x == y,
        _ => a.to_f64() == b.to_f64(),
    }
}

fn numbers_cmp(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
        _ => a.to_f64().partial_cmp(&b.to_f64()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.py_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::int(0).is_truthy());
        assert!(Value::int(-1).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::DateTime(ChronoDateTime::parse_from_rfc3339("2020-01-01T00:00:00Z").unwrap()).is_truthy());
    }

    #[test]
    fn numeric_cross_tag_equality() {
        assert!(Value::int(2).py_eq(&Value::float(2.0)));
    }

    #[test]
    fn string_number_coercion_equality() {
        assert!(Value::String("42".into()).py_eq(&Value::int(42)));
        assert!(!Value::String("nope".into()).py_eq(&Value::int(42)));
    }

    #[test]
    fn list_reference_sharing() {
        let list = Value::list(vec![Value::int(1)]);
        let Value::List(inner) = &list else { panic!() };
        let clone = list.clone();
        if let Value::List(other) = &clone {
            other.borrow_mut().push(Value::int(2));
        }
        assert_eq!(inner.borrow().len(), 2);
    }

    #[test]
    fn cyclic_list_equality_terminates() {
        let a = Value::list(vec![Value::int(1)]);
        if let Value::List(inner) = &a {
            inner.borrow_mut().push(a.clone());
        }
        assert!(a.py_eq(&a));
    }
}
