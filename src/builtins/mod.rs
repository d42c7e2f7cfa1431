//! Built-in free functions and method dispatch (spec §4.3).

mod dict_methods;
mod list_methods;
mod string_methods;

use std::cmp::Ordering;

use crate::decimal::Decimal;
use crate::error::RuntimeError;
use crate::value::{Number, Value};

pub fn call_method(receiver: &Value, name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match receiver {
        Value::String(s) => string_methods::call(s, name, args, line),
        Value::List(list) => list_methods::call(list, name, args, line),
        Value::Dict(dict) => dict_methods::call(dict, name, args, line),
        other => Err(RuntimeError::new(format!("'{}' has no methods", other.type_name())).at_line(line)),
    }
}

pub fn call_builtin(name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match name {
        "len" => {
            let value = arg(args, 0, "len", line)?;
            value.length().map(|n| Value::int(n as i64)).ok_or_else(|| {
                RuntimeError::new(format!("object of type '{}' has no len()", value.type_name())).at_line(line)
            })
        }
        "str" => Ok(Value::String(arg(args, 0, "str", line)?.py_str())),
        "int" => to_int(arg(args, 0, "int", line)?, line),
        "float" => to_float(arg(args, 0, "float", line)?, line),
        "bool" => Ok(Value::Bool(arg(args, 0, "bool", line)?.is_truthy())),
        "range" => range(args, line),
        "enumerate" => enumerate(args, line),
        "zip" => zip(args),
        "sorted" => sorted(args, line),
        "reversed" => reversed(args, line),
        "any" => Ok(Value::Bool(iterable_items(arg(args, 0, "any", line)?, line)?.iter().any(Value::is_truthy))),
        "all" => Ok(Value::Bool(iterable_items(arg(args, 0, "all", line)?, line)?.iter().all(Value::is_truthy))),
        "list" => Ok(Value::list(match args.first() {
            Some(v) => iterable_items(v.clone(), line)?,
            None => Vec::new(),
        })),
        "dict" => Ok(match args.first() {
            Some(Value::Dict(d)) => Value::dict(d.borrow().clone()),
            None => Value::empty_dict(),
            Some(other) => return Err(RuntimeError::new(format!("dict() cannot build from '{}'", other.type_name())).at_line(line)),
        }),
        "type" => Ok(Value::String(arg(args, 0, "type", line)?.type_name().to_string())),
        "isinstance" => isinstance(args, line),
        "hasattr" => Ok(Value::Bool(hasattr(args, line)?)),
        "getattr" => getattr(args, line),
        "print" => Ok(Value::Null),
        "min" => minmax(args, line, Ordering::Less),
        "max" => minmax(args, line, Ordering::Greater),
        "sum" => sum(args, line),
        "abs" => abs(arg(args, 0, "abs", line)?, line),
        "round" => round(args, line),
        other => Err(RuntimeError::new(format!("name '{other}' is not defined")).at_line(line)),
    }
}

fn arg(args: &[Value], index: usize, name: &str, line: u32) -> Result<Value, RuntimeError> {
    args.get(index).cloned().ok_or_else(|| RuntimeError::new(format!("{name}() missing required argument")).at_line(line))
}

fn to_int(value: Value, line: u32) -> Result<Value, RuntimeError> {
    match value {
        Value::Number(Number::Int(i)) => Ok(Value::int(i)),
        Value::Number(Number::Float(f)) => Ok(Value::int(f as i64)),
        Value::Bool(b) => Ok(Value::int(i64::from(b))),
        Value::String(s) => s.trim().parse::<i64>().map(Value::int).map_err(|_| {
            RuntimeError::new(format!("invalid literal for int(): '{s}'")).at_line(line)
        }),
        other => Err(RuntimeError::new(format!("int() argument must be a string or a number, not '{}'", other.type_name())).at_line(line)),
    }
}

fn to_float(value: Value, line: u32) -> Result<Value, RuntimeError> {
    match value {
        Value::Number(n) => Ok(Value::float(n.to_f64())),
        Value::Bool(b) => Ok(Value::float(if b { 1.0 } else { 0.0 })),
        Value::String(s) => s.trim().parse::<f64>().map(Value::float).map_err(|_| {
            RuntimeError::new(format!("invalid literal for float(): '{s}'")).at_line(line)
        }),
        other => Err(RuntimeError::new(format!("float() argument must be a string or a number, not '{}'", other.type_name())).at_line(line)),
    }
}

fn as_int(value: &Value, what: &str, line: u32) -> Result<i64, RuntimeError> {
    match value {
        Value::Number(Number::Int(i)) => Ok(*i),
        Value::Number(Number::Float(f)) => Ok(*f as i64),
        other => Err(RuntimeError::new(format!("{what}() requires an integer argument, got '{}'", other.type_name())).at_line(line)),
    }
}

fn range(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let (start, stop, step) = match args.len() {
        1 => (0, as_int(&args[0], "range", line)?, 1),
        2 => (as_int(&args[0], "range", line)?, as_int(&args[1], "range", line)?, 1),
        3 => (as_int(&args[0], "range", line)?, as_int(&args[1], "range", line)?, as_int(&args[2], "range", line)?),
        _ => return Err(RuntimeError::new("range() takes 1 to 3 arguments").at_line(line)),
    };
    if step == 0 {
        return Err(RuntimeError::new("range() step must not be zero").at_line(line));
    }
    let mut items = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            items.push(Value::int(i));
            i += step;
        }
    } else {
        while i > stop {
            items.push(Value::int(i));
            i += step;
        }
    }
    Ok(Value::list(items))
}

fn enumerate(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let items = iterable_items(arg(args, 0, "enumerate", line)?, line)?;
    let start = match args.get(1) {
        Some(v) => as_int(v, "enumerate", line)?,
        None => 0,
    };
    Ok(Value::list(
        items.into_iter().enumerate().map(|(i, v)| Value::list(vec![Value::int(start + i as i64), v])).collect(),
    ))
}

fn zip(args: &[Value]) -> Result<Value, RuntimeError> {
    let mut iterators = Vec::new();
    for v in args {
        iterators.push(iterable_items(v.clone(), 0)?);
    }
    let min_len = iterators.iter().map(Vec::len).min().unwrap_or(0);
    let mut result = Vec::with_capacity(min_len);
    for i in 0..min_len {
        result.push(Value::list(iterators.iter().map(|it| it[i].clone()).collect()));
    }
    Ok(Value::list(result))
}

fn sorted(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let mut items = iterable_items(arg(args, 0, "sorted", line)?, line)?;
    let reverse = matches!(args.get(1), Some(v) if v.is_truthy());
    let mut err = None;
    items.sort_by(|a, b| match a.py_cmp(b) {
        Some(ordering) => ordering,
        None => {
            err = Some(RuntimeError::new(format!("'<' not supported between '{}' and '{}'", a.type_name(), b.type_name())).at_line(line));
            Ordering::Equal
        }
    });
    if reverse {
        items.reverse();
    }
    match err {
        Some(e) => Err(e),
        None => Ok(Value::list(items)),
    }
}

fn reversed(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let mut items = iterable_items(arg(args, 0, "reversed", line)?, line)?;
    items.reverse();
    Ok(Value::list(items))
}

/// Converts a list, dict (iterated over its keys, like a `for` loop), or
/// string (iterated character by character) into a plain `Vec<Value>`.
fn iterable_items(value: Value, line: u32) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::List(list) => Ok(list.borrow().clone()),
        Value::Dict(dict) => Ok(dict.borrow().keys().cloned().map(Value::String).collect()),
        Value::String(s) => Ok(s.chars().map(|c| Value::String(c.to_string())).collect()),
        other => Err(RuntimeError::new(format!("'{}' is not iterable", other.type_name())).at_line(line)),
    }
}

fn isinstance(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let value = arg(args, 0, "isinstance", line)?;
    let Some(Value::String(type_name)) = args.get(1) else {
        return Err(RuntimeError::new("isinstance() requires a type-name string").at_line(line));
    };
    let matches = match type_name.as_str() {
        "int" => matches!(value, Value::Number(Number::Int(_))),
        "float" => matches!(value, Value::Number(Number::Float(_))),
        other => value.type_name() == other,
    };
    Ok(Value::Bool(matches))
}

fn hasattr(args: &[Value], line: u32) -> Result<bool, RuntimeError> {
    let value = arg(args, 0, "hasattr", line)?;
    let Some(Value::String(name)) = args.get(1) else {
        return Err(RuntimeError::new("hasattr() requires an attribute-name string").at_line(line));
    };
    Ok(match value {
        Value::Dict(dict) => dict.borrow().contains_key(name),
        _ => false,
    })
}

fn getattr(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let value = arg(args, 0, "getattr", line)?;
    let Some(Value::String(name)) = args.get(1) else {
        return Err(RuntimeError::new("getattr() requires an attribute-name string").at_line(line));
    };
    match &value {
        Value::Dict(dict) => Ok(dict.borrow().get(name).cloned().unwrap_or_else(|| args.get(2).cloned().unwrap_or(Value::Null))),
        _ => match args.get(2) {
            Some(default) => Ok(default.clone()),
            None => Err(RuntimeError::new(format!("'{}' object has no attribute '{name}'", value.type_name())).at_line(line)),
        },
    }
}

fn minmax(args: &[Value], line: u32, want: Ordering) -> Result<Value, RuntimeError> {
    let items = if args.len() == 1 {
        iterable_items(args[0].clone(), line)?
    } else {
        args.to_vec()
    };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(RuntimeError::new("min()/max() arg is an empty sequence").at_line(line));
    };
    for item in iter {
        if let Some(ordering) = item.py_cmp(&best) {
            if ordering == want {
                best = item;
            }
        } else {
            return Err(RuntimeError::new(format!(
                "'<'/'>' not supported between '{}' and '{}'",
                item.type_name(),
                best.type_name()
            ))
            .at_line(line));
        }
    }
    Ok(best)
}

fn sum(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let items = iterable_items(arg(args, 0, "sum", line)?, line)?;
    let mut total = match args.get(1) {
        Some(v) => v.clone(),
        None => Value::int(0),
    };
    for item in items {
        total = crate::operators::apply(crate::ast::BinaryOperator::Add, total, item, line)?;
    }
    Ok(total)
}

fn abs(value: Value, line: u32) -> Result<Value, RuntimeError> {
    match value {
        Value::Number(Number::Int(i)) => Ok(Value::int(i.abs())),
        Value::Number(Number::Float(f)) => Ok(Value::float(f.abs())),
        Value::Decimal(d) => Ok(Value::Decimal(if d.is_negative() { d.neg() } else { d })),
        other => Err(RuntimeError::new(format!("abs() requires a number, got '{}'", other.type_name())).at_line(line)),
    }
}

fn round(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let value = arg(args, 0, "round", line)?;
    let ndigits = match args.get(1) {
        Some(v) => Some(as_int(v, "round", line)?),
        None => None,
    };
    match value {
        Value::Number(n) => {
            let factor = 10f64.powi(ndigits.unwrap_or(0) as i32);
            let rounded = (n.to_f64() * factor).round() / factor;
            if ndigits.is_none() {
                Ok(Value::int(rounded as i64))
            } else {
                Ok(Value::float(rounded))
            }
        }
        Value::Decimal(d) => {
            let scale = ndigits.unwrap_or(0) as i32;
            Ok(Value::Decimal(d.div(&Decimal::from_i64(1), scale).unwrap_or(d)))
        }
        other => Err(RuntimeError::new(format!("round() requires a number, got '{}'", other.type_name())).at_line(line)),
    }
}
