//! Binary and unary operator semantics (spec §4.3).

use crate::ast::BinaryOperator;
use crate::error::RuntimeError;
use crate::value::{Number, Value};

pub fn apply(op: BinaryOperator, left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match op {
        BinaryOperator::Add => add(left, right, line),
        BinaryOperator::Sub => numeric(left, right, line, "-", |a, b| a - b, i64::checked_sub),
        BinaryOperator::Mul => mul(left, right, line),
        BinaryOperator::Div => div(left, right, line),
        BinaryOperator::FloorDiv => floor_div(left, right, line),
        BinaryOperator::Mod => modulo(left, right, line),
        BinaryOperator::Pow => pow(left, right, line),
        BinaryOperator::Eq => Ok(Value::Bool(left.py_eq(&right))),
        BinaryOperator::NotEq => Ok(Value::Bool(!left.py_eq(&right))),
        BinaryOperator::Lt => compare(left, right, line, |o| o.is_lt()),
        BinaryOperator::Gt => compare(left, right, line, |o| o.is_gt()),
        BinaryOperator::LtEq => compare(left, right, line, |o| o.is_le()),
        BinaryOperator::GtEq => compare(left, right, line, |o| o.is_ge()),
        BinaryOperator::In => contains(left, right, line),
        BinaryOperator::NotIn => contains(left, right, line).map(|v| Value::Bool(!v.is_truthy())),
        BinaryOperator::And | BinaryOperator::Or => {
            unreachable!("short-circuit operators are handled by the interpreter before reaching here")
        }
    }
}

pub fn negate(value: Value, line: u32) -> Result<Value, RuntimeError> {
    match value {
        Value::Number(Number::Int(i)) => Ok(Value::int(-i)),
        Value::Number(Number::Float(f)) => Ok(Value::float(-f)),
        Value::Decimal(d) => Ok(Value::Decimal(d.neg())),
        other => Err(type_error("-", &other, None, line)),
    }
}

fn add(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (Value::String(_), other) => Err(RuntimeError::new(format!(
            "cannot concatenate 'string' and '{}' (did you mean str(...)?)",
            other.type_name()
        ))
        .at_line(line)),
        (other, Value::String(_)) => Err(RuntimeError::new(format!(
            "cannot concatenate '{}' and 'string' (did you mean str(...)?)",
            other.type_name()
        ))
        .at_line(line)),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(a.add(&b))),
        (Value::Number(a), Value::Number(b)) => Ok(numeric_result(a, b, |x, y| x + y, |x, y| x.checked_add(y))),
        (a, b) => Err(type_error("+", &a, Some(&b), line)),
    }
}

fn mul(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::List(list), Value::Number(Number::Int(n))) | (Value::Number(Number::Int(n)), Value::List(list)) => {
            let source = list.borrow();
            if n <= 0 {
                return Ok(Value::list(Vec::new()));
            }
            let mut items = Vec::with_capacity(source.len() * n as usize);
            for _ in 0..n {
                items.extend(source.iter().cloned());
            }
            Ok(Value::list(items))
        }
        (Value::Decimal(a), Value::Decimal(b)) => Ok(Value::Decimal(a.mul(&b))),
        (Value::Number(a), Value::Number(b)) => Ok(numeric_result(a, b, |x, y| x * y, |x, y| x.checked_mul(y))),
        (a, b) => Err(type_error("*", &a, Some(&b), line)),
    }
}

fn div(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                return Err(RuntimeError::new("division by zero").at_line(line));
            }
            Ok(Value::float(a.to_f64() / b.to_f64()))
        }
        (Value::Decimal(a), Value::Decimal(b)) => {
            a.div(&b, 10).map(Value::Decimal).ok_or_else(|| RuntimeError::new("division by zero").at_line(line))
        }
        (a, b) => Err(type_error("/", &a, Some(&b), line)),
    }
}

fn floor_div(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(Number::Int(a)), Value::Number(Number::Int(b))) => {
            if b == 0 {
                return Err(RuntimeError::new("division by zero").at_line(line));
            }
            let q = a / b;
            let r = a % b;
            let floored = if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q };
            Ok(Value::int(floored))
        }
        (Value::Number(a), Value::Number(b)) => {
            if b.to_f64() == 0.0 {
                return Err(RuntimeError::new("division by zero").at_line(line));
            }
            Ok(Value::float((a.to_f64() / b.to_f64()).floor()))
        }
        (Value::Decimal(a), Value::Decimal(b)) => {
            a.floor_div(&b).map(Value::Decimal).ok_or_else(|| RuntimeError::new("division by zero").at_line(line))
        }
        (a, b) => Err(type_error("//", &a, Some(&b), line)),
    }
}

/// `%` follows the sign of the divisor, matching the reference grammar
/// (spec §4.3), i.e. Python/Euclidean-floor modulo rather than truncating.
fn modulo(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(Number::Int(a)), Value::Number(Number::Int(b))) => {
            if b == 0 {
                return Err(RuntimeError::new("modulo by zero").at_line(line));
            }
            let r = a % b;
            let result = if r != 0 && (r < 0) != (b < 0) { r + b } else { r };
            Ok(Value::int(result))
        }
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.to_f64(), b.to_f64());
            if b == 0.0 {
                return Err(RuntimeError::new("modulo by zero").at_line(line));
            }
            let r = a % b;
            let result = if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r };
            Ok(Value::float(result))
        }
        (Value::Decimal(a), Value::Decimal(b)) => {
            a.rem(&b).map(Value::Decimal).ok_or_else(|| RuntimeError::new("modulo by zero").at_line(line))
        }
        (a, b) => Err(type_error("%", &a, Some(&b), line)),
    }
}

fn pow(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(Number::Int(a)), Value::Number(Number::Int(b))) if b >= 0 => {
            Ok(match a.checked_pow(b as u32) {
                Some(v) => Value::int(v),
                None => Value::float((a as f64).powf(b as f64)),
            })
        }
        (Value::Number(a), Value::Number(b)) => Ok(Value::float(a.to_f64().powf(b.to_f64()))),
        (Value::Decimal(a), Value::Number(Number::Int(b))) if b >= 0 => Ok(Value::Decimal(a.pow(b as u32))),
        (a, b) => Err(type_error("**", &a, Some(&b), line)),
    }
}

fn numeric(
    left: Value,
    right: Value,
    line: u32,
    symbol: &str,
    float_op: fn(f64, f64) -> f64,
    int_op: fn(i64, i64) -> Option<i64>,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Decimal(a), Value::Decimal(b)) if symbol == "-" => Ok(Value::Decimal(a.sub(&b))),
        (Value::Number(a), Value::Number(b)) => Ok(numeric_result(a, b, float_op, int_op)),
        (a, b) => Err(type_error(symbol, &a, Some(&b), line)),
    }
}

fn numeric_result(a: Number, b: Number, float_op: fn(f64, f64) -> f64, int_op: fn(i64, i64) -> Option<i64>) -> Value {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if let Some(v) = int_op(x, y) {
            return Value::int(v);
        }
    }
    Value::float(float_op(a.to_f64(), b.to_f64()))
}

fn compare(left: Value, right: Value, line: u32, accept: fn(std::cmp::Ordering) -> bool) -> Result<Value, RuntimeError> {
    match left.py_cmp(&right) {
        Some(ordering) => Ok(Value::Bool(accept(ordering))),
        None => Err(RuntimeError::new(format!(
            "'<'/'>' not supported between '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))
        .at_line(line)),
    }
}

fn contains(left: Value, right: Value, line: u32) -> Result<Value, RuntimeError> {
    match right {
        Value::String(haystack) => match left {
            Value::String(needle) => Ok(Value::Bool(haystack.contains(&needle))),
            other => Err(type_error("in", &other, Some(&Value::String(haystack)), line)),
        },
        Value::List(list) => Ok(Value::Bool(list.borrow().iter().any(|item| item.py_eq(&left)))),
        Value::Dict(dict) => {
            let key = match &left {
                Value::String(s) => s.clone(),
                other => other.py_str(),
            };
            Ok(Value::Bool(dict.borrow().contains_key(&key)))
        }
        other => Err(type_error("in", &left, Some(&other), line)),
    }
}

fn type_error(op: &str, left: &Value, right: Option<&Value>, line: u32) -> RuntimeError {
    let message = match right {
        Some(right) => format!("unsupported operand type(s) for {op}: '{}' and '{}'", left.type_name(), right.type_name()),
        None => format!("unsupported operand type for unary {op}: '{}'", left.type_name()),
    };
    RuntimeError::new(message).at_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_concat_rejects_numbers() {
        let err = add(Value::String("x".into()), Value::int(1), 1).unwrap_err();
        assert!(err.message.contains("str("));
    }

    #[test]
    fn list_times_int_repeats() {
        let v = mul(Value::list(vec![Value::int(1), Value::int(2)]), Value::int(2), 1).unwrap();
        let Value::List(list) = v else { panic!() };
        assert_eq!(list.borrow().len(), 4);
    }

    #[test]
    fn negative_repeat_count_yields_empty() {
        let v = mul(Value::list(vec![Value::int(1)]), Value::int(-3), 1).unwrap();
        let Value::List(list) = v else { panic!() };
        assert!(list.borrow().is_empty());
    }

    #[test]
    fn floor_div_floors_toward_negative_infinity() {
        let v = floor_div(Value::int(-7), Value::int(2), 1).unwrap();
        assert!(matches!(v, Value::Number(Number::Int(-4))));
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        let v = modulo(Value::int(-7), Value::int(3), 1).unwrap();
        assert!(matches!(v, Value::Number(Number::Int(2))));
    }

    #[test]
    fn division_always_produces_a_double() {
        let v = div(Value::int(4), Value::int(2), 1).unwrap();
        assert!(matches!(v, Value::Number(Number::Float(f)) if f == 2.0));
    }

    #[test]
    fn pow_is_right_associative_at_the_interpreter_level_but_here_just_numeric() {
        let v = pow(Value::int(2), Value::int(10), 1).unwrap();
        assert!(matches!(v, Value::Number(Number::Int(1024))));
    }
}
