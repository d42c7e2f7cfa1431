//! List methods (spec §4.3).

use crate::error::RuntimeError;
use crate::value::{ListRef, Value};

pub fn call(list: &ListRef, name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match name {
        "append" => {
            let value = args.first().cloned().unwrap_or(Value::Null);
            list.borrow_mut().push(value);
            Ok(Value::Null)
        }
        "extend" => {
            let Some(Value::List(other)) = args.first() else {
                return Err(RuntimeError::new("extend() expects a list argument").at_line(line));
            };
            let items = other.borrow().clone();
            list.borrow_mut().extend(items);
            Ok(Value::Null)
        }
        "insert" => {
            let index = index_arg(args, 0, line)?;
            let value = args.get(1).cloned().unwrap_or(Value::Null);
            let mut list = list.borrow_mut();
            let index = index.clamp(0, list.len() as i64) as usize;
            list.insert(index, value);
            Ok(Value::Null)
        }
        "remove" => {
            let target = args.first().cloned().unwrap_or(Value::Null);
            let mut list = list.borrow_mut();
            let position = list.iter().position(|item| item.py_eq(&target));
            match position {
                Some(i) => {
                    list.remove(i);
                    Ok(Value::Null)
                }
                None => Err(RuntimeError::new("value not found in list").at_line(line)),
            }
        }
        "pop" => {
            let mut list = list.borrow_mut();
            if list.is_empty() {
                return Err(RuntimeError::new("pop from empty list").at_line(line));
            }
            let index = match args.first() {
                Some(Value::Number(n)) => {
                    let raw = n.to_f64() as i64;
                    if raw < 0 { raw + list.len() as i64 } else { raw }
                }
                _ => list.len() as i64 - 1,
            };
            if index < 0 || index as usize >= list.len() {
                return Err(RuntimeError::new("pop index out of range").at_line(line));
            }
            Ok(list.remove(index as usize))
        }
        "clear" => {
            list.borrow_mut().clear();
            Ok(Value::Null)
        }
        "copy" => Ok(Value::list(list.borrow().clone())),
        "sort" => {
            let reverse = matches!(args.first(), Some(v) if v.is_truthy());
            let mut items = list.borrow_mut();
            let mut err = None;
            items.sort_by(|a, b| match a.py_cmp(b) {
                Some(ordering) => ordering,
                None => {
                    err = Some(RuntimeError::new(format!(
                        "'<' not supported between '{}' and '{}'",
                        a.type_name(),
                        b.type_name()
                    ))
                    .at_line(line));
                    std::cmp::Ordering::Equal
                }
            });
            if reverse {
                items.reverse();
            }
            match err {
                Some(e) => Err(e),
                None => Ok(Value::Null),
            }
        }
        "reverse" => {
            list.borrow_mut().reverse();
            Ok(Value::Null)
        }
        "index" => {
            let target = args.first().cloned().unwrap_or(Value::Null);
            let list = list.borrow();
            let start = args.get(1).map_or(0, |v| value_to_index(v));
            let end = args.get(2).map_or(list.len(), |v| value_to_index(v)).min(list.len());
            if start >= end {
                return Err(RuntimeError::new("value not found in list").at_line(line));
            }
            list[start..end]
                .iter()
                .position(|item| item.py_eq(&target))
                .map(|i| Value::int((i + start) as i64))
                .ok_or_else(|| RuntimeError::new("value not found in list").at_line(line))
        }
        "count" => {
            let target = args.first().cloned().unwrap_or(Value::Null);
            Ok(Value::int(list.borrow().iter().filter(|item| item.py_eq(&target)).count() as i64))
        }
        other => Err(RuntimeError::new(format!("'list' has no method '{other}'")).at_line(line)),
    }
}

fn index_arg(args: &[Value], position: usize, line: u32) -> Result<i64, RuntimeError> {
    match args.get(position) {
        Some(Value::Number(n)) => Ok(n.to_f64() as i64),
        _ => Err(RuntimeError::new("expected an integer index argument").at_line(line)),
    }
}

fn value_to_index(value: &Value) -> usize {
    match value {
        Value::Number(n) => n.to_f64() as usize,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_pop() {
        let list: ListRef = match Value::list(vec![]) {
            Value::List(l) => l,
            _ => unreachable!(),
        };
        call(&list, "append", &[Value::int(1)], 1).unwrap();
        call(&list, "append", &[Value::int(2)], 1).unwrap();
        let popped = call(&list, "pop", &[], 1).unwrap();
        assert!(matches!(popped, Value::Number(_)));
        assert_eq!(list.borrow().len(), 1);
    }

    #[test]
    fn sort_with_reverse() {
        let list: ListRef = match Value::list(vec![Value::int(3), Value::int(1), Value::int(2)]) {
            Value::List(l) => l,
            _ => unreachable!(),
        };
        call(&list, "sort", &[Value::Bool(true)], 1).unwrap();
        let items: Vec<i64> = list
            .borrow()
            .iter()
            .map(|v| if let Value::Number(crate::value::Number::Int(i)) = v { *i } else { 0 })
            .collect();
        assert_eq!(items, vec![3, 2, 1]);
    }

    #[test]
    fn index_honors_end_bound() {
        let list: ListRef = match Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]) {
            Value::List(l) => l,
            _ => unreachable!(),
        };
        let err = call(&list, "index", &[Value::int(2), Value::int(0), Value::int(1)], 1).unwrap_err();
        assert!(err.message.contains("not found"));
        let found = call(&list, "index", &[Value::int(2), Value::int(0), Value::int(2)], 1).unwrap();
        assert!(matches!(found, Value::Number(crate::value::Number::Int(1))));
    }
}
