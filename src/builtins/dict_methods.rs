//! Dict methods (spec §4.3).

use crate::error::RuntimeError;
use crate::value::{DictRef, Value};

fn key_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.py_str(),
    }
}

pub fn call(dict: &DictRef, name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match name {
        "get" => {
            let Some(key_value) = args.first() else {
                return Err(RuntimeError::new("get() requires a key argument").at_line(line));
            };
            let key = key_of(key_value);
            Ok(dict.borrow().get(&key).cloned().unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::Null)))
        }
        "keys" => Ok(Value::list(dict.borrow().keys().cloned().map(Value::String).collect())),
        "values" => Ok(Value::list(dict.borrow().values().cloned().collect())),
        "items" => Ok(Value::list(
            dict.borrow().iter().map(|(k, v)| Value::list(vec![Value::String(k.clone()), v.clone()])).collect(),
        )),
        "pop" => {
            let Some(key_value) = args.first() else {
                return Err(RuntimeError::new("pop() requires a key argument").at_line(line));
            };
            let key = key_of(key_value);
            match dict.borrow_mut().shift_remove(&key) {
                Some(value) => Ok(value),
                None => match args.get(1) {
                    Some(default) => Ok(default.clone()),
                    None => Err(RuntimeError::new(format!("key '{key}' not found")).at_line(line)),
                },
            }
        }
        "update" => {
            let Some(Value::Dict(other)) = args.first() else {
                return Err(RuntimeError::new("update() expects a dict argument").at_line(line));
            };
            let entries: Vec<(String, Value)> = other.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let mut dict = dict.borrow_mut();
            for (k, v) in entries {
                dict.insert(k, v);
            }
            Ok(Value::Null)
        }
        "clear" => {
            dict.borrow_mut().clear();
            Ok(Value::Null)
        }
        "copy" => Ok(Value::dict(dict.borrow().clone())),
        "setdefault" => {
            let Some(key_value) = args.first() else {
                return Err(RuntimeError::new("setdefault() requires a key argument").at_line(line));
            };
            let key = key_of(key_value);
            let mut dict = dict.borrow_mut();
            if let Some(existing) = dict.get(&key) {
                return Ok(existing.clone());
            }
            let default = args.get(1).cloned().unwrap_or(Value::Null);
            dict.insert(key, default.clone());
            Ok(default)
        }
        other => Err(RuntimeError::new(format!("'dict' has no method '{other}'")).at_line(line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn dict_with(entries: Vec<(&str, Value)>) -> DictRef {
        let mut map = IndexMap::new();
        for (k, v) in entries {
            map.insert(k.to_string(), v);
        }
        match Value::dict(map) {
            Value::Dict(d) => d,
            _ => unreachable!(),
        }
    }

    #[test]
    fn get_with_default() {
        let dict = dict_with(vec![("a", Value::int(1))]);
        let v = call(&dict, "get", &[Value::String("missing".into()), Value::int(99)], 1).unwrap();
        assert!(matches!(v, Value::Number(crate::value::Number::Int(99))));
    }

    #[test]
    fn pop_without_default_errors_when_missing() {
        let dict = dict_with(vec![]);
        let err = call(&dict, "pop", &[Value::String("x".into())], 1).unwrap_err();
        assert!(err.message.contains("not found"));
    }

    #[test]
    fn items_round_trips_as_pairs() {
        let dict = dict_with(vec![("a", Value::int(1))]);
        let v = call(&dict, "items", &[], 1).unwrap();
        let Value::List(list) = v else { panic!() };
        assert_eq!(list.borrow().len(), 1);
    }
}
