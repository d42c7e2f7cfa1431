//! String methods (spec §4.3).

use crate::error::RuntimeError;
use crate::value::Value;

pub fn call(s: &str, name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match name {
        "upper" => Ok(Value::String(s.to_uppercase())),
        "lower" => Ok(Value::String(s.to_lowercase())),
        "strip" => Ok(Value::String(s.trim().to_string())),
        "lstrip" => Ok(Value::String(s.trim_start().to_string())),
        "rstrip" => Ok(Value::String(s.trim_end().to_string())),
        "replace" => {
            let from = arg_str(args, 0, "replace", line)?;
            let to = arg_str(args, 1, "replace", line)?;
            match args.get(2) {
                Some(Value::Number(n)) => {
                    let count = n.to_f64() as usize;
                    Ok(Value::String(s.replacen(&from, &to, count)))
                }
                _ => Ok(Value::String(s.replace(&from, &to))),
            }
        }
        "split" => {
            let parts: Vec<Value> = match args.first() {
                Some(Value::String(sep)) if !sep.is_empty() => s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect(),
                _ => s.split_whitespace().map(|p| Value::String(p.to_string())).collect(),
            };
            Ok(Value::list(parts))
        }
        "splitlines" => Ok(Value::list(s.lines().map(|l| Value::String(l.to_string())).collect())),
        "startswith" => {
            let prefix = arg_str(args, 0, "startswith", line)?;
            let start = arg_index(args, 1, 0);
            Ok(Value::Bool(s.get(start..).unwrap_or("").starts_with(&prefix)))
        }
        "endswith" => {
            let suffix = arg_str(args, 0, "endswith", line)?;
            let start = arg_index(args, 1, 0);
            let end = arg_index(args, 2, s.len()).min(s.len());
            let slice = if start <= end { s.get(start..end).unwrap_or("") } else { "" };
            Ok(Value::Bool(slice.ends_with(&suffix)))
        }
        "find" => {
            let needle = arg_str(args, 0, "find", line)?;
            let start = arg_index(args, 1, 0);
            let haystack = s.get(start..).unwrap_or("");
            Ok(Value::int(haystack.find(&needle).map_or(-1, |i| (i + start) as i64)))
        }
        "rfind" => {
            let needle = arg_str(args, 0, "rfind", line)?;
            Ok(Value::int(s.rfind(&needle).map_or(-1, |i| i as i64)))
        }
        "index" => {
            let needle = arg_str(args, 0, "index", line)?;
            s.find(&needle).map(|i| Value::int(i as i64)).ok_or_else(|| {
                RuntimeError::new(format!("substring '{needle}' not found")).at_line(line)
            })
        }
        "capitalize" => {
            let mut chars = s.chars();
            Ok(Value::String(match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }))
        }
        "title" => Ok(Value::String(
            s.split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        )),
        "swapcase" => Ok(Value::String(
            s.chars()
                .map(|c| if c.is_uppercase() { c.to_lowercase().next().unwrap_or(c) } else { c.to_uppercase().next().unwrap_or(c) })
                .collect(),
        )),
        "islower" => Ok(Value::Bool(s.chars().any(char::is_alphabetic) && s.chars().all(|c| !c.is_uppercase()))),
        "isupper" => Ok(Value::Bool(s.chars().any(char::is_alphabetic) && s.chars().all(|c| !c.is_lowercase()))),
        "isnumeric" => Ok(Value::Bool(!s.is_empty() && s.chars().all(|c| c.is_numeric()))),
        "ljust" => justify(s, args, line, Justify::Left),
        "rjust" => justify(s, args, line, Justify::Right),
        "center" => justify(s, args, line, Justify::Center),
        "join" => {
            let Some(Value::List(list)) = args.first() else {
                return Err(RuntimeError::new("join() expects a list argument").at_line(line));
            };
            let parts: Result<Vec<String>, RuntimeError> = list
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(RuntimeError::new(format!("join() expects strings, got '{}'", other.type_name())).at_line(line)),
                })
                .collect();
            Ok(Value::String(parts?.join(s)))
        }
        "format" => Ok(Value::String(format_string(s, args))),
        other => Err(RuntimeError::new(format!("'string' has no method '{other}'")).at_line(line)),
    }
}

enum Justify {
    Left,
    Right,
    Center,
}

fn justify(s: &str, args: &[Value], line: u32, kind: Justify) -> Result<Value, RuntimeError> {
    let width = match args.first() {
        Some(Value::Number(n)) => n.to_f64() as usize,
        _ => return Err(RuntimeError::new("justification methods require a width argument").at_line(line)),
    };
    let fill = match args.get(1) {
        Some(Value::String(f)) => f.chars().next().unwrap_or(' '),
        _ => ' ',
    };
    let len = s.chars().count();
    if len >= width {
        return Ok(Value::String(s.to_string()));
    }
    let pad = width - len;
    Ok(Value::String(match kind {
        Justify::Left => format!("{s}{}", fill.to_string().repeat(pad)),
        Justify::Right => format!("{}{s}", fill.to_string().repeat(pad)),
        Justify::Center => {
            let left = pad / 2;
            let right = pad - left;
            format!("{}{s}{}", fill.to_string().repeat(left), fill.to_string().repeat(right))
        }
    }))
}

/// A minimal `str.format` supporting `{}` and `{0}`/`{1}` positional slots.
fn format_string(template: &str, args: &[Value]) -> String {
    let mut result = String::new();
    let mut auto_index = 0usize;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            let mut spec = String::new();
            for next in chars.by_ref() {
                if next == '}' {
                    break;
                }
                spec.push(next);
            }
            let index = if spec.is_empty() {
                let i = auto_index;
                auto_index += 1;
                i
            } else {
                spec.parse().unwrap_or(0)
            };
            if let Some(value) = args.get(index) {
                result.push_str(&value.py_str());
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn arg_str(args: &[Value], index: usize, method: &str, line: u32) -> Result<String, RuntimeError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(RuntimeError::new(format!("{method}() expects a string argument")).at_line(line)),
    }
}

fn arg_index(args: &[Value], index: usize, default: usize) -> usize {
    match args.get(index) {
        Some(Value::Number(n)) => n.to_f64() as usize,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_with_limit() {
        let v = call("aaaa", "replace", &[Value::String("a".into()), Value::String("b".into()), Value::int(2)], 1).unwrap();
        assert_eq!(v.py_str(), "bbaa");
    }

    #[test]
    fn title_case() {
        let v = call("hello world", "title", &[], 1).unwrap();
        assert_eq!(v.py_str(), "Hello World");
    }

    #[test]
    fn join_requires_strings() {
        let err = call(",", "join", &[Value::list(vec![Value::int(1)])], 1).unwrap_err();
        assert!(err.message.contains("join"));
    }

    #[test]
    fn endswith_honors_start_and_end() {
        let v = call("hello world", "endswith", &[Value::String("hello".into()), Value::int(0), Value::int(5)], 1).unwrap();
        assert!(v.is_truthy());
        let v = call("hello world", "endswith", &[Value::String("world".into()), Value::int(0), Value::int(5)], 1).unwrap();
        assert!(!v.is_truthy());
    }
}
