//! The `re` module namespace, available after `import re` (spec §4.3).
//!
//! Uses `fancy_regex` rather than the plain `regex` crate: PCRE-style
//! lookaround and backreferences are worth giving up linear-time guarantees
//! for a template language that isn't handling adversarial input.

use fancy_regex::Regex;
use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::value::Value;

pub fn call(name: &str, args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    match name {
        "match" => match_fn(args, line, true),
        "search" => match_fn(args, line, false),
        "findall" => findall(args, line),
        "sub" => sub(args, line),
        "split" => split(args, line),
        other => Err(RuntimeError::new(format!("module 're' has no function '{other}'")).at_line(line)),
    }
}

fn compile(pattern: &str, line: u32) -> Result<Regex, RuntimeError> {
    Regex::new(pattern).map_err(|e| RuntimeError::new(format!("invalid regex pattern '{pattern}': {e}")).at_line(line))
}

fn pattern_and_text(args: &[Value], line: u32) -> Result<(String, String), RuntimeError> {
    let pattern = match args.first() {
        Some(Value::String(p)) => p.clone(),
        _ => return Err(RuntimeError::new("re functions require a string pattern").at_line(line)),
    };
    let text = match args.get(1) {
        Some(Value::String(t)) => t.clone(),
        _ => return Err(RuntimeError::new("re functions require a string argument to match against").at_line(line)),
    };
    Ok((pattern, text))
}

/// Builds the result dict shared by `match`/`search`: `matched`, `value`,
/// `start`, `end`, `groups` (including group 0), per spec §4.3.
fn match_result(caps: &fancy_regex::Captures<'_>) -> Value {
    let whole = caps.get(0).expect("capture group 0 always matches");
    let groups: Vec<Value> = caps
        .iter()
        .map(|g| match g {
            Some(m) => Value::String(m.as_str().to_string()),
            None => Value::Null,
        })
        .collect();
    let mut map = IndexMap::new();
    map.insert("matched".to_string(), Value::Bool(true));
    map.insert("value".to_string(), Value::String(whole.as_str().to_string()));
    map.insert("start".to_string(), Value::int(whole.start() as i64));
    map.insert("end".to_string(), Value::int(whole.end() as i64));
    map.insert("groups".to_string(), Value::list(groups));
    Value::dict(map)
}

fn no_match() -> Value {
    let mut map = IndexMap::new();
    map.insert("matched".to_string(), Value::Bool(false));
    map.insert("value".to_string(), Value::Null);
    map.insert("start".to_string(), Value::int(-1));
    map.insert("end".to_string(), Value::int(-1));
    map.insert("groups".to_string(), Value::list(Vec::new()));
    Value::dict(map)
}

fn match_fn(args: &[Value], line: u32, anchored: bool) -> Result<Value, RuntimeError> {
    let (pattern, text) = pattern_and_text(args, line)?;
    let regex = compile(&pattern, line)?;
    let found = regex.captures(&text).map_err(|e| RuntimeError::new(format!("regex match failed: {e}")).at_line(line))?;
    match found {
        Some(caps) if !anchored || caps.get(0).is_some_and(|m| m.start() == 0) => Ok(match_result(&caps)),
        _ => Ok(no_match()),
    }
}

fn findall(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let (pattern, text) = pattern_and_text(args, line)?;
    let regex = compile(&pattern, line)?;
    let mut results = Vec::new();
    for found in regex.find_iter(&text) {
        let m = found.map_err(|e| RuntimeError::new(format!("regex match failed: {e}")).at_line(line))?;
        results.push(Value::String(m.as_str().to_string()));
    }
    Ok(Value::list(results))
}

fn sub(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let pattern = match args.first() {
        Some(Value::String(p)) => p.clone(),
        _ => return Err(RuntimeError::new("re.sub() requires a string pattern").at_line(line)),
    };
    let replacement = match args.get(1) {
        Some(Value::String(r)) => r.clone(),
        _ => return Err(RuntimeError::new("re.sub() requires a string replacement").at_line(line)),
    };
    let text = match args.get(2) {
        Some(Value::String(t)) => t.clone(),
        _ => return Err(RuntimeError::new("re.sub() requires a string argument to operate on").at_line(line)),
    };
    let regex = compile(&pattern, line)?;
    Ok(Value::String(regex.replace_all(&text, replacement.as_str()).to_string()))
}

fn split(args: &[Value], line: u32) -> Result<Value, RuntimeError> {
    let (pattern, text) = pattern_and_text(args, line)?;
    let regex = compile(&pattern, line)?;
    let parts: Vec<Value> = regex.split(&text).map(|p| Value::String(p.unwrap_or_default().to_string())).collect();
    Ok(Value::list(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_finds_a_substring_match() {
        let result = call("search", &[Value::String(r"\d+".into()), Value::String("abc123".into())], 1).unwrap();
        let Value::Dict(dict) = result else { panic!() };
        assert_eq!(dict.borrow().get("value").unwrap().py_str(), "123");
    }

    #[test]
    fn match_requires_anchor_at_start() {
        let result = call("match", &[Value::String(r"\d+".into()), Value::String("abc123".into())], 1).unwrap();
        let Value::Dict(dict) = result else { panic!() };
        assert_eq!(dict.borrow().get("matched").unwrap().is_truthy(), false);
    }

    #[test]
    fn sub_replaces_all_occurrences() {
        let result =
            call("sub", &[Value::String(r"a".into()), Value::String("b".into()), Value::String("banana".into())], 1).unwrap();
        assert_eq!(result.py_str(), "bbnbnb");
    }

    #[test]
    fn invalid_pattern_is_a_runtime_error() {
        let err = call("search", &[Value::String("(".into()), Value::String("x".into())], 1).unwrap_err();
        assert!(err.message.contains("invalid regex pattern"));
    }
}
