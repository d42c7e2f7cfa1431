//! `import re` makes `re.match`/`re.search`/`re.findall`/`re.sub`/`re.split`
//! available as module-namespace calls (spec §4.3, "Module namespace: re").

use grizzly::{compile, execute, ExecutionConfig, Value};

fn run(source: &str, input: Value) -> Value {
    let program = compile(source).unwrap();
    execute(&program, input, &ExecutionConfig::default()).unwrap()
}

#[test]
fn extracts_digits_from_a_phone_number() {
    let source = "\
import re
def transform(INPUT):
    OUTPUT = {}
    digits = re.findall(r'\\d+', INPUT[\"raw\"])
    OUTPUT[\"areaCode\"] = digits[0]
    return OUTPUT
";
    let mut input = indexmap::IndexMap::new();
    input.insert("raw".to_string(), Value::String("(415) 555-0100".to_string()));
    let output = run(source, Value::dict(input));
    let Value::Dict(output) = output else { panic!() };
    assert_eq!(output.borrow().get("areaCode").unwrap().py_str(), "415");
}

#[test]
fn search_reports_a_match_dict_with_groups() {
    let source = "\
import re
def transform(INPUT):
    m = re.search(r'(\\w+)@(\\w+)', INPUT[\"email\"])
    OUTPUT = {}
    OUTPUT[\"user\"] = m[\"groups\"][1]
    OUTPUT[\"host\"] = m[\"groups\"][2]
    return OUTPUT
";
    let mut input = indexmap::IndexMap::new();
    input.insert("email".to_string(), Value::String("jane@example".to_string()));
    let output = run(source, Value::dict(input));
    let Value::Dict(output) = output else { panic!() };
    assert_eq!(output.borrow().get("user").unwrap().py_str(), "jane");
    assert_eq!(output.borrow().get("host").unwrap().py_str(), "example");
}

#[test]
fn sub_rewrites_every_occurrence() {
    let source = "\
def transform(INPUT):
    import re
    return re.sub(r'[aeiou]', '_', INPUT)
";
    let output = run(source, Value::String("banana".to_string()));
    assert_eq!(output.py_str(), "b_n_n_");
}
