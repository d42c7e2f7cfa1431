//! End-to-end scenario 2 from the spec: a MISMO-shaped mortgage loan input
//! flows through a hand-written transform that splits borrowers into a
//! primary borrower and a list of co-borrowers.

use grizzly::{compile, execute_with_validation, ExecutionConfig, Value};
use indexmap::IndexMap;

const TEMPLATE: &str = "\
def transform(INPUT):
    OUTPUT = {}
    borrowers = INPUT.deal.loan.borrowers
    primary = None
    coBorrowers = []
    for b in borrowers:
        if b[\"role\"] == \"Primary\":
            primary = b
        elif b[\"role\"] == \"CoBorrower\":
            co = {}
            co[\"fullName\"] = b[\"firstName\"] + \" \" + b[\"lastName\"]
            co[\"income\"] = b[\"income\"]
            coBorrowers.append(co)
    if primary:
        p = {}
        p[\"fullName\"] = primary[\"firstName\"] + \" \" + primary[\"lastName\"]
        OUTPUT[\"primaryBorrower\"] = p
    OUTPUT[\"coBorrowers\"] = coBorrowers
    OUTPUT[\"totalAssetValue\"] = 0
    OUTPUT[\"creditScore\"] = INPUT?.deal?.loan?.creditScore
    return OUTPUT
";

fn borrower(first: &str, last: &str, income: i64, role: &str) -> Value {
    let mut fields = IndexMap::new();
    fields.insert("firstName".to_string(), Value::String(first.to_string()));
    fields.insert("lastName".to_string(), Value::String(last.to_string()));
    fields.insert("income".to_string(), Value::int(income));
    fields.insert("role".to_string(), Value::String(role.to_string()));
    Value::dict(fields)
}

fn input_value() -> Value {
    let borrowers = Value::list(vec![
        borrower("Jane", "Doe", 85_000, "Primary"),
        borrower("John", "Doe", 72_000, "CoBorrower"),
    ]);
    let mut loan = IndexMap::new();
    loan.insert("borrowers".to_string(), borrowers);
    let mut deal = IndexMap::new();
    deal.insert("loan".to_string(), Value::dict(loan));
    let mut input = IndexMap::new();
    input.insert("deal".to_string(), Value::dict(deal));
    Value::dict(input)
}

#[test]
fn borrowers_split_into_primary_and_co_borrowers() {
    let program = compile(TEMPLATE).unwrap();
    let outcome = execute_with_validation(&program, input_value(), &ExecutionConfig::default()).unwrap();
    let Value::Dict(output) = outcome.output else { panic!("expected a dict output") };
    let output = output.borrow();

    let Some(Value::Dict(primary)) = output.get("primaryBorrower") else { panic!("missing primaryBorrower") };
    assert_eq!(primary.borrow().get("fullName").unwrap().py_str(), "Jane Doe");

    let Some(Value::List(co_borrowers)) = output.get("coBorrowers") else { panic!("missing coBorrowers") };
    let co_borrowers = co_borrowers.borrow();
    assert_eq!(co_borrowers.len(), 1);
    let Value::Dict(co) = &co_borrowers[0] else { panic!("expected a dict") };
    assert_eq!(co.borrow().get("fullName").unwrap().py_str(), "John Doe");
    assert!(co.borrow().get("income").unwrap().py_eq(&Value::int(72_000)));

    assert!(output.get("totalAssetValue").unwrap().py_eq(&Value::int(0)));
    assert!(output.get("creditScore").unwrap().is_null());

    // creditScore was reached through `?.` on a present (non-null) chain down
    // to the final missing key, so it tracks as a key-not-found access, not
    // an expected-null short-circuit — only a null left-hand side triggers
    // EXPECTED_NULL.
    assert!(!outcome.report.is_clean());
}
