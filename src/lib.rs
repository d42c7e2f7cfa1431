//! Grizzly: an embeddable data-transformation template engine.
//!
//! A template author writes a Python-like script whose entry point is a
//! function `transform(INPUT)` returning `OUTPUT`. [`compile`] turns the
//! source into a reusable [`Program`]; [`execute`]/[`execute_with_validation`]
//! run it against a structured [`Value`] input.
//!
//! ```
//! use grizzly::{compile, execute, ExecutionConfig};
//! use grizzly::Value;
//!
//! let program = compile("def transform(INPUT):\n    return INPUT\n").unwrap();
//! let output = execute(&program, Value::int(1), &ExecutionConfig::default()).unwrap();
//! assert!(matches!(output, Value::Number(_)));
//! ```

mod ast;
mod builtins;
mod config;
mod decimal;
mod error;
mod interp;
mod lexer;
mod modules;
mod operators;
mod parser;
mod run;
mod token;
mod tracker;
mod value;

pub use config::{ConfigError, ExecutionConfig, NullHandling, DEFAULT_RECURSION_LIMIT, DEFAULT_STATEMENT_LIMIT};
pub use decimal::Decimal;
pub use error::{CompileError, GrizzlyError, LexError, LexErrorKind, ParseError, ResourceError, RuntimeError};
pub use run::{compile, execute, execute_with_validation, ExecutionOutcome, Program};
pub use token::{NumberKind, Token, TokenKind};
pub use tracker::{AccessRecord, AccessStatus, ReportSummary, ValidationReport};
pub use value::{Number, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, input: Value, config: &ExecutionConfig) -> Value {
        let program = compile(source).unwrap();
        execute(&program, input, config).unwrap()
    }

    #[test]
    fn empty_body_transform() {
        let output = run(
            "def transform(INPUT):\n    OUTPUT = {}\n    return OUTPUT\n",
            Value::empty_dict(),
            &ExecutionConfig::default(),
        );
        assert!(matches!(output, Value::Dict(d) if d.borrow().is_empty()));
    }

    #[test]
    fn safe_navigation_short_circuits() {
        let source = "def transform(INPUT):\n    OUTPUT = {}\n    OUTPUT[\"city\"] = INPUT?.deal?.loan?.city\n    return OUTPUT\n";
        let mut deal = indexmap::IndexMap::new();
        deal.insert("loan".to_string(), Value::Null);
        let mut input = indexmap::IndexMap::new();
        input.insert("deal".to_string(), Value::dict(deal));
        let program = compile(source).unwrap();
        let outcome = execute_with_validation(&program, Value::dict(input), &ExecutionConfig::default()).unwrap();
        let Value::Dict(output) = outcome.output else { panic!() };
        assert!(output.borrow().get("city").unwrap().is_null());
        assert_eq!(outcome.report.by_status(AccessStatus::ExpectedNull).len(), 1);
        assert_eq!(outcome.report.summary().path_errors, 0);
    }

    #[test]
    fn strict_mode_raises_on_broken_path() {
        let source = "def transform(INPUT):\n    OUTPUT = {}\n    OUTPUT[\"city\"] = INPUT.deal.loan.city\n    return OUTPUT\n";
        let mut deal = indexmap::IndexMap::new();
        deal.insert("loan".to_string(), Value::Null);
        let mut input = indexmap::IndexMap::new();
        input.insert("deal".to_string(), Value::dict(deal));
        let program = compile(source).unwrap();
        let config = ExecutionConfig { null_handling: NullHandling::Strict, ..Default::default() };
        let err = execute(&program, Value::dict(input.clone()), &config).unwrap_err();
        assert!(matches!(err, GrizzlyError::Runtime(_)));

        let safe_config = ExecutionConfig { null_handling: NullHandling::Safe, ..Default::default() };
        let outcome = execute_with_validation(&program, Value::dict(input), &safe_config).unwrap();
        assert_eq!(outcome.report.summary().path_errors, 1);
    }

    #[test]
    fn operator_precedence_scenarios() {
        let cfg = ExecutionConfig::default();
        let v = run("def transform(INPUT):\n    return True or False and False\n", Value::Null, &cfg);
        assert!(matches!(v, Value::Bool(true)));
        let v = run("def transform(INPUT):\n    return 2 + 3 * 4\n", Value::Null, &cfg);
        assert!(matches!(v, Value::Number(Number::Int(14))));
        let v = run("def transform(INPUT):\n    return 2 ** 3 ** 2\n", Value::Null, &cfg);
        assert!(matches!(v, Value::Number(Number::Int(512))));
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let source = "def f(n):\n    return f(n - 1)\ndef transform(INPUT):\n    return f(100)\n";
        let program = compile(source).unwrap();
        let config = ExecutionConfig { recursion_limit: 8, ..Default::default() };
        let err = execute(&program, Value::int(100), &config).unwrap_err();
        assert!(matches!(err, GrizzlyError::Resource(ResourceError::RecursionLimitExceeded { .. })));
    }

    #[test]
    fn execute_rejects_an_unvalidated_zero_recursion_limit() {
        let program = compile("def transform(INPUT):\n    return INPUT\n").unwrap();
        let config = ExecutionConfig { recursion_limit: 0, ..Default::default() };
        let err = execute(&program, Value::Null, &config).unwrap_err();
        assert!(matches!(err, GrizzlyError::Config(ConfigError::ZeroRecursionLimit)));
    }
}
