//! Public engine surface (spec §6): compile once, execute many times.

use std::time::Instant;

use crate::ast::Program as AstProgram;
use crate::config::ExecutionConfig;
use crate::error::{CompileError, GrizzlyError};
use crate::interp::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::tracker::ValidationReport;
use crate::value::Value;

/// A compiled, immutable program. `Send + Sync` (it owns only scalars,
/// `String`s and `Vec`s — no shared mutable state), so one `Program` may be
/// reused to drive any number of concurrent `execute` calls (spec §5); each
/// call builds its own interpreter frames/tracker/counters from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ast: AstProgram,
}

impl Program {
    /// Names of all `import` statements in the program, in source order.
    #[must_use]
    pub fn imports(&self) -> Vec<&str> {
        self.ast.imports.iter().map(|i| i.module.as_str()).collect()
    }

    /// Names of every top-level function defined in the program.
    #[must_use]
    pub fn function_names(&self) -> Vec<&str> {
        self.ast.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// The source line `transform` is defined on, for diagnostics/tooling
    /// that want to point a host-side editor at the entry point.
    #[must_use]
    pub fn transform_line(&self) -> Option<u32> {
        self.ast.function("transform").map(|f| f.line)
    }
}

/// Lexes and parses `source`, producing a reusable [`Program`].
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    let ast = Parser::new(tokens).parse_program()?;
    Ok(Program { ast })
}

/// Runs `program`'s `transform` function against `input`, returning just
/// the output value (spec §6).
pub fn execute(program: &Program, input: Value, config: &ExecutionConfig) -> Result<Value, GrizzlyError> {
    config.validate()?;
    let interpreter = Interpreter::new(&program.ast, config);
    let (output, _tracker) = interpreter.run(input)?;
    Ok(output)
}

/// The result of [`execute_with_validation`]: the produced value, its
/// access-validation report, and wall-clock elapsed time.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub output: Value,
    pub report: ValidationReport,
    pub elapsed_ms: u64,
}

/// Like [`execute`], but forces access tracking on and returns the report
/// alongside the output and elapsed wall-clock time (spec §6).
pub fn execute_with_validation(
    program: &Program,
    input: Value,
    config: &ExecutionConfig,
) -> Result<ExecutionOutcome, GrizzlyError> {
    config.validate()?;
    let mut tracking_config = config.clone();
    tracking_config.track_access = Some(true);
    let start = Instant::now();
    let interpreter = Interpreter::new(&program.ast, &tracking_config);
    let (output, tracker) = interpreter.run(input)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(ExecutionOutcome { output, report: tracker.into_report(), elapsed_ms })
}
