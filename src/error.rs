//! Error types surfaced across the compile/execute boundary.
//!
//! Grizzly distinguishes four error kinds end to end (spec §7): compile
//! errors (lexical or syntactic), runtime errors, resource/limit errors, and
//! access events (which are not errors — see [`crate::tracker`]). Each kind
//! is its own `thiserror` enum so a host can match on structured fields
//! instead of parsing message text.

use std::fmt;

use thiserror::Error;

/// A lexical error: unterminated string, inconsistent dedent, malformed
/// number literal, or bad escape sequence. Carries the 1-based line/column
/// of the offending character, per spec §4.1's error model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message} (line {line}, column {column})")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    InconsistentDedent,
    BadNumber,
    BadEscape,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnterminatedString => "UNTERMINATED_STRING",
            Self::InconsistentDedent => "INCONSISTENT_DEDENT",
            Self::BadNumber => "BAD_NUMBER",
            Self::BadEscape => "BAD_ESCAPE",
        };
        f.write_str(s)
    }
}

impl LexError {
    pub fn new(kind: LexErrorKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

/// A syntax error: names the expected construct and what was actually
/// found, at the offending token's position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse error at line {line}, column {column}: expected {expected}, found {found}")]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(expected: impl Into<String>, found: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
            line,
            column,
        }
    }
}

/// Everything that can fail while turning source text into a [`crate::Program`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A runtime error raised during interpretation: type mismatch, missing
/// name, division by zero, a broken non-safe access in STRICT mode,
/// out-of-loop `break`/`continue`, invalid builtin arguments, or a regex
/// compile failure. Carries the statement's source line when known.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}{}", line.map(|l| format!(" (line {l})")).unwrap_or_default())]
pub struct RuntimeError {
    pub message: String,
    pub line: Option<u32>,
    /// The access path involved, if this error originated from a property
    /// or index access (e.g. `INPUT.deal.loan.city`).
    pub path: Option<String>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            path: None,
        }
    }

    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Resource/limit errors: recursion depth, statement count, or wall-clock
/// time budget exceeded. None of these abort with partial output — the
/// whole execution is aborted, per spec §5 and §7.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("recursion limit exceeded: depth {depth} > limit {limit}")]
    RecursionLimitExceeded { limit: u32, depth: u32 },
    #[error("statement limit exceeded: {count} > {limit}")]
    StatementLimitExceeded { limit: u64, count: u64 },
    #[error("time budget exceeded: {elapsed_ms}ms > {limit_ms}ms")]
    TimeBudgetExceeded { limit_ms: u64, elapsed_ms: u64 },
}

/// Everything `execute`/`execute_with_validation` can fail with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrizzlyError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl From<ResourceError> for RuntimeError {
    fn from(err: ResourceError) -> Self {
        Self::new(err.to_string())
    }
}
