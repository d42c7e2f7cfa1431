//! Execution configuration (spec §6).
//!
//! This is the entire configuration surface for the engine: there is no
//! file-based or environment-variable configuration layer, since Grizzly is
//! an embedded library rather than a standalone service. Hosts construct an
//! [`ExecutionConfig`] in code and pass it to [`crate::execute`] /
//! [`crate::execute_with_validation`].

use thiserror::Error;

/// How the interpreter reacts to `.`/`[` applied to a `NullValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullHandling {
    /// `.`/`[` on null is a runtime error. `?.`/`?[` still short-circuit.
    Strict,
    /// `.`/`[` on null yields null; every access is recorded.
    #[default]
    Safe,
    /// Like `Safe`, but nothing is recorded (zero tracker allocations).
    Silent,
}

/// Default recursion depth cap (spec §4.3).
pub const DEFAULT_RECURSION_LIMIT: u32 = 256;
/// Default total-statement cap (spec §4.3).
pub const DEFAULT_STATEMENT_LIMIT: u64 = 1_000_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("recursion_limit must be positive")]
    ZeroRecursionLimit,
    #[error("statement_limit must be positive")]
    ZeroStatementLimit,
}

/// Recognised execution options (spec §6). Rejecting unknown options isn't
/// representable in a typed Rust struct — the equivalent safeguard here is
/// that construction validates the fields that must be positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub null_handling: NullHandling,
    /// Force access recording on (`Some(true)`) or off (`Some(false)`)
    /// regardless of `null_handling`; `None` defers to the mode's default
    /// (recording in `Safe`, not in `Strict`/`Silent`).
    pub track_access: Option<bool>,
    pub recursion_limit: u32,
    pub statement_limit: u64,
    /// Optional wall-clock budget; `None` means unbounded.
    pub time_budget_ms: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            null_handling: NullHandling::default(),
            track_access: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            statement_limit: DEFAULT_STATEMENT_LIMIT,
            time_budget_ms: None,
        }
    }
}

impl ExecutionConfig {
    /// Builds a config and validates it immediately, so a host that goes
    /// through this constructor can never hand `execute`/
    /// `execute_with_validation` an out-of-range `recursion_limit` or
    /// `statement_limit` (spec §6).
    pub fn new(
        null_handling: NullHandling,
        track_access: Option<bool>,
        recursion_limit: u32,
        statement_limit: u64,
        time_budget_ms: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let config = Self { null_handling, track_access, recursion_limit, statement_limit, time_budget_ms };
        config.validate()?;
        Ok(config)
    }

    /// Validates a config built field-by-field (e.g. via struct update
    /// syntax on `ExecutionConfig::default()`). `execute`/
    /// `execute_with_validation` call this themselves, since the struct's
    /// fields are public and can bypass [`Self::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recursion_limit == 0 {
            return Err(ConfigError::ZeroRecursionLimit);
        }
        if self.statement_limit == 0 {
            return Err(ConfigError::ZeroStatementLimit);
        }
        Ok(())
    }

    /// Whether access tracking should actually run for the given
    /// `null_handling` mode, taking `track_access` into account.
    #[must_use]
    pub fn should_track(&self) -> bool {
        match self.track_access {
            Some(forced) => forced,
            None => matches!(self.null_handling, NullHandling::Safe),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_recursion_limit() {
        let err = ExecutionConfig::new(NullHandling::Safe, None, 0, DEFAULT_STATEMENT_LIMIT, None).unwrap_err();
        assert_eq!(err, ConfigError::ZeroRecursionLimit);
    }

    #[test]
    fn new_rejects_zero_statement_limit() {
        let err = ExecutionConfig::new(NullHandling::Safe, None, DEFAULT_RECURSION_LIMIT, 0, None).unwrap_err();
        assert_eq!(err, ConfigError::ZeroStatementLimit);
    }

    #[test]
    fn default_tracks_only_in_safe_mode() {
        let safe = ExecutionConfig { null_handling: NullHandling::Safe, ..Default::default() };
        assert!(safe.should_track());
        let strict = ExecutionConfig { null_handling: NullHandling::Strict, ..Default::default() };
        assert!(!strict.should_track());
    }

    #[test]
    fn track_access_forces_recording_off_in_safe_mode() {
        let config =
            ExecutionConfig { null_handling: NullHandling::Safe, track_access: Some(false), ..Default::default() };
        assert!(!config.should_track());
    }

    #[test]
    fn track_access_forces_recording_on_outside_safe_mode() {
        let config =
            ExecutionConfig { null_handling: NullHandling::Strict, track_access: Some(true), ..Default::default() };
        assert!(config.should_track());
    }
}
