//! Errors raised while cleaning a turn.
//!
//! Parse failures, fatal validation errors, guard violations and alias
//! collisions all surface as [`CleanError`]. "Incomplete input" is not an
//! error; see [`crate::classify::Classified`].

use std::fmt;

use rephp_parser::ParseErrorKind;
use serde::Serialize;
use thiserror::Error;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Would have been a fatal error at compile or run time.
    Error,
    /// Would have been a warning; the turn is still rejected.
    Warning,
}

/// A construct that PHP would reject at compile or run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FatalError {
    pub severity: Severity,
    pub message: String,
    /// 1-indexed line in the user's input.
    pub line: Option<usize>,
}

impl FatalError {
    #[must_use]
    pub fn new(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            line,
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(message, line)
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "Fatal error",
            Severity::Warning => "Warning",
        };
        write!(f, "PHP {label}:  {}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " on line {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FatalError {}

/// A genuine syntax error, positioned in the user's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PHP Parse error:  {} on line {}", self.message, self.line)
    }
}

impl std::error::Error for SyntaxError {}

/// Everything that can abort a clean.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// User code touched a name reserved for the REPL itself.
    #[error("PHP Error:  {0}")]
    Guard(String),

    /// A `use` alias was bound to two different names in one namespace.
    #[error(transparent)]
    AliasCollision(FatalError),
}

impl CleanError {
    /// Short machine-readable tag, used by `--json` output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CleanError::Syntax(_) => "syntax",
            CleanError::Fatal(e) if e.severity == Severity::Warning => "warning",
            CleanError::Fatal(_) => "fatal",
            CleanError::Guard(_) => "guard",
            CleanError::AliasCollision(_) => "alias_collision",
        }
    }

    /// The bare message without the `PHP ...:` prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            CleanError::Syntax(e) => &e.message,
            CleanError::Fatal(e) | CleanError::AliasCollision(e) => &e.message,
            CleanError::Guard(msg) => msg,
        }
    }

    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            CleanError::Syntax(e) => Some(e.line),
            CleanError::Fatal(e) | CleanError::AliasCollision(e) => e.line,
            CleanError::Guard(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_display_matches_php() {
        let err = FatalError::new("Cannot re-assign $this", Some(3));
        assert_eq!(
            err.to_string(),
            "PHP Fatal error:  Cannot re-assign $this on line 3"
        );
        let warn = FatalError::warning("get_class() called without object", None);
        assert_eq!(
            warn.to_string(),
            "PHP Warning:  get_class() called without object"
        );
    }

    #[test]
    fn clean_error_kinds() {
        let err = CleanError::from(FatalError::warning("w", Some(1)));
        assert_eq!(err.kind(), "warning");
        assert_eq!(err.message(), "w");
        assert_eq!(err.line(), Some(1));

        let guard = CleanError::Guard("nope".into());
        assert_eq!(guard.to_string(), "PHP Error:  nope");
        assert_eq!(guard.line(), None);
    }
}
