//! Incompleteness classifier.
//!
//! A REPL cannot tell a finished statement from one still being typed, so a
//! parse failure is sorted into "keep buffering" or "genuine syntax error".

use rephp_parser::ast::Program;
use rephp_parser::{parse, LineIndex, ParseError, ParseErrorKind};
use tracing::debug;

use crate::error::SyntaxError;

/// Prefix handed to the parser ahead of the user's input.
pub const OPEN_TAG: &str = "<?php ";

/// Outcome of parsing one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Complete(Program),
    /// More input is needed before the turn can be cleaned.
    Incomplete,
    Error(SyntaxError),
}

fn try_parse(source: &str) -> Result<Program, ParseError> {
    let mut result = parse(source);
    if result.errors.is_empty() {
        Ok(result.program)
    } else {
        Err(result.errors.swap_remove(0))
    }
}

/// Parse `text` (the turn's lines joined with `\n`) and classify failures.
#[must_use]
pub fn classify(text: &str, require_semicolons: bool) -> Classified {
    let source = format!("{OPEN_TAG}{text}\n");
    let err = match try_parse(&source) {
        Ok(program) => return Classified::Complete(program),
        Err(err) => err,
    };

    match err.kind {
        ParseErrorKind::UnclosedString if try_parse(&format!("{source}';")).is_ok() => {
            debug!("unclosed string, waiting for more input");
            Classified::Incomplete
        }
        ParseErrorKind::UnterminatedComment => {
            debug!("unterminated comment, waiting for more input");
            Classified::Incomplete
        }
        ParseErrorKind::TrailingComma if text.trim_end().ends_with(',') => {
            debug!("trailing comma, waiting for more input");
            Classified::Incomplete
        }
        ParseErrorKind::UnexpectedEof if require_semicolons => Classified::Incomplete,
        ParseErrorKind::UnexpectedEof => match try_parse(&format!("{source};")) {
            Ok(program) => {
                debug!("unexpected EOF, completed with an implicit semicolon");
                Classified::Complete(program)
            }
            Err(_) => {
                debug!("unexpected EOF, waiting for more input");
                Classified::Incomplete
            }
        },
        _ => Classified::Error(to_syntax_error(&source, err)),
    }
}

/// Position `err` in the user's input rather than in the wrapped source.
fn to_syntax_error(source: &str, err: ParseError) -> SyntaxError {
    let (line, mut column) = LineIndex::new(source).line_col(err.span.start);
    if line == 1 {
        column = column.saturating_sub(OPEN_TAG.len()).max(1);
    }
    SyntaxError {
        kind: err.kind,
        message: err.message,
        line,
        column,
        hint: err.hint,
    }
}
