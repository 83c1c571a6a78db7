//! `rephp clean <file>`: clean a whole file as a single turn.

use std::path::Path;

use rephp_cleaner::{CleanError, CleanOutcome, CodeCleaner};
use serde::Serialize;

use crate::error::CliError;

/// JSON shape of `rephp clean --json`.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Complete {
        code: String,
        messages: Vec<String>,
    },
    Incomplete,
    Error {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
    },
}

impl Report {
    #[must_use]
    pub fn from_result(result: &Result<CleanOutcome, CleanError>, messages: &[String]) -> Self {
        match result {
            Ok(CleanOutcome::Complete(code)) => Report::Complete {
                code: code.clone(),
                messages: messages.to_vec(),
            },
            Ok(CleanOutcome::Incomplete) => Report::Incomplete,
            Err(err) => Report::Error {
                kind: err.kind(),
                message: err.message().to_string(),
                line: err.line(),
            },
        }
    }
}

/// The turn's lines, without the file's own opening tag.
#[must_use]
pub fn source_lines(source: &str) -> Vec<&str> {
    let trimmed = source.trim_start();
    let body = match trimmed.get(..5) {
        Some(tag) if tag.eq_ignore_ascii_case("<?php") => &trimmed[5..],
        _ => source,
    };
    body.lines().collect()
}

pub fn clean_source(cleaner: &mut CodeCleaner, source: &str) -> Result<CleanOutcome, CleanError> {
    let require_semicolons = cleaner.options().require_semicolons;
    cleaner.clean(&source_lines(source), require_semicolons)
}

/// Clean `path` and render the result, either as code or as JSON.
pub fn cmd_clean(cleaner: &mut CodeCleaner, path: &Path, json: bool) -> Result<String, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let result = clean_source(cleaner, &source);
    if json {
        let report = Report::from_result(&result, cleaner.messages());
        return Ok(serde_json::to_string_pretty(&report)?);
    }
    match result? {
        CleanOutcome::Complete(code) => Ok(code),
        CleanOutcome::Incomplete => Err(CliError::Incomplete(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rephp_cleaner::CleanerOptions;

    #[test]
    fn strips_the_open_tag() {
        assert_eq!(source_lines("<?php\necho 1;\n"), ["", "echo 1;"]);
        assert_eq!(source_lines("  <?PHP echo 1;"), [" echo 1;"]);
        assert_eq!(source_lines("echo 1;"), ["echo 1;"]);
    }

    #[test]
    fn reports() {
        let mut cleaner = CodeCleaner::new(CleanerOptions::default());
        let result = clean_source(&mut cleaner, "<?php\n4");
        assert_eq!(
            Report::from_result(&result, cleaner.messages()),
            Report::Complete {
                code: "return 4;".to_string(),
                messages: Vec::new(),
            }
        );

        let result = clean_source(&mut cleaner, "if (true) {");
        assert_eq!(Report::from_result(&result, &[]), Report::Incomplete);

        let result = clean_source(&mut cleaner, "$a = 1;\nbreak;");
        let report = Report::from_result(&result, &[]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "status": "error",
                "kind": "fatal",
                "message": "'break' not in the 'loop' or 'switch' context",
                "line": 2,
            })
        );
    }
}
