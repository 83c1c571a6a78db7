//! Errors of the command-line front end.

use std::path::PathBuf;

use rephp_cleaner::CleanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Clean(#[from] CleanError),

    #[error("{0} is incomplete")]
    Incomplete(String),

    #[error("line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("cannot encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot encode configuration: {0}")]
    Toml(#[from] toml::ser::Error),
}
