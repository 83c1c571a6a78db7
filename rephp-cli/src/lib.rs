//! Library half of the `rephp` binary.
//!
//! `main.rs` only parses arguments; the configuration loader, the one-shot
//! `clean` command and the REPL session live here so that integration tests
//! in `tests/` can drive them.

pub mod clean;
pub mod config;
pub mod error;
pub mod repl;
