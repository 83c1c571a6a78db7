//! The rephp code cleaner.
//!
//! Takes the lines a user typed into the REPL and turns them into code that
//! is safe to evaluate: [`classify`] decides whether the input is complete,
//! the [`passes`] rewrite it into valid top-level code and reject constructs
//! PHP would die on, and [`CodeCleaner`] ties both together while carrying
//! namespace and `use` state from one turn to the next.

pub mod builtins;
pub mod classify;
pub mod cleaner;
pub mod error;
pub mod passes;
pub mod resolve;
pub mod state;
pub mod symbols;
pub mod visit;

pub use classify::{classify, Classified};
pub use cleaner::{CleanOutcome, CleanerOptions, CodeCleaner};
pub use error::{CleanError, FatalError, Severity, SyntaxError};
pub use passes::ImplicitUseOptions;
pub use state::{AliasTable, PipelineState};
pub use symbols::{Declaration, SymbolTable};
