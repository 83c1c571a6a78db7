//! Interactive prompt.
//!
//! Each complete turn is cleaned and the resulting code printed; the
//! declarations it makes are then remembered for later turns.

pub mod command;
pub mod session;

use std::io::IsTerminal;
use std::path::PathBuf;

use rephp_cleaner::CodeCleaner;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::error::CliError;
pub use session::{Session, Step};

const PROMPT: &str = ">>> ";
const CONTINUATION: &str = "... ";

/// Run the REPL until `:quit`, Ctrl-D or Ctrl-C at an empty buffer.
pub fn run_interactive(cleaner: CodeCleaner, history: Option<PathBuf>) -> Result<(), CliError> {
    let mut rl = rustyline::DefaultEditor::new()?;
    if let Some(path) = &history {
        if let Err(err) = rl.load_history(path) {
            debug!(path = %path.display(), %err, "no history loaded");
        }
    }
    let mut session = Session::new(cleaner);
    let color = std::io::stderr().is_terminal();

    println!("rephp v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit.\n");

    loop {
        let prompt = if session.is_buffering() {
            CONTINUATION
        } else {
            PROMPT
        };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) if session.is_buffering() => {
                session.clear_buffer();
                continue;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(&line);
        }

        match session.feed(&line) {
            Step::More => {}
            Step::Code(code) => println!("{code}"),
            Step::Output(text) => print!("{text}"),
            Step::Error(err) => report(&err.to_string(), color),
            Step::CommandError(msg) => report(&msg, color),
            Step::Quit => break,
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(err) = rl.save_history(path) {
            debug!(path = %path.display(), %err, "history not saved");
        }
    }
    Ok(())
}

fn report(message: &str, color: bool) {
    if color {
        eprintln!("\x1b[31m{message}\x1b[0m");
    } else {
        eprintln!("{message}");
    }
}
