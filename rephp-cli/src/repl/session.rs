//! One interactive session: the input buffer plus the cleaner.
//!
//! Kept free of terminal I/O so tests can feed it lines directly.

use rephp_cleaner::{CleanError, CleanOutcome, CodeCleaner};
use rephp_parser::ast::UseKind;
use tracing::debug;

use super::command::{help_text, is_command, parse_command, ReplCommand};

/// What the host should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Show the continuation prompt and read another line.
    More,
    /// A complete turn, cleaned and ready to run.
    Code(String),
    /// Output of a colon command.
    Output(String),
    /// The turn was rejected; the buffer has been discarded.
    Error(CleanError),
    /// A command failed.
    CommandError(String),
    Quit,
}

pub struct Session {
    cleaner: CodeCleaner,
    buffer: Vec<String>,
}

impl Session {
    #[must_use]
    pub fn new(cleaner: CodeCleaner) -> Self {
        Self {
            cleaner,
            buffer: Vec::new(),
        }
    }

    #[must_use]
    pub fn cleaner(&self) -> &CodeCleaner {
        &self.cleaner
    }

    #[must_use]
    pub fn is_buffering(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Feed one line typed at the prompt.
    pub fn feed(&mut self, line: &str) -> Step {
        if self.buffer.is_empty() && is_command(line) {
            return self.command(&parse_command(line));
        }
        if let Some(open) = line.strip_suffix('\\') {
            self.buffer.push(open.to_string());
            return Step::More;
        }
        self.buffer.push(line.to_string());

        let require_semicolons = self.cleaner.options().require_semicolons;
        match self.cleaner.clean(&self.buffer, require_semicolons) {
            Ok(CleanOutcome::Incomplete) => Step::More,
            Ok(CleanOutcome::Complete(code)) => {
                self.buffer.clear();
                let committed = self.cleaner.commit_declarations();
                debug!(committed, "turn complete");
                Step::Code(code)
            }
            Err(err) => {
                self.buffer.clear();
                Step::Error(err)
            }
        }
    }

    fn command(&mut self, command: &ReplCommand) -> Step {
        match command {
            ReplCommand::Help => Step::Output(help_text().to_string()),
            ReplCommand::Quit => Step::Quit,
            ReplCommand::Clear => {
                self.clear_buffer();
                Step::Output("Buffer cleared.\n".to_string())
            }
            ReplCommand::Buffer => Step::Output(
                self.buffer
                    .iter()
                    .map(|line| format!("{line}\n"))
                    .collect(),
            ),
            ReplCommand::Namespace => {
                let ns = self
                    .cleaner
                    .namespace()
                    .map_or_else(|| "(global)".to_string(), ToString::to_string);
                Step::Output(format!("{ns}\n"))
            }
            ReplCommand::Uses => Step::Output(self.uses()),
            ReplCommand::Resolve(name) if name.is_empty() => {
                Step::CommandError("Usage: :resolve <Name>".to_string())
            }
            ReplCommand::Resolve(name) => {
                Step::Output(format!("{}\n", self.cleaner.resolve_class_name(name)))
            }
            ReplCommand::Messages => Step::Output(
                self.cleaner
                    .messages()
                    .iter()
                    .map(|m| format!("{m}\n"))
                    .collect(),
            ),
            ReplCommand::Unknown(name) => {
                Step::CommandError(format!("Unknown command: :{name}. Type :help for help."))
            }
        }
    }

    fn uses(&self) -> String {
        let Some(table) = self.cleaner.aliases_for_namespace(self.cleaner.namespace()) else {
            return String::new();
        };
        table
            .iter()
            .map(|(kind, alias)| {
                let keyword = match kind {
                    UseKind::Normal => "",
                    UseKind::Function => "function ",
                    UseKind::Const => "const ",
                };
                let target = alias.target.joined();
                if target.rsplit('\\').next() == Some(alias.alias.as_str()) {
                    format!("use {keyword}{target};\n")
                } else {
                    format!("use {keyword}{target} as {};\n", alias.alias)
                }
            })
            .collect()
    }
}
