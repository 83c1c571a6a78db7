//! Colon commands understood at the prompt.

/// A REPL meta-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// `:help`: show available commands.
    Help,
    /// `:quit` or `:q`: exit the REPL.
    Quit,
    /// `:clear`: drop the input buffer.
    Clear,
    /// `:buffer`: show the lines buffered so far.
    Buffer,
    /// `:ns`: show the current namespace.
    Namespace,
    /// `:uses`: list the `use` aliases of the current namespace.
    Uses,
    /// `:resolve <Name>`: resolve a class name like the prompt would.
    Resolve(String),
    /// `:messages`: advisory messages from the last turn.
    Messages,
    Unknown(String),
}

/// Parse a command line, with or without its leading `:`.
#[must_use]
pub fn parse_command(input: &str) -> ReplCommand {
    let input = input.trim();
    let input = input.strip_prefix(':').unwrap_or(input);
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (input, ""),
    };
    match name {
        "help" | "h" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        "clear" | "c" => ReplCommand::Clear,
        "buffer" | "buf" => ReplCommand::Buffer,
        "ns" | "namespace" => ReplCommand::Namespace,
        "uses" | "use" => ReplCommand::Uses,
        "resolve" | "r" => ReplCommand::Resolve(arg.to_string()),
        "messages" | "m" => ReplCommand::Messages,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Whether `line` should be read as a command rather than PHP. Only lines
/// typed at an empty buffer qualify.
#[must_use]
pub fn is_command(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(':') && !trimmed.starts_with("::")
}

pub fn help_text() -> &'static str {
    "\
Commands:
  :help, :h         Show this help message
  :quit, :q         Exit the REPL
  :clear            Discard the lines buffered so far
  :buffer           Show the lines buffered so far
  :ns               Show the current namespace
  :uses             List the use statements in effect
  :resolve <Name>   Resolve a class name through namespace and aliases
  :messages         Show advisory messages from the last turn

Input:
  A line ending in \\ keeps the buffer open.
  Unfinished statements are buffered until they are complete.
"
}
