//! The pipeline orchestrator.

use std::path::Path;

use rephp_parser::ast::{Name, NameKind, Program};
use rephp_parser::{format_program, LineIndex};
use tracing::{debug, trace};

use crate::classify::{classify, Classified, OPEN_TAG};
use crate::error::CleanError;
use crate::passes::{
    rewrite_pipeline, validation_pipeline, ImplicitUseOptions, NamespacePass, RewriteContext,
    RewritePass, UseStatementPass, ValidationContext,
};
use crate::resolve::{is_valid_class_name, qualify_class, resolve_alias};
use crate::state::{AliasTable, PipelineState};
use crate::symbols::{collect_declarations, SymbolTable};
use crate::visit::NameRole;

/// Behaviour switches, usually read from the host's configuration.
#[derive(Debug, Clone)]
pub struct CleanerOptions {
    /// Start the session with `declare(strict_types=1)` in effect.
    pub strict_types: bool,
    /// Skip every validation pass.
    pub yolo: bool,
    /// Never complete a turn with an implied trailing `;`.
    pub require_semicolons: bool,
    /// Treat unknown qualified class names as autoloadable.
    pub assume_autoload: bool,
    pub implicit_use: ImplicitUseOptions,
}

impl Default for CleanerOptions {
    fn default() -> Self {
        Self {
            strict_types: false,
            yolo: false,
            require_semicolons: false,
            assume_autoload: true,
            implicit_use: ImplicitUseOptions::default(),
        }
    }
}

/// Result of cleaning one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// Code ready to evaluate.
    Complete(String),
    /// The input is unfinished; buffer another line.
    Incomplete,
}

/// One REPL session's cleaner.
pub struct CodeCleaner {
    options: CleanerOptions,
    state: PipelineState,
    symbols: SymbolTable,
}

impl CodeCleaner {
    #[must_use]
    pub fn new(options: CleanerOptions) -> Self {
        let mut symbols = SymbolTable::new();
        symbols.set_assume_autoload(options.assume_autoload);
        let mut state = PipelineState::new();
        state.strict_types = options.strict_types;
        Self {
            options,
            state,
            symbols,
        }
    }

    #[must_use]
    pub fn options(&self) -> &CleanerOptions {
        &self.options
    }

    /// Clean the lines of one turn.
    ///
    /// On success the turn's declarations become pending in the symbol
    /// table; the host commits them once the code has actually run.
    pub fn clean<S: AsRef<str>>(
        &mut self,
        lines: &[S],
        require_semicolons: bool,
    ) -> Result<CleanOutcome, CleanError> {
        self.state.clear_messages();
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        let mut program = match classify(&text, require_semicolons) {
            Classified::Complete(program) => program,
            Classified::Incomplete => return Ok(CleanOutcome::Incomplete),
            Classified::Error(err) => return Err(err.into()),
        };
        let lines = LineIndex::new(&format!("{OPEN_TAG}{text}\n"));

        if let Err(err) = self.run(&mut program, &lines) {
            self.symbols.discard();
            return Err(err);
        }

        self.symbols.set_pending(collect_declarations(&program));
        let code = format_program(&program);
        trace!(%code, "cleaned");
        Ok(CleanOutcome::Complete(code))
    }

    fn run(&mut self, program: &mut Program, lines: &LineIndex) -> Result<(), CleanError> {
        let mut cx = RewriteContext {
            state: &mut self.state,
            symbols: &self.symbols,
            lines,
        };
        for mut pass in rewrite_pipeline(&self.options.implicit_use) {
            debug!(pass = pass.name(), "rewrite");
            pass.rewrite(program, &mut cx)?;
        }

        if self.options.yolo {
            return Ok(());
        }
        let cx = ValidationContext {
            state: &self.state,
            symbols: &self.symbols,
            lines,
        };
        for pass in validation_pipeline() {
            debug!(pass = pass.name(), "validate");
            pass.validate(program, &cx)?;
        }
        Ok(())
    }

    /// Resolve a class name the way code typed at the prompt would see it.
    ///
    /// Returns `\Fully\Qualified` when an alias or the current namespace
    /// changes the name, and `name` itself otherwise.
    #[must_use]
    pub fn resolve_class_name(&self, name: &str) -> String {
        if !is_valid_class_name(name) {
            return name.to_string();
        }
        let parsed = Name::parse(name);
        if parsed.kind == NameKind::FullyQualified || parsed.is_special_class_name() {
            return name.to_string();
        }
        let namespace = self.state.current_namespace();
        if let Some(resolved) = self
            .state
            .aliases(namespace)
            .and_then(|table| resolve_alias(&parsed, NameRole::Class, table))
        {
            return resolved.to_string();
        }
        match namespace {
            Some(_) => format!("\\{}", qualify_class(&parsed, namespace)),
            None => name.to_string(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&Name> {
        self.state.current_namespace()
    }

    pub fn set_namespace(&mut self, namespace: Option<Name>) {
        self.state.set_namespace(namespace);
    }

    #[must_use]
    pub fn aliases_for_namespace(&self, namespace: Option<&Name>) -> Option<&AliasTable> {
        self.state.aliases(namespace)
    }

    pub fn set_aliases_for_namespace(&mut self, namespace: Option<&Name>, table: AliasTable) {
        self.state.set_aliases(namespace, table);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.state.log(message);
    }

    /// Advisory messages from the last turn.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        self.state.messages()
    }

    #[must_use]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Make the last clean turn's declarations permanent. Returns how many
    /// were added.
    pub fn commit_declarations(&mut self) -> usize {
        self.symbols.commit()
    }

    pub fn discard_declarations(&mut self) {
        self.symbols.discard();
    }

    /// Pick up the namespace and `use` context of the file at `path`.
    /// Any failure leaves the session untouched.
    pub fn warm_up(&mut self, path: &Path) {
        match std::fs::read_to_string(path) {
            Ok(source) => self.warm_up_source(&source),
            Err(err) => debug!(path = %path.display(), %err, "warm-up file unreadable"),
        }
    }

    /// Like [`Self::warm_up`], for source text that starts with `<?php`.
    pub fn warm_up_source(&mut self, source: &str) {
        let mut result = rephp_parser::parse(source);
        if let Some(err) = result.errors.first() {
            debug!(error = %err.message, "warm-up source does not parse");
            return;
        }
        let lines = LineIndex::new(source);
        let mut state = self.state.clone();
        let mut cx = RewriteContext {
            state: &mut state,
            symbols: &self.symbols,
            lines: &lines,
        };
        let mut namespace = NamespacePass;
        let mut uses = UseStatementPass;
        let passes: [&mut dyn RewritePass; 2] = [&mut namespace, &mut uses];
        for pass in passes {
            if let Err(err) = pass.rewrite(&mut result.program, &mut cx) {
                debug!(pass = pass.name(), %err, "warm-up failed");
                return;
            }
        }
        state.clear_messages();
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> CodeCleaner {
        CodeCleaner::new(CleanerOptions::default())
    }

    fn complete(cleaner: &mut CodeCleaner, lines: &[&str]) -> String {
        match cleaner.clean(lines, false) {
            Ok(CleanOutcome::Complete(code)) => code,
            other => panic!("{lines:?}: {other:?}"),
        }
    }

    #[test]
    fn incomplete_input_keeps_buffering() {
        let mut cleaner = cleaner();
        assert_eq!(cleaner.clean(&["if (true) {"], false), Ok(CleanOutcome::Incomplete));
        assert_eq!(cleaner.clean(&["4"], true), Ok(CleanOutcome::Incomplete));
    }

    #[test]
    fn syntax_errors_surface() {
        let err = cleaner().clean(&["$a = )"], false).unwrap_err();
        assert_eq!(err.kind(), "syntax");
    }

    #[test]
    fn yolo_skips_validation() {
        let mut strict = cleaner();
        assert!(strict.clean(&["break;"], false).is_err());
        let mut yolo = CodeCleaner::new(CleanerOptions {
            yolo: true,
            ..CleanerOptions::default()
        });
        assert!(yolo.clean(&["break;"], false).is_ok());
    }

    #[test]
    fn strict_types_option_prepends_declare() {
        let mut cleaner = CodeCleaner::new(CleanerOptions {
            strict_types: true,
            ..CleanerOptions::default()
        });
        assert!(complete(&mut cleaner, &["4"]).starts_with("declare(strict_types=1);\n"));
    }

    #[test]
    fn declarations_wait_for_commit() {
        let mut cleaner = cleaner();
        complete(&mut cleaner, &["function hello() {}"]);
        assert!(!cleaner.symbols().function_exists("hello"));
        assert_eq!(cleaner.commit_declarations(), 1);
        assert!(cleaner.symbols().function_exists("hello"));

        complete(&mut cleaner, &["function other() {}"]);
        cleaner.discard_declarations();
        assert_eq!(cleaner.commit_declarations(), 0);
        assert!(!cleaner.symbols().function_exists("other"));
    }

    #[test]
    fn failed_turns_leave_nothing_pending() {
        let mut cleaner = cleaner();
        assert!(cleaner.clean(&["function f() {}", "break;"], false).is_err());
        assert_eq!(cleaner.commit_declarations(), 0);
    }

    #[test]
    fn resolves_through_namespace_and_aliases() {
        let mut cleaner = cleaner();
        assert_eq!(cleaner.resolve_class_name("Foo"), "Foo");
        assert_eq!(cleaner.resolve_class_name("\\Foo"), "\\Foo");
        assert_eq!(cleaner.resolve_class_name("not a class"), "not a class");

        complete(&mut cleaner, &["namespace App;"]);
        complete(&mut cleaner, &["use Vendor\\Shell;"]);
        assert_eq!(cleaner.resolve_class_name("shell"), "\\Vendor\\Shell");
        assert_eq!(cleaner.resolve_class_name("Shell\\Command"), "\\Vendor\\Shell\\Command");
        assert_eq!(cleaner.resolve_class_name("Model"), "\\App\\Model");
        assert_eq!(cleaner.resolve_class_name("self"), "self");
    }

    #[test]
    fn accessors_round_trip() {
        let mut cleaner = cleaner();
        cleaner.set_namespace(Some(Name::parse("Foo\\Bar")));
        assert_eq!(cleaner.namespace().map(ToString::to_string).as_deref(), Some("Foo\\Bar"));

        let mut table = AliasTable::new();
        table
            .insert(rephp_parser::ast::UseKind::Normal, "S", Name::parse("Some\\Thing"))
            .unwrap();
        let ns = Name::parse("Foo\\Bar");
        cleaner.set_aliases_for_namespace(Some(&ns), table);
        assert_eq!(cleaner.resolve_class_name("S"), "\\Some\\Thing");

        cleaner.log("hello");
        assert_eq!(cleaner.messages(), ["hello".to_string()]);
        complete(&mut cleaner, &["1"]);
        assert!(cleaner.messages().is_empty());
    }

    #[test]
    fn warm_up_picks_up_context() {
        let mut cleaner = cleaner();
        cleaner.warm_up_source(
            "<?php\nnamespace App\\Http;\n\nuse Vendor\\Request as Req;\n\nclass Kernel {}\n",
        );
        assert_eq!(cleaner.namespace().map(ToString::to_string).as_deref(), Some("App\\Http"));
        assert_eq!(cleaner.resolve_class_name("Req"), "\\Vendor\\Request");
    }

    #[test]
    fn broken_warm_up_is_ignored() {
        let mut cleaner = cleaner();
        cleaner.warm_up_source("<?php\nnamespace App;\nuse A\\B;\nuse C\\B;\n");
        assert!(cleaner.namespace().is_none());
        cleaner.warm_up_source("<?php function (");
        cleaner.warm_up(Path::new("/definitely/not/here.php"));
        assert!(cleaner.namespace().is_none());
    }
}
