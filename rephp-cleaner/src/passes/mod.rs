//! Rewrite and validation passes.
//!
//! Rewrite passes turn a REPL fragment into valid top-level code and may
//! update the session state. Validation passes only inspect the final tree
//! and reject constructs PHP would die on. Each family runs in a fixed
//! order; see [`rewrite_pipeline`] and [`validation_pipeline`].

use rephp_parser::ast::{Program, Span, Spanned, Stmt};
use rephp_parser::LineIndex;

use crate::error::{CleanError, FatalError};
use crate::state::PipelineState;
use crate::symbols::SymbolTable;

mod abstract_class;
mod assign_this;
mod call_time_pass_by_reference;
mod called_class;
mod empty_array_dim_fetch;
mod exit;
mod final_class;
mod function_context;
mod function_return_in_write_context;
mod guard;
mod implicit_return;
mod implicit_use;
mod instance_of;
mod isset;
mod label_context;
mod list;
mod loop_context;
mod magic_constants;
mod namespace;
mod passable_by_reference;
mod require;
mod return_type;
mod strict_types;
mod use_statement;
mod valid_class_name;
mod valid_constant;
mod valid_constructor;
mod valid_function_name;

pub use abstract_class::AbstractClassPass;
pub use assign_this::AssignThisPass;
pub use call_time_pass_by_reference::CallTimePassByReferencePass;
pub use called_class::CalledClassPass;
pub use empty_array_dim_fetch::EmptyArrayDimFetchPass;
pub use exit::{ExitPass, BREAK_EXCEPTION_CLASS};
pub use final_class::FinalClassPass;
pub use function_context::FunctionContextPass;
pub use function_return_in_write_context::FunctionReturnInWriteContextPass;
pub use guard::{GuardPass, RESERVED_VARIABLE};
pub use implicit_return::{ImplicitReturnPass, NO_RETURN_VALUE_CLASS};
pub use implicit_use::{ImplicitUseOptions, ImplicitUsePass};
pub use instance_of::InstanceOfPass;
pub use isset::IssetPass;
pub use label_context::LabelContextPass;
pub use list::ListPass;
pub use loop_context::LoopContextPass;
pub use magic_constants::MagicConstantsPass;
pub use namespace::NamespacePass;
pub use passable_by_reference::PassableByReferencePass;
pub use require::{RequirePass, REQUIRE_RESOLVER_CLASS};
pub use return_type::ReturnTypePass;
pub use strict_types::StrictTypesPass;
pub use use_statement::UseStatementPass;
pub use valid_class_name::ValidClassNamePass;
pub use valid_constant::ValidConstantPass;
pub use valid_constructor::ValidConstructorPass;
pub use valid_function_name::ValidFunctionNamePass;

/// What a rewrite pass may read and update.
pub struct RewriteContext<'a> {
    pub state: &'a mut PipelineState,
    pub symbols: &'a SymbolTable,
    pub lines: &'a LineIndex,
}

impl RewriteContext<'_> {
    #[must_use]
    pub fn line(&self, span: &Span) -> usize {
        self.lines.line(span.start)
    }

    #[must_use]
    pub fn fatal(&self, message: impl Into<String>, span: &Span) -> CleanError {
        CleanError::Fatal(FatalError::new(message, Some(self.line(span))))
    }
}

/// What a validation pass may read.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub state: &'a PipelineState,
    pub symbols: &'a SymbolTable,
    pub lines: &'a LineIndex,
}

impl ValidationContext<'_> {
    #[must_use]
    pub fn line(&self, span: &Span) -> usize {
        self.lines.line(span.start)
    }

    #[must_use]
    pub fn fatal(&self, message: impl Into<String>, span: &Span) -> CleanError {
        CleanError::Fatal(FatalError::new(message, Some(self.line(span))))
    }

    #[must_use]
    pub fn warning(&self, message: impl Into<String>, span: &Span) -> CleanError {
        CleanError::Fatal(FatalError::warning(message, Some(self.line(span))))
    }
}

/// A tree transformation that makes a fragment valid top-level code.
pub trait RewritePass {
    fn name(&self) -> &'static str;

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>)
        -> Result<(), CleanError>;
}

/// A check that rejects a tree PHP would refuse to run.
pub trait ValidationPass {
    fn name(&self) -> &'static str;

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError>;
}

/// Rewrite passes in their required order.
#[must_use]
pub fn rewrite_pipeline(implicit_use: &ImplicitUseOptions) -> Vec<Box<dyn RewritePass>> {
    let mut passes: Vec<Box<dyn RewritePass>> = vec![
        Box::new(GuardPass),
        Box::new(ExitPass),
        Box::new(ImplicitReturnPass),
        Box::new(MagicConstantsPass),
        Box::new(NamespacePass),
    ];
    if implicit_use.is_enabled() {
        passes.push(Box::new(ImplicitUsePass::new(implicit_use.clone())));
    }
    passes.extend([
        Box::new(UseStatementPass) as Box<dyn RewritePass>,
        Box::new(RequirePass),
        Box::new(StrictTypesPass),
    ]);
    passes
}

/// Validation passes in their required order.
#[must_use]
pub fn validation_pipeline() -> Vec<Box<dyn ValidationPass>> {
    vec![
        Box::new(AbstractClassPass),
        Box::new(AssignThisPass),
        Box::new(CallTimePassByReferencePass),
        Box::new(CalledClassPass),
        Box::new(FinalClassPass),
        Box::new(FunctionContextPass),
        Box::new(FunctionReturnInWriteContextPass),
        Box::new(InstanceOfPass),
        Box::new(IssetPass),
        Box::new(ListPass),
        Box::new(LabelContextPass),
        Box::new(LoopContextPass),
        Box::new(EmptyArrayDimFetchPass),
        Box::new(ValidConstructorPass),
        Box::new(ReturnTypePass),
        Box::new(PassableByReferencePass),
        Box::new(ValidFunctionNamePass),
        Box::new(ValidClassNamePass),
        Box::new(ValidConstantPass),
    ]
}

/// Statements that can decide at runtime whether their body executes.
pub(crate) fn is_conditional(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::If(_)
            | Stmt::While { .. }
            | Stmt::DoWhile { .. }
            | Stmt::For { .. }
            | Stmt::Foreach { .. }
            | Stmt::Switch { .. }
    )
}

/// Index after the leading `declare` statements of a scope, where injected
/// statements go.
pub(crate) fn insertion_point(stmts: &[Spanned<Stmt>]) -> usize {
    stmts
        .iter()
        .take_while(|(stmt, _)| matches!(stmt, Stmt::Declare(d) if d.body.is_none()))
        .count()
}

/// Span of a synthesized node: an empty range at `at`.
pub(crate) fn synthetic_span(at: usize) -> Span {
    at..at
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers for running single passes in unit tests.

    use super::*;

    pub fn parse(src: &str) -> Program {
        let result = rephp_parser::parse(&format!("<?php {src}\n"));
        assert!(result.errors.is_empty(), "{src}: {:?}", result.errors);
        result.program
    }

    pub fn rewrite_with(
        pass: &mut dyn RewritePass,
        state: &mut PipelineState,
        src: &str,
    ) -> Result<String, CleanError> {
        let mut program = parse(src);
        let source = format!("<?php {src}\n");
        let lines = LineIndex::new(&source);
        let symbols = SymbolTable::new();
        let mut cx = RewriteContext {
            state,
            symbols: &symbols,
            lines: &lines,
        };
        pass.rewrite(&mut program, &mut cx)?;
        Ok(rephp_parser::format_program(&program))
    }

    pub fn rewrite(pass: &mut dyn RewritePass, src: &str) -> String {
        let mut state = PipelineState::new();
        match rewrite_with(pass, &mut state, src) {
            Ok(out) => out,
            Err(err) => panic!("{src}: {err}"),
        }
    }

    pub fn validate_with(
        pass: &dyn ValidationPass,
        symbols: &SymbolTable,
        src: &str,
    ) -> Result<(), CleanError> {
        let program = parse(src);
        let source = format!("<?php {src}\n");
        let lines = LineIndex::new(&source);
        let state = PipelineState::new();
        let cx = ValidationContext {
            state: &state,
            symbols,
            lines: &lines,
        };
        pass.validate(&program, &cx)
    }

    pub fn validate(pass: &dyn ValidationPass, src: &str) -> Result<(), CleanError> {
        validate_with(pass, &SymbolTable::new(), src)
    }

    /// The bare message of a failed validation.
    pub fn error(pass: &dyn ValidationPass, src: &str) -> String {
        match validate(pass, src) {
            Ok(()) => panic!("{src}: expected an error"),
            Err(err) => err.message().to_string(),
        }
    }
}
