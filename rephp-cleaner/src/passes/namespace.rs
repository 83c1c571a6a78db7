//! Carry a `namespace Foo;` statement over to later turns.

use rephp_parser::ast::{NamespaceDecl, Program, Stmt};
use tracing::debug;

use super::{RewriteContext, RewritePass};
use crate::error::CleanError;

/// A turn ending in `namespace Foo;` makes `Foo` current; one ending in a
/// braced namespace clears it. Any other turn is wrapped in the current
/// namespace, if there is one.
pub struct NamespacePass;

impl RewritePass for NamespacePass {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        if let Some((Stmt::Namespace(ns), _)) = program.stmts.last() {
            if ns.braced {
                debug!("braced namespace, clearing the current namespace");
                cx.state.set_namespace(None);
            } else {
                debug!(namespace = ?ns.name.as_ref().map(ToString::to_string), "entering namespace");
                cx.state.set_namespace(ns.name.clone());
            }
            return Ok(());
        }

        let Some(current) = cx.state.current_namespace() else {
            return Ok(());
        };
        if program.stmts.is_empty() {
            return Ok(());
        }
        let span = program.stmts[0].1.start..program.stmts[program.stmts.len() - 1].1.end;
        let stmts = std::mem::take(&mut program.stmts);
        program.stmts.push((
            Stmt::Namespace(NamespaceDecl {
                name: Some(current.clone()),
                stmts,
                braced: false,
            }),
            span,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::rewrite_with;
    use crate::state::PipelineState;

    #[test]
    fn open_namespace_becomes_current() {
        let mut state = PipelineState::new();
        let out = rewrite_with(&mut NamespacePass, &mut state, "namespace Foo\\Bar;").unwrap();
        assert_eq!(out, "namespace Foo\\Bar;");
        assert_eq!(state.current_namespace().unwrap().joined(), "Foo\\Bar");
    }

    #[test]
    fn later_turns_are_wrapped() {
        let mut state = PipelineState::new();
        rewrite_with(&mut NamespacePass, &mut state, "namespace Foo;").unwrap();
        let out = rewrite_with(&mut NamespacePass, &mut state, "$a = 1; echo $a;").unwrap();
        assert_eq!(out, "namespace Foo;\n$a = 1;\necho $a;");
    }

    #[test]
    fn braced_namespace_clears() {
        let mut state = PipelineState::new();
        rewrite_with(&mut NamespacePass, &mut state, "namespace Foo;").unwrap();
        rewrite_with(&mut NamespacePass, &mut state, "namespace Bar { }").unwrap();
        assert!(state.current_namespace().is_none());
        let out = rewrite_with(&mut NamespacePass, &mut state, "1;").unwrap();
        assert_eq!(out, "1;");
    }

    #[test]
    fn global_namespace_statement_clears() {
        let mut state = PipelineState::new();
        rewrite_with(&mut NamespacePass, &mut state, "namespace Foo;").unwrap();
        rewrite_with(&mut NamespacePass, &mut state, "namespace { }").unwrap();
        assert!(state.current_namespace().is_none());
    }
}
