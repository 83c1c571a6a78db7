//! `exit` and `die` become a catchable exception.

use rephp_parser::ast::{Arg, Expr, Program, Spanned};

use super::{RewriteContext, RewritePass};
use crate::error::CleanError;
use crate::visit::{walk_block_mut, walk_expr_mut, VisitorMut};

/// Exception the REPL's execution loop catches to leave the shell.
pub const BREAK_EXCEPTION_CLASS: &str = "Rephp\\Exception\\BreakException";

/// Replaces every `exit`/`die` with `throw new BreakException(...)`.
pub struct ExitPass;

impl RewritePass for ExitPass {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn rewrite(&mut self, program: &mut Program, _cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        walk_block_mut(&mut ExitRewriter, &mut program.stmts);
        Ok(())
    }
}

struct ExitRewriter;

impl VisitorMut for ExitRewriter {
    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        // Inner exits first, so `exit(exit(1))` rewrites both.
        walk_expr_mut(self, expr);
        if let Expr::Exit { expr: arg, .. } = &mut expr.0 {
            let args = arg.take().map(|a| vec![Arg::positional(*a)]).unwrap_or_default();
            let span = expr.1.clone();
            expr.0 = Expr::Throw(Box::new((Expr::new_instance(BREAK_EXCEPTION_CLASS, args), span)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::rewrite;

    #[test]
    fn rewrites_exit_and_die() {
        assert_eq!(
            rewrite(&mut ExitPass, "exit;"),
            "throw new \\Rephp\\Exception\\BreakException();"
        );
        assert_eq!(
            rewrite(&mut ExitPass, "die('bye');"),
            "throw new \\Rephp\\Exception\\BreakException('bye');"
        );
        assert_eq!(
            rewrite(&mut ExitPass, "exit(1);"),
            "throw new \\Rephp\\Exception\\BreakException(1);"
        );
    }

    #[test]
    fn rewrites_nested_positions() {
        let out = rewrite(&mut ExitPass, "$a or die(exit(2));");
        assert!(!out.contains("exit") && !out.contains("die"), "{out}");
        assert_eq!(out.matches("BreakException").count(), 2);

        let out = rewrite(&mut ExitPass, "if ($x) { $y ? exit : 1; } for (;; exit) {}");
        assert_eq!(out.matches("BreakException").count(), 2, "{out}");

        let out = rewrite(&mut ExitPass, "switch (exit()) { case 1: die; }");
        assert_eq!(out.matches("BreakException").count(), 2, "{out}");
    }
}
