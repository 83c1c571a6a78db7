//! Keeps user code away from the REPL's own scope variable.

use rephp_parser::ast::{Expr, Literal, Program, Span, Spanned, Stmt};
use rephp_parser::is_name_char;

use super::{RewriteContext, RewritePass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_function, walk_program, walk_stmt, FunctionLike, VisitResult, Visitor};

/// Variable the REPL uses to carry its scope between turns, without `$`.
pub const RESERVED_VARIABLE: &str = "__rephp__";

/// Rejects any reference to [`RESERVED_VARIABLE`].
pub struct GuardPass;

impl RewritePass for GuardPass {
    fn name(&self) -> &'static str {
        "guard"
    }

    fn rewrite(&mut self, program: &mut Program, _cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        walk_program(&mut Guard, program)
    }
}

struct Guard;

fn violation() -> CleanError {
    CleanError::Guard(format!(
        "Don't mess with ${RESERVED_VARIABLE}; bad things will happen"
    ))
}

fn check(name: &str) -> VisitResult {
    if name == RESERVED_VARIABLE {
        Err(violation())
    } else {
        Ok(())
    }
}

fn interpolates_reserved(literal: &Literal) -> bool {
    if !literal.interpolates() {
        return false;
    }
    let text = match literal {
        Literal::String(s) | Literal::Heredoc(s) | Literal::ShellExec(s) => s,
        Literal::Int(_) | Literal::Float(_) => return false,
    };
    let plain = format!("${RESERVED_VARIABLE}");
    let braced = format!("${{{RESERVED_VARIABLE}");
    text.match_indices(&plain)
        .any(|(i, _)| !text[i + plain.len()..].starts_with(is_name_char))
        || text.contains(&braced)
}

impl Visitor for Guard {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        match &stmt.0 {
            Stmt::Static(vars) => vars.iter().try_for_each(|v| check(&v.name))?,
            Stmt::Try(t) => t
                .catches
                .iter()
                .filter_map(|c| c.var.as_deref())
                .try_for_each(check)?,
            _ => {}
        }
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        match &expr.0 {
            Expr::Variable(name) => check(name)?,
            Expr::Literal(lit) if interpolates_reserved(lit) => return Err(violation()),
            _ => {}
        }
        walk_expr(self, expr)
    }

    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        func.params().iter().try_for_each(|p| check(&p.name))?;
        if let FunctionLike::Closure(c) = func {
            c.uses.iter().try_for_each(|u| check(&u.name))?;
        }
        walk_function(self, func, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::rewrite_with;
    use crate::state::PipelineState;

    fn guarded(src: &str) -> bool {
        matches!(
            rewrite_with(&mut GuardPass, &mut PipelineState::new(), src),
            Err(CleanError::Guard(_))
        )
    }

    #[test]
    fn rejects_reserved_variable() {
        assert!(guarded("$__rephp__;"));
        assert!(guarded("$a = $__rephp__['x'];"));
        assert!(guarded("function f($__rephp__) {}"));
        assert!(guarded("$f = function () use ($__rephp__) {};"));
        assert!(guarded("static $__rephp__;"));
        assert!(guarded("try {} catch (Exception $__rephp__) {}"));
        assert!(guarded("echo \"hi $__rephp__\";"));
        assert!(guarded("`rm $__rephp__`;"));
        assert!(guarded("echo \"hi ${__rephp__}\";"));
    }

    #[test]
    fn allows_everything_else() {
        assert!(!guarded("$__rephp = 1;"));
        assert!(!guarded("echo '$__rephp__';"));
        assert!(!guarded("echo \"$__rephp__x\";"));
        assert!(!guarded("$rephp = new Foo();"));
    }

    #[test]
    fn message() {
        let err = rewrite_with(&mut GuardPass, &mut PipelineState::new(), "$__rephp__;").unwrap_err();
        assert_eq!(
            err.message(),
            "Don't mess with $__rephp__; bad things will happen"
        );
    }
}
