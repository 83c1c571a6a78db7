use rephp_parser::ast::{Expr, Program, Spanned, Stmt};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, walk_stmt, VisitResult, Visitor};

const WRITE_CONTEXT: &str = "Can't use function return value in write context";
const ISSET_CALL: &str =
    "Cannot use isset() on the result of a function call (you can use \"null !== func()\" instead)";

/// Call results are values, not storage: they cannot be taken by
/// reference, `isset()` or `unset()`. Assigning to one is already a syntax
/// error.
pub struct FunctionReturnInWriteContextPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        if let Stmt::Unset(vars) = &stmt.0 {
            if vars.iter().any(|(var, _)| var.is_call()) {
                return Err(self.cx.fatal(WRITE_CONTEXT, &stmt.1));
            }
        }
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        let by_ref_call = match &expr.0 {
            Expr::Array { items, .. } => items
                .iter()
                .flatten()
                .any(|item| item.by_ref && item.value.0.is_call()),
            Expr::FuncCall { args, .. }
            | Expr::MethodCall { args, .. }
            | Expr::StaticCall { args, .. } => {
                args.iter().any(|arg| arg.by_ref && arg.value.0.is_call())
            }
            Expr::Isset(vars) if vars.iter().any(|(var, _)| var.is_call()) => {
                return Err(self.cx.fatal(ISSET_CALL, &expr.1));
            }
            _ => false,
        };
        if by_ref_call {
            return Err(self.cx.fatal(WRITE_CONTEXT, &expr.1));
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for FunctionReturnInWriteContextPass {
    fn name(&self) -> &'static str {
        "function_return_in_write_context"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(&mut Check { cx }, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn references_to_call_results() {
        for src in ["$a = [&f()];", "$a = [1, &$b->c()];"] {
            assert_eq!(error(&FunctionReturnInWriteContextPass, src), WRITE_CONTEXT, "{src}");
        }
    }

    #[test]
    fn isset_and_unset() {
        assert_eq!(error(&FunctionReturnInWriteContextPass, "isset($a, f());"), ISSET_CALL);
        assert_eq!(error(&FunctionReturnInWriteContextPass, "unset(A::f());"), WRITE_CONTEXT);
    }

    #[test]
    fn ordinary_use_of_calls() {
        for src in ["$a = f();", "isset($a[f()]);", "unset($a->b);", "$a = [&$b, f()];", "empty(f());"] {
            assert!(validate(&FunctionReturnInWriteContextPass, src).is_ok(), "{src}");
        }
    }
}
