use rephp_parser::ast::{Arg, Expr, Program, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, VisitResult, Visitor};

/// Rejects `f(&$x)`.
pub struct CallTimePassByReferencePass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        let args: &[Arg] = match &expr.0 {
            Expr::FuncCall { args, .. }
            | Expr::MethodCall { args, .. }
            | Expr::StaticCall { args, .. }
            | Expr::New { args, .. } => args,
            _ => &[],
        };
        if args.iter().any(|arg| arg.by_ref) {
            return Err(self
                .cx
                .fatal("Call-time pass-by-reference has been removed", &expr.1));
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for CallTimePassByReferencePass {
    fn name(&self) -> &'static str {
        "call_time_pass_by_reference"
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
    fn rejects_reference_arguments() {
        for src in ["f(&$a);", "$a->b(1, &$c);", "A::b(&$c);", "new A(&$b);"] {
            assert_eq!(
                error(&CallTimePassByReferencePass, src),
                "Call-time pass-by-reference has been removed",
                "{src}"
            );
        }
    }

    #[test]
    fn allows_by_ref_elsewhere() {
        for src in ["f($a);", "$a = &$b;", "$a = [&$b];", "function f(&$a) {}", "foreach ($a as &$b) {}"] {
            assert!(validate(&CallTimePassByReferencePass, src).is_ok(), "{src}");
        }
    }
}
