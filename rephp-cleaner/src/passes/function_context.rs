use rephp_parser::ast::{Expr, Program, Span, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_function, walk_program, FunctionLike, VisitResult, Visitor};

/// `yield` is only valid inside a function body.
pub struct FunctionContextPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    depth: usize,
}

impl Visitor for Check<'_> {
    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        self.depth += 1;
        let result = walk_function(self, func, span);
        self.depth -= 1;
        result
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if self.depth == 0 && matches!(expr.0, Expr::Yield { .. } | Expr::YieldFrom(_)) {
            return Err(self.cx.fatal(
                "The \"yield\" expression can only be used inside a function",
                &expr.1,
            ));
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for FunctionContextPass {
    fn name(&self) -> &'static str {
        "function_context"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(&mut Check { cx, depth: 0 }, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn top_level_yield() {
        for src in ["yield;", "$a = yield 1;", "yield from [1];", "if (true) { yield 'k' => 1; }"] {
            assert_eq!(
                error(&FunctionContextPass, src),
                "The \"yield\" expression can only be used inside a function",
                "{src}"
            );
        }
    }

    #[test]
    fn yield_in_functions() {
        for src in [
            "function f() { yield 1; }",
            "$f = function () { yield from g(); };",
            "class A { function f() { yield; } }",
        ] {
            assert!(validate(&FunctionContextPass, src).is_ok(), "{src}");
        }
    }
}
