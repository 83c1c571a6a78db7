use rephp_parser::ast::{Expr, Program, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, VisitResult, Visitor};

/// `isset()` only accepts variables, array offsets and properties.
pub struct IssetPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::Isset(vars) = &expr.0 {
            if vars.iter().any(|(var, _)| !var.is_variable_like()) {
                return Err(self.cx.fatal(
                    "Cannot use isset() on the result of an expression \
                     (you can use \"null !== expression\" instead)",
                    &expr.1,
                ));
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for IssetPass {
    fn name(&self) -> &'static str {
        "isset"
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
    fn expressions_are_rejected() {
        for src in ["isset(1);", "isset($a, $b + 1);", "isset(FOO);", "if (isset([])) {}"] {
            assert_eq!(
                error(&IssetPass, src),
                "Cannot use isset() on the result of an expression (you can use \"null !== expression\" instead)",
                "{src}"
            );
        }
    }

    #[test]
    fn storage_is_accepted() {
        for src in ["isset($a);", "isset($a['b'], $c->d, E::$f, $$g);", "isset($a?->b);"] {
            assert!(validate(&IssetPass, src).is_ok(), "{src}");
        }
    }
}
