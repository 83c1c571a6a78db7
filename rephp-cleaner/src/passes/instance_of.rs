use rephp_parser::ast::{Expr, Program, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, VisitResult, Visitor};

/// The left operand of `instanceof` must be able to hold an object.
pub struct InstanceOfPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::Instanceof { expr: operand, .. } = &expr.0 {
            if matches!(operand.0, Expr::Literal(_) | Expr::ConstFetch(_) | Expr::MagicConst(_)) {
                return Err(self.cx.fatal(
                    "instanceof expects an object instance, constant given",
                    &expr.1,
                ));
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for InstanceOfPass {
    fn name(&self) -> &'static str {
        "instance_of"
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
    fn constant_operands() {
        for src in ["1 instanceof A;", "'a' instanceof A;", "FOO instanceof A;", "__LINE__ instanceof A;"] {
            assert_eq!(
                error(&InstanceOfPass, src),
                "instanceof expects an object instance, constant given",
                "{src}"
            );
        }
    }

    #[test]
    fn object_operands() {
        for src in ["$a instanceof A;", "f() instanceof A;", "$a->b instanceof $c;", "$a[0] instanceof A;"] {
            assert!(validate(&InstanceOfPass, src).is_ok(), "{src}");
        }
    }
}
