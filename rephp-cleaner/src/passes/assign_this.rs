use rephp_parser::ast::{Expr, Program, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, VisitResult, Visitor};

/// `$this` cannot be assigned to.
pub struct AssignThisPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::Assign { var, .. } | Expr::AssignRef { var, .. } | Expr::AssignOp { var, .. } =
            &expr.0
        {
            if matches!(&var.0, Expr::Variable(name) if name == "this") {
                return Err(self.cx.fatal("Cannot re-assign $this", &expr.1));
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for AssignThisPass {
    fn name(&self) -> &'static str {
        "assign_this"
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
    fn rejects_this_assignment() {
        for src in ["$this = 1;", "$a = $this = 1;", "$this .= 'x';", "$this =& $a;"] {
            assert_eq!(error(&AssignThisPass, src), "Cannot re-assign $this", "{src}");
        }
    }

    #[test]
    fn allows_everything_else() {
        for src in ["$a = $this;", "$this->a = 1;", "$this['a'] = 1;", "$thisOne = 1;"] {
            assert!(validate(&AssignThisPass, src).is_ok(), "{src}");
        }
    }
}
