use rephp_parser::ast::{ArrayItem, Expr, Program, Span, Spanned, Stmt};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_expr, walk_program, walk_stmt, VisitResult, Visitor};

/// Shape rules for `list()` and `[...]` destructuring targets.
pub struct ListPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

fn destructured(expr: &Expr) -> Option<&[Option<ArrayItem>]> {
    match expr {
        Expr::List(items) | Expr::Array { items, .. } => Some(items),
        _ => None,
    }
}

impl Check<'_> {
    fn check_target(&self, items: &[Option<ArrayItem>], span: &Span) -> VisitResult {
        if items.iter().all(Option::is_none) {
            return Err(self.cx.fatal("Cannot use empty list", span));
        }
        let present = || items.iter().flatten();
        if present().any(|item| item.key.is_some()) && present().any(|item| item.key.is_none()) {
            return Err(self.cx.fatal(
                "Cannot mix keyed and unkeyed array entries in assignments",
                span,
            ));
        }
        for item in present() {
            let (value, value_span) = &item.value;
            if let Some(nested) = destructured(value) {
                self.check_target(nested, value_span)?;
            } else if !value.is_variable_like() {
                return Err(self.cx.fatal(
                    "Assignments can only happen to writable values",
                    value_span,
                ));
            }
        }
        Ok(())
    }
}

impl Visitor for Check<'_> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        if let Stmt::Foreach { value, .. } = &stmt.0 {
            if let Some(items) = destructured(&value.0) {
                self.check_target(items, &value.1)?;
            }
        }
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::Assign { var, .. } = &expr.0 {
            if let Some(items) = destructured(&var.0) {
                self.check_target(items, &var.1)?;
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for ListPass {
    fn name(&self) -> &'static str {
        "list"
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
    fn empty_targets() {
        for src in ["list() = $a;", "[] = $a;", "list(,) = $a;", "[$a, []] = $b;"] {
            assert_eq!(error(&ListPass, src), "Cannot use empty list", "{src}");
        }
    }

    #[test]
    fn unwritable_items() {
        for src in ["list($a, 1) = $b;", "[$a, f()] = $b;", "['k' => 'v'] = $b;", "foreach ($a as [$b, 2]) {}"] {
            assert_eq!(error(&ListPass, src), "Assignments can only happen to writable values", "{src}");
        }
    }

    #[test]
    fn keyed_and_unkeyed() {
        assert_eq!(
            error(&ListPass, "['a' => $a, $b] = $c;"),
            "Cannot mix keyed and unkeyed array entries in assignments"
        );
    }

    #[test]
    fn valid_destructuring() {
        for src in [
            "list($a, $b) = $c;",
            "[$a, , $b] = $c;",
            "[$a->b, $c['d'], [$e, $f]] = $g;",
            "['x' => $a, 'y' => $b] = $c;",
            "foreach ($a as list($b, $c)) {}",
            "$a = [1, 2];",
        ] {
            assert!(validate(&ListPass, src).is_ok(), "{src}");
        }
    }
}
