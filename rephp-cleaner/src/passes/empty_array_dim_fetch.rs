use rephp_parser::ast::{Expr, Program, Spanned, Stmt};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_block, walk_expr, walk_program, walk_stmt, VisitResult, Visitor};

/// `$a[]` appends, so it may only appear where a value is written.
pub struct EmptyArrayDimFetchPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Check<'_> {
    /// Walk an expression in write position.
    fn visit_target(&mut self, target: &Spanned<Expr>) -> VisitResult {
        match &target.0 {
            Expr::ArrayDimFetch { var, dim } => {
                self.visit_target(var)?;
                dim.as_deref().map_or(Ok(()), |d| self.visit_expr(d))
            }
            Expr::List(items) | Expr::Array { items, .. } => {
                for item in items.iter().flatten() {
                    if let Some(key) = &item.key {
                        self.visit_expr(key)?;
                    }
                    self.visit_target(&item.value)?;
                }
                Ok(())
            }
            _ => self.visit_expr(target),
        }
    }
}

impl Visitor for Check<'_> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        let Stmt::Foreach {
            expr,
            key,
            value,
            body,
            ..
        } = &stmt.0
        else {
            return walk_stmt(self, stmt);
        };
        self.visit_expr(expr)?;
        if let Some(key) = key {
            self.visit_target(key)?;
        }
        self.visit_target(value)?;
        walk_block(self, body)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        match &expr.0 {
            Expr::ArrayDimFetch { dim: None, .. } => {
                Err(self.cx.fatal("Cannot use [] for reading", &expr.1))
            }
            Expr::Assign { var, value } => {
                self.visit_target(var)?;
                self.visit_expr(value)
            }
            Expr::AssignRef { var, value } => {
                self.visit_target(var)?;
                self.visit_target(value)
            }
            _ => walk_expr(self, expr),
        }
    }
}

impl ValidationPass for EmptyArrayDimFetchPass {
    fn name(&self) -> &'static str {
        "empty_array_dim_fetch"
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
    fn reading_an_append() {
        for src in ["$a[];", "echo $a[];", "$b = $a[];", "f($a[]);", "$a[] += 1;", "$a[]['x'];"] {
            assert_eq!(error(&EmptyArrayDimFetchPass, src), "Cannot use [] for reading", "{src}");
        }
    }

    #[test]
    fn writing_an_append() {
        for src in [
            "$a[] = 1;",
            "$a['x'][] = 1;",
            "$a[]['x'] = 1;",
            "$a[] = &$b;",
            "$b = &$a[];",
            "[$a[], $b[]] = [1, 2];",
            "foreach ($c as $a[]) {}",
            "$a[$b[0]] = 1;",
        ] {
            assert!(validate(&EmptyArrayDimFetchPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn offsets_of_a_target_are_read() {
        assert!(validate(&EmptyArrayDimFetchPass, "$a[$b[]] = 1;").is_err());
    }
}
