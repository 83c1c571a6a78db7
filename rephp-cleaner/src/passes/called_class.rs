use rephp_parser::ast::{ClassDecl, ClassKind, Expr, NameOrExpr, Program, Span, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_class, walk_expr, walk_program, VisitResult, Visitor};

/// `get_class()` and `get_called_class()` without an object only make sense
/// inside a class. Reported as a warning.
pub struct CalledClassPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    in_class: bool,
}

fn is_null(expr: &Expr) -> bool {
    matches!(expr, Expr::ConstFetch(name) if name.joined().eq_ignore_ascii_case("null"))
}

impl Visitor for Check<'_> {
    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        let outer = self.in_class;
        self.in_class = matches!(class.kind, ClassKind::Class | ClassKind::Trait);
        walk_class(self, class, span)?;
        self.in_class = outer;
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::FuncCall {
            name: NameOrExpr::Name(name),
            args,
        } = &expr.0
        {
            let bare = args.first().map_or(true, |arg| is_null(&arg.value.0));
            let callee = name.joined().to_ascii_lowercase();
            if !self.in_class && bare && matches!(callee.as_str(), "get_class" | "get_called_class") {
                return Err(self.cx.warning(
                    format!("{callee}() called without object from outside a class"),
                    &expr.1,
                ));
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for CalledClassPass {
    fn name(&self) -> &'static str {
        "called_class"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(
            &mut Check {
                cx,
                in_class: false,
            },
            program,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn warns_outside_classes() {
        assert_eq!(
            error(&CalledClassPass, "get_class();"),
            "get_class() called without object from outside a class"
        );
        assert_eq!(
            error(&CalledClassPass, "$a = GET_CALLED_CLASS();"),
            "get_called_class() called without object from outside a class"
        );
        assert_eq!(
            error(&CalledClassPass, "function f() { return get_class(null); }"),
            "get_class() called without object from outside a class"
        );
        let err = validate(&CalledClassPass, "get_class();").unwrap_err();
        assert_eq!(err.kind(), "warning");
    }

    #[test]
    fn allowed_forms() {
        for src in [
            "get_class($a);",
            "$f();",
            "class A { function f() { return get_class(); } }",
            "trait T { function f() { return get_called_class(); } }",
        ] {
            assert!(validate(&CalledClassPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn interfaces_do_not_count_as_class_scope() {
        assert!(validate(&CalledClassPass, "interface I { const A = 1; } get_class();").is_err());
    }
}
