use rephp_parser::ast::{Expr, Program, Span, Spanned, Stmt, TypeHint};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_function, walk_program, walk_stmt, FunctionLike, VisitResult, Visitor};

const MESSAGE: &str = "A function with return type must return a value";
const NULLABLE_MESSAGE: &str = "A function with return type must return a value \
                                (did you mean \"return null;\" instead of \"return;\"?)";
const VOID_MESSAGE: &str = "A void function must not return a value";
const VOID_NULL_MESSAGE: &str = "A void function must not return a value \
                                 (did you mean \"return;\" instead of \"return null;\"?)";
const NULLABLE_VOID_MESSAGE: &str = "Void type cannot be nullable";

/// `return` statements must agree with the declared return type.
pub struct ReturnTypePass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    /// Return types of the enclosing function-likes, innermost last.
    stack: Vec<Option<TypeHint>>,
}

fn is_null(expr: &Expr) -> bool {
    matches!(expr, Expr::ConstFetch(name) if name.joined().eq_ignore_ascii_case("null"))
}

impl Check<'_> {
    fn check_return(&self, value: Option<&Spanned<Expr>>, span: &Span) -> VisitResult {
        let Some(Some(expected)) = self.stack.last() else {
            return Ok(());
        };
        let message = if expected.is_void() {
            match value {
                Some((expr, _)) if is_null(expr) => Some(VOID_NULL_MESSAGE),
                Some(_) => Some(VOID_MESSAGE),
                None => None,
            }
        } else if value.is_none() {
            Some(if expected.is_nullable() {
                NULLABLE_MESSAGE
            } else {
                MESSAGE
            })
        } else {
            None
        };
        message.map_or(Ok(()), |m| Err(self.cx.fatal(m, span)))
    }
}

impl Visitor for Check<'_> {
    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        let return_type = func.return_type();
        if matches!(return_type, Some(TypeHint::Nullable(inner)) if inner.is_void()) {
            return Err(self.cx.fatal(NULLABLE_VOID_MESSAGE, span));
        }
        self.stack.push(return_type.cloned());
        let result = walk_function(self, func, span);
        self.stack.pop();
        result
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        if let Stmt::Return(value) = &stmt.0 {
            self.check_return(value.as_ref(), &stmt.1)?;
        }
        walk_stmt(self, stmt)
    }
}

impl ValidationPass for ReturnTypePass {
    fn name(&self) -> &'static str {
        "return_type"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(
            &mut Check {
                cx,
                stack: Vec::new(),
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
    fn typed_functions_need_a_value() {
        assert_eq!(error(&ReturnTypePass, "function f(): int { return; }"), MESSAGE);
        assert_eq!(error(&ReturnTypePass, "function f(): ?int { return; }"), NULLABLE_MESSAGE);
        assert_eq!(error(&ReturnTypePass, "$f = function (): array { return; };"), MESSAGE);
        assert_eq!(error(&ReturnTypePass, "class A { function f(): self { return; } }"), MESSAGE);
    }

    #[test]
    fn types_admitting_null_suggest_return_null() {
        for src in [
            "function f(): mixed { return; }",
            "function f(): int|null { return; }",
            "function f(): ?A { return; }",
        ] {
            assert_eq!(error(&ReturnTypePass, src), NULLABLE_MESSAGE, "{src}");
        }
    }

    #[test]
    fn void_functions_return_nothing() {
        assert_eq!(error(&ReturnTypePass, "function f(): void { return 1; }"), VOID_MESSAGE);
        assert_eq!(error(&ReturnTypePass, "function f(): void { return NULL; }"), VOID_NULL_MESSAGE);
        assert_eq!(error(&ReturnTypePass, "function f(): ?void {}"), NULLABLE_VOID_MESSAGE);
    }

    #[test]
    fn nested_functions_have_their_own_type() {
        assert_eq!(
            error(&ReturnTypePass, "function f(): void { $g = function (): int { return; }; }"),
            MESSAGE
        );
        assert!(validate(&ReturnTypePass, "function f(): int { $g = function () { return; }; return 1; }").is_ok());
    }

    #[test]
    fn valid_returns() {
        for src in [
            "return;",
            "return 1;",
            "function f() { return; }",
            "function f(): void { return; }",
            "function f(): ?int { return null; }",
            "function f(): int|string { return 1; }",
            "$f = fn(): int => 1;",
        ] {
            assert!(validate(&ReturnTypePass, src).is_ok(), "{src}");
        }
    }
}
