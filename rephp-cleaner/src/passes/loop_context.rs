use rephp_parser::ast::{Expr, Literal, Program, Span, Spanned, Stmt};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_function, walk_program, walk_stmt, FunctionLike, VisitResult, Visitor};

/// `break` and `continue` need an enclosing loop or `switch`, deep enough
/// for their literal level.
pub struct LoopContextPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    depth: u64,
}

/// Value of an integer literal in any PHP base.
fn int_value(text: &str) -> Option<u64> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

impl Check<'_> {
    fn check_jump(&self, operator: &str, level: Option<&Spanned<Expr>>, span: &Span) -> VisitResult {
        if self.depth == 0 {
            return Err(self.cx.fatal(
                format!("'{operator}' not in the 'loop' or 'switch' context"),
                span,
            ));
        }
        let Some((level, _)) = level else {
            return Ok(());
        };
        let positive = format!("'{operator}' operator accepts only positive numbers");
        match level {
            Expr::Literal(Literal::Float(_)) => Err(self.cx.fatal(positive, span)),
            Expr::Literal(Literal::Int(text)) => match int_value(text) {
                Some(0) => Err(self.cx.fatal(positive, span)),
                Some(n) if n <= self.depth => Ok(()),
                Some(n) => Err(self.cx.fatal(format!("Cannot '{operator}' {n} levels"), span)),
                None => Err(self.cx.fatal(format!("Cannot '{operator}' {text} levels"), span)),
            },
            _ => Err(self.cx.fatal(
                format!("'{operator}' operator with non-constant operand is no longer supported"),
                span,
            )),
        }
    }
}

impl Visitor for Check<'_> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        match &stmt.0 {
            Stmt::Break(level) => self.check_jump("break", level.as_ref(), &stmt.1),
            Stmt::Continue(level) => self.check_jump("continue", level.as_ref(), &stmt.1),
            Stmt::While { .. }
            | Stmt::DoWhile { .. }
            | Stmt::For { .. }
            | Stmt::Foreach { .. }
            | Stmt::Switch { .. } => {
                self.depth += 1;
                let result = walk_stmt(self, stmt);
                self.depth -= 1;
                result
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        let outer = std::mem::replace(&mut self.depth, 0);
        let result = walk_function(self, func, span);
        self.depth = outer;
        result
    }
}

impl ValidationPass for LoopContextPass {
    fn name(&self) -> &'static str {
        "loop_context"
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
    fn outside_any_loop() {
        assert_eq!(error(&LoopContextPass, "break;"), "'break' not in the 'loop' or 'switch' context");
        assert_eq!(
            error(&LoopContextPass, "if (true) { continue; }"),
            "'continue' not in the 'loop' or 'switch' context"
        );
        assert_eq!(
            error(&LoopContextPass, "while (true) { function f() { break; } }"),
            "'break' not in the 'loop' or 'switch' context"
        );
    }

    #[test]
    fn levels() {
        assert_eq!(error(&LoopContextPass, "while (true) { break 2; }"), "Cannot 'break' 2 levels");
        assert_eq!(
            error(&LoopContextPass, "for (;;) { continue 0; }"),
            "'continue' operator accepts only positive numbers"
        );
        assert_eq!(
            error(&LoopContextPass, "do { break 1.5; } while (true);"),
            "'break' operator accepts only positive numbers"
        );
        assert_eq!(
            error(&LoopContextPass, "foreach ($a as $b) { break $c; }"),
            "'break' operator with non-constant operand is no longer supported"
        );
        assert_eq!(
            error(&LoopContextPass, "while (true) { break -1; }"),
            "'break' operator with non-constant operand is no longer supported"
        );
    }

    #[test]
    fn valid_jumps() {
        for src in [
            "while (true) { break; }",
            "while (true) { while (true) { break 2; } }",
            "switch ($a) { case 1: foreach ($b as $c) { continue 2; } }",
            "for (;;) { $f = function () { while (true) { break; } }; break 1; }",
        ] {
            assert!(validate(&LoopContextPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn literal_bases() {
        assert_eq!(int_value("0x2"), Some(2));
        assert_eq!(int_value("0b11"), Some(3));
        assert_eq!(int_value("010"), Some(8));
        assert_eq!(int_value("1_0"), Some(10));
        assert_eq!(int_value("0"), Some(0));
    }
}
