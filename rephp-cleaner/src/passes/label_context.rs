use std::collections::HashSet;

use rephp_parser::ast::{Program, Span, Spanned, Stmt};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_function, walk_program, walk_stmt, FunctionLike, VisitResult, Visitor};

/// Every `goto` must name a label of the same function body (or of the top
/// level). Jumps into loops and out of closures are not modelled.
pub struct LabelContextPass;

#[derive(Default)]
struct Frame {
    labels: HashSet<String>,
    gotos: Vec<(String, Span)>,
}

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    frames: Vec<Frame>,
}

impl Check<'_> {
    fn finish(&self, frame: &Frame) -> VisitResult {
        match frame.gotos.iter().find(|(label, _)| !frame.labels.contains(label)) {
            Some((label, span)) => Err(self
                .cx
                .fatal(format!("'goto' to undefined label '{label}'"), span)),
            None => Ok(()),
        }
    }
}

impl Visitor for Check<'_> {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        if let Some(frame) = self.frames.last_mut() {
            match &stmt.0 {
                Stmt::Goto(label) => frame.gotos.push((label.to_ascii_lowercase(), stmt.1.clone())),
                Stmt::Label(label) => {
                    frame.labels.insert(label.to_ascii_lowercase());
                }
                _ => {}
            }
        }
        walk_stmt(self, stmt)
    }

    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        self.frames.push(Frame::default());
        let walked = walk_function(self, func, span);
        let frame = self.frames.pop().unwrap_or_default();
        walked?;
        if func.is_anonymous() {
            Ok(())
        } else {
            self.finish(&frame)
        }
    }
}

impl ValidationPass for LabelContextPass {
    fn name(&self) -> &'static str {
        "label_context"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        let mut check = Check {
            cx,
            frames: vec![Frame::default()],
        };
        walk_program(&mut check, program)?;
        let top = check.frames.pop().unwrap_or_default();
        check.finish(&top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn undefined_labels() {
        assert_eq!(error(&LabelContextPass, "goto Nowhere;"), "'goto' to undefined label 'nowhere'");
        assert_eq!(
            error(&LabelContextPass, "a: function f() { goto a; }"),
            "'goto' to undefined label 'a'"
        );
        assert_eq!(
            error(&LabelContextPass, "class A { function f() { goto b; } }"),
            "'goto' to undefined label 'b'"
        );
        let err = validate(&LabelContextPass, "\n\ngoto x;").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn defined_labels() {
        for src in [
            "goto a; echo 1; a: echo 2;",
            "a: goto a;",
            "if (true) { goto done; } done:",
            "function f() { goto a; a: return; }",
            "unused: echo 1;",
        ] {
            assert!(validate(&LabelContextPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn closures_are_not_checked() {
        assert!(validate(&LabelContextPass, "$f = function () { goto nowhere; };").is_ok());
    }
}
