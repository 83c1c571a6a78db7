//! Keep `declare(strict_types=1)` in force across turns.

use rephp_parser::ast::{DeclareStmt, Expr, Literal, Program, Spanned, Stmt};
use tracing::debug;

use super::{synthetic_span, RewriteContext, RewritePass};
use crate::error::CleanError;

const MESSAGE: &str = "strict_types declaration must have 0 or 1 as its value";

/// Tracks the session's `strict_types` flag. While it is on, every turn that
/// does not already start with a `declare` gets `declare(strict_types=1);`.
pub struct StrictTypesPass;

fn strict_value(value: &Spanned<Expr>) -> Option<bool> {
    match &value.0 {
        Expr::Literal(Literal::Int(text)) => match text.replace('_', "").parse::<i64>() {
            Ok(0) => Some(false),
            Ok(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn declares(stmts: &[Spanned<Stmt>]) -> impl Iterator<Item = (&DeclareStmt, &Spanned<Stmt>)> {
    stmts.iter().filter_map(|stmt| match &stmt.0 {
        Stmt::Declare(d) => Some((d, stmt)),
        _ => None,
    })
}

impl RewritePass for StrictTypesPass {
    fn name(&self) -> &'static str {
        "strict_types"
    }

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        let prepend = cx.state.strict_types;

        let nested = program.stmts.iter().filter_map(|(stmt, _)| match stmt {
            Stmt::Namespace(ns) => Some(ns.stmts.as_slice()),
            _ => None,
        });
        for scope in std::iter::once(program.stmts.as_slice()).chain(nested) {
            for (declare, (_, span)) in declares(scope) {
                for (key, value) in &declare.directives {
                    if !key.eq_ignore_ascii_case("strict_types") {
                        continue;
                    }
                    let Some(strict) = strict_value(value) else {
                        return Err(cx.fatal(MESSAGE, span));
                    };
                    debug!(strict, "strict_types declared");
                    cx.state.strict_types = strict;
                }
            }
        }

        if prepend && !matches!(program.stmts.first(), Some((Stmt::Declare(_), _))) {
            let declare = DeclareStmt {
                directives: vec![(
                    "strict_types".to_string(),
                    (Expr::Literal(Literal::Int("1".to_string())), synthetic_span(0)),
                )],
                body: None,
            };
            program.stmts.insert(0, (Stmt::Declare(declare), synthetic_span(0)));
        }
        Ok(())
    }
}
