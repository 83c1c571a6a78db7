//! Make the turn evaluate to its last expression.

use rephp_parser::ast::{Block, Expr, NameOrExpr, Program, Spanned, Stmt};

use super::{synthetic_span, RewriteContext, RewritePass};
use crate::error::CleanError;

/// Returned by turns that produce no value, so the shell can stay quiet.
pub const NO_RETURN_VALUE_CLASS: &str = "Rephp\\CodeCleaner\\NoReturnValue";

/// Wraps the final expression statement in `return`, and ends statement
/// turns with `return new NoReturnValue()`. Descends into the branches of a
/// final `if` or `switch` and into a final namespace body.
pub struct ImplicitReturnPass;

impl RewritePass for ImplicitReturnPass {
    fn name(&self) -> &'static str {
        "implicit_return"
    }

    fn rewrite(&mut self, program: &mut Program, _cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        add_implicit_return(&mut program.stmts);
        Ok(())
    }
}

fn no_value_return(at: usize) -> Spanned<Stmt> {
    let span = synthetic_span(at);
    let sentinel = Expr::new_instance(NO_RETURN_VALUE_CLASS, Vec::new());
    (Stmt::Return(Some((sentinel, span.clone()))), span)
}

fn add_implicit_return(stmts: &mut Block) {
    let Some((last, span)) = stmts.last_mut() else {
        stmts.push(no_value_return(0));
        return;
    };
    let end = span.end;

    match last {
        Stmt::If(s) => {
            add_implicit_return(&mut s.then);
            for elseif in &mut s.elseifs {
                add_implicit_return(&mut elseif.body);
            }
            if let Some(else_) = &mut s.else_ {
                add_implicit_return(else_);
            }
        }
        Stmt::Switch { cases, .. } => {
            for case in cases {
                if matches!(case.body.last(), Some((Stmt::Break(_), _))) {
                    if let Some(brk) = case.body.pop() {
                        add_implicit_return(&mut case.body);
                        case.body.push(brk);
                    }
                }
            }
        }
        Stmt::Expression((Expr::Throw(_), _)) => {}
        Stmt::Expression((expr, _)) if is_halt_compiler(expr) => {}
        Stmt::Expression(_) => {
            if let Stmt::Expression(expr) = std::mem::replace(last, Stmt::Nop) {
                *last = Stmt::Return(Some(expr));
            }
        }
        Stmt::Namespace(ns) => add_implicit_return(&mut ns.stmts),
        _ => {}
    }

    if is_non_expression_stmt(&stmts[stmts.len() - 1].0) {
        stmts.push(no_value_return(end));
    }
}

/// `__halt_compiler()` must stay a bare statement.
fn is_halt_compiler(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::FuncCall { name: NameOrExpr::Name(name), .. }
            if name.joined().eq_ignore_ascii_case("__halt_compiler")
    )
}

fn is_non_expression_stmt(stmt: &Stmt) -> bool {
    !matches!(
        stmt,
        Stmt::Expression(_) | Stmt::Return(_) | Stmt::Namespace(_)
    )
}
