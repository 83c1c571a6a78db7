//! Route `require` and `include` paths through a runtime resolver.

use rephp_parser::ast::{
    Arg, Expr, IncludeKind, Literal, MemberName, Name, NameOrExpr, Program, Spanned,
};
use rephp_parser::LineIndex;

use super::{RewriteContext, RewritePass};
use crate::error::CleanError;
use crate::visit::{walk_block_mut, walk_expr_mut, VisitorMut};

/// Runtime class whose static methods resolve include paths.
pub const REQUIRE_RESOLVER_CLASS: &str = "Rephp\\CodeCleaner\\RequirePass";

/// `require $path` becomes `require \Rephp\CodeCleaner\RequirePass::resolve($path, <line>)`
/// so a missing file is reported as a catchable fatal error; `include`
/// goes through `resolveInclude`, which only warns.
pub struct RequirePass;

struct Resolve<'a> {
    lines: &'a LineIndex,
}

impl VisitorMut for Resolve<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr_mut(self, expr);
        let line = self.lines.line(expr.1.start);
        let Expr::Include { kind, expr: operand } = &mut expr.0 else {
            return;
        };
        let method = match kind {
            IncludeKind::Require | IncludeKind::RequireOnce => "resolve",
            IncludeKind::Include | IncludeKind::IncludeOnce => "resolveInclude",
        };
        let span = operand.1.clone();
        let placeholder = (Expr::Literal(Literal::Int(String::new())), span.clone());
        let path = std::mem::replace(&mut **operand, placeholder);
        **operand = (
            Expr::StaticCall {
                class: NameOrExpr::Name(Name::fully_qualified(REQUIRE_RESOLVER_CLASS)),
                name: MemberName::Ident(method.to_string()),
                args: vec![
                    Arg::positional(path),
                    Arg::positional((Expr::Literal(Literal::Int(line.to_string())), span.clone())),
                ],
            },
            span,
        );
    }
}

impl RewritePass for RequirePass {
    fn name(&self) -> &'static str {
        "require"
    }

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        walk_block_mut(&mut Resolve { lines: cx.lines }, &mut program.stmts);
        Ok(())
    }
}
