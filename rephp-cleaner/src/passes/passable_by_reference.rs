use rephp_parser::ast::{Arg, Expr, Name, NameKind, NameOrExpr, NamespaceDecl, Program, Span, Spanned};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::qualify_declared;
use crate::symbols::FunctionInfo;
use crate::visit::{walk_block, walk_expr, walk_program, VisitResult, Visitor};

/// Arguments bound to by-reference parameters of known functions must be
/// something a reference can point at.
pub struct PassableByReferencePass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
}

/// Calls, unlike literals, only draw a notice at runtime.
fn is_passable(arg: &Arg) -> bool {
    match &arg.value.0 {
        Expr::Array { .. } => arg.unpack,
        value => {
            value.is_variable_like()
                || value.is_call()
                || matches!(value, Expr::ClassConstFetch { .. })
        }
    }
}

impl Check<'_> {
    /// Unqualified calls inside a namespace fall back to the global function.
    fn function(&self, name: &Name) -> Option<&FunctionInfo> {
        let symbols = self.cx.symbols;
        match name.kind {
            NameKind::FullyQualified => symbols.function(&name.joined()),
            NameKind::Relative => {
                symbols.function(&qualify_declared(&name.joined(), self.namespace.as_ref()))
            }
            NameKind::Normal => symbols
                .function(&qualify_declared(&name.joined(), self.namespace.as_ref()))
                .or_else(|| {
                    if name.is_unqualified() {
                        symbols.function(name.first())
                    } else {
                        None
                    }
                }),
        }
    }
}

impl Visitor for Check<'_> {
    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        self.namespace = ns.name.clone();
        walk_block(self, &ns.stmts)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        if let Expr::FuncCall {
            name: NameOrExpr::Name(name),
            args,
        } = &expr.0
        {
            if let Some(info) = self.function(name) {
                // Sorts every argument in place, literals included.
                let exempt = info.name.eq_ignore_ascii_case("array_multisort");
                let positional = args.iter().take_while(|arg| arg.name.is_none() && !arg.unpack);
                for (position, arg) in positional.enumerate() {
                    if !exempt && info.is_by_ref(position) && !is_passable(arg) {
                        return Err(self
                            .cx
                            .fatal("Only variables can be passed by reference", &arg.value.1));
                    }
                }
            }
        }
        walk_expr(self, expr)
    }
}

impl ValidationPass for PassableByReferencePass {
    fn name(&self) -> &'static str {
        "passable_by_reference"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(
            &mut Check {
                cx,
                namespace: None,
            },
            program,
        )
    }
}
