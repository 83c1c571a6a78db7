use std::collections::HashSet;

use rephp_parser::ast::{Name, NamespaceDecl, Program, Span, Spanned, Stmt};

use super::{is_conditional, ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::qualify_declared;
use crate::visit::{walk_block, walk_program, walk_stmt, VisitResult, Visitor};

/// A function may not be declared twice, unless the declaration sits inside
/// a conditional that might never run.
pub struct ValidFunctionNamePass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
    conditional: usize,
    declared: HashSet<String>,
}

impl Visitor for Check<'_> {
    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        self.namespace = ns.name.clone();
        walk_block(self, &ns.stmts)
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        if is_conditional(&stmt.0) {
            self.conditional += 1;
            let result = walk_stmt(self, stmt);
            self.conditional -= 1;
            return result;
        }
        if let Stmt::Function(func) = &stmt.0 {
            let name = qualify_declared(&func.name, self.namespace.as_ref());
            let key = name.to_ascii_lowercase();
            if self.conditional == 0
                && (self.cx.symbols.function_exists(&name) || self.declared.contains(&key))
            {
                return Err(self.cx.fatal(format!("Cannot redeclare {name}()"), &stmt.1));
            }
            self.declared.insert(key);
        }
        walk_stmt(self, stmt)
    }
}

impl ValidationPass for ValidFunctionNamePass {
    fn name(&self) -> &'static str {
        "valid_function_name"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        let mut check = Check {
            cx,
            namespace: None,
            conditional: 0,
            declared: HashSet::new(),
        };
        walk_program(&mut check, program)
    }
}
