//! Namespaced and class constant references.
//!
//! Unqualified constants fall back to the global namespace at runtime and
//! are left alone.

use std::collections::HashSet;

use rephp_parser::ast::{
    ClassKind, Expr, Name, NameOrExpr, NamespaceDecl, Program, Span, Spanned, Stmt,
};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::{qualify_class, qualify_declared};
use crate::visit::{walk_block, walk_expr, walk_program, walk_stmt, VisitResult, Visitor};

pub struct ValidConstantPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
    /// Constants declared with `const` earlier in this turn.
    declared: HashSet<String>,
}

impl Check<'_> {
    fn check_constant(&self, name: &Name, span: &Span) -> VisitResult {
        if name.parts.len() < 2 {
            return Ok(());
        }
        let qualified = qualify_class(name, self.namespace.as_ref());
        if self.cx.symbols.constant_exists(&qualified) || self.declared.contains(&qualified) {
            return Ok(());
        }
        Err(self.cx.fatal(format!("Undefined constant {qualified}"), span))
    }

    fn check_class_constant(&self, class: &Name, constant: &str, span: &Span) -> VisitResult {
        if class.is_special_class_name() || constant.eq_ignore_ascii_case("class") {
            return Ok(());
        }
        let qualified = qualify_class(class, self.namespace.as_ref());
        let Some(info) = self.cx.symbols.class(&qualified) else {
            return Ok(());
        };
        let label = match info.kind {
            ClassKind::Interface => "Interface",
            ClassKind::Class | ClassKind::Trait => "Class",
        };
        match self.cx.symbols.class_constant_exists(&qualified, constant) {
            Some(false) => Err(self.cx.fatal(
                format!("{label} constant '{}::{constant}' not found", info.name),
                span,
            )),
            _ => Ok(()),
        }
    }
}

impl Visitor for Check<'_> {
    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        self.namespace = ns.name.clone();
        walk_block(self, &ns.stmts)
    }

    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        walk_stmt(self, stmt)?;
        if let Stmt::Const(items) = &stmt.0 {
            for item in items {
                self.declared
                    .insert(qualify_declared(&item.name, self.namespace.as_ref()));
            }
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        walk_expr(self, expr)?;
        match &expr.0 {
            Expr::ConstFetch(name) => self.check_constant(name, &expr.1),
            Expr::ClassConstFetch {
                class: NameOrExpr::Name(class),
                name,
            } => self.check_class_constant(class, name, &expr.1),
            _ => Ok(()),
        }
    }
}

impl ValidationPass for ValidConstantPass {
    fn name(&self) -> &'static str {
        "valid_constant"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        let mut check = Check {
            cx,
            namespace: None,
            declared: HashSet::new(),
        };
        walk_program(&mut check, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, parse, validate, validate_with};
    use crate::symbols::{collect_declarations, SymbolTable};

    fn with(decls: &str) -> SymbolTable {
        let mut symbols = SymbolTable::new();
        for decl in collect_declarations(&parse(decls)) {
            symbols.insert(decl);
        }
        symbols
    }

    #[test]
    fn namespaced_constants_must_exist() {
        assert_eq!(error(&ValidConstantPass, "echo Foo\\BAR;"), "Undefined constant Foo\\BAR");
        assert_eq!(
            error(&ValidConstantPass, "namespace N { echo Sub\\BAR; }"),
            "Undefined constant N\\Sub\\BAR"
        );
        let symbols = with("namespace Foo { const BAR = 1; }");
        assert!(validate_with(&ValidConstantPass, &symbols, "echo \\foo\\BAR;").is_ok());
        assert!(validate_with(&ValidConstantPass, &symbols, "echo \\Foo\\bar;").is_err());
    }

    #[test]
    fn unqualified_constants_are_not_checked() {
        for src in ["echo NOPE;", "echo \\NOPE;", "echo PHP_EOL;", "namespace N { echo X; }"] {
            assert!(validate(&ValidConstantPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn constants_declared_earlier_in_the_turn() {
        assert!(validate(&ValidConstantPass, "namespace N { const X = 1; echo \\N\\X; }").is_ok());
    }

    #[test]
    fn class_constants_of_known_classes() {
        let symbols =
            with("class A { const X = 1; } class B extends A {} interface I { const Y = 2; }");
        for src in [
            "echo A::X;",
            "echo b::X;",
            "echo B::class;",
            "echo I::Y;",
            "echo Unknown::Z;",
            "echo Exception::WHATEVER;",
            "echo $a::X;",
        ] {
            assert!(validate_with(&ValidConstantPass, &symbols, src).is_ok(), "{src}");
        }
        let err = validate_with(&ValidConstantPass, &symbols, "echo B::Y;").unwrap_err();
        assert_eq!(err.message(), "Class constant 'B::Y' not found");
        let err = validate_with(&ValidConstantPass, &symbols, "echo I::X;").unwrap_err();
        assert_eq!(err.message(), "Interface constant 'I::X' not found");
    }
}
