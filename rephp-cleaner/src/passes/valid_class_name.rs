//! Class-like declarations and references.
//!
//! Declarations must not collide with known class-likes and must extend or
//! implement ones that exist. References through `new`, `::` and static
//! calls must name something that exists or could be autoloaded.

use std::collections::HashMap;

use rephp_parser::ast::{
    ClassDecl, ClassKind, Expr, MemberName, Name, NameOrExpr, NamespaceDecl, Program, Span,
    Spanned, Stmt,
};

use super::{is_conditional, ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::{qualify_class, qualify_declared};
use crate::visit::{
    walk_block, walk_class, walk_expr, walk_function, walk_program, walk_stmt, FunctionLike,
    NameRole, VisitResult, Visitor,
};

pub struct ValidClassNamePass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
    conditional: usize,
    /// Whether each enclosing class-like has a parent, innermost last.
    classes: Vec<bool>,
    closures: usize,
    /// Class-likes declared earlier in this turn, by lowercased name.
    declared: HashMap<String, ClassKind>,
}

impl Check<'_> {
    fn qualify(&self, name: &Name) -> String {
        qualify_class(name, self.namespace.as_ref())
    }

    fn declared_kind(&self, name: &str) -> Option<ClassKind> {
        self.declared.get(&name.to_ascii_lowercase()).copied()
    }

    fn class_exists(&self, name: &str) -> bool {
        let symbols = self.cx.symbols;
        symbols.class_exists(name)
            || self.declared_kind(name) == Some(ClassKind::Class)
            || symbols.may_autoload(name)
    }

    fn interface_exists(&self, name: &str) -> bool {
        let symbols = self.cx.symbols;
        symbols.interface_exists(name)
            || self.declared_kind(name) == Some(ClassKind::Interface)
            || symbols.may_autoload(name)
    }

    fn trait_exists(&self, name: &str) -> bool {
        let symbols = self.cx.symbols;
        symbols.trait_exists(name)
            || self.declared_kind(name) == Some(ClassKind::Trait)
            || symbols.may_autoload(name)
    }

    fn not_found(&self, name: &str, span: &Span) -> CleanError {
        self.cx.fatal(format!("Class '{name}' not found"), span)
    }

    fn ensure_can_define(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        let Some(short) = class.name.as_deref() else {
            return Ok(());
        };
        let name = qualify_declared(short, self.namespace.as_ref());
        let existing = self
            .cx
            .symbols
            .class(&name)
            .map(|info| info.kind)
            .or_else(|| self.declared_kind(&name));
        if let Some(kind) = existing {
            let label = match kind {
                ClassKind::Class => "Class",
                ClassKind::Interface => "Interface",
                ClassKind::Trait => "Trait",
            };
            return Err(self.cx.fatal(format!("{label} named {name} already exists"), span));
        }
        self.declared.insert(name.to_ascii_lowercase(), class.kind);
        Ok(())
    }

    fn ensure_interfaces_exist(&self, names: &[Name], span: &Span) -> VisitResult {
        for name in names {
            let qualified = self.qualify(name);
            if !self.interface_exists(&qualified) {
                return Err(self.cx.fatal(format!("Interface '{qualified}' not found"), span));
            }
        }
        Ok(())
    }

    fn check_declaration(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        if self.conditional > 0 {
            return Ok(());
        }
        self.ensure_can_define(class, span)?;
        match class.kind {
            ClassKind::Class => {
                if let Some(parent) = class.extends.first() {
                    let qualified = self.qualify(parent);
                    if !parent.is_special_class_name() && !self.class_exists(&qualified) {
                        return Err(self.not_found(&qualified, span));
                    }
                }
                self.ensure_interfaces_exist(&class.implements, span)
            }
            ClassKind::Interface => self.ensure_interfaces_exist(&class.extends, span),
            ClassKind::Trait => Ok(()),
        }
    }

    /// `self`, `static` and `parent` need an enclosing class. Closures may
    /// be bound to one later.
    fn check_special(&self, name: &Name, span: &Span) -> VisitResult {
        if self.closures > 0 {
            return Ok(());
        }
        let keyword = name.first().to_ascii_lowercase();
        match self.classes.last() {
            None => Err(self.cx.fatal(
                format!("Cannot use \"{keyword}\" when no class scope is active"),
                span,
            )),
            Some(false) if keyword == "parent" => Err(self.cx.fatal(
                "Cannot use \"parent\" when current class scope has no parent",
                span,
            )),
            Some(_) => Ok(()),
        }
    }

    fn check_reference(&self, expr: &Spanned<Expr>) -> VisitResult {
        let span = &expr.1;
        match &expr.0 {
            Expr::New {
                class: NameOrExpr::Name(name),
                ..
            } if !name.is_special_class_name() => {
                let qualified = self.qualify(name);
                if self.class_exists(&qualified) {
                    Ok(())
                } else {
                    Err(self.not_found(&qualified, span))
                }
            }
            Expr::ClassConstFetch {
                class: NameOrExpr::Name(name),
                name: constant,
            } if !name.is_special_class_name() && !constant.eq_ignore_ascii_case("class") => {
                let qualified = self.qualify(name);
                if self.class_exists(&qualified) || self.interface_exists(&qualified) {
                    Ok(())
                } else {
                    Err(self.not_found(&qualified, span))
                }
            }
            Expr::StaticCall {
                class: NameOrExpr::Name(name),
                name: method,
                ..
            } if !name.is_special_class_name() => {
                let qualified = self.qualify(name);
                if !self.class_exists(&qualified) && !self.trait_exists(&qualified) {
                    return Err(self.not_found(&qualified, span));
                }
                if self.declared_kind(&qualified) == Some(ClassKind::Class) {
                    return Ok(());
                }
                let MemberName::Ident(method) = method else {
                    return Ok(());
                };
                match self.cx.symbols.method_exists(&qualified, method) {
                    Some(false) => Err(self.cx.fatal(
                        format!("Call to undefined method {qualified}::{method}()"),
                        span,
                    )),
                    _ => Ok(()),
                }
            }
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
        if is_conditional(&stmt.0) {
            self.conditional += 1;
            let result = walk_stmt(self, stmt);
            self.conditional -= 1;
            return result;
        }
        walk_stmt(self, stmt)
    }

    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        if class.name.is_some() {
            self.check_declaration(class, span)?;
        }
        let has_parent = class.kind == ClassKind::Trait || !class.extends.is_empty();
        self.classes.push(has_parent);
        let result = walk_class(self, class, span);
        self.classes.pop();
        result
    }

    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        if !func.is_anonymous() {
            return walk_function(self, func, span);
        }
        self.closures += 1;
        let result = walk_function(self, func, span);
        self.closures -= 1;
        result
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        walk_expr(self, expr)?;
        self.check_reference(expr)
    }

    fn visit_name(&mut self, name: &Name, role: NameRole, span: &Span) -> VisitResult {
        if role == NameRole::Class && name.is_special_class_name() {
            self.check_special(name, span)?;
        }
        Ok(())
    }
}

impl ValidationPass for ValidClassNamePass {
    fn name(&self) -> &'static str {
        "valid_class_name"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        let mut check = Check {
            cx,
            namespace: None,
            conditional: 0,
            classes: Vec::new(),
            closures: 0,
            declared: HashMap::new(),
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
    fn redeclaration() {
        assert_eq!(
            error(&ValidClassNamePass, "class stdClass {}"),
            "Class named stdClass already exists"
        );
        assert_eq!(
            error(&ValidClassNamePass, "interface A {} class a {}"),
            "Interface named a already exists"
        );
        assert_eq!(
            error(&ValidClassNamePass, "trait T {} trait T {}"),
            "Trait named T already exists"
        );
        let symbols = with("class A {}");
        let err = validate_with(&ValidClassNamePass, &symbols, "class A {}").unwrap_err();
        assert_eq!(err.message(), "Class named A already exists");
    }

    #[test]
    fn conditional_declarations_are_skipped() {
        let symbols = with("class A {}");
        for src in [
            "if (true) { class A {} }",
            "while (false) { class A {} }",
            "if (false) { class B extends Missing {} }",
        ] {
            assert!(validate_with(&ValidClassNamePass, &symbols, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn parents_and_interfaces_must_exist() {
        assert_eq!(error(&ValidClassNamePass, "class A extends B {}"), "Class 'B' not found");
        assert_eq!(
            error(&ValidClassNamePass, "class A implements Countable, Nope {}"),
            "Interface 'Nope' not found"
        );
        assert_eq!(
            error(&ValidClassNamePass, "interface I extends Exception {}"),
            "Interface 'Exception' not found"
        );
        for src in [
            "class A extends Exception implements Countable {}",
            "class B {} class A extends B {}",
            "interface I {} class A implements I {}",
            "class A extends \\Vendor\\Base {}",
        ] {
            assert!(validate(&ValidClassNamePass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn references_must_exist() {
        assert_eq!(error(&ValidClassNamePass, "new Nope();"), "Class 'Nope' not found");
        assert_eq!(error(&ValidClassNamePass, "echo Nope::A;"), "Class 'Nope' not found");
        assert_eq!(error(&ValidClassNamePass, "Nope::f();"), "Class 'Nope' not found");
        for src in [
            "new stdClass();",
            "new $a();",
            "echo Nope::class;",
            "echo Countable::A;",
            "new Some\\Autoloaded();",
            "namespace N { new Local(); }",
            "class A {} new A();",
            "$a = new class {};",
        ] {
            assert!(validate(&ValidClassNamePass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn autoloading_can_be_turned_off() {
        let mut symbols = SymbolTable::new();
        symbols.set_assume_autoload(false);
        let err = validate_with(&ValidClassNamePass, &symbols, "new Some\\Thing();").unwrap_err();
        assert_eq!(err.message(), "Class 'Some\\Thing' not found");
    }

    #[test]
    fn static_calls_need_the_method() {
        let symbols = with(
            "class A { static function f() {} } class B extends A {} \
             class M { static function __callStatic($n, $a) {} }",
        );
        for src in ["A::f();", "B::F();", "M::anything();", "Exception::whatever();"] {
            assert!(validate_with(&ValidClassNamePass, &symbols, src).is_ok(), "{src}");
        }
        let err = validate_with(&ValidClassNamePass, &symbols, "B::g();").unwrap_err();
        assert_eq!(err.message(), "Call to undefined method B::g()");
        assert!(validate(&ValidClassNamePass, "class C {} C::g();").is_ok());
    }

    #[test]
    fn special_names_need_a_class_scope() {
        assert_eq!(
            error(&ValidClassNamePass, "self::f();"),
            "Cannot use \"self\" when no class scope is active"
        );
        assert_eq!(
            error(&ValidClassNamePass, "function f() { return new static(); }"),
            "Cannot use \"static\" when no class scope is active"
        );
        assert_eq!(
            error(&ValidClassNamePass, "class A { function f() { parent::f(); } }"),
            "Cannot use \"parent\" when current class scope has no parent"
        );
        for src in [
            "class A { function f(): self { return new static(); } }",
            "class A extends Exception { function f() { parent::f(); } }",
            "trait T { function f() { parent::f(); } }",
            "$f = function () { return self::X; };",
        ] {
            assert!(validate(&ValidClassNamePass, src).is_ok(), "{src}");
        }
    }
}
