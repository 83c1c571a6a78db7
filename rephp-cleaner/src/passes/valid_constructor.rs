use std::collections::HashSet;

use rephp_parser::ast::{ClassDecl, ClassKind, MethodDecl, Name, NamespaceDecl, Program, Span};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::qualify_declared;
use crate::visit::{walk_block, walk_class, walk_program, VisitResult, Visitor};

/// Constructors cannot be static or declare a return type, and no method may
/// be declared twice.
pub struct ValidConstructorPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
}

impl Check<'_> {
    /// `__construct`, or a method named after a class of the global
    /// namespace when there is no `__construct`.
    fn constructor<'c>(&self, class: &'c ClassDecl) -> Option<&'c MethodDecl> {
        let mut legacy = None;
        for method in class.methods() {
            if method.name.eq_ignore_ascii_case("__construct") {
                return Some(method);
            }
            let global = self.namespace.as_ref().map_or(true, |ns| ns.parts.is_empty());
            if global && class.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(&method.name)) {
                legacy = Some(method);
            }
        }
        legacy
    }
}

impl Visitor for Check<'_> {
    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        self.namespace = ns.name.clone();
        walk_block(self, &ns.stmts)
    }

    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        let class_name = class.name.as_deref().unwrap_or("class@anonymous");
        let mut seen = HashSet::new();
        for method in class.methods() {
            if !seen.insert(method.name.to_ascii_lowercase()) {
                return Err(self
                    .cx
                    .fatal(format!("Cannot redeclare {class_name}::{}()", method.name), span));
            }
        }

        if class.kind == ClassKind::Class {
            if let Some(ctor) = self.constructor(class) {
                let qualified = qualify_declared(class_name, self.namespace.as_ref());
                if ctor.modifiers.is_static {
                    return Err(self.cx.fatal(
                        format!("Constructor {qualified}::{}() cannot be static", ctor.name),
                        span,
                    ));
                }
                if ctor.return_type.is_some() {
                    return Err(self.cx.fatal(
                        format!(
                            "Constructor {qualified}::{}() cannot declare a return type",
                            ctor.name
                        ),
                        span,
                    ));
                }
            }
        }
        walk_class(self, class, span)
    }
}

impl ValidationPass for ValidConstructorPass {
    fn name(&self) -> &'static str {
        "valid_constructor"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn static_constructors() {
        assert_eq!(
            error(&ValidConstructorPass, "class A { static function __construct() {} }"),
            "Constructor A::__construct() cannot be static"
        );
        assert_eq!(
            error(&ValidConstructorPass, "class A { public static function a() {} }"),
            "Constructor A::a() cannot be static"
        );
        assert_eq!(
            error(&ValidConstructorPass, "namespace N { class A { static function __construct() {} } }"),
            "Constructor N\\A::__construct() cannot be static"
        );
    }

    #[test]
    fn constructor_return_types() {
        assert_eq!(
            error(&ValidConstructorPass, "class A { function __construct(): void {} }"),
            "Constructor A::__construct() cannot declare a return type"
        );
        assert_eq!(
            error(&ValidConstructorPass, "class A { function A(): int {} }"),
            "Constructor A::A() cannot declare a return type"
        );
    }

    #[test]
    fn duplicate_methods() {
        assert_eq!(
            error(&ValidConstructorPass, "class A { function f() {} function F() {} }"),
            "Cannot redeclare A::F()"
        );
    }

    #[test]
    fn legacy_names_only_count_without_construct_or_namespace() {
        for src in [
            "class A { function __construct() {} static function a() {} }",
            "namespace N { class A { static function a() {} } }",
            "class A { function __construct() {} }",
            "interface I { static function i(); }",
        ] {
            assert!(validate(&ValidConstructorPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn reported_on_the_class_line() {
        let err = validate(&ValidConstructorPass, "\nclass A {\n    static function __construct() {}\n}")
            .unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
