//! Abstract method rules.

use rephp_parser::ast::{ClassDecl, ClassKind, ClassMember, Program, Span};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::visit::{walk_class, walk_program, VisitResult, Visitor};

/// Abstract methods may not have a body, concrete ones must, and a class
/// with abstract methods must itself be abstract.
pub struct AbstractClassPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
}

impl Visitor for Check<'_> {
    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        let class_name = class.name.as_deref().unwrap_or("class@anonymous");
        let mut abstract_methods = Vec::new();

        for (member, member_span) in &class.members {
            let ClassMember::Method(method) = member else {
                continue;
            };
            let name = format!("{class_name}::{}", method.name);
            match (class.kind, method.modifiers.is_abstract, method.body.is_some()) {
                (ClassKind::Interface, _, true) => {
                    return Err(self.cx.fatal(
                        format!("Interface function {name}() cannot contain body"),
                        member_span,
                    ));
                }
                (ClassKind::Interface, ..) => {}
                (_, true, true) => {
                    return Err(self.cx.fatal(
                        format!("Abstract function {name}() cannot contain body"),
                        member_span,
                    ));
                }
                (_, true, false) => abstract_methods.push(name),
                (_, false, false) => {
                    return Err(self.cx.fatal(
                        format!("Non-abstract method {name}() must contain body"),
                        member_span,
                    ));
                }
                (_, false, true) => {}
            }
        }

        if class.kind == ClassKind::Class && !class.is_abstract && !abstract_methods.is_empty() {
            let count = abstract_methods.len();
            let plural = if count == 1 { "" } else { "s" };
            return Err(self.cx.fatal(
                format!(
                    "Class {class_name} contains {count} abstract method{plural} and must therefore \
                     be declared abstract or implement the remaining methods ({})",
                    abstract_methods.join(", ")
                ),
                span,
            ));
        }
        walk_class(self, class, span)
    }
}

impl ValidationPass for AbstractClassPass {
    fn name(&self) -> &'static str {
        "abstract_class"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        walk_program(&mut Check { cx }, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate};

    #[test]
    fn abstract_method_with_body() {
        assert_eq!(
            error(&AbstractClassPass, "abstract class A { abstract function f() {} }"),
            "Abstract function A::f() cannot contain body"
        );
    }

    #[test]
    fn concrete_class_with_abstract_methods() {
        assert_eq!(
            error(&AbstractClassPass, "class A { abstract function f(); }"),
            "Class A contains 1 abstract method and must therefore be declared abstract or \
             implement the remaining methods (A::f)"
        );
        assert_eq!(
            error(&AbstractClassPass, "class A { abstract function f(); abstract function g(); }"),
            "Class A contains 2 abstract methods and must therefore be declared abstract or \
             implement the remaining methods (A::f, A::g)"
        );
    }

    #[test]
    fn bodies_where_they_belong() {
        assert_eq!(
            error(&AbstractClassPass, "interface I { function f() {} }"),
            "Interface function I::f() cannot contain body"
        );
        assert_eq!(
            error(&AbstractClassPass, "class A { function f(); }"),
            "Non-abstract method A::f() must contain body"
        );
    }

    #[test]
    fn valid_classes() {
        for src in [
            "abstract class A { abstract function f(); function g() {} }",
            "interface I { function f(); }",
            "trait T { abstract function f(); }",
            "class A { function f() {} }",
            "$a = new class { function f() {} };",
        ] {
            assert!(validate(&AbstractClassPass, src).is_ok(), "{src}");
        }
    }

    #[test]
    fn error_line_is_the_method() {
        let err = validate(&AbstractClassPass, "abstract class A {\n    abstract function f() {}\n}")
            .unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
