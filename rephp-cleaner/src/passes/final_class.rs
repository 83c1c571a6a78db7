use std::collections::HashSet;

use rephp_parser::ast::{ClassDecl, ClassKind, Name, NamespaceDecl, Program, Span};

use super::{ValidationContext, ValidationPass};
use crate::error::CleanError;
use crate::resolve::{qualify_class, qualify_declared};
use crate::visit::{walk_block, walk_class, walk_program, VisitResult, Visitor};

/// Final classes, built-in or declared, cannot be extended.
pub struct FinalClassPass;

struct Check<'a> {
    cx: &'a ValidationContext<'a>,
    namespace: Option<Name>,
    declared_final: HashSet<String>,
}

impl Check<'_> {
    fn is_final(&self, name: &str) -> bool {
        self.cx.symbols.class(name).is_some_and(|c| c.is_final)
            || self.declared_final.contains(&name.to_ascii_lowercase())
    }
}

impl Visitor for Check<'_> {
    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        self.namespace = ns.name.clone();
        walk_block(self, &ns.stmts)
    }

    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        if class.kind == ClassKind::Class {
            if let Some(parent) = class.extends.first() {
                let qualified = qualify_class(parent, self.namespace.as_ref());
                if self.is_final(&qualified) {
                    return Err(self.cx.fatal(
                        format!(
                            "Class {} may not inherit from final class ({})",
                            class.name.as_deref().unwrap_or("class@anonymous"),
                            parent.joined()
                        ),
                        span,
                    ));
                }
            }
            if let (true, Some(name)) = (class.is_final, &class.name) {
                let qualified = qualify_declared(name, self.namespace.as_ref());
                self.declared_final.insert(qualified.to_ascii_lowercase());
            }
        }
        walk_class(self, class, span)
    }
}

impl ValidationPass for FinalClassPass {
    fn name(&self) -> &'static str {
        "final_class"
    }

    fn validate(&self, program: &Program, cx: &ValidationContext<'_>) -> Result<(), CleanError> {
        let mut check = Check {
            cx,
            namespace: None,
            declared_final: HashSet::new(),
        };
        walk_program(&mut check, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{error, validate, validate_with};
    use crate::symbols::{collect_declarations, SymbolTable};

    #[test]
    fn final_builtins() {
        assert_eq!(
            error(&FinalClassPass, "class A extends Closure {}"),
            "Class A may not inherit from final class (Closure)"
        );
        assert_eq!(
            error(&FinalClassPass, "$a = new class extends \\Generator {};"),
            "Class class@anonymous may not inherit from final class (Generator)"
        );
    }

    #[test]
    fn final_classes_of_this_turn_and_earlier_ones() {
        assert_eq!(
            error(&FinalClassPass, "final class A {} class B extends A {}"),
            "Class B may not inherit from final class (A)"
        );
        assert_eq!(
            error(&FinalClassPass, "namespace N { final class A {} class B extends A {} }"),
            "Class B may not inherit from final class (A)"
        );

        let mut symbols = SymbolTable::new();
        let program = crate::passes::test_support::parse("final class Base {}");
        for decl in collect_declarations(&program) {
            symbols.insert(decl);
        }
        assert!(validate_with(&FinalClassPass, &symbols, "class C extends base {}").is_err());
    }

    #[test]
    fn open_classes() {
        for src in [
            "class A extends Exception {}",
            "class A {} class B extends A {}",
            "final class A {} class B extends \\N\\A {}",
            "interface I extends Countable {}",
        ] {
            assert!(validate(&FinalClassPass, src).is_ok(), "{src}");
        }
    }
}
