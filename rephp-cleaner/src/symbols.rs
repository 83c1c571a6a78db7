//! Symbol table: which classes, functions and constants exist.
//!
//! Validation passes ask it whether a name is declared. It starts out with
//! the built-ins of [`crate::builtins`] and grows with the declarations of
//! every turn the host commits.

use std::collections::{HashMap, HashSet};

use rephp_parser::ast::{
    ClassDecl, ClassKind, ClassMember, FunctionDecl, Name, Program, Spanned, Stmt,
};

use crate::builtins;
use crate::resolve::{qualify_class, qualify_declared};

/// A known class, interface or trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Fully qualified name without the leading `\`.
    pub name: String,
    pub kind: ClassKind,
    pub is_final: bool,
    pub is_abstract: bool,
    pub parent: Option<String>,
    /// Own constant names, `None` when they cannot be known statically.
    pub constants: Option<Vec<String>>,
    /// Own lowercased method names, `None` when they cannot be known statically.
    pub methods: Option<Vec<String>>,
}

impl ClassInfo {
    fn builtin(name: &str, kind: ClassKind, is_final: bool, is_abstract: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_final,
            is_abstract,
            parent: None,
            constants: None,
            methods: None,
        }
    }

    /// Describe a named class declaration found in `namespace`.
    #[must_use]
    pub fn from_decl(decl: &ClassDecl, namespace: Option<&Name>) -> Option<Self> {
        let short = decl.name.as_deref()?;
        let parent = match decl.kind {
            ClassKind::Class => decl.extends.first().map(|p| qualify_class(p, namespace)),
            ClassKind::Interface | ClassKind::Trait => None,
        };
        let uses_traits = decl
            .members
            .iter()
            .any(|(m, _)| matches!(m, ClassMember::TraitUse(_)));
        let methods = (!uses_traits).then(|| {
            decl.methods()
                .map(|m| m.name.to_ascii_lowercase())
                .collect()
        });
        let constants = (!uses_traits && decl.implements.is_empty()).then(|| {
            decl.members
                .iter()
                .filter_map(|(m, _)| match m {
                    ClassMember::Const(c) => Some(c.items.iter().map(|i| i.name.clone())),
                    _ => None,
                })
                .flatten()
                .collect()
        });
        Some(Self {
            name: qualify_declared(short, namespace),
            kind: decl.kind,
            is_final: decl.is_final,
            is_abstract: decl.is_abstract,
            parent,
            constants,
            methods,
        })
    }
}

/// A known function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Fully qualified name without the leading `\`.
    pub name: String,
    by_ref: Vec<usize>,
    variadic_by_ref_from: Option<usize>,
}

impl FunctionInfo {
    fn builtin(name: &str, positions: &[usize]) -> Self {
        let (by_ref, variadic_by_ref_from) = match positions {
            [rest @ .., last, usize::MAX] => {
                let mut by_ref = rest.to_vec();
                by_ref.push(*last);
                (by_ref, Some(*last))
            }
            _ => (positions.to_vec(), None),
        };
        Self {
            name: name.to_string(),
            by_ref,
            variadic_by_ref_from,
        }
    }

    #[must_use]
    pub fn from_decl(decl: &FunctionDecl, namespace: Option<&Name>) -> Self {
        let by_ref = decl
            .params
            .iter()
            .enumerate()
            .filter(|(_, p)| p.by_ref)
            .map(|(i, _)| i)
            .collect();
        let variadic_by_ref_from = decl
            .params
            .iter()
            .position(|p| p.variadic && p.by_ref);
        Self {
            name: qualify_declared(&decl.name, namespace),
            by_ref,
            variadic_by_ref_from,
        }
    }

    /// Whether the parameter at `position` takes its argument by reference.
    #[must_use]
    pub fn is_by_ref(&self, position: usize) -> bool {
        self.by_ref.contains(&position)
            || self
                .variadic_by_ref_from
                .is_some_and(|from| position >= from)
    }
}

/// Something a turn declares unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassInfo),
    Function(FunctionInfo),
    Constant(String),
}

/// Known symbols plus the declarations of the last cleaned turn.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    classes: HashMap<String, ClassInfo>,
    functions: HashMap<String, FunctionInfo>,
    constants: HashSet<String>,
    pending: Vec<Declaration>,
    assume_autoload: bool,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding the built-ins, with autoloading assumed.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self::empty();
        for (name, kind, is_final, is_abstract) in builtins::class_likes() {
            table.insert(Declaration::Class(ClassInfo::builtin(
                name,
                kind,
                is_final,
                is_abstract,
            )));
        }
        for &(name, positions) in builtins::FUNCTIONS {
            table.insert(Declaration::Function(FunctionInfo::builtin(name, positions)));
        }
        for name in builtins::CONSTANTS {
            table.insert(Declaration::Constant((*name).to_string()));
        }
        table
    }

    /// A table with no symbols at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
            functions: HashMap::new(),
            constants: HashSet::new(),
            pending: Vec::new(),
            assume_autoload: true,
        }
    }

    #[must_use]
    pub fn assume_autoload(&self) -> bool {
        self.assume_autoload
    }

    pub fn set_assume_autoload(&mut self, assume: bool) {
        self.assume_autoload = assume;
    }

    /// Record a declaration as existing right away.
    pub fn insert(&mut self, decl: Declaration) {
        match decl {
            Declaration::Class(info) => {
                self.classes.insert(symbol_key(&info.name), info);
            }
            Declaration::Function(info) => {
                self.functions.insert(symbol_key(&info.name), info);
            }
            Declaration::Constant(name) => {
                self.constants.insert(constant_key(&name));
            }
        }
    }

    /// Replace the pending declarations with those of the latest turn.
    pub fn set_pending(&mut self, decls: Vec<Declaration>) {
        self.pending = decls;
    }

    #[must_use]
    pub fn pending(&self) -> &[Declaration] {
        &self.pending
    }

    /// Make the pending declarations permanent. Returns how many there were.
    pub fn commit(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for decl in pending {
            self.insert(decl);
        }
        count
    }

    pub fn discard(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(&symbol_key(name))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    fn has_kind(&self, name: &str, kind: ClassKind) -> bool {
        self.class(name).is_some_and(|c| c.kind == kind)
    }

    #[must_use]
    pub fn class_exists(&self, name: &str) -> bool {
        self.has_kind(name, ClassKind::Class)
    }

    #[must_use]
    pub fn interface_exists(&self, name: &str) -> bool {
        self.has_kind(name, ClassKind::Interface)
    }

    #[must_use]
    pub fn trait_exists(&self, name: &str) -> bool {
        self.has_kind(name, ClassKind::Trait)
    }

    /// Unknown qualified names may still be loaded on first use.
    #[must_use]
    pub fn may_autoload(&self, name: &str) -> bool {
        self.assume_autoload && name.trim_start_matches('\\').contains('\\')
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(&symbol_key(name))
    }

    #[must_use]
    pub fn function_exists(&self, name: &str) -> bool {
        self.function(name).is_some()
    }

    #[must_use]
    pub fn constant_exists(&self, name: &str) -> bool {
        self.constants.contains(&constant_key(name))
    }

    /// Whether `class` or one of its ancestors declares `method`, or
    /// `__callStatic`. `None` when that cannot be known.
    #[must_use]
    pub fn method_exists(&self, class: &str, method: &str) -> Option<bool> {
        let method = method.to_ascii_lowercase();
        self.walk_ancestors(class, |info| {
            info.methods
                .as_ref()
                .map(|ms| ms.iter().any(|m| *m == method || m == "__callstatic"))
        })
    }

    /// Whether `class` or one of its ancestors declares the constant.
    #[must_use]
    pub fn class_constant_exists(&self, class: &str, constant: &str) -> Option<bool> {
        self.walk_ancestors(class, |info| {
            info.constants
                .as_ref()
                .map(|cs| cs.iter().any(|c| c == constant))
        })
    }

    fn walk_ancestors(
        &self,
        class: &str,
        mut own: impl FnMut(&ClassInfo) -> Option<bool>,
    ) -> Option<bool> {
        let mut current = self.class(class)?;
        // Bounded so an inheritance cycle cannot hang the check.
        for _ in 0..64 {
            if own(current)? {
                return Some(true);
            }
            match &current.parent {
                Some(parent) => current = self.class(parent)?,
                None => return Some(false),
            }
        }
        None
    }
}

fn symbol_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Constant names are case-sensitive; their namespace is not.
fn constant_key(name: &str) -> String {
    let name = name.trim_start_matches('\\');
    match name.rsplit_once('\\') {
        Some((ns, short)) => format!("{}\\{short}", ns.to_ascii_lowercase()),
        None => name.to_string(),
    }
}

/// Unconditional declarations of a turn: top-level ones and those directly
/// inside namespace, block and `declare` bodies.
#[must_use]
pub fn collect_declarations(program: &Program) -> Vec<Declaration> {
    let mut decls = Vec::new();
    collect_block(&program.stmts, None, &mut decls);
    decls
}

fn collect_block(
    stmts: &[Spanned<Stmt>],
    namespace: Option<&Name>,
    decls: &mut Vec<Declaration>,
) {
    for (stmt, _) in stmts {
        match stmt {
            Stmt::Namespace(ns) => collect_block(&ns.stmts, ns.name.as_ref(), decls),
            Stmt::Block(body) => collect_block(body, namespace, decls),
            Stmt::Declare(declare) => {
                if let Some(body) = &declare.body {
                    collect_block(body, namespace, decls);
                }
            }
            Stmt::Class(class) => {
                if let Some(info) = ClassInfo::from_decl(class, namespace) {
                    decls.push(Declaration::Class(info));
                }
            }
            Stmt::Function(func) => {
                decls.push(Declaration::Function(FunctionInfo::from_decl(func, namespace)));
            }
            Stmt::Const(items) => decls.extend(
                items
                    .iter()
                    .map(|item| Declaration::Constant(qualify_declared(&item.name, namespace))),
            ),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(src: &str) -> Program {
        let result = rephp_parser::parse(src);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        result.program
    }

    #[test]
    fn builtins_are_known() {
        let table = SymbolTable::new();
        assert!(table.class_exists("stdclass"));
        assert!(table.class_exists("\\Exception"));
        assert!(table.interface_exists("Countable"));
        assert!(!table.class_exists("Countable"));
        assert!(table.function_exists("STRLEN"));
        assert!(table.constant_exists("PHP_EOL"));
        assert!(!table.constant_exists("php_eol"));
        assert!(table.class("Closure").unwrap().is_final);
    }

    #[test]
    fn builtin_by_ref_positions() {
        let table = SymbolTable::new();
        assert!(table.function("sort").unwrap().is_by_ref(0));
        assert!(!table.function("sort").unwrap().is_by_ref(1));
        let sscanf = table.function("sscanf").unwrap();
        assert!(!sscanf.is_by_ref(1));
        assert!(sscanf.is_by_ref(2));
        assert!(sscanf.is_by_ref(7));
    }

    #[test]
    fn pending_declarations_commit() {
        let mut table = SymbolTable::new();
        let decls = collect_declarations(&program(
            "<?php namespace Foo; class Bar {} function baz(&$x) {} const QUX = 1;",
        ));
        assert_eq!(decls.len(), 3);
        table.set_pending(decls);
        assert!(!table.class_exists("Foo\\Bar"));
        assert_eq!(table.commit(), 3);
        assert!(table.class_exists("foo\\bar"));
        assert!(table.function("Foo\\baz").unwrap().is_by_ref(0));
        assert!(table.constant_exists("FOO\\QUX"));
        assert!(!table.constant_exists("Foo\\qux"));
    }

    #[test]
    fn conditional_declarations_are_not_collected() {
        let decls = collect_declarations(&program("<?php if (true) { class A {} } function f() { class B {} }"));
        assert_eq!(decls.len(), 1);
        assert!(matches!(&decls[0], Declaration::Function(f) if f.name == "f"));
    }

    #[test]
    fn discard_drops_pending() {
        let mut table = SymbolTable::new();
        table.set_pending(collect_declarations(&program("<?php class A {}")));
        table.discard();
        assert_eq!(table.commit(), 0);
        assert!(!table.class_exists("A"));
    }

    #[test]
    fn methods_and_constants_follow_parents() {
        let mut table = SymbolTable::new();
        table.set_pending(collect_declarations(&program(
            "<?php class A { const X = 1; function f() {} } class B extends A { function g() {} }",
        )));
        table.commit();
        assert_eq!(table.method_exists("B", "F"), Some(true));
        assert_eq!(table.method_exists("B", "h"), Some(false));
        assert_eq!(table.class_constant_exists("B", "X"), Some(true));
        assert_eq!(table.class_constant_exists("B", "Y"), Some(false));
        assert_eq!(table.method_exists("Exception", "getMessage"), None);
    }

    #[test]
    fn autoload_applies_to_qualified_names() {
        let mut table = SymbolTable::new();
        assert!(table.may_autoload("\\Vendor\\Thing"));
        assert!(!table.may_autoload("Thing"));
        table.set_assume_autoload(false);
        assert!(!table.may_autoload("Vendor\\Thing"));
    }
}
