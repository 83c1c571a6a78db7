//! Automatic `use` statements for unambiguous short class names.

use std::collections::{BTreeMap, HashSet};

use rephp_parser::ast::{Name, NameKind, Program, Span, Spanned, Stmt, UseDecl, UseItem, UseKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{insertion_point, synthetic_span, RewriteContext, RewritePass};
use crate::error::CleanError;
use crate::resolve::qualify_declared;
use crate::state::PipelineState;
use crate::symbols::SymbolTable;
use crate::visit::{walk_block, NameRole, VisitResult, Visitor};

/// Which namespaces implicit `use` statements may import from. Both lists
/// hold namespace prefixes, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicitUseOptions {
    pub include_namespaces: Vec<String>,
    pub exclude_namespaces: Vec<String>,
}

impl ImplicitUseOptions {
    /// The pass only runs when at least one filter is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.include_namespaces.is_empty() || !self.exclude_namespaces.is_empty()
    }
}

/// Imports an unqualified class name when exactly one known namespaced
/// class-like has that short name.
pub struct ImplicitUsePass {
    include: Vec<String>,
    exclude: Vec<String>,
}

fn normalize_prefixes(namespaces: &[String]) -> Vec<String> {
    namespaces
        .iter()
        .map(|ns| format!("{}\\", ns.trim_matches('\\').to_ascii_lowercase()))
        .collect()
}

impl ImplicitUsePass {
    #[must_use]
    pub fn new(options: ImplicitUseOptions) -> Self {
        Self {
            include: normalize_prefixes(&options.include_namespaces),
            exclude: normalize_prefixes(&options.exclude_namespaces),
        }
    }

    fn admits(&self, fqn: &str) -> bool {
        if !fqn.contains('\\') {
            return false;
        }
        let lower = fqn.to_ascii_lowercase();
        if self.exclude.iter().any(|ns| lower.starts_with(ns.as_str())) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|ns| lower.starts_with(ns.as_str()))
    }

    /// Lowercased short name to its single candidate, or `None` when the
    /// short name is ambiguous.
    fn short_name_map(&self, symbols: &SymbolTable) -> BTreeMap<String, Option<String>> {
        let mut map: BTreeMap<String, Option<String>> = BTreeMap::new();
        for class in symbols.classes().filter(|c| self.admits(&c.name)) {
            let short = class
                .name
                .rsplit('\\')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            map.entry(short)
                .and_modify(|existing| {
                    if existing
                        .as_deref()
                        .is_some_and(|e| !e.eq_ignore_ascii_case(&class.name))
                    {
                        *existing = None;
                    }
                })
                .or_insert_with(|| Some(class.name.clone()));
        }
        map
    }
}

/// Unqualified class references of one scope, in order of appearance.
#[derive(Default)]
struct ShortNames {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl Visitor for ShortNames {
    fn visit_name(&mut self, name: &Name, role: NameRole, _span: &Span) -> VisitResult {
        if role == NameRole::Class
            && name.is_unqualified()
            && !name.is_special_class_name()
            && self.seen.insert(name.first().to_ascii_lowercase())
        {
            self.names.push(name.first().to_string());
        }
        Ok(())
    }
}

/// Lowercased aliases bound by the `use` statements of a scope.
fn scope_aliases(stmts: &[Spanned<Stmt>]) -> HashSet<String> {
    let mut aliases = HashSet::new();
    for (stmt, _) in stmts {
        if let Stmt::Use(decl) = stmt {
            for item in &decl.items {
                aliases.insert(item.alias_name().to_ascii_lowercase());
            }
        }
    }
    aliases
}

impl ImplicitUsePass {
    fn imports_for(
        &self,
        stmts: &[Spanned<Stmt>],
        namespace: Option<&Name>,
        state: &PipelineState,
        symbols: &SymbolTable,
        map: &BTreeMap<String, Option<String>>,
    ) -> Result<Vec<String>, CleanError> {
        let mut names = ShortNames::default();
        walk_block(&mut names, stmts)?;
        let aliases = scope_aliases(stmts);
        let session = state.aliases(namespace);

        let mut imports: Vec<String> = names
            .names
            .iter()
            .filter(|short| {
                let lower = short.to_ascii_lowercase();
                symbols.class(short).is_none()
                    && !aliases.contains(&lower)
                    && session.map_or(true, |t| t.get(UseKind::Normal, short).is_none())
                    && namespace.map_or(true, |ns| {
                        symbols.class(&qualify_declared(short, Some(ns))).is_none()
                    })
            })
            .filter_map(|short| map.get(&short.to_ascii_lowercase()).cloned().flatten())
            .collect();
        imports.sort();
        imports.dedup();
        Ok(imports)
    }
}

fn use_stmt(fqn: &str, at: usize) -> Spanned<Stmt> {
    (
        Stmt::Use(UseDecl {
            kind: UseKind::Normal,
            prefix: None,
            items: vec![UseItem {
                name: Name::new(Name::fully_qualified(fqn).parts, NameKind::Normal),
                alias: None,
                kind: None,
            }],
        }),
        synthetic_span(at),
    )
}

fn inject(stmts: &mut Vec<Spanned<Stmt>>, imports: &[String], state: &mut PipelineState) {
    if imports.is_empty() {
        return;
    }
    let listing = imports
        .iter()
        .map(|fqn| format!("use {fqn};"))
        .collect::<Vec<_>>()
        .join(" ");
    debug!(%listing, "implicit imports");
    state.log(format!("added use statements: {listing}"));

    let at = insertion_point(stmts);
    let offset = stmts.get(at).map_or(0, |(_, span)| span.start);
    stmts.splice(at..at, imports.iter().map(|fqn| use_stmt(fqn, offset)));
}

impl RewritePass for ImplicitUsePass {
    fn name(&self) -> &'static str {
        "implicit_use"
    }

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        let map = self.short_name_map(cx.symbols);
        if map.is_empty() {
            return Ok(());
        }

        let has_namespace = program
            .stmts
            .iter()
            .any(|(stmt, _)| matches!(stmt, Stmt::Namespace(_)));
        if !has_namespace {
            let imports = self.imports_for(&program.stmts, None, cx.state, cx.symbols, &map)?;
            inject(&mut program.stmts, &imports, cx.state);
            return Ok(());
        }

        for (stmt, _) in &mut program.stmts {
            if let Stmt::Namespace(ns) = stmt {
                let imports =
                    self.imports_for(&ns.stmts, ns.name.as_ref(), cx.state, cx.symbols, &map)?;
                inject(&mut ns.stmts, &imports, cx.state);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::parse;
    use crate::symbols::collect_declarations;
    use rephp_parser::LineIndex;

    fn symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        let program = parse(
            "namespace App\\Model { class User {} interface Post {} } \
             namespace App\\Http { class Request {} } \
             namespace Vendor\\Http { class Request {} } \
             namespace Vendor\\Util { trait Str {} }",
        );
        for decl in collect_declarations(&program) {
            symbols.insert(decl);
        }
        symbols
    }

    fn run(options: ImplicitUseOptions, state: &mut PipelineState, src: &str) -> String {
        let mut program = parse(src);
        let source = format!("<?php {src}\n");
        let lines = LineIndex::new(&source);
        let symbols = symbols();
        let mut cx = RewriteContext {
            state,
            symbols: &symbols,
            lines: &lines,
        };
        ImplicitUsePass::new(options).rewrite(&mut program, &mut cx).unwrap();
        rephp_parser::format_program(&program)
    }

    fn include(ns: &[&str]) -> ImplicitUseOptions {
        ImplicitUseOptions {
            include_namespaces: ns.iter().map(ToString::to_string).collect(),
            exclude_namespaces: Vec::new(),
        }
    }

    #[test]
    fn disabled_without_filters() {
        assert!(!ImplicitUseOptions::default().is_enabled());
        assert!(include(&["App"]).is_enabled());
    }

    #[test]
    fn imports_unique_short_names() {
        let mut state = PipelineState::new();
        let out = run(include(&["App\\"]), &mut state, "new User(); Post::find();");
        assert_eq!(
            out,
            "use App\\Model\\Post;\nuse App\\Model\\User;\nnew User();\nPost::find();"
        );
        assert_eq!(
            state.messages(),
            ["added use statements: use App\\Model\\Post; use App\\Model\\User;"]
        );
    }

    #[test]
    fn ambiguous_names_are_skipped() {
        let mut state = PipelineState::new();
        let out = run(include(&["App", "vendor"]), &mut state, "new Request();");
        assert_eq!(out, "new Request();");

        let out = run(include(&["app"]), &mut state, "new Request();");
        assert_eq!(out, "use App\\Http\\Request;\nnew Request();");
    }

    #[test]
    fn exclusions_and_existing_aliases() {
        let mut state = PipelineState::new();
        let options = ImplicitUseOptions {
            include_namespaces: Vec::new(),
            exclude_namespaces: vec!["App\\Http".to_string()],
        };
        let out = run(options.clone(), &mut state, "new Request(); new Str();");
        assert_eq!(
            out,
            "use Vendor\\Http\\Request;\nuse Vendor\\Util\\Str;\nnew Request();\nnew Str();"
        );

        let out = run(options, &mut state, "use Foo\\Str; new Str();");
        assert_eq!(out, "use Foo\\Str;\nnew Str();");
    }

    #[test]
    fn global_and_same_namespace_classes_win() {
        let mut state = PipelineState::new();
        let out = run(include(&["App"]), &mut state, "new Exception(); new stdClass();");
        assert_eq!(out, "new Exception();\nnew stdClass();");

        let out = run(include(&["App"]), &mut state, "namespace App\\Model { new User(); new Request(); }");
        assert_eq!(
            out,
            "namespace App\\Model {\n    use App\\Http\\Request;\n    new User();\n    new Request();\n}"
        );
    }
}
