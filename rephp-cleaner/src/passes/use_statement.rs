//! Carry `use` aliases over to later turns.
//!
//! Every turn is parsed on its own, so aliases typed earlier would be lost.
//! Real `use` statements are recorded in the session's alias table and
//! removed; names in the turn that start with a known alias are rewritten to
//! their fully qualified form, and the whole table is re-declared at the top
//! of each scope.

use rephp_parser::ast::{Name, NameKind, Program, Spanned, Stmt, UseDecl, UseItem};
use tracing::debug;

use super::{insertion_point, synthetic_span, RewriteContext, RewritePass};
use crate::error::{CleanError, FatalError};
use crate::resolve::resolve_alias;
use crate::state::AliasTable;
use crate::visit::{walk_stmt_mut, NameRole, VisitorMut};

pub struct UseStatementPass;

struct Resolver<'a> {
    table: &'a AliasTable,
}

impl VisitorMut for Resolver<'_> {
    fn visit_name_mut(&mut self, name: &mut Name, role: NameRole) {
        if let Some(resolved) = resolve_alias(name, role, self.table) {
            *name = resolved;
        }
    }
}

/// Record the `use` statements of one scope and drop them from it.
fn record_uses(
    stmts: &mut Vec<Spanned<Stmt>>,
    namespace: Option<&Name>,
    cx: &mut RewriteContext<'_>,
) -> Result<(), CleanError> {
    let mut kept = Vec::with_capacity(stmts.len());
    for (stmt, span) in std::mem::take(stmts) {
        let Stmt::Use(decl) = stmt else {
            kept.push((stmt, span));
            continue;
        };
        for item in &decl.items {
            let mut parts = decl.prefix.as_ref().map(|p| p.parts.clone()).unwrap_or_default();
            parts.extend(item.name.parts.iter().cloned());
            let kind = item.kind.unwrap_or(decl.kind);
            let alias = item.alias_name();
            debug!(alias, target = %parts.join("\\"), "recording use");
            let line = cx.line(&span);
            cx.state
                .aliases_mut(namespace)
                .insert(kind, alias, Name::new(parts, NameKind::FullyQualified))
                .map_err(|err| CleanError::AliasCollision(FatalError::new(err.message, Some(line))))?;
        }
    }
    *stmts = kept;
    Ok(())
}

/// One `use` statement per recorded alias.
fn synthesized_uses(table: &AliasTable, at: usize) -> Vec<Spanned<Stmt>> {
    table
        .iter()
        .map(|(kind, alias)| {
            let name = Name::new(alias.target.parts.clone(), NameKind::Normal);
            let explicit = (alias.alias != name.last()).then(|| alias.alias.clone());
            (
                Stmt::Use(UseDecl {
                    kind,
                    prefix: None,
                    items: vec![UseItem {
                        name,
                        alias: explicit,
                        kind: None,
                    }],
                }),
                synthetic_span(at),
            )
        })
        .collect()
}

/// Resolve and re-declare aliases in the statements of one scope. Namespace
/// statements nested in `stmts` are left to their own scope.
fn apply_scope(stmts: &mut Vec<Spanned<Stmt>>, table: &AliasTable) {
    if table.is_empty() {
        return;
    }
    let mut resolver = Resolver { table };
    for stmt in stmts.iter_mut() {
        if !matches!(stmt.0, Stmt::Namespace(_)) {
            walk_stmt_mut(&mut resolver, stmt);
        }
    }
    if stmts.iter().all(|(stmt, _)| matches!(stmt, Stmt::Namespace(_))) {
        return;
    }
    let at = insertion_point(stmts);
    let offset = stmts.get(at).map_or(0, |(_, span)| span.start);
    stmts.splice(at..at, synthesized_uses(table, offset));
}

impl RewritePass for UseStatementPass {
    fn name(&self) -> &'static str {
        "use_statement"
    }

    fn rewrite(&mut self, program: &mut Program, cx: &mut RewriteContext<'_>) -> Result<(), CleanError> {
        let has_namespace = program
            .stmts
            .iter()
            .any(|(stmt, _)| matches!(stmt, Stmt::Namespace(_)));
        let top_namespace = if has_namespace {
            None
        } else {
            cx.state.current_namespace().cloned()
        };

        record_uses(&mut program.stmts, top_namespace.as_ref(), cx)?;
        let table = cx.state.aliases(top_namespace.as_ref()).cloned().unwrap_or_default();
        apply_scope(&mut program.stmts, &table);

        for (stmt, _) in &mut program.stmts {
            let Stmt::Namespace(ns) = stmt else {
                continue;
            };
            record_uses(&mut ns.stmts, ns.name.as_ref(), cx)?;
            let table = cx.state.aliases(ns.name.as_ref()).cloned().unwrap_or_default();
            apply_scope(&mut ns.stmts, &table);
        }
        Ok(())
    }
}
