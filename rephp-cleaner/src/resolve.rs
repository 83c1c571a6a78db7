//! Name qualification and alias lookup.

use rephp_parser::ast::{Name, NameKind, UseKind};
use rephp_parser::{is_name_char, is_name_start};

use crate::state::AliasTable;
use crate::visit::NameRole;

/// `namespace\short` for a symbol declared in `namespace`, without the
/// leading `\`.
#[must_use]
pub fn qualify_declared(short: &str, namespace: Option<&Name>) -> String {
    match namespace {
        Some(ns) if !ns.parts.is_empty() => format!("{}\\{short}", ns.joined()),
        _ => short.to_string(),
    }
}

/// Fully qualified form of a class reference made inside `namespace`,
/// without the leading `\`. Unqualified class names never fall back to the
/// global namespace.
#[must_use]
pub fn qualify_class(name: &Name, namespace: Option<&Name>) -> String {
    match name.kind {
        NameKind::FullyQualified => name.joined(),
        NameKind::Normal | NameKind::Relative => qualify_declared(&name.joined(), namespace),
    }
}

/// Expand `name` through the aliases in `table`. Returns the fully qualified
/// replacement, remembering the original spelling, or `None` when no alias
/// applies.
#[must_use]
pub fn resolve_alias(name: &Name, role: NameRole, table: &AliasTable) -> Option<Name> {
    if name.kind != NameKind::Normal || name.parts.is_empty() {
        return None;
    }
    if role == NameRole::Class && name.is_special_class_name() {
        return None;
    }
    let alias = if name.parts.len() == 1 {
        let kind = match role {
            NameRole::Class => UseKind::Normal,
            NameRole::Function => UseKind::Function,
            NameRole::Constant => UseKind::Const,
        };
        table.get(kind, name.first())?
    } else {
        table.get(UseKind::Normal, name.first())?
    };
    let mut parts = alias.target.parts.clone();
    parts.extend(name.parts[1..].iter().cloned());
    Some(Name {
        parts,
        kind: NameKind::FullyQualified,
        original: Some(name.to_string()),
    })
}

/// Whether `text` is spelled like a class name: identifiers separated by
/// `\`, optionally with a leading `\`.
#[must_use]
pub fn is_valid_class_name(text: &str) -> bool {
    let body = text.strip_prefix('\\').unwrap_or(text);
    !body.is_empty()
        && body.split('\\').all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(is_name_start) && chars.all(is_name_char)
        })
}
