//! Cross-turn state owned by the orchestrator.
//!
//! Rewrite passes write it while a turn is cleaned; validation passes, the
//! name resolver and REPL commands read it.

use std::collections::{BTreeMap, HashMap};

use rephp_parser::ast::{Name, NameKind, UseKind};

use crate::error::FatalError;

/// One recorded `use` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The alias as the user spelled it.
    pub alias: String,
    /// Fully qualified target.
    pub target: Name,
}

/// Aliases in effect for one namespace, keyed by kind and lowercased alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<(UseKind, String), Alias>,
}

impl AliasTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `alias` to `target`. Rebinding to the same target is a no-op;
    /// rebinding to a different one is an alias collision.
    pub fn insert(&mut self, kind: UseKind, alias: &str, target: Name) -> Result<(), FatalError> {
        let key = (kind, alias.to_ascii_lowercase());
        let target = Name::fully_qualified(&target.joined());
        if let Some(existing) = self.entries.get(&key) {
            if existing.target.joined().eq_ignore_ascii_case(&target.joined()) {
                return Ok(());
            }
            return Err(FatalError::new(
                format!(
                    "Cannot use {} as {alias} because the name is already in use",
                    target.joined()
                ),
                None,
            ));
        }
        self.entries.insert(
            key,
            Alias {
                alias: alias.to_string(),
                target,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn get(&self, kind: UseKind, alias: &str) -> Option<&Alias> {
        self.entries.get(&(kind, alias.to_ascii_lowercase()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (UseKind, &Alias)> {
        self.entries.iter().map(|((kind, _), alias)| (*kind, alias))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Class aliases as `lowercased alias -> fully qualified name`.
    #[must_use]
    pub fn class_aliases(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter(|((kind, _), _)| *kind == UseKind::Normal)
            .map(|((_, key), alias)| (key.clone(), alias.target.joined()))
            .collect()
    }
}

/// Lowercased key of a namespace; the global namespace is `""`.
#[must_use]
pub fn namespace_key(namespace: Option<&Name>) -> String {
    namespace.map_or_else(String::new, |ns| ns.joined().to_ascii_lowercase())
}

/// Session state threaded through every pass.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    current_namespace: Option<Name>,
    aliases: HashMap<String, AliasTable>,
    messages: Vec<String>,
    /// Session-wide `strict_types` flag.
    pub strict_types: bool,
}

impl PipelineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_namespace(&self) -> Option<&Name> {
        self.current_namespace.as_ref()
    }

    /// Set or clear the current namespace. An empty name clears it.
    pub fn set_namespace(&mut self, namespace: Option<Name>) {
        self.current_namespace = namespace
            .filter(|ns| !ns.parts.is_empty())
            .map(|ns| Name::new(ns.parts, NameKind::Normal));
    }

    #[must_use]
    pub fn aliases(&self, namespace: Option<&Name>) -> Option<&AliasTable> {
        self.aliases.get(&namespace_key(namespace))
    }

    pub fn aliases_mut(&mut self, namespace: Option<&Name>) -> &mut AliasTable {
        self.aliases.entry(namespace_key(namespace)).or_default()
    }

    pub fn set_aliases(&mut self, namespace: Option<&Name>, table: AliasTable) {
        self.aliases.insert(namespace_key(namespace), table);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_keys_are_case_insensitive() {
        let mut table = AliasTable::new();
        table
            .insert(UseKind::Normal, "Shell", Name::parse("Psy\\Shell"))
            .unwrap();
        let alias = table.get(UseKind::Normal, "SHELL").unwrap();
        assert_eq!(alias.target.to_string(), "\\Psy\\Shell");
        assert!(table.get(UseKind::Function, "shell").is_none());
    }

    #[test]
    fn rebinding_same_target_is_allowed() {
        let mut table = AliasTable::new();
        table.insert(UseKind::Normal, "C", Name::parse("A\\B")).unwrap();
        table.insert(UseKind::Normal, "c", Name::parse("\\a\\b")).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rebinding_other_target_collides() {
        let mut table = AliasTable::new();
        table.insert(UseKind::Normal, "C", Name::parse("A\\B")).unwrap();
        let err = table
            .insert(UseKind::Normal, "C", Name::parse("X\\Y"))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Cannot use X\\Y as C because the name is already in use"
        );
    }

    #[test]
    fn namespace_tables_are_separate() {
        let mut state = PipelineState::new();
        let foo = Name::parse("Foo");
        state
            .aliases_mut(Some(&foo))
            .insert(UseKind::Normal, "S", Name::parse("StdClass"))
            .unwrap();
        assert!(state.aliases(None).is_none());
        assert_eq!(state.aliases(Some(&Name::parse("FOO"))).unwrap().len(), 1);
    }

    #[test]
    fn empty_namespace_clears() {
        let mut state = PipelineState::new();
        state.set_namespace(Some(Name::parse("Foo\\Bar")));
        assert_eq!(state.current_namespace().unwrap().joined(), "Foo\\Bar");
        state.set_namespace(Some(Name::new(vec![], NameKind::Normal)));
        assert!(state.current_namespace().is_none());
    }
}
