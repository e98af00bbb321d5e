//! Field alias resolution.
//!
//! Raw input may refer to fields by an alias (a translated label, a short
//! name). Resolvers map such names to the canonical field name; whether the
//! result actually exists is checked by the input layer.

use std::collections::HashMap;

use crate::field::FieldSet;

/// Maps a raw field name to its canonical name.
///
/// Implementations return the input unchanged when they don't know the name.
pub trait FieldAliasResolver {
    fn resolve_field_name(&self, field_set: &FieldSet, name: &str) -> String;
}

impl<R: FieldAliasResolver + ?Sized> FieldAliasResolver for &R {
    fn resolve_field_name(&self, field_set: &FieldSet, name: &str) -> String {
        (**self).resolve_field_name(field_set, name)
    }
}

impl<R: FieldAliasResolver + ?Sized> FieldAliasResolver for Box<R> {
    fn resolve_field_name(&self, field_set: &FieldSet, name: &str) -> String {
        (**self).resolve_field_name(field_set, name)
    }
}

/// Resolver that performs no aliasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAliasResolver;

impl FieldAliasResolver for NoopAliasResolver {
    fn resolve_field_name(&self, _field_set: &FieldSet, name: &str) -> String {
        name.to_string()
    }
}

/// Static alias table, scoped per field set name.
///
/// # Example
///
/// ```
/// use quarry::{AliasMap, FieldAliasResolver, FieldConfig, FieldSet};
///
/// let set = FieldSet::new("invoice").with_field(FieldConfig::new("invoice_label"));
/// let aliases = AliasMap::new().with_alias("invoice", "label", "invoice_label");
///
/// assert_eq!(aliases.resolve_field_name(&set, "label"), "invoice_label");
/// assert_eq!(aliases.resolve_field_name(&set, "other"), "other");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    aliases: HashMap<String, HashMap<String, String>>,
}

impl AliasMap {
    pub fn new() -> Self {
        AliasMap::default()
    }

    pub fn with_alias(
        mut self,
        field_set: impl Into<String>,
        alias: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.aliases
            .entry(field_set.into())
            .or_default()
            .insert(alias.into(), field.into());
        self
    }
}

impl FieldAliasResolver for AliasMap {
    fn resolve_field_name(&self, field_set: &FieldSet, name: &str) -> String {
        self.aliases
            .get(field_set.name())
            .and_then(|aliases| aliases.get(name))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Tries resolvers in order; the first answer present in the field set wins.
#[derive(Default)]
pub struct ChainAliasResolver {
    resolvers: Vec<Box<dyn FieldAliasResolver + Send + Sync>>,
}

impl ChainAliasResolver {
    pub fn new() -> Self {
        ChainAliasResolver::default()
    }

    pub fn with(mut self, resolver: impl FieldAliasResolver + Send + Sync + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }
}

impl FieldAliasResolver for ChainAliasResolver {
    fn resolve_field_name(&self, field_set: &FieldSet, name: &str) -> String {
        self.resolvers
            .iter()
            .map(|resolver| resolver.resolve_field_name(field_set, name))
            .find(|resolved| field_set.has(resolved))
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldConfig;

    fn field_set() -> FieldSet {
        FieldSet::new("invoice")
            .with_field(FieldConfig::new("invoice_label"))
            .with_field(FieldConfig::new("invoice_customer"))
    }

    #[test]
    fn alias_map_is_scoped_to_field_set() {
        let aliases = AliasMap::new().with_alias("customer", "label", "c_label");
        assert_eq!(aliases.resolve_field_name(&field_set(), "label"), "label");
    }

    #[test]
    fn chain_picks_first_existing_answer() {
        let label = |to: &str| AliasMap::new().with_alias("invoice", "label", to);
        let chain = ChainAliasResolver::new()
            .with(label("no_such_field"))
            .with(label("invoice_label"));

        assert_eq!(
            chain.resolve_field_name(&field_set(), "label"),
            "invoice_label"
        );
        assert_eq!(chain.resolve_field_name(&field_set(), "unknown"), "unknown");
    }

    #[test]
    fn noop_returns_input() {
        assert_eq!(
            NoopAliasResolver.resolve_field_name(&field_set(), "anything"),
            "anything"
        );
    }
}
