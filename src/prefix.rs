//! Prefix table: prefix name ↔ namespace IRI.
//!
//! Prefix names are normalized to end with `:` (so `"whatever"` and
//! `"whatever:"` address the same entry). Expansion of `prefix:local` picks the
//! longest registered prefix name the text starts with; abbreviation picks the
//! longest namespace the IRI starts with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::vocab;

/// Mapping from prefix names to namespace IRIs. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixManager {
    prefixes: BTreeMap<String, String>,
}

/// Normalize a prefix name so it always ends with a single `:`.
fn normalize(short_form: &str) -> String {
    let trimmed = short_form.trim().trim_end_matches(':');
    format!("{trimmed}:")
}

impl PrefixManager {
    /// Create an empty prefix table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table pre-populated with the `owl:`, `rdf:`, `rdfs:` and `xsd:` prefixes.
    pub fn with_standard_prefixes() -> Self {
        let mut pm = Self::new();
        pm.add_prefix(vocab::OWL, "owl");
        pm.add_prefix(vocab::RDF, "rdf");
        pm.add_prefix(vocab::RDFS, "rdfs");
        pm.add_prefix(vocab::XSD, "xsd");
        pm
    }

    /// Register (or replace) a prefix. Returns the previous namespace, if any.
    pub fn add_prefix(&mut self, namespace: &str, short_form: &str) -> Option<String> {
        self.prefixes
            .insert(normalize(short_form), namespace.to_string())
    }

    /// Look up the namespace registered for a prefix name (`"x"` or `"x:"`).
    pub fn prefix(&self, short_form: &str) -> Option<&str> {
        self.prefixes.get(&normalize(short_form)).map(String::as_str)
    }

    pub fn contains(&self, short_form: &str) -> bool {
        self.prefixes.contains_key(&normalize(short_form))
    }

    /// Expand `prefix:local` using the longest matching prefix name.
    ///
    /// Returns `None` when no registered prefix name matches.
    pub fn expand(&self, text: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(name, _)| text.starts_with(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, ns)| format!("{ns}{}", &text[name.len()..]))
    }

    /// Abbreviate an IRI to `prefix:local` using the longest matching namespace.
    pub fn abbreviate(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()) && iri.len() > ns.len())
            .max_by_key(|(_, ns)| ns.len())
            .map(|(name, ns)| format!("{name}{}", &iri[ns.len()..]))
    }

    /// Iterate `(prefix name, namespace)` pairs, prefix names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(name, ns)| (name.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_names_are_normalized() {
        let mut pm = PrefixManager::new();
        pm.add_prefix("http://whatever.com/", "whatever");
        assert_eq!(pm.prefix("whatever:"), Some("http://whatever.com/"));
        assert_eq!(pm.prefix("whatever"), Some("http://whatever.com/"));
        assert!(pm.prefix("other").is_none());
    }

    #[test]
    fn expand_uses_longest_prefix() {
        let mut pm = PrefixManager::new();
        pm.add_prefix("http://a.org/", "ex");
        pm.add_prefix("http://b.org/", "ex:sub");
        assert_eq!(pm.expand("ex:Lion").as_deref(), Some("http://a.org/Lion"));
        assert_eq!(pm.expand("ex:sub:Lion").as_deref(), Some("http://b.org/Lion"));
        assert!(pm.expand("zz:Lion").is_none());
    }

    #[test]
    fn abbreviate_uses_longest_namespace() {
        let mut pm = PrefixManager::new();
        pm.add_prefix("http://example.org/", "ex");
        pm.add_prefix("http://example.org/bio/", "bio");
        assert_eq!(
            pm.abbreviate("http://example.org/bio/Cell").as_deref(),
            Some("bio:Cell")
        );
        assert_eq!(
            pm.abbreviate("http://example.org/Lion").as_deref(),
            Some("ex:Lion")
        );
        assert!(pm.abbreviate("http://elsewhere.org/X").is_none());
    }

    #[test]
    fn replacing_a_prefix_returns_old_namespace() {
        let mut pm = PrefixManager::new();
        assert!(pm.add_prefix("http://a.org/", "ex").is_none());
        assert_eq!(pm.add_prefix("http://b.org/", "ex:").as_deref(), Some("http://a.org/"));
        assert_eq!(pm.len(), 1);
    }

    #[test]
    fn standard_prefixes_present() {
        let pm = PrefixManager::with_standard_prefixes();
        assert_eq!(pm.prefix("owl"), Some(vocab::OWL));
        assert_eq!(
            pm.expand("rdfs:label").as_deref(),
            Some(vocab::RDFS_LABEL)
        );
    }
}
