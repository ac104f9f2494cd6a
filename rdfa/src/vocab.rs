//! Constant IRIs and the term/vocabulary mappings consulted during
//! CURIE and term resolution.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

pub const RDFA_NAMESPACE: &str = "http://www.w3.org/ns/rdfa#";
pub const RDFA_USES_VOCABULARY: &str = "http://www.w3.org/ns/rdfa#usesVocabulary";
pub const RDFA_PATTERN: &str = "http://www.w3.org/ns/rdfa#Pattern";
pub const RDFA_COPY: &str = "http://www.w3.org/ns/rdfa#copy";
pub const RDFA_JSON: &str = "http://www.w3.org/ns/rdfa#JSON";

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const XHTML_VOCAB_NAMESPACE: &str = "http://www.w3.org/1999/xhtml/vocab#";

pub const XSD_DURATION: &str = "http://www.w3.org/2001/XMLSchema#duration";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_TIME: &str = "http://www.w3.org/2001/XMLSchema#time";
pub const XSD_G_YEAR_MONTH: &str = "http://www.w3.org/2001/XMLSchema#gYearMonth";
pub const XSD_G_YEAR: &str = "http://www.w3.org/2001/XMLSchema#gYear";

/// The reserved terms of the fixed XHTML vocabulary, resolved against
/// [`XHTML_VOCAB_NAMESPACE`].
const XHTML_TERMS: &[&str] = &[
    "alternate",
    "appendix",
    "bookmark",
    "cite",
    "chapter",
    "contents",
    "copyright",
    "describedby",
    "first",
    "glossary",
    "help",
    "icon",
    "index",
    "last",
    "license",
    "meta",
    "next",
    "p3pv1",
    "prev",
    "previous",
    "related",
    "role",
    "section",
    "start",
    "stylesheet",
    "subsection",
    "top",
    "up",
];

/// The term/prefix/vocabulary mappings in force at one point of the walk.
///
/// Local mappings (from `@vocab`, `@profile`) form a chain over a default
/// vocabulary; resolution is local first, default second. Term lookup is
/// case-insensitive, matching how reserved XHTML terms are written in the
/// wild.
#[derive(Debug, Clone, Default)]
pub struct TermMappings {
    vocabulary_iri: String,
    terms: HashMap<String, String>,
    namespaces: HashMap<String, String>,
}

impl TermMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-force default vocabulary IRI, empty when none is set.
    pub fn vocabulary_iri(&self) -> &str {
        &self.vocabulary_iri
    }

    pub fn set_vocabulary_iri(&mut self, iri: &str) {
        self.vocabulary_iri = iri.to_owned();
    }

    pub fn add_term(&mut self, term: &str, iri: &str) {
        self.terms.insert(term.to_ascii_lowercase(), iri.to_owned());
    }

    pub fn add_namespace(&mut self, prefix: &str, iri: &str) {
        self.namespaces.insert(prefix.to_owned(), iri.to_owned());
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.terms.contains_key(&term.to_ascii_lowercase())
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    /// Resolves a bare term: an explicit term mapping wins, otherwise the
    /// term concatenates onto the vocabulary IRI.
    pub fn resolve_term(&self, term: &str) -> Option<String> {
        if let Some(iri) = self.terms.get(&term.to_ascii_lowercase()) {
            return Some(iri.clone());
        }
        if self.vocabulary_iri.is_empty() {
            None
        } else {
            Some(format!("{}{}", self.vocabulary_iri, term))
        }
    }

    /// Pulls every mapping of `other` into this one, `other` winning on
    /// conflicts.
    pub fn merge(&mut self, other: &TermMappings) {
        if !other.vocabulary_iri.is_empty() {
            self.vocabulary_iri = other.vocabulary_iri.clone();
        }
        for (term, iri) in &other.terms {
            self.terms.insert(term.clone(), iri.clone());
        }
        for (prefix, iri) in &other.namespaces {
            self.namespaces.insert(prefix.clone(), iri.clone());
        }
    }
}

/// The fixed XHTML+RDFa vocabulary, the default context for XHTML
/// documents and the only source of bare terms under RDFa 1.0.
pub static XHTML_VOCABULARY: Lazy<TermMappings> = Lazy::new(|| {
    let mut mappings = TermMappings::new();
    for term in XHTML_TERMS {
        mappings.add_term(term, &format!("{}{}", XHTML_VOCAB_NAMESPACE, term));
    }
    mappings
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xhtml_terms_are_case_insensitive() {
        assert!(XHTML_VOCABULARY.has_term("license"));
        assert!(XHTML_VOCABULARY.has_term("LICENSE"));
        assert_eq!(
            Some("http://www.w3.org/1999/xhtml/vocab#license".to_owned()),
            XHTML_VOCABULARY.resolve_term("License")
        );
        assert!(!XHTML_VOCABULARY.has_term("nosuchterm"));
    }

    #[test]
    fn vocabulary_iri_backs_unknown_terms() {
        let mut mappings = TermMappings::new();
        assert_eq!(None, mappings.resolve_term("name"));
        mappings.set_vocabulary_iri("http://schema.org/");
        assert_eq!(
            Some("http://schema.org/name".to_owned()),
            mappings.resolve_term("name")
        );
        mappings.add_term("name", "http://example.com/name");
        assert_eq!(
            Some("http://example.com/name".to_owned()),
            mappings.resolve_term("name")
        );
    }
}
