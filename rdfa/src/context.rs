//! Per-element evaluation state threaded through the tree walk.

use crate::vocab::TermMappings;
use oxiri::Iri;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tern_api::model::{NamedNode, Subject, Term};

/// The grammar variant an RDFa parser enforces, or how to detect it.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RdfaSyntax {
    /// RDFa 1.0: no `@prefix`/`@vocab`/`@profile`/`@datetime`, bare terms
    /// only from the fixed XHTML vocabulary, mixed content becomes an XML
    /// literal.
    Rdfa10,
    /// [RDFa Core 1.1](https://www.w3.org/TR/rdfa-core/).
    Rdfa11,
    /// Inspect the root `@version` attribute, assume 1.1 when absent.
    AutoDetect,
    /// Inspect the root `@version` attribute, assume 1.0 when absent.
    AutoDetectLegacy,
}

/// How a deferred triple relates the parent subject to the descendant
/// subject that will complete it.
#[derive(Debug, Clone)]
pub(crate) enum IncompleteTriple {
    Forward(NamedNode),
    Reverse(NamedNode),
    /// The completing subject joins the list accumulated under this
    /// predicate rather than producing a direct triple.
    List(NamedNode),
}

/// Accumulated `@inlist` members per predicate, shared between an element
/// and the descendants contributing to its lists.
pub(crate) type ListMapping = Rc<RefCell<HashMap<NamedNode, Vec<Term>>>>;

pub(crate) fn fresh_list_mapping() -> ListMapping {
    Rc::new(RefCell::new(HashMap::new()))
}

/// The evaluation context one element is processed under.
///
/// A child recursion derives a fresh value; the parent's copy is never
/// mutated, so unwinding restores its state structurally. The two shared
/// pieces are deliberate: the list mapping accumulates across the subtree
/// that owns it, and incomplete triples are completed by descendants.
#[derive(Clone)]
pub(crate) struct EvaluationContext {
    pub base_iri: Option<Iri<String>>,
    pub language: String,
    pub parent_subject: Option<Subject>,
    pub parent_object: Option<Subject>,
    pub incomplete_triples: Vec<IncompleteTriple>,
    pub list_mapping: ListMapping,
    pub local_vocabulary: TermMappings,
}

impl EvaluationContext {
    pub fn new(base_iri: Option<Iri<String>>) -> Self {
        Self {
            base_iri,
            language: String::new(),
            parent_subject: None,
            parent_object: None,
            incomplete_triples: Vec::new(),
            list_mapping: fresh_list_mapping(),
            local_vocabulary: TermMappings::new(),
        }
    }
}

/// The term and namespace mappings extracted from one profile document.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub namespaces: Vec<(String, String)>,
    pub terms: Vec<(String, String)>,
}

/// Dereferences `@profile` documents.
///
/// Retrieval is outside this crate's scope, so the default loader resolves
/// nothing and any `@profile` use skips its element's subtree with a
/// warning. Callers with an HTTP stack plug their own loader in via
/// [`crate::RdfaParser::with_profile_loader`].
pub trait ProfileLoader {
    /// Returns the profile's mappings, or `None` when the document cannot
    /// be retrieved or parsed.
    fn load(&mut self, iri: &str) -> Option<Profile>;
}

/// The default loader: every lookup fails.
#[derive(Default, Clone, Copy)]
pub struct NoProfileLoader;

impl ProfileLoader for NoProfileLoader {
    fn load(&mut self, _iri: &str) -> Option<Profile> {
        None
    }
}
