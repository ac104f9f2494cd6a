//! Scoped prefix to IRI mappings.
//!
//! Both the TriG graph blocks and the RDFa element recursion need to undo
//! namespace declarations on scope exit, including declarations that
//! shadowed an outer binding. The map keeps an undo log of
//! `(prefix, previous value)` records so that rollback costs only the
//! number of bindings changed inside the scope.

use std::collections::hash_map::HashMap;

/// A point in the undo log to roll back to.
///
/// Marks must be restored in reverse order of creation.
#[derive(Debug, Clone, Copy)]
pub struct ScopeMark(usize);

/// A prefix to IRI mapping with scoped rollback.
///
/// ```
/// use tern_api::scope::NamespaceScope;
///
/// let mut scope = NamespaceScope::default();
/// scope.bind("ex", "http://example.com/ns#");
/// let mark = scope.mark();
/// scope.bind("ex", "http://example.com/other#");
/// scope.restore(mark);
/// assert_eq!(Some("http://example.com/ns#"), scope.get("ex"));
/// ```
#[derive(Default, Debug, Clone)]
pub struct NamespaceScope {
    bindings: HashMap<String, String>,
    undo: Vec<(String, Option<String>)>,
}

impl NamespaceScope {
    /// Binds a prefix, recording the shadowed binding if any.
    pub fn bind(&mut self, prefix: &str, iri: &str) {
        let previous = self.bindings.insert(prefix.to_owned(), iri.to_owned());
        self.undo.push((prefix.to_owned(), previous));
    }

    /// The IRI currently bound to a prefix.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(|iri| iri.as_str())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.bindings.contains_key(prefix)
    }

    /// Opens a scope: every binding made after this call is undone by
    /// [`restore`](NamespaceScope::restore) with the returned mark.
    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.undo.len())
    }

    /// Rolls back every binding made since `mark`, reinstating shadowed
    /// bindings exactly.
    pub fn restore(&mut self, mark: ScopeMark) {
        while self.undo.len() > mark.0 {
            let (prefix, previous) = match self.undo.pop() {
                Some(record) => record,
                None => break,
            };
            match previous {
                Some(iri) => {
                    self.bindings.insert(prefix, iri);
                }
                None => {
                    self.bindings.remove(&prefix);
                }
            }
        }
    }

    /// Iterates over the currently visible bindings, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
