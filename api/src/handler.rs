//! Sink interfaces receiving the parse products.
//!
//! Parsers report into a handler: a `start_rdf` call, then any number of
//! triple/quad, namespace and base events, then exactly one `end_rdf` call.
//! Every `bool`-returning event may return `false` to request a clean stop:
//! the parser unwinds without error and calls `end_rdf(true)`.

use crate::model::{Quad, Triple};

/// A sink for triple-producing parsers (Turtle, N-Triples, RDFa).
pub trait RdfHandler {
    /// Called once before any other event.
    fn start_rdf(&mut self) {}

    /// Called exactly once after parsing ends.
    ///
    /// `success` is `false` only when a fatal error aborted the parse;
    /// a handler-requested stop still ends with `true`.
    fn end_rdf(&mut self, _success: bool) {}

    /// A completed triple. Returns `false` to stop parsing cleanly.
    fn handle_triple(&mut self, triple: Triple) -> bool;

    /// A namespace binding from a directive or attribute.
    fn handle_namespace(&mut self, _prefix: &str, _iri: &str) -> bool {
        true
    }

    /// A base IRI declaration.
    fn handle_base_iri(&mut self, _iri: &str) -> bool {
        true
    }
}

/// A sink for quad-producing parsers (TriG, N-Quads).
pub trait QuadRdfHandler {
    /// Called once before any other event.
    fn start_rdf(&mut self) {}

    /// Called exactly once after parsing ends. See [`RdfHandler::end_rdf`].
    fn end_rdf(&mut self, _success: bool) {}

    /// A completed quad. Returns `false` to stop parsing cleanly.
    fn handle_quad(&mut self, quad: Quad) -> bool;

    /// A namespace binding from a directive.
    fn handle_namespace(&mut self, _prefix: &str, _iri: &str) -> bool {
        true
    }

    /// A base IRI declaration.
    fn handle_base_iri(&mut self, _iri: &str) -> bool {
        true
    }
}

/// A handler accumulating everything it receives into vectors.
///
/// Mostly useful for tests and small one-shot parses:
///
/// ```
/// use tern_api::handler::{CollectingHandler, RdfHandler};
/// use tern_api::model::*;
///
/// let mut sink = CollectingHandler::default();
/// sink.start_rdf();
/// sink.handle_triple(Triple {
///     subject: NamedNode { iri: "http://example.com/s".to_owned() }.into(),
///     predicate: NamedNode { iri: "http://example.com/p".to_owned() },
///     object: NamedNode { iri: "http://example.com/o".to_owned() }.into(),
/// });
/// sink.end_rdf(true);
/// assert_eq!(1, sink.triples.len());
/// assert_eq!(Some(true), sink.ended_with);
/// ```
#[derive(Default)]
pub struct CollectingHandler {
    pub triples: Vec<Triple>,
    pub quads: Vec<Quad>,
    pub namespaces: Vec<(String, String)>,
    pub base_iris: Vec<String>,
    pub started: bool,
    pub ended_with: Option<bool>,
    /// When set, triple/quad events request a stop after this many have been received.
    pub stop_after: Option<usize>,
}

impl CollectingHandler {
    pub fn stopping_after(count: usize) -> Self {
        Self {
            stop_after: Some(count),
            ..Self::default()
        }
    }

    fn should_continue(&self, received: usize) -> bool {
        match self.stop_after {
            Some(limit) => received < limit,
            None => true,
        }
    }
}

impl RdfHandler for CollectingHandler {
    fn start_rdf(&mut self) {
        self.started = true;
    }

    fn end_rdf(&mut self, success: bool) {
        self.ended_with = Some(success);
    }

    fn handle_triple(&mut self, triple: Triple) -> bool {
        self.triples.push(triple);
        self.should_continue(self.triples.len())
    }

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool {
        self.namespaces.push((prefix.to_owned(), iri.to_owned()));
        true
    }

    fn handle_base_iri(&mut self, iri: &str) -> bool {
        self.base_iris.push(iri.to_owned());
        true
    }
}

impl QuadRdfHandler for CollectingHandler {
    fn start_rdf(&mut self) {
        self.started = true;
    }

    fn end_rdf(&mut self, success: bool) {
        self.ended_with = Some(success);
    }

    fn handle_quad(&mut self, quad: Quad) -> bool {
        self.quads.push(quad);
        self.should_continue(self.quads.len())
    }

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool {
        self.namespaces.push((prefix.to_owned(), iri.to_owned()));
        true
    }

    fn handle_base_iri(&mut self, iri: &str) -> bool {
        self.base_iris.push(iri.to_owned());
        true
    }
}
