//! Expansion of `rdfa:Pattern`/`rdfa:copy` property copying.

use crate::vocab::{RDFA_COPY, RDFA_PATTERN, RDF_TYPE};
use std::collections::{HashMap, HashSet};
use tern_api::handler::RdfHandler;
use tern_api::model::{NamedNode, Subject, Term, Triple};

/// A handler wrapper implementing the
/// [HTML+RDFa property copying](https://www.w3.org/TR/html-rdfa/#property-copying)
/// vocabulary.
///
/// Triples whose subject is a declared `rdfa:Pattern` are withheld, and
/// every `rdfa:copy` reference to the pattern replays them under the
/// referencing subject instead, following chained copies. Patterns that
/// nothing copies pass through verbatim at the end of the parse.
///
/// A subject counts as a pattern from its `rdf:type rdfa:Pattern` triple
/// onwards, so the type triple has to come before the pattern's body.
/// Output generated by [`crate::RdfaParser`] from `typeof="rdfa:Pattern"`
/// markup satisfies this.
pub struct PatternCopyingHandler<H: RdfHandler> {
    inner: H,
    patterns: HashMap<Subject, Vec<(NamedNode, Term)>>,
    copies: Vec<(Subject, Term)>,
    stopped: bool,
}

impl<H: RdfHandler> PatternCopyingHandler<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            patterns: HashMap::new(),
            copies: Vec::new(),
            stopped: false,
        }
    }

    /// Unwraps the inner handler.
    pub fn into_inner(self) -> H {
        self.inner
    }

    fn is_pattern_declaration(triple: &Triple) -> bool {
        triple.predicate.iri == RDF_TYPE
            && matches!(&triple.object, Term::NamedNode(named) if named.iri == RDFA_PATTERN)
    }

    /// Replays the body of `target` under `subject`, recursing through
    /// chained copies. Returns `false` when the inner handler stops.
    fn replay(
        &mut self,
        subject: &Subject,
        target: &Subject,
        visited: &mut HashSet<Subject>,
        consumed: &mut HashSet<Subject>,
    ) -> bool {
        if !visited.insert(target.clone()) {
            return true;
        }
        consumed.insert(target.clone());
        let body = match self.patterns.get(target) {
            Some(body) => body.clone(),
            None => {
                // the reference does not point at a pattern, keep the
                // original copy triple
                return self.inner.handle_triple(Triple {
                    subject: subject.clone(),
                    predicate: NamedNode {
                        iri: RDFA_COPY.to_owned(),
                    },
                    object: Term::from(target.clone()),
                });
            }
        };
        for (predicate, object) in body {
            if !self.inner.handle_triple(Triple {
                subject: subject.clone(),
                predicate,
                object,
            }) {
                return false;
            }
        }
        let chained: Vec<Subject> = self
            .copies
            .iter()
            .filter(|(copier, _)| copier == target)
            .filter_map(|(_, object)| subject_of(object))
            .collect();
        for next in chained {
            if !self.replay(subject, &next, visited, consumed) {
                return false;
            }
        }
        true
    }

    fn flush(&mut self) -> bool {
        let copies = self.copies.clone();
        let mut consumed = HashSet::new();
        for (copier, object) in &copies {
            // copies inside a pattern body only apply through a chain
            if self.patterns.contains_key(copier) {
                continue;
            }
            let target = match subject_of(object) {
                Some(target) => target,
                None => continue,
            };
            let mut visited = HashSet::new();
            if !self.replay(copier, &target, &mut visited, &mut consumed) {
                return false;
            }
        }
        // unreferenced patterns were ordinary data after all
        let unreferenced: Vec<(Subject, Vec<(NamedNode, Term)>)> = self
            .patterns
            .iter()
            .filter(|(subject, _)| !consumed.contains(*subject))
            .map(|(subject, body)| (subject.clone(), body.clone()))
            .collect();
        for (subject, body) in unreferenced {
            if !self.inner.handle_triple(Triple {
                subject: subject.clone(),
                predicate: NamedNode {
                    iri: RDF_TYPE.to_owned(),
                },
                object: NamedNode {
                    iri: RDFA_PATTERN.to_owned(),
                }
                .into(),
            }) {
                return false;
            }
            for (predicate, object) in body {
                if !self.inner.handle_triple(Triple {
                    subject: subject.clone(),
                    predicate,
                    object,
                }) {
                    return false;
                }
            }
            for (copier, object) in &copies {
                if copier == &subject
                    && !self.inner.handle_triple(Triple {
                        subject: subject.clone(),
                        predicate: NamedNode {
                            iri: RDFA_COPY.to_owned(),
                        },
                        object: object.clone(),
                    })
                {
                    return false;
                }
            }
        }
        true
    }
}

fn subject_of(term: &Term) -> Option<Subject> {
    match term {
        Term::NamedNode(named) => Some(named.clone().into()),
        Term::BlankNode(blank) => Some(blank.clone().into()),
        _ => None,
    }
}

impl<H: RdfHandler> RdfHandler for PatternCopyingHandler<H> {
    fn start_rdf(&mut self) {
        self.inner.start_rdf();
    }

    fn end_rdf(&mut self, success: bool) {
        if success && !self.stopped {
            self.flush();
        }
        self.inner.end_rdf(success);
    }

    fn handle_triple(&mut self, triple: Triple) -> bool {
        if triple.predicate.iri == RDFA_COPY {
            self.copies.push((triple.subject, triple.object));
            return true;
        }
        if Self::is_pattern_declaration(&triple) {
            self.patterns.entry(triple.subject).or_default();
            return true;
        }
        if let Some(body) = self.patterns.get_mut(&triple.subject) {
            body.push((triple.predicate, triple.object));
            return true;
        }
        let keep_going = self.inner.handle_triple(triple);
        if !keep_going {
            self.stopped = true;
        }
        keep_going
    }

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool {
        self.inner.handle_namespace(prefix, iri)
    }

    fn handle_base_iri(&mut self, iri: &str) -> bool {
        self.inner.handle_base_iri(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_api::handler::CollectingHandler;

    fn iri(name: &str) -> NamedNode {
        NamedNode {
            iri: format!("http://example.com/{}", name),
        }
    }

    fn triple(subject: &str, predicate: &str, object: &str) -> Triple {
        Triple {
            subject: iri(subject).into(),
            predicate: iri(predicate),
            object: iri(object).into(),
        }
    }

    fn type_pattern(subject: &str) -> Triple {
        Triple {
            subject: iri(subject).into(),
            predicate: NamedNode {
                iri: RDF_TYPE.to_owned(),
            },
            object: NamedNode {
                iri: RDFA_PATTERN.to_owned(),
            }
            .into(),
        }
    }

    fn copy(subject: &str, target: &str) -> Triple {
        Triple {
            subject: iri(subject).into(),
            predicate: NamedNode {
                iri: RDFA_COPY.to_owned(),
            },
            object: iri(target).into(),
        }
    }

    fn run(triples: Vec<Triple>) -> CollectingHandler {
        let mut handler = PatternCopyingHandler::new(CollectingHandler::default());
        handler.start_rdf();
        for t in triples {
            assert!(handler.handle_triple(t));
        }
        handler.end_rdf(true);
        handler.into_inner()
    }

    #[test]
    fn copies_replay_the_pattern_body_under_the_copier() {
        let sink = run(vec![
            type_pattern("pattern"),
            triple("pattern", "name", "value"),
            triple("a", "unrelated", "x"),
            copy("a", "pattern"),
            copy("b", "pattern"),
        ]);
        assert_eq!(
            vec![
                triple("a", "unrelated", "x"),
                triple("a", "name", "value"),
                triple("b", "name", "value"),
            ],
            sink.triples
        );
    }

    #[test]
    fn chained_copies_apply_transitively() {
        let sink = run(vec![
            type_pattern("outer"),
            triple("outer", "p", "v1"),
            copy("outer", "inner"),
            type_pattern("inner"),
            triple("inner", "q", "v2"),
            copy("a", "outer"),
        ]);
        assert_eq!(
            vec![triple("a", "p", "v1"), triple("a", "q", "v2")],
            sink.triples
        );
    }

    #[test]
    fn cyclic_copies_terminate() {
        let sink = run(vec![
            type_pattern("x"),
            triple("x", "p", "v1"),
            copy("x", "y"),
            type_pattern("y"),
            triple("y", "q", "v2"),
            copy("y", "x"),
            copy("a", "x"),
        ]);
        assert_eq!(
            vec![triple("a", "p", "v1"), triple("a", "q", "v2")],
            sink.triples
        );
    }

    #[test]
    fn unreferenced_patterns_pass_through_verbatim() {
        let sink = run(vec![
            type_pattern("pattern"),
            triple("pattern", "name", "value"),
            triple("a", "p", "o"),
        ]);
        assert_eq!(
            vec![
                triple("a", "p", "o"),
                type_pattern("pattern"),
                triple("pattern", "name", "value"),
            ],
            sink.triples
        );
    }

    #[test]
    fn a_copy_of_a_non_pattern_is_kept_as_is() {
        let sink = run(vec![copy("a", "nothing")]);
        assert_eq!(vec![copy("a", "nothing")], sink.triples);
    }
}
