use tern_api::handler::CollectingHandler;
use tern_api::model::{Literal, NamedNode, Subject, Term, Triple};
use tern_rdfa::dom::{Document, SimpleTree};
use tern_rdfa::vocab;
use tern_rdfa::{PatternCopyingHandler, RdfaParser, RdfaSyntax};

const BASE: &str = "http://example.com/doc";
const EX: &str = "http://example.com/ns#";

fn iri(iri: &str) -> NamedNode {
    NamedNode {
        iri: iri.to_owned(),
    }
}

fn ex(name: &str) -> NamedNode {
    iri(&format!("{}{}", EX, name))
}

fn doc(fragment: &str) -> NamedNode {
    iri(&format!("{}#{}", BASE, fragment))
}

fn simple(value: &str) -> Term {
    Literal::Simple {
        value: value.to_owned(),
    }
    .into()
}

/// An `<html><body/></html>` skeleton with an `ex` prefix declared on the
/// root. Returns the tree and the body handle.
fn skeleton() -> (SimpleTree, usize) {
    let mut tree = SimpleTree::new("html");
    tree.set_attribute(tree.root(), "prefix", &format!("ex: {}", EX));
    let body = tree.append_element(tree.root(), "body");
    (tree, body)
}

fn parse_as(tree: &mut SimpleTree, syntax: RdfaSyntax) -> CollectingHandler {
    let mut sink = CollectingHandler::default();
    let mut parser = RdfaParser::with_base_iri(syntax, BASE).unwrap();
    parser.parse(tree, &mut sink).unwrap();
    assert_eq!(Some(true), sink.ended_with);
    sink
}

fn parse(tree: &mut SimpleTree) -> CollectingHandler {
    parse_as(tree, RdfaSyntax::Rdfa11)
}

#[test]
fn typeof_with_about_types_the_subject() {
    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "typeof", "ex:T");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("a").into(),
            predicate: iri(vocab::RDF_TYPE),
            object: ex("T").into(),
        }],
        sink.triples
    );
    assert_eq!(vec![("ex".to_owned(), EX.to_owned())], sink.namespaces);
}

#[test]
fn content_attribute_with_inherited_language() {
    let (mut tree, body) = skeleton();
    tree.set_attribute(tree.root(), "lang", "en");
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "property", "ex:name");
    tree.set_attribute(div, "content", "Alice");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("a").into(),
            predicate: ex("name"),
            object: Literal::LanguageTaggedString {
                value: "Alice".to_owned(),
                language: "en".to_owned(),
            }
            .into(),
        }],
        sink.triples
    );
}

#[test]
fn explicit_datatype_types_the_text_content() {
    let (mut tree, body) = skeleton();
    tree.set_attribute(
        tree.root(),
        "prefix",
        &format!("ex: {} xsd: http://www.w3.org/2001/XMLSchema#", EX),
    );
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "property", "ex:age");
    tree.set_attribute(div, "datatype", "xsd:integer");
    tree.append_text(div, "30");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("a").into(),
            predicate: ex("age"),
            object: Literal::Typed {
                value: "30".to_owned(),
                datatype: iri("http://www.w3.org/2001/XMLSchema#integer"),
            }
            .into(),
        }],
        sink.triples
    );
}

#[test]
fn rel_links_about_to_href() {
    let (mut tree, body) = skeleton();
    let a = tree.append_element(body, "a");
    tree.set_attribute(a, "about", "#a");
    tree.set_attribute(a, "rel", "ex:knows");
    tree.set_attribute(a, "href", "http://example.com/b");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("a").into(),
            predicate: ex("knows"),
            object: iri("http://example.com/b").into(),
        }],
        sink.triples
    );
}

#[test]
fn rev_reverses_subject_and_object() {
    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "rev", "ex:parent");
    tree.set_attribute(div, "resource", "#b");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("b").into(),
            predicate: ex("parent"),
            object: doc("a").into(),
        }],
        sink.triples
    );
}

#[test]
fn hanging_rel_completes_against_each_descendant_subject() {
    let (mut tree, body) = skeleton();
    let outer = tree.append_element(body, "div");
    tree.set_attribute(outer, "about", "#a");
    tree.set_attribute(outer, "rel", "ex:knows");
    let first = tree.append_element(outer, "div");
    tree.set_attribute(first, "about", "#b");
    let second = tree.append_element(outer, "div");
    tree.set_attribute(second, "about", "#c");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![
            Triple {
                subject: doc("a").into(),
                predicate: ex("knows"),
                object: doc("b").into(),
            },
            Triple {
                subject: doc("a").into(),
                predicate: ex("knows"),
                object: doc("c").into(),
            },
        ],
        sink.triples
    );
}

#[test]
fn typeof_without_about_completes_with_a_blank_node() {
    let (mut tree, body) = skeleton();
    let outer = tree.append_element(body, "div");
    tree.set_attribute(outer, "about", "#a");
    tree.set_attribute(outer, "rel", "ex:knows");
    let inner = tree.append_element(outer, "div");
    tree.set_attribute(inner, "typeof", "ex:Person");

    let sink = parse(&mut tree);
    assert_eq!(2, sink.triples.len());
    let person = sink.triples[0].subject.clone();
    assert!(matches!(person, Subject::BlankNode(_)));
    assert_eq!(iri(vocab::RDF_TYPE), sink.triples[0].predicate);
    assert_eq!(Term::from(ex("Person")), sink.triples[0].object);
    assert_eq!(
        Triple {
            subject: doc("a").into(),
            predicate: ex("knows"),
            object: person.into(),
        },
        sink.triples[1]
    );
}

#[test]
fn inlist_members_build_a_single_collection() {
    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    for value in ["1", "2"] {
        let span = tree.append_element(div, "span");
        tree.set_attribute(span, "property", "ex:item");
        tree.set_attribute(span, "inlist", "");
        tree.set_attribute(span, "content", value);
    }

    let sink = parse(&mut tree);
    assert_eq!(5, sink.triples.len());

    let rdf_first = iri(vocab::RDF_FIRST);
    let rdf_rest = iri(vocab::RDF_REST);
    let head_triple = &sink.triples[4];
    assert_eq!(Subject::from(doc("a")), head_triple.subject);
    assert_eq!(ex("item"), head_triple.predicate);

    let find = |subject: &Term, predicate: &NamedNode| {
        sink.triples
            .iter()
            .find(|t| Term::from(t.subject.clone()) == *subject && t.predicate == *predicate)
            .map(|t| t.object.clone())
            .unwrap()
    };
    let head = head_triple.object.clone();
    assert_eq!(simple("1"), find(&head, &rdf_first));
    let tail = find(&head, &rdf_rest);
    assert_eq!(simple("2"), find(&tail, &rdf_first));
    assert_eq!(
        Term::from(iri(vocab::RDF_NIL)),
        find(&tail, &rdf_rest)
    );
}

#[test]
fn inlist_with_an_explicit_subject_and_object_emits_immediately() {
    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "rel", "ex:item");
    tree.set_attribute(div, "inlist", "");
    tree.set_attribute(div, "resource", "#b");

    let sink = parse(&mut tree);
    assert_eq!(3, sink.triples.len());
    let node = sink.triples[0].subject.clone();
    assert_eq!(
        Triple {
            subject: node.clone(),
            predicate: iri(vocab::RDF_FIRST),
            object: doc("b").into(),
        },
        sink.triples[0]
    );
    assert_eq!(
        Triple {
            subject: node.clone(),
            predicate: iri(vocab::RDF_REST),
            object: iri(vocab::RDF_NIL).into(),
        },
        sink.triples[1]
    );
    assert_eq!(
        Triple {
            subject: doc("a").into(),
            predicate: ex("item"),
            object: node.into(),
        },
        sink.triples[2]
    );
}

#[test]
fn vocab_resolves_terms_and_reports_its_use() {
    let mut tree = SimpleTree::new("html");
    let body = tree.append_element(tree.root(), "body");
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "vocab", "http://example.com/vocab#");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "typeof", "Person");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![
            Triple {
                subject: iri(BASE).into(),
                predicate: iri(vocab::RDFA_USES_VOCABULARY),
                object: iri("http://example.com/vocab#").into(),
            },
            Triple {
                subject: doc("a").into(),
                predicate: iri(vocab::RDF_TYPE),
                object: iri("http://example.com/vocab#Person").into(),
            },
        ],
        sink.triples
    );
}

#[test]
fn prefix_declarations_shadow_and_unwind() {
    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    let shadowed = tree.append_element(div, "span");
    tree.set_attribute(shadowed, "prefix", "ex: http://example.com/inner#");
    tree.set_attribute(shadowed, "about", "#a");
    tree.set_attribute(shadowed, "property", "ex:p");
    tree.set_attribute(shadowed, "content", "1");
    let outer = tree.append_element(div, "span");
    tree.set_attribute(outer, "about", "#b");
    tree.set_attribute(outer, "property", "ex:p");
    tree.set_attribute(outer, "content", "2");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![
            Triple {
                subject: doc("a").into(),
                predicate: iri("http://example.com/inner#p"),
                object: simple("1"),
            },
            Triple {
                subject: doc("b").into(),
                predicate: ex("p"),
                object: simple("2"),
            },
        ],
        sink.triples
    );
    assert_eq!(
        vec![
            ("ex".to_owned(), EX.to_owned()),
            ("ex".to_owned(), "http://example.com/inner#".to_owned()),
        ],
        sink.namespaces
    );
}

#[test]
fn xmlns_declarations_get_a_fragment_separator() {
    let mut tree = SimpleTree::new("html");
    tree.set_attribute(tree.root(), "xmlns:ex", "http://example.com/ns");
    let body = tree.append_element(tree.root(), "body");
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "property", "ex:p");
    tree.set_attribute(div, "content", "1");

    let sink = parse(&mut tree);
    assert_eq!(vec![("ex".to_owned(), EX.to_owned())], sink.namespaces);
    assert_eq!(ex("p"), sink.triples[0].predicate);
}

#[test]
fn base_element_overrides_the_base_iri() {
    let (mut tree, body) = skeleton();
    let head = tree.append_element(tree.root(), "head");
    let base = tree.append_element(head, "base");
    tree.set_attribute(base, "href", "http://other.example/dir/page?q=1#frag");
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "typeof", "ex:T");

    let sink = parse(&mut tree);
    assert_eq!(
        Subject::from(iri("http://other.example/dir/page#a")),
        sink.triples[0].subject
    );
}

#[test]
fn xml_literal_captures_markup_with_namespace_declarations() {
    let (mut tree, body) = skeleton();
    tree.set_attribute(
        tree.root(),
        "prefix",
        "rdf: http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    );
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "property", "rdf:value");
    tree.set_attribute(div, "datatype", "rdf:XMLLiteral");
    let bold = tree.append_element(div, "b");
    tree.append_text(bold, "bold");
    tree.append_text(div, " text");

    let sink = parse(&mut tree);
    assert_eq!(
        vec![Triple {
            subject: doc("a").into(),
            predicate: iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#value"),
            object: Literal::Typed {
                value: "<b xmlns=\"http://www.w3.org/1999/xhtml\" \
                        xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">bold</b> text"
                    .to_owned(),
                datatype: iri(vocab::RDF_XML_LITERAL),
            }
            .into(),
        }],
        sink.triples
    );
}

#[test]
fn datetime_attribute_picks_an_xsd_type() {
    let (mut tree, body) = skeleton();
    let time = tree.append_element(body, "time");
    tree.set_attribute(time, "about", "#a");
    tree.set_attribute(time, "property", "ex:when");
    tree.set_attribute(time, "datetime", "2026-08-30");

    let sink = parse(&mut tree);
    assert_eq!(
        Term::from(Literal::Typed {
            value: "2026-08-30".to_owned(),
            datatype: iri("http://www.w3.org/2001/XMLSchema#date"),
        }),
        sink.triples[0].object
    );
}

#[test]
fn time_element_content_is_typed_without_a_datetime_attribute() {
    let (mut tree, body) = skeleton();
    let time = tree.append_element(body, "time");
    tree.set_attribute(time, "about", "#a");
    tree.set_attribute(time, "property", "ex:when");
    tree.append_text(time, "2026");

    let sink = parse(&mut tree);
    assert_eq!(
        Term::from(Literal::Typed {
            value: "2026".to_owned(),
            datatype: iri("http://www.w3.org/2001/XMLSchema#gYear"),
        }),
        sink.triples[0].object
    );
}

#[test]
fn mixed_content_is_an_xml_literal_only_under_the_legacy_version() {
    let build = || {
        let mut tree = SimpleTree::new("html");
        tree.set_attribute(tree.root(), "xmlns:ex", EX);
        let body = tree.append_element(tree.root(), "body");
        let div = tree.append_element(body, "div");
        tree.set_attribute(div, "about", "#a");
        tree.set_attribute(div, "property", "ex:p");
        let bold = tree.append_element(div, "b");
        tree.append_text(bold, "x");
        tree
    };

    let legacy = parse_as(&mut build(), RdfaSyntax::Rdfa10);
    match &legacy.triples[0].object {
        Term::Literal(Literal::Typed { datatype, .. }) => {
            assert_eq!(&iri(vocab::RDF_XML_LITERAL), datatype)
        }
        object => panic!("expected an XML literal, got {}", object),
    }

    let current = parse_as(&mut build(), RdfaSyntax::Rdfa11);
    assert_eq!(simple("x"), current.triples[0].object);
}

#[test]
fn the_version_attribute_drives_auto_detection() {
    let build = |version: Option<&str>| {
        let mut tree = SimpleTree::new("html");
        if let Some(version) = version {
            tree.set_attribute(tree.root(), "version", version);
        }
        tree.set_attribute(tree.root(), "xmlns:ex", EX);
        let body = tree.append_element(tree.root(), "body");
        let div = tree.append_element(body, "div");
        tree.set_attribute(div, "about", "#a");
        tree.set_attribute(div, "property", "ex:p");
        let bold = tree.append_element(div, "b");
        tree.append_text(bold, "x");
        tree
    };

    let legacy = parse_as(&mut build(Some("XHTML+RDFa 1.0")), RdfaSyntax::AutoDetect);
    assert!(matches!(
        legacy.triples[0].object,
        Term::Literal(Literal::Typed { .. })
    ));

    let current = parse_as(&mut build(None), RdfaSyntax::AutoDetect);
    assert_eq!(simple("x"), current.triples[0].object);

    let assumed_legacy = parse_as(&mut build(None), RdfaSyntax::AutoDetectLegacy);
    assert!(matches!(
        assumed_legacy.triples[0].object,
        Term::Literal(Literal::Typed { .. })
    ));
}

#[test]
fn warnings_reach_the_registered_callback() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let (mut tree, body) = skeleton();
    let div = tree.append_element(body, "div");
    tree.set_attribute(div, "about", "#a");
    tree.set_attribute(div, "property", "missing");
    tree.set_attribute(div, "content", "1");

    let warnings = Rc::new(RefCell::new(Vec::new()));
    let collected = Rc::clone(&warnings);
    let mut parser = RdfaParser::with_base_iri(RdfaSyntax::Rdfa11, BASE).unwrap();
    parser.set_warning_handler(move |message| collected.borrow_mut().push(message.to_owned()));
    let mut sink = CollectingHandler::default();
    parser.parse(&mut tree, &mut sink).unwrap();

    assert!(sink.triples.is_empty());
    assert!(warnings
        .borrow()
        .iter()
        .any(|message| message.contains("missing")));
}

#[test]
fn a_stopping_handler_ends_the_parse_cleanly() {
    let (mut tree, body) = skeleton();
    for fragment in ["a", "b", "c"] {
        let div = tree.append_element(body, "div");
        tree.set_attribute(div, "about", &format!("#{}", fragment));
        tree.set_attribute(div, "typeof", "ex:T");
    }

    let mut sink = CollectingHandler::stopping_after(2);
    let mut parser = RdfaParser::with_base_iri(RdfaSyntax::Rdfa11, BASE).unwrap();
    parser.parse(&mut tree, &mut sink).unwrap();
    assert_eq!(2, sink.triples.len());
    assert_eq!(Some(true), sink.ended_with);
}

#[test]
fn patterns_are_replayed_under_each_copier() {
    let mut tree = SimpleTree::new("html");
    tree.set_attribute(
        tree.root(),
        "prefix",
        &format!("ex: {} rdfa: http://www.w3.org/ns/rdfa#", EX),
    );
    let body = tree.append_element(tree.root(), "body");
    let pattern = tree.append_element(body, "div");
    tree.set_attribute(pattern, "resource", "#pat");
    tree.set_attribute(pattern, "typeof", "rdfa:Pattern");
    let name = tree.append_element(pattern, "span");
    tree.set_attribute(name, "property", "ex:name");
    tree.set_attribute(name, "content", "N");
    let copier = tree.append_element(body, "div");
    tree.set_attribute(copier, "about", "#x");
    tree.set_attribute(copier, "rel", "rdfa:copy");
    tree.set_attribute(copier, "resource", "#pat");

    let mut handler = PatternCopyingHandler::new(CollectingHandler::default());
    let mut parser = RdfaParser::with_base_iri(RdfaSyntax::Rdfa11, BASE).unwrap();
    parser.parse(&mut tree, &mut handler).unwrap();

    let sink = handler.into_inner();
    assert_eq!(
        vec![Triple {
            subject: doc("x").into(),
            predicate: ex("name"),
            object: simple("N"),
        }],
        sink.triples
    );
}
