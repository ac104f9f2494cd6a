use tern_api::handler::CollectingHandler;
use tern_api::model::{NamedNode, NamedOrBlankNode, Subject};
use tern_api::token::{Token, TokenKind, VecTokenSource};
use tern_turtle::{NQuadsParser, NTriplesParser};

fn t(kind: TokenKind) -> Token {
    Token::of(kind)
}

fn v(kind: TokenKind, value: &str) -> Token {
    Token::with_value(kind, value)
}

#[test]
fn ntriples_statements_are_flat() {
    let tokens = vec![
        t(TokenKind::Bof),
        v(TokenKind::Iri, "http://example.com/s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Literal, "abc"),
        v(TokenKind::Datatype, "<http://www.w3.org/2001/XMLSchema#string>"),
        t(TokenKind::Dot),
        v(TokenKind::BlankNodeWithId, "b0"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::BlankNodeWithId, "b1"),
        t(TokenKind::Dot),
        t(TokenKind::Eof),
    ];
    let mut sink = CollectingHandler::default();
    NTriplesParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .unwrap();
    assert_eq!(2, sink.triples.len());
    assert_eq!(
        "<http://example.com/s> <http://example.com/p> \"abc\"^^<http://www.w3.org/2001/XMLSchema#string>",
        sink.triples[0].to_string()
    );
    assert_eq!("_:b0 <http://example.com/p> _:b1", sink.triples[1].to_string());
    assert_eq!(Some(true), sink.ended_with);
}

#[test]
fn ntriples_relative_iris_are_rejected() {
    let tokens = vec![
        t(TokenKind::Bof),
        v(TokenKind::Iri, "s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Iri, "http://example.com/o"),
        t(TokenKind::Dot),
        t(TokenKind::Eof),
    ];
    let mut sink = CollectingHandler::default();
    assert!(NTriplesParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .is_err());
    assert_eq!(Some(false), sink.ended_with);
}

#[test]
fn nquads_graph_label_is_optional() {
    let tokens = vec![
        t(TokenKind::Bof),
        v(TokenKind::Iri, "http://example.com/s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Iri, "http://example.com/o"),
        v(TokenKind::Iri, "http://example.com/g"),
        t(TokenKind::Dot),
        v(TokenKind::Iri, "http://example.com/s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Iri, "http://example.com/o"),
        t(TokenKind::Dot),
        t(TokenKind::Eof),
    ];
    let mut sink = CollectingHandler::default();
    NQuadsParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .unwrap();
    assert_eq!(2, sink.quads.len());
    assert_eq!(
        Some(NamedOrBlankNode::from(NamedNode {
            iri: "http://example.com/g".to_owned()
        })),
        sink.quads[0].graph_name
    );
    assert_eq!(None, sink.quads[1].graph_name);
}

#[test]
fn nquads_blank_node_graph_labels() {
    let tokens = vec![
        t(TokenKind::Bof),
        v(TokenKind::BlankNodeWithId, "s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Literal, "o"),
        v(TokenKind::BlankNodeWithId, "g"),
        t(TokenKind::Dot),
        t(TokenKind::Eof),
    ];
    let mut sink = CollectingHandler::default();
    NQuadsParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .unwrap();
    match &sink.quads[0].graph_name {
        Some(NamedOrBlankNode::BlankNode(node)) => assert_eq!("g", node.id),
        other => panic!("expected a blank node graph label, got {:?}", other),
    }
    assert_eq!(
        Subject::from(tern_api::model::BlankNode { id: "s".to_owned() }),
        sink.quads[0].subject
    );
}

#[test]
fn missing_dot_is_fatal() {
    let tokens = vec![
        t(TokenKind::Bof),
        v(TokenKind::Iri, "http://example.com/s"),
        v(TokenKind::Iri, "http://example.com/p"),
        v(TokenKind::Iri, "http://example.com/o"),
        t(TokenKind::Eof),
    ];
    let mut sink = CollectingHandler::default();
    assert!(NQuadsParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .is_err());
}

#[test]
fn handler_stop_is_honored() {
    let mut tokens = vec![t(TokenKind::Bof)];
    for _ in 0..3 {
        tokens.push(v(TokenKind::Iri, "http://example.com/s"));
        tokens.push(v(TokenKind::Iri, "http://example.com/p"));
        tokens.push(v(TokenKind::Iri, "http://example.com/o"));
        tokens.push(t(TokenKind::Dot));
    }
    tokens.push(t(TokenKind::Eof));
    let mut sink = CollectingHandler::stopping_after(1);
    NTriplesParser::new()
        .parse(VecTokenSource::new(tokens), &mut sink)
        .unwrap();
    assert_eq!(1, sink.triples.len());
    assert_eq!(Some(true), sink.ended_with);
}
