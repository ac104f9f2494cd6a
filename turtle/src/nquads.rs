//! Implementation of [N-Triples](https://www.w3.org/TR/n-triples/) and
//! [N-Quads](https://www.w3.org/TR/n-quads/) parsers over a token queue.
//!
//! The line-oriented grammars allow no directives, no prefixed names and no
//! relative IRIs, so these parsers carry no scope state at all.

use crate::error::{Interrupt, TurtleError};
use crate::turtle::{emit, next_token, peek};
use oxilangtag::LanguageTag;
use oxiri::Iri;
use tern_api::handler::{QuadRdfHandler, RdfHandler};
use tern_api::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Subject, Term, Triple};
use tern_api::token::{Token, TokenKind, TokenSource};

/// An [N-Triples](https://www.w3.org/TR/n-triples/) streaming parser.
///
/// ```
/// use tern_api::handler::CollectingHandler;
/// use tern_api::token::{Token, TokenKind, VecTokenSource};
/// use tern_turtle::NTriplesParser;
///
/// // <http://example.com/a> <http://example.com/b> "1"@en .
/// let tokens = VecTokenSource::new(vec![
///     Token::of(TokenKind::Bof),
///     Token::with_value(TokenKind::Iri, "http://example.com/a"),
///     Token::with_value(TokenKind::Iri, "http://example.com/b"),
///     Token::with_value(TokenKind::Literal, "1"),
///     Token::with_value(TokenKind::LanguageTag, "en"),
///     Token::of(TokenKind::Dot),
///     Token::of(TokenKind::Eof),
/// ]);
///
/// let mut sink = CollectingHandler::default();
/// NTriplesParser::new().parse(tokens, &mut sink)?;
/// assert_eq!(
///     "<http://example.com/a> <http://example.com/b> \"1\"@en",
///     sink.triples[0].to_string()
/// );
/// # Ok::<_, tern_turtle::TurtleError>(())
/// ```
#[derive(Default, Clone, Copy)]
pub struct NTriplesParser;

impl NTriplesParser {
    pub fn new() -> Self {
        Self
    }

    /// Consumes the whole token queue, reporting into `handler`.
    ///
    /// See [`crate::TurtleParser::parse`] for the bracketing contract.
    pub fn parse<S: TokenSource, H: RdfHandler>(
        &mut self,
        mut tokens: S,
        handler: &mut H,
    ) -> Result<(), TurtleError> {
        handler.start_rdf();
        let result = {
            let mut sink = TripleForwarder(handler);
            parse_document(&mut tokens, &mut sink, false)
        };
        match result {
            Ok(()) | Err(Interrupt::Stop) => {
                handler.end_rdf(true);
                Ok(())
            }
            Err(Interrupt::Error(error)) => {
                handler.end_rdf(false);
                Err(error)
            }
        }
    }
}

/// An [N-Quads](https://www.w3.org/TR/n-quads/) streaming parser.
///
/// Statements may carry a fourth term naming the graph; without one the
/// quad belongs to the default graph.
#[derive(Default, Clone, Copy)]
pub struct NQuadsParser;

impl NQuadsParser {
    pub fn new() -> Self {
        Self
    }

    /// Consumes the whole token queue, reporting into `handler`.
    ///
    /// See [`crate::TurtleParser::parse`] for the bracketing contract.
    pub fn parse<S: TokenSource, H: QuadRdfHandler>(
        &mut self,
        mut tokens: S,
        handler: &mut H,
    ) -> Result<(), TurtleError> {
        handler.start_rdf();
        let result = {
            let mut sink = QuadForwarder(handler);
            parse_document(&mut tokens, &mut sink, true)
        };
        match result {
            Ok(()) | Err(Interrupt::Stop) => {
                handler.end_rdf(true);
                Ok(())
            }
            Err(Interrupt::Error(error)) => {
                handler.end_rdf(false);
                Err(error)
            }
        }
    }
}

// [1] nquadsDoc ::= statement? (EOL statement)* EOL?
fn parse_document<S: TokenSource, H: GraphTermSink>(
    tokens: &mut S,
    handler: &mut H,
    quads: bool,
) -> Result<(), Interrupt> {
    if tokens.peek().kind == TokenKind::Bof {
        tokens.dequeue();
    }
    loop {
        match peek(tokens).kind {
            TokenKind::Eof => {
                tokens.dequeue();
                return Ok(());
            }
            TokenKind::Iri | TokenKind::BlankNodeWithId => {
                parse_statement(tokens, handler, quads)?
            }
            _ => {
                let token = next_token(tokens);
                return Err(TurtleError::unexpected(&token, "the subject of a statement").into());
            }
        }
    }
}

// [2] statement ::= subject predicate object graphLabel? '.'
fn parse_statement<S: TokenSource, H: GraphTermSink>(
    tokens: &mut S,
    handler: &mut H,
    quads: bool,
) -> Result<(), Interrupt> {
    let subject_token = next_token(tokens);
    let subject: Subject = match subject_token.kind {
        TokenKind::Iri => parse_absolute_iri(&subject_token)?.into(),
        TokenKind::BlankNodeWithId => BlankNode {
            id: subject_token.value,
        }
        .into(),
        _ => {
            return Err(
                TurtleError::unexpected(&subject_token, "the subject of a statement").into(),
            )
        }
    };
    let predicate_token = next_token(tokens);
    if predicate_token.kind != TokenKind::Iri {
        return Err(TurtleError::unexpected(&predicate_token, "the predicate IRI").into());
    }
    let predicate = parse_absolute_iri(&predicate_token)?;
    let object_token = next_token(tokens);
    let object: Term = match object_token.kind {
        TokenKind::Iri => parse_absolute_iri(&object_token)?.into(),
        TokenKind::BlankNodeWithId => BlankNode {
            id: object_token.value,
        }
        .into(),
        TokenKind::Literal => parse_literal(tokens, object_token)?.into(),
        _ => return Err(TurtleError::unexpected(&object_token, "the object of a statement").into()),
    };
    let mut graph_name = None;
    let terminator = next_token(tokens);
    let terminator = if quads {
        match terminator.kind {
            TokenKind::Iri => {
                graph_name = Some(NamedOrBlankNode::from(parse_absolute_iri(&terminator)?));
                next_token(tokens)
            }
            TokenKind::BlankNodeWithId => {
                graph_name = Some(NamedOrBlankNode::from(BlankNode {
                    id: terminator.value,
                }));
                next_token(tokens)
            }
            _ => terminator,
        }
    } else {
        terminator
    };
    if terminator.kind != TokenKind::Dot {
        return Err(TurtleError::unexpected(&terminator, "'.' ending the statement").into());
    }
    handler.sink(
        Triple {
            subject,
            predicate,
            object,
        },
        graph_name,
    )
}

// [6] literal ::= STRING_LITERAL_QUOTE ('^^' IRIREF | LANGTAG)?
fn parse_literal<S: TokenSource>(tokens: &mut S, token: Token) -> Result<Literal, TurtleError> {
    match peek(tokens).kind {
        TokenKind::LanguageTag => {
            let tag_token = tokens.dequeue();
            let language = LanguageTag::parse(tag_token.value.to_ascii_lowercase())
                .map_err(|error| {
                    TurtleError::invalid_language_tag(&tag_token.value, error, tag_token.position)
                })?
                .into_inner();
            Ok(Literal::LanguageTaggedString {
                value: token.value,
                language,
            })
        }
        TokenKind::Datatype => {
            let datatype_token = tokens.dequeue();
            let iri = datatype_token
                .value
                .strip_prefix('<')
                .and_then(|v| v.strip_suffix('>'))
                .unwrap_or(&datatype_token.value);
            let datatype = Iri::parse(iri.to_owned())
                .map(|iri| NamedNode {
                    iri: iri.into_inner(),
                })
                .map_err(|error| {
                    TurtleError::invalid_iri(iri, error, Some(datatype_token.position))
                })?;
            Ok(Literal::Typed {
                value: token.value,
                datatype,
            })
        }
        _ => Ok(Literal::Simple { value: token.value }),
    }
}

fn parse_absolute_iri(token: &Token) -> Result<NamedNode, TurtleError> {
    Iri::parse(token.value.clone())
        .map(|iri| NamedNode {
            iri: iri.into_inner(),
        })
        .map_err(|error| TurtleError::invalid_iri(&token.value, error, Some(token.position)))
}

/// The N-Triples and N-Quads statement loops only differ in what they do
/// with a finished statement and whether a graph term is legal.
trait GraphTermSink {
    fn sink(&mut self, triple: Triple, graph_name: Option<NamedOrBlankNode>)
        -> Result<(), Interrupt>;
}

struct TripleForwarder<'a, H>(&'a mut H);

impl<'a, H: RdfHandler> GraphTermSink for TripleForwarder<'a, H> {
    fn sink(
        &mut self,
        triple: Triple,
        _graph_name: Option<NamedOrBlankNode>,
    ) -> Result<(), Interrupt> {
        emit(self.0, triple)
    }
}

struct QuadForwarder<'a, H>(&'a mut H);

impl<'a, H: QuadRdfHandler> GraphTermSink for QuadForwarder<'a, H> {
    fn sink(
        &mut self,
        triple: Triple,
        graph_name: Option<NamedOrBlankNode>,
    ) -> Result<(), Interrupt> {
        if self.0.handle_quad(triple.in_graph(graph_name)) {
            Ok(())
        } else {
            Err(Interrupt::Stop)
        }
    }
}
