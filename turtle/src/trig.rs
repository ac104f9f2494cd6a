//! Implementation of a [TriG](https://www.w3.org/TR/trig/) streaming
//! parser on top of the Turtle grammar engine.

use crate::error::{Interrupt, TurtleError};
use crate::turtle::{next_token, peek, ListContext, TurtleParser, TurtleSyntax};
use tern_api::handler::{QuadRdfHandler, RdfHandler};
use tern_api::model::{BlankNode, NamedOrBlankNode, Subject, Triple};
use tern_api::token::{TokenKind, TokenSource};

/// The grammar variant a [`TriGParser`] enforces.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TriGSyntax {
    /// The pre-W3C member submission grammar: `name = { ... }` blocks,
    /// no `GRAPH` keyword, directives always file-scoped.
    Original,
    /// [TriG 1.1](https://www.w3.org/TR/trig/).
    Rdf11,
    /// TriG 1.1 plus RDF-star quoted triples and annotations.
    Rdf11Star,
}

/// A [TriG](https://www.w3.org/TR/trig/) streaming parser.
///
/// It wraps the [`TurtleParser`] grammar engine, additionally recognizing
/// graph blocks and tagging every triple parsed inside one with the graph
/// name. Directives declared inside a block are scoped to it: the prior
/// namespace bindings and base IRI are reinstated when the block closes and
/// the handler is re-notified of each restored binding.
///
/// ```
/// use tern_api::handler::CollectingHandler;
/// use tern_api::token::{Token, TokenKind, VecTokenSource};
/// use tern_turtle::{TriGParser, TriGSyntax};
///
/// // <http://example.com/g> { <http://example.com/a> <http://example.com/b> <http://example.com/c> . }
/// let tokens = VecTokenSource::new(vec![
///     Token::of(TokenKind::Bof),
///     Token::with_value(TokenKind::Iri, "http://example.com/g"),
///     Token::of(TokenKind::LeftBrace),
///     Token::with_value(TokenKind::Iri, "http://example.com/a"),
///     Token::with_value(TokenKind::Iri, "http://example.com/b"),
///     Token::with_value(TokenKind::Iri, "http://example.com/c"),
///     Token::of(TokenKind::Dot),
///     Token::of(TokenKind::RightBrace),
///     Token::of(TokenKind::Eof),
/// ]);
///
/// let mut sink = CollectingHandler::default();
/// TriGParser::new(TriGSyntax::Rdf11).parse(tokens, &mut sink)?;
/// assert_eq!(1, sink.quads.len());
/// assert_eq!(
///     "<http://example.com/a> <http://example.com/b> <http://example.com/c> <http://example.com/g>",
///     sink.quads[0].to_string()
/// );
/// # Ok::<_, tern_turtle::TurtleError>(())
/// ```
pub struct TriGParser {
    inner: TurtleParser,
    syntax: TriGSyntax,
    seen_default_graph: bool,
}

impl TriGParser {
    pub fn new(syntax: TriGSyntax) -> Self {
        Self {
            inner: TurtleParser::new(turtle_syntax(syntax)),
            syntax,
            seen_default_graph: false,
        }
    }

    /// Builds a parser with an initial base IRI for relative IRI resolution.
    pub fn with_base_iri(syntax: TriGSyntax, base_iri: &str) -> Result<Self, TurtleError> {
        Ok(Self {
            inner: TurtleParser::with_base_iri(turtle_syntax(syntax), base_iri)?,
            syntax,
            seen_default_graph: false,
        })
    }

    /// Consumes the whole token queue, reporting into `handler`.
    ///
    /// See [`TurtleParser::parse`] for the bracketing contract.
    pub fn parse<S: TokenSource, H: QuadRdfHandler>(
        &mut self,
        mut tokens: S,
        handler: &mut H,
    ) -> Result<(), TurtleError> {
        handler.start_rdf();
        match self.parse_document(&mut tokens, handler) {
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

    // [1g] trigDoc ::= (directive | block)*
    // [2g] block ::= triplesOrGraph | wrappedGraph | triples2 | 'GRAPH' labelOrSubject wrappedGraph
    fn parse_document<S: TokenSource, H: QuadRdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
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
                TokenKind::At | TokenKind::BaseDirective | TokenKind::PrefixDirective => {
                    let mut scoped = GraphScopedHandler {
                        inner: &mut *handler,
                        graph_name: None,
                    };
                    self.inner.parse_directive(tokens, &mut scoped)?
                }
                TokenKind::Graph => {
                    let keyword = next_token(tokens);
                    if self.syntax == TriGSyntax::Original {
                        return Err(TurtleError::unexpected(
                            &keyword,
                            "a graph name (the GRAPH keyword needs TriG 1.1)",
                        )
                        .into());
                    }
                    let name = self.parse_graph_name(tokens)?;
                    let open = next_token(tokens);
                    if open.kind != TokenKind::LeftBrace {
                        return Err(
                            TurtleError::unexpected(&open, "'{' opening the graph block").into()
                        );
                    }
                    self.parse_graph_content(tokens, handler, Some(name))?;
                }
                TokenKind::LeftBrace => {
                    let open = next_token(tokens);
                    if self.seen_default_graph {
                        return Err(TurtleError::multiple_default_graphs(open.position).into());
                    }
                    self.seen_default_graph = true;
                    self.parse_graph_content(tokens, handler, None)?;
                }
                TokenKind::Iri
                | TokenKind::PrefixedName
                | TokenKind::BlankNode
                | TokenKind::BlankNodeWithId => self.parse_triples_or_graph(tokens, handler)?,
                // collections, property lists and quoted triples can never
                // name a graph, they go straight to triple parsing
                TokenKind::LeftBracket | TokenKind::LeftParen | TokenKind::StartQuote => {
                    let mut scoped = GraphScopedHandler {
                        inner: &mut *handler,
                        graph_name: None,
                    };
                    self.inner
                        .parse_triples(tokens, &mut scoped, ListContext::Top)?;
                }
                _ => {
                    let token = next_token(tokens);
                    return Err(TurtleError::unexpected(
                        &token,
                        "a directive, a graph block or the subject of a triple",
                    )
                    .into());
                }
            }
        }
    }

    // [3g] triplesOrGraph ::= labelOrSubject (wrappedGraph | predicateObjectList '.')
    //
    // The same leading term may be a graph name or a plain subject. The
    // graph-block reading is committed only upon actually seeing '{' (or
    // the legacy '='); otherwise the term is an ordinary subject.
    fn parse_triples_or_graph<S: TokenSource, H: QuadRdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
    ) -> Result<(), Interrupt> {
        let label = self.parse_graph_name(tokens)?;
        match peek(tokens).kind {
            TokenKind::LeftBrace => {
                tokens.dequeue();
                self.parse_graph_content(tokens, handler, Some(label))
            }
            TokenKind::Equals => {
                let equals = tokens.dequeue();
                if self.syntax != TriGSyntax::Original {
                    return Err(TurtleError::unexpected(
                        &equals,
                        "'{' ('=' graph blocks are a legacy TriG form)",
                    )
                    .into());
                }
                let open = next_token(tokens);
                if open.kind != TokenKind::LeftBrace {
                    return Err(
                        TurtleError::unexpected(&open, "'{' opening the graph block").into()
                    );
                }
                self.parse_graph_content(tokens, handler, Some(label))
            }
            _ => {
                let mut scoped = GraphScopedHandler {
                    inner: &mut *handler,
                    graph_name: None,
                };
                self.inner.parse_predicate_object_list(
                    tokens,
                    &mut scoped,
                    &Subject::from(label),
                    ListContext::Top,
                )
            }
        }
    }

    // [7g] labelOrSubject ::= iri | BlankNode
    fn parse_graph_name<S: TokenSource>(
        &mut self,
        tokens: &mut S,
    ) -> Result<NamedOrBlankNode, Interrupt> {
        let token = next_token(tokens);
        Ok(match token.kind {
            TokenKind::Iri | TokenKind::PrefixedName => self.inner.resolve_name(&token)?.into(),
            TokenKind::BlankNodeWithId => BlankNode { id: token.value }.into(),
            TokenKind::BlankNode => self.inner.bnode_id_generator.generate().into(),
            _ => {
                return Err(TurtleError::unexpected(
                    &token,
                    "an IRI or blank node naming a graph",
                )
                .into())
            }
        })
    }

    // [5g] wrappedGraph ::= '{' triplesBlock? '}'
    fn parse_graph_content<S: TokenSource, H: QuadRdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
        graph_name: Option<NamedOrBlankNode>,
    ) -> Result<(), Interrupt> {
        let mark = self.inner.scope.mark();
        let saved_base = self.inner.base_iri.clone();
        loop {
            match peek(tokens).kind {
                TokenKind::RightBrace => {
                    tokens.dequeue();
                    break;
                }
                TokenKind::At | TokenKind::BaseDirective | TokenKind::PrefixDirective => {
                    let mut scoped = GraphScopedHandler {
                        inner: &mut *handler,
                        graph_name: graph_name.clone(),
                    };
                    self.inner.parse_directive(tokens, &mut scoped)?;
                }
                TokenKind::Iri
                | TokenKind::PrefixedName
                | TokenKind::BlankNode
                | TokenKind::BlankNodeWithId
                | TokenKind::LeftBracket
                | TokenKind::LeftParen
                | TokenKind::StartQuote => {
                    let mut scoped = GraphScopedHandler {
                        inner: &mut *handler,
                        graph_name: graph_name.clone(),
                    };
                    // inside a block the final statement's '.' is optional
                    self.inner
                        .parse_triples(tokens, &mut scoped, ListContext::GraphBlock)?;
                }
                _ => {
                    let token = next_token(tokens);
                    return Err(TurtleError::unexpected(
                        &token,
                        "a triple or '}' closing the graph block",
                    )
                    .into());
                }
            }
        }
        // legacy writers put a '.' after the closing brace
        if peek(tokens).kind == TokenKind::Dot {
            tokens.dequeue();
        }
        // directives declared inside a block are scoped to it, except under
        // the legacy syntax where they stay file-scoped
        if self.syntax != TriGSyntax::Original {
            self.inner.scope.restore(mark);
            self.inner.base_iri = saved_base;
            if let Some(base) = &self.inner.base_iri {
                if !handler.handle_base_iri(base.as_str()) {
                    return Err(Interrupt::Stop);
                }
            }
            for (prefix, iri) in self.inner.scope.iter() {
                if !handler.handle_namespace(prefix, iri) {
                    return Err(Interrupt::Stop);
                }
            }
        }
        Ok(())
    }
}

fn turtle_syntax(syntax: TriGSyntax) -> TurtleSyntax {
    match syntax {
        TriGSyntax::Original => TurtleSyntax::Original,
        TriGSyntax::Rdf11 => TurtleSyntax::W3C,
        TriGSyntax::Rdf11Star => TurtleSyntax::Rdf11Star,
    }
}

/// Adapts a quad handler into the triple handler the Turtle engine reports
/// into, tagging every triple with the enclosing graph name.
struct GraphScopedHandler<'a, H> {
    inner: &'a mut H,
    graph_name: Option<NamedOrBlankNode>,
}

impl<'a, H: QuadRdfHandler> RdfHandler for GraphScopedHandler<'a, H> {
    fn handle_triple(&mut self, triple: Triple) -> bool {
        self.inner.handle_quad(triple.in_graph(self.graph_name.clone()))
    }

    fn handle_namespace(&mut self, prefix: &str, iri: &str) -> bool {
        self.inner.handle_namespace(prefix, iri)
    }

    fn handle_base_iri(&mut self, iri: &str) -> bool {
        self.inner.handle_base_iri(iri)
    }
}
