//! Implementation of a [Turtle](https://www.w3.org/TR/turtle/) streaming
//! parser driven by an external token queue.

use crate::error::{Interrupt, TurtleError};
use crate::utils::{
    is_valid_boolean, is_valid_decimal, is_valid_double, is_valid_integer, BlankNodeIdGenerator,
};
use oxilangtag::LanguageTag;
use oxiri::Iri;
use tern_api::handler::RdfHandler;
use tern_api::model::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Subject, Term, Triple};
use tern_api::scope::NamespaceScope;
use tern_api::token::{Position, Token, TokenKind, TokenSource};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// The grammar variant a [`TurtleParser`] enforces.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TurtleSyntax {
    /// The pre-W3C member submission grammar: `@`-style directives only,
    /// case-sensitive booleans, no RDF-star.
    Original,
    /// [Turtle 1.1](https://www.w3.org/TR/turtle/).
    W3C,
    /// Turtle 1.1 plus [RDF-star](https://www.w3.org/2021/12/rdf-star.html)
    /// quoted triples and annotations.
    Rdf11Star,
}

/// A [Turtle](https://www.w3.org/TR/turtle/) streaming parser.
///
/// It consumes a typed token queue produced by an external tokenizer and
/// reports triples, namespace declarations and base declarations into an
/// [`RdfHandler`]. Any handler callback may return `false` to stop the
/// parse cleanly.
///
/// ```
/// use tern_api::handler::CollectingHandler;
/// use tern_api::token::{Token, TokenKind, VecTokenSource};
/// use tern_turtle::{TurtleParser, TurtleSyntax};
///
/// // @prefix ex: <http://example.com/> . ex:a ex:b ex:c .
/// let tokens = VecTokenSource::new(vec![
///     Token::of(TokenKind::Bof),
///     Token::of(TokenKind::At),
///     Token::of(TokenKind::PrefixDirective),
///     Token::with_value(TokenKind::PrefixName, "ex:"),
///     Token::with_value(TokenKind::Iri, "http://example.com/"),
///     Token::of(TokenKind::Dot),
///     Token::with_value(TokenKind::PrefixedName, "ex:a"),
///     Token::with_value(TokenKind::PrefixedName, "ex:b"),
///     Token::with_value(TokenKind::PrefixedName, "ex:c"),
///     Token::of(TokenKind::Dot),
///     Token::of(TokenKind::Eof),
/// ]);
///
/// let mut sink = CollectingHandler::default();
/// TurtleParser::new(TurtleSyntax::W3C).parse(tokens, &mut sink)?;
/// assert_eq!(1, sink.triples.len());
/// assert_eq!(
///     "<http://example.com/a> <http://example.com/b> <http://example.com/c>",
///     sink.triples[0].to_string()
/// );
/// # Ok::<_, tern_turtle::TurtleError>(())
/// ```
pub struct TurtleParser {
    pub(crate) syntax: TurtleSyntax,
    pub(crate) scope: NamespaceScope,
    pub(crate) base_iri: Option<Iri<String>>,
    pub(crate) bnode_id_generator: BlankNodeIdGenerator,
}

impl TurtleParser {
    pub fn new(syntax: TurtleSyntax) -> Self {
        Self {
            syntax,
            scope: NamespaceScope::default(),
            base_iri: None,
            bnode_id_generator: BlankNodeIdGenerator::default(),
        }
    }

    /// Builds a parser with an initial base IRI for relative IRI resolution.
    pub fn with_base_iri(syntax: TurtleSyntax, base_iri: &str) -> Result<Self, TurtleError> {
        let base = Iri::parse(base_iri.to_owned())
            .map_err(|error| TurtleError::invalid_iri(base_iri, error, None))?;
        Ok(Self {
            base_iri: Some(base),
            ..Self::new(syntax)
        })
    }

    /// Consumes the whole token queue, reporting into `handler`.
    ///
    /// `start_rdf` is called first and `end_rdf` exactly once at the end:
    /// with `false` if a parse error aborted the run, with `true` otherwise,
    /// including when the handler itself requested the stop.
    pub fn parse<S: TokenSource, H: RdfHandler>(
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

    // [1] turtleDoc ::= statement*
    // [2] statement ::= directive | triples '.'
    fn parse_document<S: TokenSource, H: RdfHandler>(
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
                    self.parse_directive(tokens, handler)?
                }
                TokenKind::Iri
                | TokenKind::PrefixedName
                | TokenKind::BlankNode
                | TokenKind::BlankNodeWithId
                | TokenKind::LeftBracket
                | TokenKind::LeftParen
                | TokenKind::StartQuote => {
                    self.parse_triples(tokens, handler, ListContext::Top)?
                }
                _ => {
                    let token = next_token(tokens);
                    return Err(TurtleError::unexpected(
                        &token,
                        "a directive or the subject of a triple",
                    )
                    .into());
                }
            }
        }
    }

    // [3] directive ::= prefixID | base | sparqlPrefix | sparqlBase
    //
    // Turtle-style directives (`@prefix`, `@base`) end with a '.',
    // SPARQL-style ones (`PREFIX`, `BASE`) must not. The asymmetry is part
    // of the grammar.
    pub(crate) fn parse_directive<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
    ) -> Result<(), Interrupt> {
        let token = next_token(tokens);
        let (turtle_style, keyword) = if token.kind == TokenKind::At {
            (true, next_token(tokens))
        } else {
            (false, token)
        };
        if !turtle_style && self.syntax == TurtleSyntax::Original {
            return Err(TurtleError::unexpected(
                &keyword,
                "an '@' directive (SPARQL-style directives need the W3C grammar)",
            )
            .into());
        }
        match keyword.kind {
            // [5] base ::= '@base' IRIREF '.'
            TokenKind::BaseDirective => {
                let iri_token = next_token(tokens);
                if iri_token.kind != TokenKind::Iri {
                    return Err(
                        TurtleError::unexpected(&iri_token, "the IRI of the new base").into(),
                    );
                }
                let base = self.resolve_iri_value(&iri_token.value, iri_token.position)?;
                if !handler.handle_base_iri(base.as_str()) {
                    return Err(Interrupt::Stop);
                }
                self.base_iri = Some(base);
            }
            // [4] prefixID ::= '@prefix' PNAME_NS IRIREF '.'
            TokenKind::PrefixDirective => {
                let prefix_token = next_token(tokens);
                if prefix_token.kind != TokenKind::PrefixName {
                    return Err(
                        TurtleError::unexpected(&prefix_token, "the prefix name to bind").into(),
                    );
                }
                let prefix = prefix_token
                    .value
                    .strip_suffix(':')
                    .unwrap_or(&prefix_token.value)
                    .to_owned();
                let iri_token = next_token(tokens);
                if iri_token.kind != TokenKind::Iri {
                    return Err(
                        TurtleError::unexpected(&iri_token, "the namespace IRI to bind").into(),
                    );
                }
                let namespace = self.resolve_iri_value(&iri_token.value, iri_token.position)?;
                if !handler.handle_namespace(&prefix, namespace.as_str()) {
                    return Err(Interrupt::Stop);
                }
                self.scope.bind(&prefix, namespace.as_str());
            }
            _ => {
                return Err(
                    TurtleError::unexpected(&keyword, "the 'base' or 'prefix' keyword").into(),
                )
            }
        }
        if turtle_style {
            let dot = next_token(tokens);
            if dot.kind != TokenKind::Dot {
                return Err(TurtleError::unexpected(&dot, "'.' ending the directive").into());
            }
        }
        Ok(())
    }

    // [6] triples ::= subject predicateObjectList | blankNodePropertyList predicateObjectList?
    //
    // `context` is `Top` at the file level and `GraphBlock` inside a TriG
    // `{...}` block, where the last statement may leave out its '.'.
    pub(crate) fn parse_triples<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
        context: ListContext,
    ) -> Result<(), Interrupt> {
        let token = next_token(tokens);
        let mut property_list_subject = false;
        let subject: Subject = match token.kind {
            TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&token)?.into(),
            TokenKind::BlankNodeWithId => BlankNode { id: token.value }.into(),
            TokenKind::BlankNode => self.bnode_id_generator.generate().into(),
            TokenKind::LeftBracket => {
                if peek(tokens).kind == TokenKind::RightBracket {
                    tokens.dequeue();
                    self.bnode_id_generator.generate().into()
                } else {
                    property_list_subject = true;
                    let subject = Subject::from(self.bnode_id_generator.generate());
                    self.parse_predicate_object_list(
                        tokens,
                        handler,
                        &subject,
                        ListContext::BlankNodeList,
                    )?;
                    subject
                }
            }
            TokenKind::LeftParen => self.parse_collection(tokens, handler)?.into(),
            TokenKind::StartQuote => {
                self.check_star_enabled(&token)?;
                Subject::Triple(Box::new(self.parse_quoted_triple(tokens)?))
            }
            _ => return Err(TurtleError::unexpected(&token, "the subject of a triple").into()),
        };
        // a blank node property list may form a whole statement on its own
        if property_list_subject {
            match peek(tokens).kind {
                TokenKind::Dot => {
                    tokens.dequeue();
                    return Ok(());
                }
                TokenKind::RightBrace if context == ListContext::GraphBlock => {
                    return Ok(());
                }
                _ => {}
            }
        }
        self.parse_predicate_object_list(tokens, handler, &subject, context)
    }

    // [7] predicateObjectList ::= verb objectList (';' (verb objectList)?)*
    // [9] verb ::= predicate | 'a'
    pub(crate) fn parse_predicate_object_list<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
        subject: &Subject,
        context: ListContext,
    ) -> Result<(), Interrupt> {
        let mut parsed_any = false;
        loop {
            let token = next_token(tokens);
            let predicate = match token.kind {
                TokenKind::KeywordA => NamedNode {
                    iri: RDF_TYPE.to_owned(),
                },
                TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&token)?,
                TokenKind::RightBracket
                    if context == ListContext::BlankNodeList && parsed_any =>
                {
                    return Ok(())
                }
                _ => {
                    return Err(
                        TurtleError::unexpected(&token, context.predicate_expectation()).into(),
                    )
                }
            };
            parsed_any = true;
            match self.parse_object_list(tokens, handler, subject, &predicate, context)? {
                ListEnd::Terminated => return Ok(()),
                ListEnd::Semicolon => {
                    // runs of semicolons coalesce, and a trailing semicolon
                    // directly before the terminator closes the list
                    loop {
                        let kind = peek(tokens).kind;
                        if kind == TokenKind::Semicolon {
                            tokens.dequeue();
                        } else if kind == context.terminator() {
                            tokens.dequeue();
                            return Ok(());
                        } else if kind == TokenKind::RightBrace
                            && context == ListContext::GraphBlock
                        {
                            // the '}' belongs to the graph block, not to us
                            return Ok(());
                        } else {
                            break;
                        }
                    }
                }
            }
        }
    }

    // [8] objectList ::= object annotation? (',' object annotation?)*
    fn parse_object_list<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
        subject: &Subject,
        predicate: &NamedNode,
        context: ListContext,
    ) -> Result<ListEnd, Interrupt> {
        loop {
            let token = next_token(tokens);
            let object = self.parse_object_term(tokens, handler, token)?;
            let triple = Triple {
                subject: subject.clone(),
                predicate: predicate.clone(),
                object,
            };
            emit(handler, triple.clone())?;
            loop {
                match peek(tokens).kind {
                    TokenKind::Comma => {
                        tokens.dequeue();
                        break;
                    }
                    TokenKind::Semicolon => {
                        tokens.dequeue();
                        return Ok(ListEnd::Semicolon);
                    }
                    TokenKind::Dot
                        if context == ListContext::Top
                            || context == ListContext::GraphBlock =>
                    {
                        tokens.dequeue();
                        return Ok(ListEnd::Terminated);
                    }
                    // the final statement in a graph block may omit its '.';
                    // the '}' stays for the block parser to consume
                    TokenKind::RightBrace if context == ListContext::GraphBlock => {
                        return Ok(ListEnd::Terminated);
                    }
                    TokenKind::RightBracket if context == ListContext::BlankNodeList => {
                        tokens.dequeue();
                        return Ok(ListEnd::Terminated);
                    }
                    TokenKind::EndAnnotation if context == ListContext::AnnotationList => {
                        tokens.dequeue();
                        return Ok(ListEnd::Terminated);
                    }
                    // [30t] annotation ::= '{|' predicateObjectList '|}'
                    TokenKind::StartAnnotation => {
                        let start = tokens.dequeue();
                        self.check_star_enabled(&start)?;
                        let annotated = Subject::Triple(Box::new(triple.clone()));
                        self.parse_predicate_object_list(
                            tokens,
                            handler,
                            &annotated,
                            ListContext::AnnotationList,
                        )?;
                    }
                    _ => {
                        let token = next_token(tokens);
                        return Err(TurtleError::unexpected(
                            &token,
                            context.continuation_expectation(),
                        )
                        .into());
                    }
                }
            }
        }
    }

    // [12] object ::= iri | BlankNode | collection | blankNodePropertyList | literal | quotedTriple
    fn parse_object_term<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
        token: Token,
    ) -> Result<Term, Interrupt> {
        Ok(match token.kind {
            TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&token)?.into(),
            TokenKind::BlankNodeWithId => BlankNode { id: token.value }.into(),
            TokenKind::BlankNode => self.bnode_id_generator.generate().into(),
            // [15] blankNodePropertyList ::= '[' predicateObjectList ']'
            TokenKind::LeftBracket => {
                if peek(tokens).kind == TokenKind::RightBracket {
                    tokens.dequeue();
                    self.bnode_id_generator.generate().into()
                } else {
                    let node = self.bnode_id_generator.generate();
                    let subject = Subject::from(node.clone());
                    self.parse_predicate_object_list(
                        tokens,
                        handler,
                        &subject,
                        ListContext::BlankNodeList,
                    )?;
                    node.into()
                }
            }
            TokenKind::LeftParen => Term::from(self.parse_collection(tokens, handler)?),
            TokenKind::Literal | TokenKind::LongLiteral | TokenKind::PlainLiteral => {
                self.parse_literal(tokens, token)?.into()
            }
            TokenKind::StartQuote => {
                self.check_star_enabled(&token)?;
                Term::Triple(Box::new(self.parse_quoted_triple(tokens)?))
            }
            _ => return Err(TurtleError::unexpected(&token, "the object of a triple").into()),
        })
    }

    // [16] collection ::= '(' object* ')'
    //
    // Expands to an rdf:first/rdf:rest chain. The head blank node is
    // returned, an empty collection resolves directly to rdf:nil.
    fn parse_collection<S: TokenSource, H: RdfHandler>(
        &mut self,
        tokens: &mut S,
        handler: &mut H,
    ) -> Result<NamedOrBlankNode, Interrupt> {
        if peek(tokens).kind == TokenKind::RightParen {
            tokens.dequeue();
            return Ok(NamedNode {
                iri: RDF_NIL.to_owned(),
            }
            .into());
        }
        let head = self.bnode_id_generator.generate();
        let mut current = head.clone();
        loop {
            let token = next_token(tokens);
            let item = self.parse_object_term(tokens, handler, token)?;
            emit(
                handler,
                Triple {
                    subject: current.clone().into(),
                    predicate: NamedNode {
                        iri: RDF_FIRST.to_owned(),
                    },
                    object: item,
                },
            )?;
            if peek(tokens).kind == TokenKind::RightParen {
                tokens.dequeue();
                emit(
                    handler,
                    Triple {
                        subject: current.into(),
                        predicate: NamedNode {
                            iri: RDF_REST.to_owned(),
                        },
                        object: NamedNode {
                            iri: RDF_NIL.to_owned(),
                        }
                        .into(),
                    },
                )?;
                return Ok(head.into());
            }
            let next = self.bnode_id_generator.generate();
            emit(
                handler,
                Triple {
                    subject: current.into(),
                    predicate: NamedNode {
                        iri: RDF_REST.to_owned(),
                    },
                    object: next.clone().into(),
                },
            )?;
            current = next;
        }
    }

    // [27t] quotedTriple ::= '<<' qtSubject verb qtObject '>>'
    //
    // A quoted triple is a term, not an assertion: nothing is reported to
    // the handler here. Sub-terms come from a restricted token set: no
    // property lists and no collections, only the anonymous blank form.
    fn parse_quoted_triple<S: TokenSource>(
        &mut self,
        tokens: &mut S,
    ) -> Result<Triple, Interrupt> {
        let subject_token = next_token(tokens);
        let subject: Subject = match subject_token.kind {
            TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&subject_token)?.into(),
            TokenKind::BlankNodeWithId => BlankNode {
                id: subject_token.value,
            }
            .into(),
            TokenKind::BlankNode => self.bnode_id_generator.generate().into(),
            TokenKind::LeftBracket => self.parse_quoted_anon(tokens)?.into(),
            TokenKind::StartQuote => Subject::Triple(Box::new(self.parse_quoted_triple(tokens)?)),
            _ => {
                return Err(TurtleError::unexpected(
                    &subject_token,
                    "the subject of a quoted triple",
                )
                .into())
            }
        };
        let predicate_token = next_token(tokens);
        let predicate = match predicate_token.kind {
            TokenKind::KeywordA => NamedNode {
                iri: RDF_TYPE.to_owned(),
            },
            TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&predicate_token)?,
            _ => {
                return Err(TurtleError::unexpected(
                    &predicate_token,
                    "the predicate of a quoted triple",
                )
                .into())
            }
        };
        let object_token = next_token(tokens);
        let object: Term = match object_token.kind {
            TokenKind::Iri | TokenKind::PrefixedName => self.resolve_name(&object_token)?.into(),
            TokenKind::BlankNodeWithId => BlankNode {
                id: object_token.value,
            }
            .into(),
            TokenKind::BlankNode => self.bnode_id_generator.generate().into(),
            TokenKind::LeftBracket => self.parse_quoted_anon(tokens)?.into(),
            TokenKind::Literal | TokenKind::LongLiteral | TokenKind::PlainLiteral => {
                self.parse_literal(tokens, object_token)?.into()
            }
            TokenKind::StartQuote => Term::Triple(Box::new(self.parse_quoted_triple(tokens)?)),
            _ => {
                return Err(TurtleError::unexpected(
                    &object_token,
                    "the object of a quoted triple",
                )
                .into())
            }
        };
        let end = next_token(tokens);
        if end.kind != TokenKind::EndQuote {
            return Err(TurtleError::unexpected(&end, "'>>' closing the quoted triple").into());
        }
        Ok(Triple {
            subject,
            predicate,
            object,
        })
    }

    fn parse_quoted_anon<S: TokenSource>(
        &mut self,
        tokens: &mut S,
    ) -> Result<BlankNode, Interrupt> {
        let close = next_token(tokens);
        if close.kind != TokenKind::RightBracket {
            return Err(TurtleError::unexpected(
                &close,
                "']' (property lists cannot appear inside quoted triples)",
            )
            .into());
        }
        Ok(self.bnode_id_generator.generate())
    }

    // [13] literal ::= RDFLiteral | NumericLiteral | BooleanLiteral
    // [128s] RDFLiteral ::= String (LANGTAG | '^^' iri)?
    fn parse_literal<S: TokenSource>(
        &mut self,
        tokens: &mut S,
        token: Token,
    ) -> Result<Literal, Interrupt> {
        match token.kind {
            TokenKind::Literal | TokenKind::LongLiteral => match peek(tokens).kind {
                TokenKind::LanguageTag => {
                    let tag_token = tokens.dequeue();
                    let language = LanguageTag::parse(tag_token.value.to_ascii_lowercase())
                        .map_err(|error| {
                            TurtleError::invalid_language_tag(
                                &tag_token.value,
                                error,
                                tag_token.position,
                            )
                        })?
                        .into_inner();
                    Ok(Literal::LanguageTaggedString {
                        value: token.value,
                        language,
                    })
                }
                TokenKind::Datatype => {
                    let datatype_token = tokens.dequeue();
                    let datatype = self.resolve_datatype(&datatype_token)?;
                    Ok(Literal::Typed {
                        value: token.value,
                        datatype,
                    })
                }
                _ => Ok(Literal::Simple { value: token.value }),
            },
            TokenKind::PlainLiteral => Ok(self.infer_plain_literal(token)?),
            _ => Err(TurtleError::unexpected(&token, "a literal").into()),
        }
    }

    // [19]-[21], [133s]: bare numbers and booleans carry their datatype in
    // their lexical form; the double form wins over integer over decimal
    // over boolean
    fn infer_plain_literal(&self, token: Token) -> Result<Literal, TurtleError> {
        let datatype = if is_valid_double(&token.value) {
            XSD_DOUBLE
        } else if is_valid_integer(&token.value) {
            XSD_INTEGER
        } else if is_valid_decimal(&token.value) {
            XSD_DECIMAL
        } else if is_valid_boolean(&token.value, self.syntax == TurtleSyntax::Original) {
            return Ok(Literal::Typed {
                value: token.value.to_ascii_lowercase(),
                datatype: NamedNode {
                    iri: XSD_BOOLEAN.to_owned(),
                },
            });
        } else {
            return Err(TurtleError::invalid_plain_literal(
                &token.value,
                token.position,
            ));
        };
        Ok(Literal::Typed {
            value: token.value,
            datatype: NamedNode {
                iri: datatype.to_owned(),
            },
        })
    }

    pub(crate) fn resolve_name(&self, token: &Token) -> Result<NamedNode, TurtleError> {
        match token.kind {
            TokenKind::Iri => Ok(NamedNode {
                iri: self
                    .resolve_iri_value(&token.value, token.position)?
                    .into_inner(),
            }),
            TokenKind::PrefixedName => self.resolve_prefixed(&token.value, token.position),
            _ => Err(TurtleError::unexpected(token, "an IRI or a prefixed name")),
        }
    }

    // a datatype token carries either an `<iri>` or a prefixed name
    fn resolve_datatype(&self, token: &Token) -> Result<NamedNode, TurtleError> {
        let value = &token.value;
        if value.starts_with('<') && value.ends_with('>') {
            Ok(NamedNode {
                iri: self
                    .resolve_iri_value(&value[1..value.len() - 1], token.position)?
                    .into_inner(),
            })
        } else {
            self.resolve_prefixed(value, token.position)
        }
    }

    fn resolve_iri_value(
        &self,
        value: &str,
        position: Position,
    ) -> Result<Iri<String>, TurtleError> {
        match &self.base_iri {
            Some(base) => base.resolve(value),
            None => Iri::parse(value.to_owned()),
        }
        .map_err(|error| TurtleError::invalid_iri(value, error, Some(position)))
    }

    // [137s] PrefixedName ::= PNAME_LN | PNAME_NS
    fn resolve_prefixed(&self, value: &str, position: Position) -> Result<NamedNode, TurtleError> {
        let mut parts = value.splitn(2, ':');
        let prefix = parts.next().unwrap_or("");
        let local = parts.next().unwrap_or("");
        match self.scope.get(prefix) {
            Some(namespace) => Ok(NamedNode {
                iri: format!("{}{}", namespace, local),
            }),
            None => Err(TurtleError::unknown_prefix(prefix, position)),
        }
    }

    fn check_star_enabled(&self, token: &Token) -> Result<(), TurtleError> {
        if self.syntax == TurtleSyntax::Rdf11Star {
            Ok(())
        } else {
            Err(TurtleError::unexpected(
                token,
                "a plain term (quoted triples and annotations need the RDF-star syntax)",
            ))
        }
    }
}

/// The construct a predicate-object list is nested in, deciding which
/// terminator tokens are legal.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum ListContext {
    Top,
    /// Inside a TriG graph block: like `Top`, but a '}' also ends the
    /// statement (left unconsumed for the block parser).
    GraphBlock,
    BlankNodeList,
    AnnotationList,
}

impl ListContext {
    fn terminator(self) -> TokenKind {
        match self {
            ListContext::Top | ListContext::GraphBlock => TokenKind::Dot,
            ListContext::BlankNodeList => TokenKind::RightBracket,
            ListContext::AnnotationList => TokenKind::EndAnnotation,
        }
    }

    fn predicate_expectation(self) -> &'static str {
        match self {
            ListContext::Top | ListContext::GraphBlock => "a predicate",
            ListContext::BlankNodeList => "a predicate or ']'",
            ListContext::AnnotationList => "a predicate or '|}'",
        }
    }

    fn continuation_expectation(self) -> &'static str {
        match self {
            ListContext::Top => "',', ';', '.' or an annotation",
            ListContext::GraphBlock => "',', ';', '.', '}' or an annotation",
            ListContext::BlankNodeList => "',', ';', ']' or an annotation",
            ListContext::AnnotationList => "',', ';', '|}' or an annotation",
        }
    }
}

enum ListEnd {
    Terminated,
    Semicolon,
}

pub(crate) fn emit<H: RdfHandler>(handler: &mut H, triple: Triple) -> Result<(), Interrupt> {
    if handler.handle_triple(triple) {
        Ok(())
    } else {
        Err(Interrupt::Stop)
    }
}

pub(crate) fn next_token(tokens: &mut impl TokenSource) -> Token {
    loop {
        let token = tokens.dequeue();
        if token.kind != TokenKind::Comment {
            return token;
        }
    }
}

pub(crate) fn peek(tokens: &mut impl TokenSource) -> &Token {
    while tokens.peek().kind == TokenKind::Comment {
        tokens.dequeue();
    }
    tokens.peek()
}
