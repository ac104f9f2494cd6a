//! The boundary between the external tokenizer and the grammar engines.
//!
//! The engines never see raw characters. They consume an ordered queue of
//! typed tokens that starts with a [`TokenKind::Bof`] token and ends with a
//! [`TokenKind::Eof`] token, using only one token of lookahead.

use std::fmt;

/// The closed set of token types the grammar engines dispatch on.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TokenKind {
    /// Start-of-file marker, always the first token of a queue.
    Bof,
    /// End-of-file marker, always the last token of a queue.
    Eof,
    /// A comment, discarded by all engines.
    Comment,
    /// The `@` introducing a Turtle-style directive.
    At,
    /// The `base` keyword (either `@base` body or SPARQL-style `BASE`).
    BaseDirective,
    /// The `prefix` keyword (either `@prefix` body or SPARQL-style `PREFIX`).
    PrefixDirective,
    /// A `p:` prefix name inside a prefix directive.
    PrefixName,
    /// A `<...>` IRI reference. The value carries the content without angle brackets.
    Iri,
    /// A `p:local` prefixed name.
    PrefixedName,
    /// An anonymous blank node introduction (`[]` collapsed by the tokenizer, or bare `_:`).
    BlankNode,
    /// A `_:label` blank node. The value carries the label.
    BlankNodeWithId,
    /// The `a` shorthand keyword for `rdf:type`.
    KeywordA,
    /// A quoted string literal. The value carries the unescaped content.
    Literal,
    /// A triple-quoted long string literal.
    LongLiteral,
    /// An unquoted literal (number or boolean).
    PlainLiteral,
    /// A `@lang` tag following a literal. The value carries the tag without `@`.
    LanguageTag,
    /// A `^^<iri>` or `^^p:local` datatype annotation. The value carries the raw IRI or prefixed name.
    Datatype,
    Dot,
    Comma,
    Semicolon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// The TriG `GRAPH` keyword.
    Graph,
    /// The legacy TriG `=` between a graph name and its block.
    Equals,
    /// `<<`
    StartQuote,
    /// `>>`
    EndQuote,
    /// `{|`
    StartAnnotation,
    /// `|}`
    EndAnnotation,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Bof => "start of file",
            TokenKind::Eof => "end of file",
            TokenKind::Comment => "comment",
            TokenKind::At => "'@'",
            TokenKind::BaseDirective => "base directive",
            TokenKind::PrefixDirective => "prefix directive",
            TokenKind::PrefixName => "prefix name",
            TokenKind::Iri => "IRI reference",
            TokenKind::PrefixedName => "prefixed name",
            TokenKind::BlankNode => "blank node",
            TokenKind::BlankNodeWithId => "labelled blank node",
            TokenKind::KeywordA => "keyword 'a'",
            TokenKind::Literal => "literal",
            TokenKind::LongLiteral => "long literal",
            TokenKind::PlainLiteral => "plain literal",
            TokenKind::LanguageTag => "language tag",
            TokenKind::Datatype => "datatype annotation",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Graph => "keyword 'GRAPH'",
            TokenKind::Equals => "'='",
            TokenKind::StartQuote => "'<<'",
            TokenKind::EndQuote => "'>>'",
            TokenKind::StartAnnotation => "'{|'",
            TokenKind::EndAnnotation => "'|}'",
        })
    }
}

/// A position in the source text, 1-based.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// A typed token produced by an external tokenizer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Position,
}

impl Token {
    /// A value-less token of the given kind at the default position.
    pub fn of(kind: TokenKind) -> Self {
        Self {
            kind,
            value: String::new(),
            position: Position::default(),
        }
    }

    /// A token with a value at the default position.
    pub fn with_value(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            position: Position::default(),
        }
    }
}

/// An ordered token queue with single-token lookahead.
///
/// Implementations must yield a [`TokenKind::Bof`] token first and a
/// [`TokenKind::Eof`] token last, and keep returning `Eof` tokens once the
/// queue is exhausted.
pub trait TokenSource {
    /// Inspects the next token without consuming it.
    fn peek(&mut self) -> &Token;

    /// Consumes and returns the next token.
    fn dequeue(&mut self) -> Token;
}

/// A [`TokenSource`] over a token vector built ahead of time.
///
/// ```
/// use tern_api::token::{Token, TokenKind, TokenSource, VecTokenSource};
///
/// let mut tokens = VecTokenSource::new(vec![Token::of(TokenKind::Bof)]);
/// assert_eq!(TokenKind::Bof, tokens.dequeue().kind);
/// assert_eq!(TokenKind::Eof, tokens.peek().kind);
/// ```
pub struct VecTokenSource {
    tokens: std::vec::IntoIter<Token>,
    peeked: Option<Token>,
    eof: Token,
}

impl VecTokenSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            peeked: None,
            eof: Token::of(TokenKind::Eof),
        }
    }
}

impl TokenSource for VecTokenSource {
    fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next();
        }
        self.peeked.as_ref().unwrap_or(&self.eof)
    }

    fn dequeue(&mut self) -> Token {
        self.peeked
            .take()
            .or_else(|| self.tokens.next())
            .unwrap_or_else(|| self.eof.clone())
    }
}

impl From<Vec<Token>> for VecTokenSource {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}
