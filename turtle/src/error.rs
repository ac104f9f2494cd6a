use oxilangtag::LanguageTagParseError;
use oxiri::IriParseError;
use std::error::Error;
use std::fmt;
use tern_api::token::{Position, Token};

/// Error raised by the Turtle-family parsers.
///
/// It carries the offending token, a description of what the grammar
/// expected there, and the token position when the tokenizer provided one.
#[derive(Debug)]
pub struct TurtleError {
    pub(crate) kind: TurtleErrorKind,
    pub(crate) position: Option<Position>,
}

#[derive(Debug)]
pub(crate) enum TurtleErrorKind {
    UnexpectedToken { found: String, expected: String },
    UnknownPrefix(String),
    InvalidIri { iri: String, error: IriParseError },
    InvalidLanguageTag { tag: String, error: LanguageTagParseError },
    InvalidPlainLiteral(String),
    MultipleDefaultGraphs,
}

impl TurtleError {
    /// The source position of the token that triggered the error, if known.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub(crate) fn unexpected(token: &Token, expected: impl Into<String>) -> Self {
        Self {
            kind: TurtleErrorKind::UnexpectedToken {
                found: if token.value.is_empty() {
                    token.kind.to_string()
                } else {
                    format!("{} '{}'", token.kind, token.value)
                },
                expected: expected.into(),
            },
            position: Some(token.position),
        }
    }

    pub(crate) fn unknown_prefix(prefix: &str, position: Position) -> Self {
        Self {
            kind: TurtleErrorKind::UnknownPrefix(prefix.to_owned()),
            position: Some(position),
        }
    }

    pub(crate) fn invalid_iri(iri: &str, error: IriParseError, position: Option<Position>) -> Self {
        Self {
            kind: TurtleErrorKind::InvalidIri {
                iri: iri.to_owned(),
                error,
            },
            position,
        }
    }

    pub(crate) fn invalid_language_tag(
        tag: &str,
        error: LanguageTagParseError,
        position: Position,
    ) -> Self {
        Self {
            kind: TurtleErrorKind::InvalidLanguageTag {
                tag: tag.to_owned(),
                error,
            },
            position: Some(position),
        }
    }

    pub(crate) fn invalid_plain_literal(value: &str, position: Position) -> Self {
        Self {
            kind: TurtleErrorKind::InvalidPlainLiteral(value.to_owned()),
            position: Some(position),
        }
    }

    pub(crate) fn multiple_default_graphs(position: Position) -> Self {
        Self {
            kind: TurtleErrorKind::MultipleDefaultGraphs,
            position: Some(position),
        }
    }
}

impl fmt::Display for TurtleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TurtleErrorKind::UnexpectedToken { found, expected } => {
                write!(f, "unexpected {}, expected {}", found, expected)?
            }
            TurtleErrorKind::UnknownPrefix(prefix) => {
                write!(f, "the prefix '{}:' has not been declared", prefix)?
            }
            TurtleErrorKind::InvalidIri { iri, error } => {
                write!(f, "the IRI '{}' is invalid: {}", iri, error)?
            }
            TurtleErrorKind::InvalidLanguageTag { tag, error } => {
                write!(f, "the language tag '{}' is invalid: {}", tag, error)?
            }
            TurtleErrorKind::InvalidPlainLiteral(value) => write!(
                f,
                "'{}' is not a valid number or boolean lexical form",
                value
            )?,
            TurtleErrorKind::MultipleDefaultGraphs => write!(
                f,
                "a TriG document may contain at most one unnamed graph block"
            )?,
        }
        if let Some(position) = self.position {
            write!(f, " at {}", position)?;
        }
        Ok(())
    }
}

impl Error for TurtleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            TurtleErrorKind::InvalidIri { error, .. } => Some(error),
            TurtleErrorKind::InvalidLanguageTag { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Internal unwinding signal.
///
/// A handler returning `false` requests a clean stop, which must not be
/// conflated with a parse failure: only `Error` reaches the caller, `Stop`
/// is translated into a successful end of parse at the top level.
pub(crate) enum Interrupt {
    Stop,
    Error(TurtleError),
}

impl From<TurtleError> for Interrupt {
    fn from(error: TurtleError) -> Self {
        Interrupt::Error(error)
    }
}
