use oxiri::IriParseError;
use std::error::Error;
use std::fmt;

/// A fatal error raised while evaluating an RDFa document.
///
/// RDFa is deliberately lenient: unresolvable CURIEs, terms and profile
/// documents are reported on the warning channel and their attributes
/// dropped. Only genuinely unprocessable documents surface here.
#[derive(Debug)]
pub struct RdfaError {
    kind: RdfaErrorKind,
}

#[derive(Debug)]
enum RdfaErrorKind {
    InvalidBaseIri {
        iri: String,
        error: IriParseError,
    },
    NonIriDatatype {
        value: String,
    },
    UndefinedXmlNamespace {
        prefix: String,
    },
}

impl RdfaError {
    pub(crate) fn invalid_base_iri(iri: &str, error: IriParseError) -> Self {
        Self {
            kind: RdfaErrorKind::InvalidBaseIri {
                iri: iri.to_owned(),
                error,
            },
        }
    }

    pub(crate) fn non_iri_datatype(value: &str) -> Self {
        Self {
            kind: RdfaErrorKind::NonIriDatatype {
                value: value.to_owned(),
            },
        }
    }

    pub(crate) fn undefined_xml_namespace(prefix: &str) -> Self {
        Self {
            kind: RdfaErrorKind::UndefinedXmlNamespace {
                prefix: prefix.to_owned(),
            },
        }
    }
}

impl fmt::Display for RdfaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RdfaErrorKind::InvalidBaseIri { iri, error } => {
                write!(f, "invalid base IRI '{}': {}", iri, error)
            }
            RdfaErrorKind::NonIriDatatype { value } => {
                write!(f, "the datatype '{}' does not resolve to an IRI", value)
            }
            RdfaErrorKind::UndefinedXmlNamespace { prefix } => write!(
                f,
                "malformed XML literal: the namespace prefix '{}' is undefined",
                prefix
            ),
        }
    }
}

impl Error for RdfaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            RdfaErrorKind::InvalidBaseIri { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Why the tree walk unwound: the handler asked for a clean stop, or a
/// fatal error occurred. Warnings never travel this channel.
pub(crate) enum Interrupt {
    Stop,
    Error(RdfaError),
}

impl From<RdfaError> for Interrupt {
    fn from(error: RdfaError) -> Self {
        Interrupt::Error(error)
    }
}
