//! Implementation of [Turtle](https://www.w3.org/TR/turtle/), [TriG](https://www.w3.org/TR/trig/), [N-Triples](https://www.w3.org/TR/n-triples/) and [N-Quads](https://www.w3.org/TR/n-quads/) parsers.
//!
//! The parsers are driven by a typed token queue produced by an external
//! tokenizer and report triples and quads into a handler as soon as each
//! statement completes.
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_qualifications
)]
#![doc(test(attr(deny(warnings))))]

mod error;
mod nquads;
mod trig;
mod turtle;
mod utils;

pub use crate::error::TurtleError;
pub use crate::nquads::NQuadsParser;
pub use crate::nquads::NTriplesParser;
pub use crate::trig::TriGParser;
pub use crate::trig::TriGSyntax;
pub use crate::turtle::TurtleParser;
pub use crate::turtle::TurtleSyntax;
pub use crate::utils::{is_valid_boolean, is_valid_decimal, is_valid_double, is_valid_integer};
