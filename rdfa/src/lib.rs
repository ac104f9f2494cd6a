//! Implementation of an [RDFa Core 1.1](https://www.w3.org/TR/rdfa-core/)
//! and RDFa 1.0 processor over an abstract document tree.
//!
//! The parser walks a tree exposed through the [`dom::Document`] trait and
//! reports triples into a handler as they are produced. Property copying
//! (`rdfa:Pattern`/`rdfa:copy`) is available as a handler wrapper.
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

mod context;
pub mod dom;
mod error;
mod parser;
mod pattern;
pub mod vocab;

pub use crate::context::NoProfileLoader;
pub use crate::context::Profile;
pub use crate::context::ProfileLoader;
pub use crate::context::RdfaSyntax;
pub use crate::error::RdfaError;
pub use crate::parser::RdfaParser;
pub use crate::pattern::PatternCopyingHandler;
