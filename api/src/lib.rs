//! This crate provides the shared data structures and interfaces for token-driven RDF parsers.
//!
//! It is used by the [`tern_turtle`](https://docs.rs/tern_turtle/) and [`tern_rdfa`](https://docs.rs/tern_rdfa/) crates.
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

pub mod handler;
pub mod model;
pub mod scope;
pub mod token;
