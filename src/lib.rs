//! Strict JSON request-body decoding
//!
//! Decodes a request body against a closed schema: bounded size, exactly one
//! JSON value, no undeclared fields. Every failure is classified into a small
//! stable set of [`ErrorKind`]s with a client-facing message. The [`Runtime`]
//! scalar carries minute counts as `"<N> mins"` strings.
//!
//! # Example
//!
//! ```rust
//! use serde::Deserialize;
//! use strict_body::{decode_slice, field, DecodeError, Field, FieldKind, Runtime, Schema};
//!
//! #[derive(Debug, Deserialize)]
//! struct MovieInput {
//!     title: String,
//!     runtime: Runtime,
//! }
//!
//! impl Schema for MovieInput {
//!     const FIELDS: &'static [Field] = &[
//!         field("title", FieldKind::String),
//!         field("runtime", FieldKind::Runtime),
//!     ];
//! }
//!
//! let movie: MovieInput = decode_slice(br#"{"title":"Inception","runtime":"148 mins"}"#).unwrap();
//! assert_eq!(movie.runtime, Runtime(148));
//!
//! let err = decode_slice::<MovieInput>(br#"{"title":"x","year":5}"#).unwrap_err();
//! assert_eq!(err, DecodeError::UnknownField { field: "year".into() });
//! ```

mod error;
mod runtime;
mod schema;
mod observe;
mod decoder;
mod envelope;

pub use error::*;
pub use runtime::*;
pub use schema::*;
pub use observe::*;
pub use decoder::*;
pub use envelope::*;

#[cfg(test)]
mod tests;
