//! # satori-core — Value Model for the satori Toolchain
//!
//! This crate is the leaf of the satori workspace. It owns the boundary
//! between configuration text and the primitive value tree that the schema
//! engine operates on.
//!
//! ## Key Design Principles
//!
//! 1. **One value tree.** Every document, schema spec and default value is a
//!    `serde_yaml::Value`. Its `Mapping` keeps insertion order, so rendered
//!    specifications come out in a stable, declaration-driven key order.
//!
//! 2. **Text in, text out.** [`text::parse`] and [`text::render`] are the only
//!    places YAML syntax is touched. The schema engine never formats YAML
//!    itself.
//!
//! 3. **Categories, not Rust types.** [`ValueKind`] classifies a value into
//!    the categories schema type names refer to (boolean, integer, real,
//!    string, sequence, mapping).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `satori-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod text;
pub mod value;

pub use error::CoreError;
pub use serde_yaml::{Mapping, Value};
pub use value::{compare_numbers, describe, key_string, untagged, ValueKind};
