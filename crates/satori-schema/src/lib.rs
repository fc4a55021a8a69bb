//! # satori-schema — Composable Schema Validation
//!
//! Turns a declarative, partially specified description of a data shape
//! into a single [`Schema`] that can check data, check another schema for
//! subsumption, fill in and strip defaults, render its effective
//! specification and hand out blueprints.
//!
//! ## Composition
//!
//! A spec activates any number of facets (type, options, min, max, regex,
//! record, map, list; the base facet is always on). The global
//! [`Registry`] orders them so every facet runs after the facets it
//! refines, with ties broken by a fixed priority. The resulting chain is
//! checked against itself before the schema is returned:
//!
//! ```
//! use satori_schema::Schema;
//! use serde_yaml::Value;
//!
//! let schema = Schema::parse("{type: integer, min: 0, max: 10}").unwrap();
//! assert!(schema.validate(&Value::from(5_i64)).is_ok());
//! assert!(schema.validate(&Value::from(11_i64)).is_err());
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `satori-core` internally.
//! - Validation collects every violation in one pass; it never stops at the
//!   first error.
//! - A `Schema` is immutable once composed and is `Send + Sync`.
//! - Logs through `tracing`; never installs a subscriber.

pub mod blueprint;
pub mod error;
pub mod facet;
pub mod registry;
pub mod schema;
pub mod spec;
mod structural;

pub use blueprint::{Blueprint, BlueprintError, BlueprintValue};
pub use error::{SchemaError, ValidationError, ValidationErrors, ValidationFailed};
pub use facet::{FacetKind, Primitive};
pub use registry::{FacetDescriptor, Registry};
pub use schema::Schema;
pub use spec::RawSpec;
