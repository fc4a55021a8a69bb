//! # Blueprints
//!
//! A blueprint is a skeleton value for a record or map schema. Keys that
//! have not been set are synthesized on first access from the nested
//! schema's own blueprint and cached, so callers can build deeply nested
//! defaults one path at a time:
//!
//! ```
//! use satori_schema::Schema;
//!
//! let schema = Schema::parse("fields: {limits: {fields: {time: {type: integer}}}}").unwrap();
//! let mut blue = schema.blueprint().unwrap();
//! blue.node("limits").unwrap().set("time", serde_yaml::Value::from(10_i64));
//! assert_eq!(
//!     blue.to_value(),
//!     serde_yaml::from_str::<serde_yaml::Value>("limits: {time: 10}").unwrap()
//! );
//! ```
//!
//! Population needs `&mut self`, so the memo cache is never touched by two
//! threads at once.

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use satori_core::{key_string, Mapping, Value};
use thiserror::Error;

use crate::schema::Schema;
use crate::structural::Fields;

/// Error obtaining or walking a blueprint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlueprintError {
    /// The schema is not a single record or map shape.
    #[error("No blueprint available for this schema")]
    Unavailable,

    /// The key is not declared and cannot be synthesized.
    #[error("no blueprint for key '{0}'")]
    UnknownKey(String),

    /// The entry holds a plain value, not a nested blueprint.
    #[error("entry '{0}' is a plain value")]
    NotANode(String),
}

/// Where missing keys come from.
#[derive(Debug, Clone)]
pub(crate) enum Factory {
    /// A record: each declared field has its own schema.
    Fields(Arc<Fields>),
    /// A map: every key shares the value schema.
    Values(Arc<Schema>),
}

impl Factory {
    fn synthesize(&self, key: &str) -> Result<Blueprint, BlueprintError> {
        let schema = match self {
            Self::Fields(fields) => &fields
                .get(key)
                .ok_or_else(|| BlueprintError::UnknownKey(key.to_string()))?
                .schema,
            Self::Values(schema) => schema,
        };
        schema
            .blueprint()
            .map_err(|_| BlueprintError::UnknownKey(key.to_string()))
    }
}

/// One entry of a blueprint.
#[derive(Debug, Clone)]
pub enum BlueprintValue {
    /// A nested skeleton.
    Node(Blueprint),
    /// A value set by the caller.
    Value(Value),
}

/// Mappings become nested blueprints with no factory; anything else is a
/// plain value.
impl From<Value> for BlueprintValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Mapping(map) => Self::Node(Blueprint {
                entries: map
                    .into_iter()
                    .map(|(key, value)| (key_string(&key), Self::from(value)))
                    .collect(),
                factory: None,
            }),
            other => Self::Value(other),
        }
    }
}

impl BlueprintValue {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Node(node) => node.to_value(),
            Self::Value(value) => value.clone(),
        }
    }
}

/// Lazily populated skeleton of a record or map.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    entries: IndexMap<String, BlueprintValue>,
    factory: Option<Factory>,
}

impl Blueprint {
    /// An empty blueprint with no factory.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Get an entry, synthesizing and caching it on first access.
    ///
    /// # Errors
    ///
    /// Returns `BlueprintError::UnknownKey` if the key is not set and the
    /// schema offers no nested blueprint for it.
    pub fn entry(&mut self, key: &str) -> Result<&mut BlueprintValue, BlueprintError> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let factory = self
                    .factory
                    .as_ref()
                    .ok_or_else(|| BlueprintError::UnknownKey(key.to_string()))?;
                let node = factory.synthesize(key)?;
                Ok(vacant.insert(BlueprintValue::Node(node)))
            }
        }
    }

    /// Like [`entry`](Self::entry), but the entry must be a nested blueprint.
    pub fn node(&mut self, key: &str) -> Result<&mut Blueprint, BlueprintError> {
        match self.entry(key)? {
            BlueprintValue::Node(node) => Ok(node),
            BlueprintValue::Value(_) => Err(BlueprintError::NotANode(key.to_string())),
        }
    }

    /// Set a value, replacing whatever the key held. A mapping is stored
    /// as a nested blueprint, so its keys can be walked with
    /// [`node`](Self::node).
    pub fn set(&mut self, key: &str, value: Value) {
        self.entries
            .insert(key.to_string(), BlueprintValue::from(value));
    }

    /// Look up an entry without populating it.
    pub fn get(&self, key: &str) -> Option<&BlueprintValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BlueprintValue> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Convert the populated skeleton into a plain mapping value.
    pub fn to_value(&self) -> Value {
        let mapping: Mapping = self
            .entries
            .iter()
            .map(|(key, entry)| (Value::String(key.clone()), entry.to_value()))
            .collect();
        Value::Mapping(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn record() -> Schema {
        Schema::parse(
            "fields:\n  limits:\n    fields:\n      time: integer\n      memory: integer\n  name: string\n",
        )
        .unwrap()
    }

    #[test]
    fn non_structural_has_no_blueprint() {
        let schema = Schema::parse("integer").unwrap();
        assert_eq!(schema.blueprint().unwrap_err(), BlueprintError::Unavailable);
        let untyped = Schema::new(crate::RawSpec::None).unwrap();
        assert_eq!(untyped.blueprint().unwrap_err(), BlueprintError::Unavailable);
    }

    #[test]
    fn multi_typed_has_no_blueprint() {
        let schema = Schema::parse("type: [map, string]").unwrap();
        assert!(schema.blueprint().is_err());
    }

    #[test]
    fn record_blueprint_starts_empty() {
        let blue = record().blueprint().unwrap();
        assert!(blue.is_empty());
        assert_eq!(blue.to_value(), yaml("{}"));
    }

    #[test]
    fn missing_record_field_is_synthesized_once() {
        let mut blue = record().blueprint().unwrap();
        blue.node("limits").unwrap().set("time", yaml("5"));
        // Second access returns the cached node, keeping what was set.
        blue.node("limits").unwrap().set("memory", yaml("64"));
        assert_eq!(blue.len(), 1);
        assert_eq!(blue.to_value(), yaml("limits: {time: 5, memory: 64}"));
    }

    #[test]
    fn undeclared_field_is_unknown() {
        let mut blue = record().blueprint().unwrap();
        assert_eq!(
            blue.entry("nope").unwrap_err(),
            BlueprintError::UnknownKey("nope".into())
        );
    }

    #[test]
    fn scalar_field_has_no_nested_blueprint() {
        let mut blue = record().blueprint().unwrap();
        assert_eq!(
            blue.entry("name").unwrap_err(),
            BlueprintError::UnknownKey("name".into())
        );
        blue.set("name", yaml("x"));
        assert!(matches!(blue.entry("name").unwrap(), BlueprintValue::Value(_)));
        assert_eq!(blue.node("name").unwrap_err(), BlueprintError::NotANode("name".into()));
    }

    #[test]
    fn assigned_mapping_becomes_a_node() {
        let mut blue = record().blueprint().unwrap();
        blue.set("limits", yaml("{time: 5, extra: {deep: 1}}"));
        let limits = blue.node("limits").unwrap();
        limits.set("memory", yaml("64"));
        assert!(matches!(limits.entry("extra").unwrap(), BlueprintValue::Node(_)));
        // An assigned node has no factory, so undeclared keys stay unknown.
        assert_eq!(
            limits.entry("other").unwrap_err(),
            BlueprintError::UnknownKey("other".into())
        );
        assert_eq!(
            blue.to_value(),
            yaml("limits: {time: 5, extra: {deep: 1}, memory: 64}")
        );
    }

    #[test]
    fn map_blueprint_synthesizes_any_key() {
        let schema = Schema::parse("key: string\nvalue: {fields: {size: integer}}\n").unwrap();
        let mut blue = schema.blueprint().unwrap();
        blue.node("a").unwrap().set("size", yaml("1"));
        blue.node("b").unwrap();
        assert_eq!(blue.to_value(), yaml("{a: {size: 1}, b: {}}"));
    }

    #[test]
    fn plain_map_blueprint_has_no_nested_nodes() {
        let schema = Schema::parse("map").unwrap();
        let mut blue = schema.blueprint().unwrap();
        assert!(blue.entry("x").is_err());
    }

    #[test]
    fn get_does_not_populate() {
        let mut blue = record().blueprint().unwrap();
        assert!(blue.get("limits").is_none());
        blue.entry("limits").unwrap();
        assert!(blue.contains_key("limits"));
        assert_eq!(blue.keys().collect::<Vec<_>>(), vec!["limits"]);
        assert!(blue.remove("limits").is_some());
        assert!(blue.is_empty());
    }
}
