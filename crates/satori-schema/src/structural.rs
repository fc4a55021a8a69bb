//! # Structural Facets
//!
//! Record, map and list facets recurse into nested schemas. Each nested
//! field, key, value or item schema is itself composed through the registry
//! that built the parent, so nesting follows the same activation and
//! ordering rules as the top level.
//!
//! All three refine the type facet and default its `type` to `record`,
//! `map` or `list`. Data of the wrong shape is left to the type facet; the
//! structural facet only recurses into values it can walk.

use std::sync::Arc;

use indexmap::IndexMap;
use satori_core::{key_string, Mapping, Value};

use crate::blueprint::{Blueprint, BlueprintError, Factory};
use crate::error::{SchemaError, ValidationError};
use crate::facet::{set_default, FacetKind};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::spec::RawSpec;

/// A declared record field. `key` is the mapping key as written, which
/// need not be a string.
#[derive(Debug)]
pub(crate) struct Field {
    pub(crate) key: Value,
    pub(crate) schema: Arc<Schema>,
}

/// Ordered table of record fields, by field name.
pub(crate) type Fields = IndexMap<String, Field>;

fn nested(spec: Option<&Value>, registry: &Registry<'static>) -> Result<Arc<Schema>, SchemaError> {
    let raw = match spec {
        Some(value) => RawSpec::try_from(value.clone())?,
        None => RawSpec::None,
    };
    Ok(Arc::new(Schema::compose(registry, raw, Mapping::new())?))
}

fn spec_required(spec: &Mapping) -> bool {
    spec.get("required").and_then(Value::as_bool).unwrap_or(false)
}

/// Recursively augment a nested schema into `draft[key]`, leaving the key
/// out when the nested schema contributes nothing.
fn augment_nested(
    schema: &Schema,
    draft: &mut Mapping,
    key: &str,
    conflicts: &mut Vec<String>,
) {
    let mut sub = match draft.get(key) {
        Some(Value::Mapping(existing)) => existing.clone(),
        _ => Mapping::new(),
    };
    schema.augment_spec(&mut sub, conflicts);
    if !sub.is_empty() {
        draft.insert(key.into(), Value::Mapping(sub));
    }
}

// ─── Record ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct RecordFacet {
    pub(crate) fields: Arc<Fields>,
}

impl RecordFacet {
    /// Build field schemas and, for an optional record without an explicit
    /// default, synthesize one from the fields' defaults.
    pub(crate) fn build(spec: &mut Mapping, registry: &Registry<'static>) -> Result<Self, SchemaError> {
        let declared = match spec.get("fields").or_else(|| spec.get("entries")) {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(declared)) => declared.clone(),
            Some(_) => {
                return Err(SchemaError::invalid(
                    "'fields' must map field names to specs",
                ))
            }
        };

        let mut fields = Fields::new();
        let mut defaults = Mapping::new();
        for (key, subspec) in declared {
            let schema = nested(Some(&subspec), registry)?;
            if let Some(default) = schema.default_value() {
                defaults.insert(key.clone(), default.clone());
            }
            fields.insert(key_string(&key), Field { key, schema });
        }

        set_default(spec, "type", Value::String("record".into()));
        if !spec_required(spec) {
            set_default(spec, "default", Value::Mapping(defaults));
        }
        Ok(Self {
            fields: Arc::new(fields),
        })
    }

    pub(crate) fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let Value::Mapping(map) = data else {
            return;
        };
        for (name, field) in self.fields.iter() {
            let value = map.get(&field.key).unwrap_or(&Value::Null);
            field.schema.check(value, errors, &format!("{path}.{name}"));
        }
    }

    pub(crate) fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.record_facet() {
            for (name, field) in self.fields.iter() {
                match theirs.fields.get(name) {
                    Some(their_field) => field.schema.check_schema(
                        &their_field.schema,
                        errors,
                        &format!("{path}.{name}"),
                    ),
                    None => errors.push(ValidationError::new(
                        format!("no specification for field '{name}'"),
                        path,
                    )),
                }
            }
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("no record specification", path));
        }
    }

    /// Field specs are always written, even empty ones: an empty spec still
    /// declares the field.
    pub(crate) fn augment(&self, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        let mut fields = match draft.get("fields") {
            Some(Value::Mapping(existing)) => existing.clone(),
            _ => Mapping::new(),
        };
        for field in self.fields.values() {
            let mut sub = match fields.get(&field.key) {
                Some(Value::Mapping(existing)) => existing.clone(),
                _ => Mapping::new(),
            };
            field.schema.augment_spec(&mut sub, conflicts);
            fields.insert(field.key.clone(), Value::Mapping(sub));
        }
        draft.insert("fields".into(), Value::Mapping(fields));
    }

    /// Fields whose normalized value is null are left out.
    pub(crate) fn normalize(&self, data: Value) -> Value {
        let mut map = match data {
            Value::Mapping(map) => map,
            other => return other,
        };
        for field in self.fields.values() {
            let current = map.get(&field.key).cloned().unwrap_or(Value::Null);
            let normalized = field.schema.normalize_owned(current);
            if !normalized.is_null() {
                map.insert(field.key.clone(), normalized);
            }
        }
        Value::Mapping(map)
    }

    pub(crate) fn simplify(&self, data: Value) -> Value {
        let map = match data {
            Value::Mapping(map) => map,
            other => return other,
        };
        let simplified = map
            .into_iter()
            .filter_map(|(key, value)| {
                let field = self
                    .fields
                    .get(&key_string(&key))
                    .filter(|field| field.key == key);
                match field {
                    Some(field) => {
                        let value = field.schema.simplify_owned(value);
                        (!value.is_null()).then_some((key, value))
                    }
                    None => Some((key, value)),
                }
            })
            .collect();
        Value::Mapping(simplified)
    }

    pub(crate) fn blueprint(
        &self,
        prev: Result<Blueprint, BlueprintError>,
    ) -> Result<Blueprint, BlueprintError> {
        Ok(prev?.with_factory(Factory::Fields(Arc::clone(&self.fields))))
    }
}

// ─── Map ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct MapFacet {
    pub(crate) key: Arc<Schema>,
    pub(crate) value: Arc<Schema>,
}

impl MapFacet {
    pub(crate) fn build(spec: &mut Mapping, registry: &Registry<'static>) -> Result<Self, SchemaError> {
        set_default(spec, "type", Value::String("map".into()));
        let key = nested(spec.get("key"), registry)?;
        if key.declared_default().is_some() {
            return Err(SchemaError::invalid(
                "cannot specify default value for mapping keys",
            ));
        }
        let value = nested(spec.get("value"), registry)?;
        Ok(Self { key, value })
    }

    pub(crate) fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let Value::Mapping(map) = data else {
            return;
        };
        let key_path = format!("{path}[keys]");
        let value_path = format!("{path}[values]");
        for (key, value) in map {
            self.key.check(key, errors, &key_path);
            self.value.check(value, errors, &value_path);
        }
    }

    pub(crate) fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.map_facet() {
            self.key.check_schema(&theirs.key, errors, &format!("{path}[keys]"));
            self.value
                .check_schema(&theirs.value, errors, &format!("{path}[values]"));
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("no map specification", path));
        }
    }

    pub(crate) fn augment(&self, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        augment_nested(&self.key, draft, "key", conflicts);
        augment_nested(&self.value, draft, "value", conflicts);
    }

    pub(crate) fn normalize(&self, data: Value) -> Value {
        let map = match data {
            Value::Mapping(map) => map,
            other => return other,
        };
        Value::Mapping(
            map.into_iter()
                .map(|(key, value)| (key, self.value.normalize_owned(value)))
                .collect(),
        )
    }

    /// Entries are kept even when their value simplifies to null: the key
    /// itself carries information.
    pub(crate) fn simplify(&self, data: Value) -> Value {
        let map = match data {
            Value::Mapping(map) => map,
            other => return other,
        };
        Value::Mapping(
            map.into_iter()
                .map(|(key, value)| (key, self.value.simplify_owned(value)))
                .collect(),
        )
    }

    pub(crate) fn blueprint(
        &self,
        prev: Result<Blueprint, BlueprintError>,
    ) -> Result<Blueprint, BlueprintError> {
        Ok(prev?.with_factory(Factory::Values(Arc::clone(&self.value))))
    }
}

// ─── List ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct ListFacet {
    pub(crate) item: Arc<Schema>,
}

impl ListFacet {
    pub(crate) fn build(spec: &mut Mapping, registry: &Registry<'static>) -> Result<Self, SchemaError> {
        set_default(spec, "type", Value::String("list".into()));
        let item = nested(spec.get("item").or_else(|| spec.get("element")), registry)?;
        if item.declared_default().is_some() {
            return Err(SchemaError::invalid(
                "cannot specify a default value for list items",
            ));
        }
        Ok(Self { item })
    }

    pub(crate) fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let Value::Sequence(items) = data else {
            return;
        };
        for (index, item) in items.iter().enumerate() {
            self.item.check(item, errors, &format!("{path}[{index}]"));
        }
    }

    pub(crate) fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.list_facet() {
            self.item
                .check_schema(&theirs.item, errors, &format!("{path}[items]"));
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("no list specification", path));
        }
    }

    pub(crate) fn augment(&self, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        augment_nested(&self.item, draft, "item", conflicts);
    }

    pub(crate) fn normalize(&self, data: Value) -> Value {
        match data {
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.item.normalize_owned(item))
                    .collect(),
            ),
            other => other,
        }
    }

    pub(crate) fn simplify(&self, data: Value) -> Value {
        match data {
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.item.simplify_owned(item))
                    .collect(),
            ),
            other => other,
        }
    }
}
