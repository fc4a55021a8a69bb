//! # Facets
//!
//! A facet is one independently activatable unit of validation behavior.
//! A composite [`Schema`] is an ordered chain of facets, most general first;
//! every operation walks the chain so that a specialized facet always runs
//! after the facets it refines.
//!
//! This module holds the universal base facet and the scalar facets
//! (type, options, min, max, regex). The structural facets live in
//! [`crate::structural`].

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use satori_core::{compare_numbers, describe, Mapping, Value, ValueKind};

use crate::blueprint::{Blueprint, BlueprintError};
use crate::error::{SchemaError, ValidationError};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::structural::{ListFacet, MapFacet, RecordFacet};

/// Identifies a facet implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKind {
    /// `required` / `default`. Always active.
    Base,
    /// `type`.
    Type,
    /// `options`.
    Options,
    /// `min`.
    Min,
    /// `max`.
    Max,
    /// `regex`. Refines `Type`.
    Regex,
    /// `fields` / `entries`. Refines `Type`.
    Record,
    /// `key` / `value`. Refines `Type`.
    Map,
    /// `item` / `element`. Refines `Type`.
    List,
}

impl FacetKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Type => "type",
            Self::Options => "options",
            Self::Min => "min",
            Self::Max => "max",
            Self::Regex => "regex",
            Self::Record => "record",
            Self::Map => "map",
            Self::List => "list",
        }
    }

    /// Whether the facet recurses into nested schemas.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Record | Self::Map | Self::List)
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive category named by the `type` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    String,
    Integer,
    /// Any number, integral or not.
    Real,
    Sequence,
    Map,
}

impl Primitive {
    /// Resolve a type name. `list`/`tuple` alias `sequence`, `record`
    /// aliases `map`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "integer" => Self::Integer,
            "real" => Self::Real,
            "sequence" | "list" | "tuple" => Self::Sequence,
            "map" | "record" => Self::Map,
            _ => return None,
        })
    }

    pub fn admits(self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (Self::Boolean, ValueKind::Boolean)
                | (Self::String, ValueKind::String)
                | (Self::Integer, ValueKind::Integer)
                | (Self::Real, ValueKind::Integer | ValueKind::Real)
                | (Self::Sequence, ValueKind::Sequence)
                | (Self::Map, ValueKind::Mapping)
        )
    }

    /// Whether every value of `other` is also a value of `self`.
    pub fn subsumes(self, other: Primitive) -> bool {
        self == other || (self == Self::Real && other == Self::Integer)
    }
}

/// Read the `type` constraint as a list of names, accepting a bare name.
pub(crate) fn type_names(spec: &Mapping) -> Option<Vec<String>> {
    match spec.get("type")? {
        Value::String(name) => Some(vec![name.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Insert `key: value` unless the key is already present.
pub(crate) fn set_default(spec: &mut Mapping, key: &str, value: Value) {
    if !spec.contains_key(key) {
        spec.insert(key.into(), value);
    }
}

/// One link of a composite schema's chain.
#[derive(Debug, Clone)]
pub(crate) enum Facet {
    Base,
    Type(TypeFacet),
    Options(OptionsFacet),
    Min(BoundFacet),
    Max(BoundFacet),
    Regex(RegexFacet),
    Record(RecordFacet),
    Map(MapFacet),
    List(ListFacet),
}

impl Facet {
    pub(crate) fn kind(&self) -> FacetKind {
        match self {
            Self::Base => FacetKind::Base,
            Self::Type(_) => FacetKind::Type,
            Self::Options(_) => FacetKind::Options,
            Self::Min(_) => FacetKind::Min,
            Self::Max(_) => FacetKind::Max,
            Self::Regex(_) => FacetKind::Regex,
            Self::Record(_) => FacetKind::Record,
            Self::Map(_) => FacetKind::Map,
            Self::List(_) => FacetKind::List,
        }
    }

    /// Extract this facet's portion of the spec.
    ///
    /// Facets are built most specific first, so a refining facet can fill
    /// in keys (such as a default `type`) before the facet it refines reads
    /// them.
    pub(crate) fn build(
        kind: FacetKind,
        spec: &mut Mapping,
        registry: &Registry<'static>,
    ) -> Result<Self, SchemaError> {
        Ok(match kind {
            FacetKind::Base => Self::Base,
            FacetKind::Type => Self::Type(TypeFacet::build(spec)?),
            FacetKind::Options => Self::Options(OptionsFacet::build(spec)?),
            FacetKind::Min => Self::Min(BoundFacet::build(spec, "min")?),
            FacetKind::Max => Self::Max(BoundFacet::build(spec, "max")?),
            FacetKind::Regex => Self::Regex(RegexFacet::build(spec)?),
            FacetKind::Record => Self::Record(RecordFacet::build(spec, registry)?),
            FacetKind::Map => Self::Map(MapFacet::build(spec, registry)?),
            FacetKind::List => Self::List(ListFacet::build(spec, registry)?),
        })
    }

    /// Check `data`, appending violations. `schema` is the whole chain.
    pub(crate) fn check(
        &self,
        schema: &Schema,
        data: &Value,
        errors: &mut Vec<ValidationError>,
        path: &str,
    ) {
        match self {
            Self::Base => {
                if schema.required() && data.is_null() {
                    errors.push(ValidationError::new("value required but not provided", path));
                }
            }
            Self::Type(f) => f.check(data, errors, path),
            Self::Options(f) => f.check(data, errors, path),
            Self::Min(f) => f.check_min(data, errors, path),
            Self::Max(f) => f.check_max(data, errors, path),
            Self::Regex(f) => f.check(data, errors, path),
            Self::Record(f) => f.check(data, errors, path),
            Self::Map(f) => f.check(data, errors, path),
            Self::List(f) => f.check(data, errors, path),
        }
    }

    /// Check that `other` is an acceptable narrowing of `schema`.
    pub(crate) fn check_schema(
        &self,
        schema: &Schema,
        other: &Schema,
        errors: &mut Vec<ValidationError>,
        path: &str,
    ) {
        match self {
            Self::Base => {
                if schema.required() && !other.required() {
                    let default = other.default_value().cloned().unwrap_or(Value::Null);
                    schema.check(&default, errors, &format!("{path} (default)"));
                }
                if let Some(options) = other.options_facet() {
                    let option_path = format!("{path} (option)");
                    for option in &options.allowed {
                        schema.check(option, errors, &option_path);
                    }
                }
            }
            Self::Type(f) => f.check_schema(other, errors, path),
            Self::Options(_) => {
                if !other.is(FacetKind::Options) {
                    errors.push(ValidationError::new("allowed values are not specified", path));
                }
            }
            Self::Min(f) => f.check_schema_min(other, errors, path),
            Self::Max(f) => f.check_schema_max(other, errors, path),
            Self::Regex(f) => f.check_schema(other, errors, path),
            Self::Record(f) => f.check_schema(other, errors, path),
            Self::Map(f) => f.check_schema(other, errors, path),
            Self::List(f) => f.check_schema(other, errors, path),
        }
    }

    /// Write this facet's constraints into a spec draft, combining with
    /// whatever the draft already declares. Uncombinable constraints are
    /// reported through `conflicts`.
    pub(crate) fn augment(&self, schema: &Schema, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        match self {
            Self::Base => {
                if schema.required() {
                    set_default(draft, "required", Value::Bool(true));
                }
                if let Some(default) = schema.declared_default() {
                    set_default(draft, "default", default.clone());
                }
            }
            Self::Type(f) => f.augment(draft),
            Self::Options(f) => f.augment(draft),
            Self::Min(f) => f.augment(draft, "min", Ordering::Greater),
            Self::Max(f) => f.augment(draft, "max", Ordering::Less),
            Self::Regex(f) => f.augment(draft, conflicts),
            Self::Record(f) => f.augment(draft, conflicts),
            Self::Map(f) => f.augment(draft, conflicts),
            Self::List(f) => f.augment(draft, conflicts),
        }
    }

    /// Fill in defaults. Runs most general first.
    pub(crate) fn normalize(&self, schema: &Schema, data: Value) -> Value {
        match self {
            Self::Base if data.is_null() => schema.default_value().cloned().unwrap_or(Value::Null),
            Self::Record(f) => f.normalize(data),
            Self::Map(f) => f.normalize(data),
            Self::List(f) => f.normalize(data),
            _ => data,
        }
    }

    /// Strip defaults. Runs most specific first.
    pub(crate) fn simplify(&self, schema: &Schema, data: Value) -> Value {
        match self {
            Self::Base if schema.default_value() == Some(&data) => Value::Null,
            Self::Record(f) => f.simplify(data),
            Self::Map(f) => f.simplify(data),
            Self::List(f) => f.simplify(data),
            _ => data,
        }
    }

    pub(crate) fn blueprint(
        &self,
        prev: Result<Blueprint, BlueprintError>,
    ) -> Result<Blueprint, BlueprintError> {
        match self {
            Self::Base => Err(BlueprintError::Unavailable),
            Self::Type(f) if f.is_single_map() => Ok(Blueprint::new()),
            Self::Record(f) => f.blueprint(prev),
            Self::Map(f) => f.blueprint(prev),
            _ => prev,
        }
    }
}

// ─── Type ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct TypeFacet {
    names: Vec<String>,
    primitives: Vec<Primitive>,
}

impl TypeFacet {
    fn build(spec: &Mapping) -> Result<Self, SchemaError> {
        let names = type_names(spec).ok_or_else(|| {
            SchemaError::invalid("'type' must be a type name or a list of type names")
        })?;
        if names.is_empty() {
            return Err(SchemaError::invalid("The set of allowed types is empty"));
        }
        let primitives = names
            .iter()
            .map(|name| {
                Primitive::from_name(name)
                    .ok_or_else(|| SchemaError::invalid(format!("unknown type '{name}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { names, primitives })
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    fn is_single_map(&self) -> bool {
        self.primitives == [Primitive::Map]
    }

    fn admits_name(&self, name: &str) -> bool {
        Primitive::from_name(name)
            .is_some_and(|p| self.primitives.iter().any(|own| own.subsumes(p)))
    }

    fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let kind = ValueKind::of(data);
        if kind == ValueKind::Null || self.primitives.iter().any(|p| p.admits(kind)) {
            return;
        }
        errors.push(ValidationError::new(
            format!(
                "value '{}' has type '{}', none of the allowed '{}'",
                describe(data),
                kind,
                self.names.join(", ")
            ),
            path,
        ));
    }

    fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.type_facet() {
            for name in &theirs.names {
                if !self.admits_name(name) {
                    errors.push(ValidationError::new(
                        format!("additional allowed type '{name}'"),
                        path,
                    ));
                }
            }
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("allowed types not specified", path));
        }
    }

    /// Intersect with the draft's types, keeping the narrower name of each
    /// compatible pair.
    fn augment(&self, draft: &mut Mapping) {
        let names = match type_names(draft) {
            Some(existing) => {
                let mut kept: Vec<String> = Vec::new();
                for theirs in &existing {
                    let Some(their_primitive) = Primitive::from_name(theirs) else {
                        continue;
                    };
                    for (mine, my_primitive) in self.names.iter().zip(&self.primitives) {
                        let narrower = if my_primitive.subsumes(their_primitive) {
                            theirs
                        } else if their_primitive.subsumes(*my_primitive) {
                            mine
                        } else {
                            continue;
                        };
                        if !kept.contains(narrower) {
                            kept.push(narrower.clone());
                        }
                    }
                }
                kept
            }
            None => self.names.clone(),
        };
        let value = match names.as_slice() {
            [single] => Value::String(single.clone()),
            _ => Value::Sequence(names.into_iter().map(Value::String).collect()),
        };
        draft.insert("type".into(), value);
    }
}

// ─── Options ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub(crate) struct OptionsFacet {
    pub(crate) allowed: Vec<Value>,
}

impl OptionsFacet {
    fn build(spec: &Mapping) -> Result<Self, SchemaError> {
        match spec.get("options") {
            Some(Value::Sequence(allowed)) => Ok(Self {
                allowed: allowed.clone(),
            }),
            _ => Err(SchemaError::invalid("'options' must be a list of values")),
        }
    }

    /// Numbers match by value, so `1.0` is the option `1`.
    fn allows(&self, data: &Value) -> bool {
        self.allowed
            .iter()
            .any(|option| option == data || compare_numbers(option, data) == Some(Ordering::Equal))
    }

    fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        if data.is_null() || self.allows(data) {
            return;
        }
        errors.push(ValidationError::new(
            format!(
                "value '{}' not among the allowed '{}'",
                describe(data),
                describe(&Value::Sequence(self.allowed.clone()))
            ),
            path,
        ));
    }

    fn augment(&self, draft: &mut Mapping) {
        let options = match draft.get("options") {
            Some(Value::Sequence(existing)) => existing
                .iter()
                .filter(|option| self.allows(option))
                .cloned()
                .collect(),
            _ => self.allowed.clone(),
        };
        draft.insert("options".into(), Value::Sequence(options));
    }
}

// ─── Min / Max ───────────────────────────────────────────────────────

/// An inclusive numeric bound; used for both `min` and `max`.
#[derive(Debug, Clone)]
pub(crate) struct BoundFacet {
    pub(crate) bound: Value,
}

impl BoundFacet {
    fn build(spec: &Mapping, key: &str) -> Result<Self, SchemaError> {
        match spec.get(key) {
            Some(bound @ Value::Number(_)) => Ok(Self {
                bound: bound.clone(),
            }),
            _ => Err(SchemaError::invalid(format!("'{key}' must be a number"))),
        }
    }

    fn check_min(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        if data.is_null() {
            return;
        }
        match compare_numbers(&self.bound, data) {
            Some(Ordering::Less | Ordering::Equal) => {}
            Some(Ordering::Greater) => errors.push(ValidationError::new(
                format!(
                    "value '{}' not above the required minimum '{}'",
                    describe(data),
                    describe(&self.bound)
                ),
                path,
            )),
            None => errors.push(ValidationError::new(
                format!(
                    "value '{}' cannot be compared with the required minimum '{}'",
                    describe(data),
                    describe(&self.bound)
                ),
                path,
            )),
        }
    }

    fn check_max(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        if data.is_null() {
            return;
        }
        match compare_numbers(data, &self.bound) {
            Some(Ordering::Less | Ordering::Equal) => {}
            Some(Ordering::Greater) => errors.push(ValidationError::new(
                format!(
                    "value '{}' not below the required maximum '{}'",
                    describe(data),
                    describe(&self.bound)
                ),
                path,
            )),
            None => errors.push(ValidationError::new(
                format!(
                    "value '{}' cannot be compared with the required maximum '{}'",
                    describe(data),
                    describe(&self.bound)
                ),
                path,
            )),
        }
    }

    fn check_schema_min(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.min_facet() {
            if compare_numbers(&theirs.bound, &self.bound) == Some(Ordering::Less) {
                errors.push(ValidationError::new(
                    format!(
                        "allowed minimum '{}' is lower than '{}'",
                        describe(&theirs.bound),
                        describe(&self.bound)
                    ),
                    path,
                ));
            }
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("minimum allowed value is not specified", path));
        }
    }

    fn check_schema_max(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.max_facet() {
            if compare_numbers(&theirs.bound, &self.bound) == Some(Ordering::Greater) {
                errors.push(ValidationError::new(
                    format!(
                        "allowed maximum '{}' is greater than '{}'",
                        describe(&theirs.bound),
                        describe(&self.bound)
                    ),
                    path,
                ));
            }
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new("maximum allowed value is not specified", path));
        }
    }

    /// Keep whichever of the draft's bound and ours is stricter. `stricter`
    /// is the ordering of our bound relative to the draft's that makes ours
    /// win: `Greater` for a minimum, `Less` for a maximum.
    fn augment(&self, draft: &mut Mapping, key: &str, stricter: Ordering) {
        let keep_existing = draft
            .get(key)
            .and_then(|existing| compare_numbers(&self.bound, existing))
            .is_some_and(|ord| ord != stricter);
        if !keep_existing {
            draft.insert(key.into(), self.bound.clone());
        }
    }
}

// ─── Regex ───────────────────────────────────────────────────────────

/// Full-match pattern constraint. Refines [`TypeFacet`] with a default
/// type of `string`.
#[derive(Debug, Clone)]
pub(crate) struct RegexFacet {
    pattern: String,
    compiled: Regex,
}

impl RegexFacet {
    fn build(spec: &mut Mapping) -> Result<Self, SchemaError> {
        set_default(spec, "type", Value::String("string".into()));
        let pattern = spec
            .get("regex")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::invalid("'regex' must be a string"))?
            .to_string();
        let compiled = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| SchemaError::invalid(format!("invalid regex '{pattern}': {e}")))?;
        Ok(Self { pattern, compiled })
    }

    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let matched = match data {
            Value::Null => return,
            Value::String(s) => self.compiled.is_match(s),
            _ => false,
        };
        if !matched {
            errors.push(ValidationError::new(
                format!(
                    "value '{}' does not match the required regex '{}'",
                    describe(data),
                    self.pattern
                ),
                path,
            ));
        }
    }

    fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        if let Some(theirs) = other.regex_facet() {
            if theirs.pattern != self.pattern {
                errors.push(ValidationError::new(
                    format!(
                        "required regex '{}' is different than '{}' (and subsumption is not implemented)",
                        theirs.pattern, self.pattern
                    ),
                    path,
                ));
            }
        } else if !other.is(FacetKind::Options) {
            errors.push(ValidationError::new(
                "allowed values are not constrained by a regex",
                path,
            ));
        }
    }

    fn augment(&self, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        match draft.get("regex").and_then(Value::as_str) {
            Some(existing) if existing != self.pattern => conflicts.push(format!(
                "cannot merge schemas with different pattern constraints '{existing}' and '{}'",
                self.pattern
            )),
            _ => {
                draft.insert("regex".into(), Value::String(self.pattern.clone()));
            }
        }
    }
}
