//! # Composite Schema
//!
//! [`Schema`] is the validator produced by composition: the spec is
//! normalized, the registry linearizes the activated facets, each facet
//! takes its share of the spec, and the result checks itself before it is
//! handed out. A `Schema` is immutable afterwards and can be shared across
//! threads.
//!
//! Every operation walks the facet chain. Data checks, subsumption checks,
//! augmentation and normalization run most general first; simplification
//! runs most specific first so nested values are reduced before the
//! enclosing default comparison.

use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use satori_core::{text, untagged, Mapping, Value};
use serde_yaml::value::TaggedValue;

use crate::blueprint::{Blueprint, BlueprintError};
use crate::error::{SchemaError, ValidationError, ValidationErrors, ValidationFailed};
use crate::facet::{BoundFacet, Facet, FacetKind, OptionsFacet, RegexFacet, TypeFacet};
use crate::registry::Registry;
use crate::spec::RawSpec;
use crate::structural::{ListFacet, MapFacet, RecordFacet};

/// A composed, self-consistent validator.
#[derive(Debug, Clone)]
pub struct Schema {
    required: bool,
    default_value: Option<Value>,
    /// The default was synthesized from record field defaults rather than
    /// declared.
    default_derived: bool,
    facets: Vec<Facet>,
    /// The registry this schema was composed through; merges recompose
    /// through it too.
    registry: Registry<'static>,
}

impl Schema {
    /// Compose a schema through the global registry.
    pub fn new(spec: impl Into<RawSpec>) -> Result<Self, SchemaError> {
        Self::compose(Registry::global(), spec.into(), Mapping::new())
    }

    /// Compose a schema with explicit constraints merged over `spec`.
    /// Override keys win on collision.
    pub fn with_overrides(spec: impl Into<RawSpec>, overrides: Mapping) -> Result<Self, SchemaError> {
        Self::compose(Registry::global(), spec.into(), overrides)
    }

    /// Compose a schema through a custom registry. Nested schemas and
    /// merges use the same registry.
    pub fn with_registry(
        registry: &Registry<'static>,
        spec: impl Into<RawSpec>,
    ) -> Result<Self, SchemaError> {
        Self::compose(registry, spec.into(), Mapping::new())
    }

    /// Compose a schema from spec text.
    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        Self::new(RawSpec::Text(source.to_string()))
    }

    pub(crate) fn compose(
        registry: &Registry<'static>,
        raw: RawSpec,
        overrides: Mapping,
    ) -> Result<Self, SchemaError> {
        let mut spec = raw.into_mapping(overrides)?;
        let kinds = registry.linearize(&spec)?;
        let explicit_default = spec.contains_key("default");

        let mut facets = Vec::with_capacity(kinds.len());
        for kind in kinds.iter().rev() {
            facets.push(Facet::build(*kind, &mut spec, registry)?);
        }
        facets.reverse();

        let required = match spec.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(required)) => *required,
            Some(_) => return Err(SchemaError::invalid("'required' must be a boolean")),
        };
        let default_value = spec.get("default").filter(|v| !v.is_null()).cloned();
        if required && default_value.is_some() {
            return Err(SchemaError::invalid(
                "cannot provide a default value for a required element",
            ));
        }

        let schema = Self {
            required,
            default_derived: default_value.is_some() && !explicit_default,
            default_value,
            facets,
            registry: *registry,
        };

        let mut errors = Vec::new();
        schema.check_schema(&schema, &mut errors, "");
        if !errors.is_empty() {
            return Err(SchemaError::Rejected {
                message: "Incorrect schema".into(),
                details: errors.into(),
            });
        }

        tracing::debug!(facets = ?kinds, required, "composed schema");
        Ok(schema)
    }

    /// Whether null data is rejected.
    pub fn required(&self) -> bool {
        self.required
    }

    /// The value [`normalize`](Self::normalize) substitutes for null.
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// The default as written in the spec; `None` for a default the record
    /// facet synthesized from its fields.
    pub(crate) fn declared_default(&self) -> Option<&Value> {
        if self.default_derived {
            None
        } else {
            self.default_value.as_ref()
        }
    }

    /// Facet kinds in chain order, most general first.
    pub fn facets(&self) -> Vec<FacetKind> {
        self.facets.iter().map(Facet::kind).collect()
    }

    pub fn is(&self, kind: FacetKind) -> bool {
        self.facets.iter().any(|facet| facet.kind() == kind)
    }

    /// Whether the schema recurses into records, maps or lists.
    pub fn is_structural(&self) -> bool {
        self.facets.iter().any(|facet| facet.kind().is_structural())
    }

    /// Allowed type names, if the schema constrains types.
    pub fn types(&self) -> Option<&[String]> {
        self.type_facet().map(TypeFacet::names)
    }

    /// Allowed values, if the schema enumerates them.
    pub fn options(&self) -> Option<&[Value]> {
        self.options_facet().map(|f| f.allowed.as_slice())
    }

    pub fn minimum(&self) -> Option<&Value> {
        self.min_facet().map(|f| &f.bound)
    }

    pub fn maximum(&self) -> Option<&Value> {
        self.max_facet().map(|f| &f.bound)
    }

    /// The regex source as written, without anchors.
    pub fn pattern(&self) -> Option<&str> {
        self.regex_facet().map(RegexFacet::pattern)
    }

    /// The schema of a declared record field.
    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.record_facet()
            .and_then(|f| f.fields.get(name))
            .map(|field| field.schema.as_ref())
    }

    // ── facet lookup ─────────────────────────────────────────────────

    pub(crate) fn type_facet(&self) -> Option<&TypeFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Type(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn options_facet(&self) -> Option<&OptionsFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Options(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn min_facet(&self) -> Option<&BoundFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Min(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn max_facet(&self) -> Option<&BoundFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Max(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn regex_facet(&self) -> Option<&RegexFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Regex(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn record_facet(&self) -> Option<&RecordFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Record(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn map_facet(&self) -> Option<&MapFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::Map(f) => Some(f),
            _ => None,
        })
    }

    pub(crate) fn list_facet(&self) -> Option<&ListFacet> {
        self.facets.iter().find_map(|facet| match facet {
            Facet::List(f) => Some(f),
            _ => None,
        })
    }

    // ── checking ─────────────────────────────────────────────────────

    /// Append every violation of `data` to `errors`, paths prefixed by
    /// `path`. Tagged data is checked by the value it wraps.
    pub fn check(&self, data: &Value, errors: &mut Vec<ValidationError>, path: &str) {
        let data = untagged(data);
        for facet in &self.facets {
            facet.check(self, data, errors, path);
        }
    }

    /// Append every way in which `other` fails to narrow `self`.
    pub fn check_schema(&self, other: &Schema, errors: &mut Vec<ValidationError>, path: &str) {
        for facet in &self.facets {
            facet.check_schema(self, other, errors, path);
        }
    }

    /// Check `data`, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` carrying every violation found.
    pub fn validate(&self, data: &Value) -> Result<(), ValidationFailed> {
        let mut errors = Vec::new();
        self.check(data, &mut errors, "");
        if errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(errors = errors.len(), "data failed validation");
        Err(ValidationFailed(ValidationErrors::from(errors)))
    }

    /// Check that `other` is an acceptable narrowing of `self`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Rejected` ("schema too weak") with the
    /// individual violations.
    pub fn validate_schema(&self, other: &Schema) -> Result<(), SchemaError> {
        let mut errors = Vec::new();
        self.check_schema(other, &mut errors, "");
        if errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(errors = errors.len(), "schema failed subsumption");
        Err(SchemaError::Rejected {
            message: "schema too weak".into(),
            details: errors.into(),
        })
    }

    // ── defaults ─────────────────────────────────────────────────────

    /// Fill in defaults, depth-first.
    pub fn normalize(&self, data: &Value) -> Value {
        self.normalize_owned(data.clone())
    }

    /// Strip values equal to their defaults.
    pub fn simplify(&self, data: &Value) -> Value {
        self.simplify_owned(data.clone())
    }

    /// A tag survives normalization; the wrapped value is normalized.
    pub(crate) fn normalize_owned(&self, data: Value) -> Value {
        if let Value::Tagged(tagged) = data {
            let TaggedValue { tag, value } = *tagged;
            return Value::Tagged(Box::new(TaggedValue {
                tag,
                value: self.normalize_owned(value),
            }));
        }
        self.facets
            .iter()
            .fold(data, |data, facet| facet.normalize(self, data))
    }

    /// A tagged value that simplifies away entirely loses its tag.
    pub(crate) fn simplify_owned(&self, data: Value) -> Value {
        if let Value::Tagged(tagged) = data {
            let TaggedValue { tag, value } = *tagged;
            return match self.simplify_owned(value) {
                Value::Null => Value::Null,
                value => Value::Tagged(Box::new(TaggedValue { tag, value })),
            };
        }
        self.facets
            .iter()
            .rev()
            .fold(data, |data, facet| facet.simplify(self, data))
    }

    // ── introspection ────────────────────────────────────────────────

    pub(crate) fn augment_spec(&self, draft: &mut Mapping, conflicts: &mut Vec<String>) {
        for facet in &self.facets {
            facet.augment(self, draft, conflicts);
        }
    }

    /// The effective constraint set as a spec mapping, or null when the
    /// schema has no constraints.
    pub fn specification(&self) -> Value {
        let mut draft = Mapping::new();
        let mut conflicts = Vec::new();
        self.augment_spec(&mut draft, &mut conflicts);
        if draft.is_empty() {
            Value::Null
        } else {
            Value::Mapping(draft)
        }
    }

    /// A lazily populated skeleton for a record or map schema.
    ///
    /// # Errors
    ///
    /// Returns `BlueprintError::Unavailable` for any other shape.
    pub fn blueprint(&self) -> Result<Blueprint, BlueprintError> {
        self.facets
            .iter()
            .fold(Err(BlueprintError::Unavailable), |prev, facet| {
                facet.blueprint(prev)
            })
    }

    /// Combine two schemas: both specifications are written onto one
    /// draft, then recomposed through `self`'s registry.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Unmergeable` when constraints cannot be
    /// combined, or any composition error the combined spec raises.
    pub fn merge(&self, other: &Schema) -> Result<Schema, SchemaError> {
        let mut draft = Mapping::new();
        let mut conflicts = Vec::new();
        self.augment_spec(&mut draft, &mut conflicts);
        other.augment_spec(&mut draft, &mut conflicts);
        if !conflicts.is_empty() {
            return Err(SchemaError::Unmergeable(conflicts.join("; ")));
        }
        Schema::compose(&self.registry, RawSpec::Mapping(draft), Mapping::new())
    }
}

impl Add for &Schema {
    type Output = Result<Schema, SchemaError>;

    fn add(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = text::render(&self.specification()).map_err(|_| fmt::Error)?;
        f.write_str(rendered.trim_end())
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl TryFrom<Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(RawSpec::try_from(value)?)
    }
}
