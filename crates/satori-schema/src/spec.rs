//! # Raw Specs
//!
//! A raw spec is what a caller hands to [`Schema::new`](crate::Schema::new):
//! nothing, spec text, a sequence of allowed values, or a constraint
//! mapping. It is normalized once into the mapping form before any facet
//! looks at it.

use satori_core::{describe, text, Mapping, Value};

use crate::error::SchemaError;

/// Unnormalized schema description.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSpec {
    /// No constraints.
    None,
    /// Spec text, parsed with [`satori_core::text::parse`]. A bare word is a
    /// type name.
    Text(String),
    /// Shorthand for `{options: [...]}`.
    Options(Vec<Value>),
    /// Constraint mapping, used as-is.
    Mapping(Mapping),
}

impl RawSpec {
    /// Normalize into the constraint mapping, then merge `overrides` on top.
    /// Override keys win on collision.
    pub(crate) fn into_mapping(self, overrides: Mapping) -> Result<Mapping, SchemaError> {
        let mut spec = match self {
            Self::None => Mapping::new(),
            Self::Text(source) => from_parsed(text::parse(&source)?)?,
            Self::Options(options) => options_spec(options),
            Self::Mapping(mapping) => mapping,
        };
        for (key, value) in overrides {
            spec.insert(key, value);
        }
        Ok(spec)
    }
}

fn options_spec(options: Vec<Value>) -> Mapping {
    let mut spec = Mapping::new();
    spec.insert("options".into(), Value::Sequence(options));
    spec
}

/// Interpret the result of parsing spec text.
fn from_parsed(value: Value) -> Result<Mapping, SchemaError> {
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::String(name) => {
            let mut spec = Mapping::new();
            spec.insert("type".into(), Value::String(name));
            Ok(spec)
        }
        Value::Sequence(options) => Ok(options_spec(options)),
        Value::Mapping(mapping) => Ok(mapping),
        Value::Tagged(tagged) => from_parsed(tagged.value),
        other => Err(SchemaError::invalid(format!(
            "unsupported schema spec '{}'",
            describe(&other)
        ))),
    }
}

impl From<&str> for RawSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Value>> for RawSpec {
    fn from(options: Vec<Value>) -> Self {
        Self::Options(options)
    }
}

impl From<Mapping> for RawSpec {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl<T: Into<RawSpec>> From<Option<T>> for RawSpec {
    fn from(spec: Option<T>) -> Self {
        spec.map_or(Self::None, Into::into)
    }
}

impl TryFrom<Value> for RawSpec {
    type Error = SchemaError;

    /// Nested specs inside a spec (field specs, key/value/item specs) arrive
    /// as values. Strings are spec text, so `fields: {a: integer}` works.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::None),
            Value::String(text) => Ok(Self::Text(text)),
            Value::Sequence(options) => Ok(Self::Options(options)),
            Value::Mapping(mapping) => Ok(Self::Mapping(mapping)),
            Value::Tagged(tagged) => Self::try_from(tagged.value),
            other => Err(SchemaError::invalid(format!(
                "unsupported schema spec '{}'",
                describe(&other)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn mapping(text: &str) -> Mapping {
        yaml(text).as_mapping().cloned().unwrap()
    }

    #[test]
    fn none_is_empty_mapping() {
        let spec = RawSpec::None.into_mapping(Mapping::new()).unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn bare_word_is_type() {
        let spec = RawSpec::from("integer").into_mapping(Mapping::new()).unwrap();
        assert_eq!(spec, mapping("type: integer"));
    }

    #[test]
    fn text_mapping_is_parsed() {
        let spec = RawSpec::from("{type: integer, min: 0}")
            .into_mapping(Mapping::new())
            .unwrap();
        assert_eq!(spec, mapping("{type: integer, min: 0}"));
    }

    #[test]
    fn text_sequence_is_options() {
        let spec = RawSpec::from("[a, b]").into_mapping(Mapping::new()).unwrap();
        assert_eq!(spec, mapping("options: [a, b]"));
    }

    #[test]
    fn sequence_is_options() {
        let spec = RawSpec::from(vec![yaml("a"), yaml("b")])
            .into_mapping(Mapping::new())
            .unwrap();
        assert_eq!(spec, mapping("options: [a, b]"));
    }

    #[test]
    fn overrides_win() {
        let spec = RawSpec::from(mapping("{type: string, required: false}"))
            .into_mapping(mapping("{required: true}"))
            .unwrap();
        assert_eq!(spec["required"], Value::Bool(true));
        assert_eq!(spec["type"], yaml("string"));
    }

    #[test]
    fn malformed_text_propagates_parse_error() {
        let err = RawSpec::from("{type: [").into_mapping(Mapping::new()).unwrap_err();
        assert!(matches!(err, SchemaError::Text(_)));
    }

    #[test]
    fn scalar_value_is_rejected() {
        let err = RawSpec::try_from(yaml("42")).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    #[test]
    fn option_none_is_none() {
        let raw: RawSpec = Option::<&str>::None.into();
        assert_eq!(raw, RawSpec::None);
    }
}
