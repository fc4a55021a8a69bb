//! # Value Classification
//!
//! Helpers for inspecting the primitive value tree: which category a value
//! belongs to, how two numbers compare, and how to show a value in a
//! one-line diagnostic.

use std::cmp::Ordering;
use std::fmt;

use serde_yaml::Value;

/// Category of a primitive value.
///
/// Tagged values are classified by the value they wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    /// A number representable as `i64` or `u64`.
    Integer,
    /// A number with a fractional part (or outside the integer range).
    Real,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Real,
            Value::String(_) => Self::String,
            Value::Sequence(_) => Self::Sequence,
            Value::Mapping(_) => Self::Mapping,
            Value::Tagged(tagged) => Self::of(&tagged.value),
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strip any YAML tags wrapping a value.
pub fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

/// Compare two numeric values.
///
/// Integers compare exactly; anything involving a real compares as `f64`.
/// Returns `None` if either side is not a number, or for NaN.
pub fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    let (Value::Number(a), Value::Number(b)) = (untagged(a), untagged(b)) else {
        return None;
    };
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// One-line rendering of a value for diagnostics.
///
/// Scalars print bare (`x`, `5`, `true`, `null`); collections print as
/// compact JSON, falling back to `Debug` when keys are not JSON-compatible.
pub fn describe(value: &Value) -> String {
    match untagged(value) {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}

/// Convert a mapping key into a field name.
pub fn key_string(key: &Value) -> String {
    match untagged(key) {
        Value::String(s) => s.clone(),
        other => describe(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn classify_scalars() {
        assert_eq!(ValueKind::of(&Value::Null), ValueKind::Null);
        assert_eq!(ValueKind::of(&yaml("true")), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&yaml("42")), ValueKind::Integer);
        assert_eq!(ValueKind::of(&yaml("-7")), ValueKind::Integer);
        assert_eq!(ValueKind::of(&yaml("2.5")), ValueKind::Real);
        assert_eq!(ValueKind::of(&yaml("hello")), ValueKind::String);
    }

    #[test]
    fn classify_collections() {
        assert_eq!(ValueKind::of(&yaml("[1, 2]")), ValueKind::Sequence);
        assert_eq!(ValueKind::of(&yaml("{a: 1}")), ValueKind::Mapping);
    }

    #[test]
    fn classify_tagged_by_inner_value() {
        assert_eq!(ValueKind::of(&yaml("!timespan '1:00'")), ValueKind::String);
    }

    #[test]
    fn compare_integers_exactly() {
        assert_eq!(compare_numbers(&yaml("1"), &yaml("2")), Some(Ordering::Less));
        assert_eq!(compare_numbers(&yaml("5"), &yaml("5")), Some(Ordering::Equal));
        assert_eq!(
            compare_numbers(&yaml("18446744073709551615"), &yaml("1")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn compare_mixed_as_float() {
        assert_eq!(compare_numbers(&yaml("1"), &yaml("1.5")), Some(Ordering::Less));
        assert_eq!(compare_numbers(&yaml("-0.5"), &yaml("-1")), Some(Ordering::Greater));
    }

    #[test]
    fn compare_non_numbers_is_none() {
        assert_eq!(compare_numbers(&yaml("x"), &yaml("1")), None);
        assert_eq!(compare_numbers(&Value::Null, &yaml("1")), None);
    }

    #[test]
    fn describe_is_one_line() {
        assert_eq!(describe(&yaml("x")), "x");
        assert_eq!(describe(&yaml("5")), "5");
        assert_eq!(describe(&Value::Null), "null");
        assert_eq!(describe(&yaml("[a, b]")), r#"["a","b"]"#);
        assert_eq!(describe(&yaml("{k: 1}")), r#"{"k":1}"#);
    }

    #[test]
    fn key_string_of_non_string_key() {
        assert_eq!(key_string(&yaml("field")), "field");
        assert_eq!(key_string(&yaml("3")), "3");
    }

    #[test]
    fn kind_display_matches_name() {
        assert_eq!(ValueKind::Mapping.to_string(), "mapping");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use serde_yaml::Number;

        proptest! {
            #[test]
            fn integer_comparison_matches_i64(a in any::<i64>(), b in any::<i64>()) {
                let (x, y) = (Value::Number(Number::from(a)), Value::Number(Number::from(b)));
                prop_assert_eq!(compare_numbers(&x, &y), Some(a.cmp(&b)));
                prop_assert_eq!(compare_numbers(&y, &x), Some(b.cmp(&a)));
            }

            #[test]
            fn integers_are_never_real(a in any::<i64>()) {
                prop_assert_eq!(ValueKind::of(&Value::Number(Number::from(a))), ValueKind::Integer);
            }
        }
    }
}
