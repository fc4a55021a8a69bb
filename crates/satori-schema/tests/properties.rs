//! Property tests over generated values and specs.

use proptest::prelude::*;
use satori_schema::{RawSpec, Schema};
use serde_yaml::{Mapping, Number, Value};

const TYPE_NAMES: &[&str] = &["boolean", "string", "integer", "real", "sequence", "map"];

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(Number::from(n))),
        (-1.0e6f64..1.0e6).prop_map(|x| Value::Number(Number::from(x))),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Sequence),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..4).prop_map(|entries| {
                Value::Mapping(
                    entries
                        .into_iter()
                        .map(|(k, v)| (Value::String(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

/// The category a type name would have to allow for `value` to pass.
fn admitted_by(names: &[&str], value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(_) => names.contains(&"boolean"),
        Value::String(_) => names.contains(&"string"),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            names.contains(&"integer") || names.contains(&"real")
        }
        Value::Number(_) => names.contains(&"real"),
        Value::Sequence(_) => names.contains(&"sequence"),
        Value::Mapping(_) => names.contains(&"map"),
        Value::Tagged(_) => false,
    }
}

fn type_spec(names: &[&str]) -> Mapping {
    let mut spec = Mapping::new();
    spec.insert(
        "type".into(),
        Value::Sequence(names.iter().map(|n| Value::String((*n).into())).collect()),
    );
    spec
}

proptest! {
    #[test]
    fn type_only_accepts_exactly_its_categories(
        names in prop::sample::subsequence(TYPE_NAMES.to_vec(), 1..=TYPE_NAMES.len()),
        value in arb_value(),
    ) {
        let schema = Schema::new(type_spec(&names)).unwrap();
        prop_assert_eq!(schema.validate(&value).is_ok(), admitted_by(&names, &value));
    }

    #[test]
    fn options_shorthand_matches_mapping_form(
        options in prop::collection::vec(arb_scalar(), 0..5),
        probe in arb_scalar(),
    ) {
        let shorthand = Schema::new(RawSpec::Options(options.clone())).unwrap();
        let mut spec = Mapping::new();
        spec.insert("options".into(), Value::Sequence(options));
        let explicit = Schema::new(spec).unwrap();
        prop_assert_eq!(
            shorthand.validate(&probe).is_ok(),
            explicit.validate(&probe).is_ok()
        );
    }

    #[test]
    fn normalize_simplify_round_trip_is_stable(
        a in prop::option::of(any::<i32>()),
        b in prop::option::of("[a-z]{0,4}"),
        extra in prop::option::of(any::<bool>()),
    ) {
        let schema = Schema::parse(
            "fields:\n  a: {type: integer, default: 7}\n  b: {type: string, default: hi}\n  c: {fields: {d: {type: boolean, default: true}}}\n",
        )
        .unwrap();

        let mut data = Mapping::new();
        if let Some(a) = a {
            data.insert("a".into(), Value::Number(Number::from(i64::from(a))));
        }
        if let Some(b) = b {
            data.insert("b".into(), Value::String(b));
        }
        if let Some(extra) = extra {
            let mut c = Mapping::new();
            c.insert("d".into(), Value::Bool(extra));
            data.insert("c".into(), Value::Mapping(c));
        }
        let data = Value::Mapping(data);

        let normalized = schema.normalize(&data);
        let round_trip = schema.normalize(&schema.simplify(&normalized));
        prop_assert_eq!(round_trip, normalized);
    }
}
