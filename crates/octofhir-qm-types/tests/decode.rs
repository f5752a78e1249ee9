//! Decoder behavior tests
//!
//! Covers the decision order, the extension markers and totality over
//! arbitrary JSON input.

use octofhir_qm_types::{
    decode, DecodedValue, Parameter, Parameters, CQF_IS_EMPTY_LIST_URL, DATA_ABSENT_REASON_URL,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{json, Value};

fn decode_json(value: Value) -> DecodedValue {
    decode(&Parameter::from_value(&value))
}

#[rstest]
#[case(json!({"name": "Initial Population", "valueBoolean": true}), DecodedValue::Boolean(true))]
#[case(json!({"name": "Numerator", "valueBoolean": false}), DecodedValue::Boolean(false))]
#[case(json!({"name": "Patient Score", "valueInteger": 0}), DecodedValue::Integer(0))]
#[case(json!({"name": "Patient Score", "valueInteger": 1}), DecodedValue::Integer(1))]
#[case(json!({"name": "Banner", "valueString": "Follow up"}), DecodedValue::String("Follow up".into()))]
#[case(json!({"name": "Nothing"}), DecodedValue::Null)]
#[case(json!({"name": "Wrong", "valueInteger": "1"}), DecodedValue::Null)]
fn decodes_scalar_shapes(#[case] input: Value, #[case] expected: DecodedValue) {
    assert_eq!(decode_json(input), expected);
}

#[test]
fn data_absent_reason_is_null_not_false() {
    let decoded = decode_json(json!({
        "name": "Denominator",
        "_valueBoolean": {
            "extension": [{"url": DATA_ABSENT_REASON_URL, "valueCode": "unknown"}]
        }
    }));
    assert_eq!(decoded, DecodedValue::Null);
    assert_ne!(decoded, DecodedValue::Boolean(false));
}

#[test]
fn empty_list_marker_decodes_to_empty_list() {
    let decoded = decode_json(json!({
        "name": "Numerator",
        "_valueBoolean": {
            "extension": [{"url": CQF_IS_EMPTY_LIST_URL, "valueBoolean": true}]
        }
    }));
    assert_eq!(decoded, DecodedValue::EmptyList);
    assert!(decoded.is_absent());
}

#[test]
fn extensions_ignored_when_boolean_present() {
    let decoded = decode_json(json!({
        "name": "Numerator",
        "valueBoolean": true,
        "_valueBoolean": {
            "extension": [{"url": CQF_IS_EMPTY_LIST_URL, "valueBoolean": true}]
        }
    }));
    assert_eq!(decoded, DecodedValue::Boolean(true));
}

#[test]
fn resource_passes_through_unmodified() {
    let encounter = json!({"resourceType": "Encounter", "id": "e1", "status": "finished"});
    let decoded = decode_json(json!({"name": "Visit", "resource": encounter.clone()}));
    assert_eq!(decoded, DecodedValue::Resource(encounter));
}

#[test]
fn decoding_a_bundle_is_repeatable() {
    let bundle = Parameters::from_value(&json!({
        "resourceType": "Parameters",
        "parameter": [
            {"name": "Initial Population", "valueBoolean": true},
            {"name": "Patient Score", "valueInteger": 0}
        ]
    }));
    let first: Vec<_> = bundle.iter().map(decode).collect();
    let second: Vec<_> = bundle.iter().map(decode).collect();
    assert_eq!(first, second);
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(|f| serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(
                (
                    prop_oneof![
                        Just("name".to_string()),
                        Just("valueBoolean".to_string()),
                        Just("valueInteger".to_string()),
                        Just("valueString".to_string()),
                        Just("resource".to_string()),
                        Just("_valueBoolean".to_string()),
                        Just("extension".to_string()),
                        Just("url".to_string()),
                    ],
                    inner
                ),
                0..5
            )
            .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn decode_is_total(input in arb_json()) {
        let decoded = decode_json(input);
        let kinds = ["true", "false", "integer", "string", "null", "empty-list", "resource"];
        prop_assert!(kinds.contains(&decoded.kind()));
    }

    #[test]
    fn genuine_booleans_round_trip(b in any::<bool>()) {
        prop_assert_eq!(decode_json(json!({"name": "X", "valueBoolean": b})), DecodedValue::Boolean(b));
    }
}
