use std::collections::BTreeMap;

use gridlab_core::{SpecificationIdentity, Value};

fn spec_from(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn identity_is_insertion_order_independent() {
    let forward = spec_from(&[("seed", Value::Int(1)), ("num_calls", Value::Int(3))]);
    let reversed = spec_from(&[("num_calls", Value::Int(3)), ("seed", Value::Int(1))]);

    let a = SpecificationIdentity::of(&forward).expect("identity");
    let b = SpecificationIdentity::of(&reversed).expect("identity");
    assert_eq!(a, b);
}

#[test]
fn identity_changes_with_content() {
    let base = spec_from(&[("seed", Value::Int(1))]);
    let other_value = spec_from(&[("seed", Value::Int(2))]);
    let other_key = spec_from(&[("sprout", Value::Int(1))]);

    let id = SpecificationIdentity::of(&base).expect("identity");
    assert_ne!(id, SpecificationIdentity::of(&other_value).expect("identity"));
    assert_ne!(id, SpecificationIdentity::of(&other_key).expect("identity"));
}

#[test]
fn identity_is_stable_across_calls() {
    let spec = spec_from(&[
        ("seed", Value::Int(42)),
        ("rate", Value::Float(0.01)),
        ("tag", Value::from("sweep-a")),
    ]);
    let a = SpecificationIdentity::of(&spec).expect("identity");
    let b = SpecificationIdentity::of(&spec).expect("identity");
    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert_eq!(a.short().len(), 8);
}

#[test]
fn identity_rejects_non_finite_floats() {
    let spec = spec_from(&[("rate", Value::Float(f64::INFINITY))]);
    assert!(SpecificationIdentity::of(&spec).is_err());
}
