use std::collections::BTreeSet;

use gridlab_core::Value;
use gridlab_gen::{generate, GenerationSpec, ParameterDomain};

fn domain(name: &str, values: Vec<Value>) -> ParameterDomain {
    ParameterDomain {
        name: name.to_string(),
        values,
    }
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

#[test]
fn cross_product_has_expected_cardinality() {
    let spec = GenerationSpec::new(vec![
        domain("seed", ints(&[1, 2, 3, 4, 5, 6, 7, 8])),
        domain("num_calls", ints(&[1, 2, 3])),
    ]);
    assert_eq!(spec.combination_count(), 24);

    let specifications = generate(&spec);
    assert_eq!(specifications.len(), 24);
    for specification in &specifications {
        assert_eq!(specification.len(), 2);
        assert!(specification.contains_key("seed"));
        assert!(specification.contains_key("num_calls"));
    }

    let distinct: BTreeSet<_> = specifications.iter().cloned().collect();
    assert_eq!(distinct.len(), 24);
}

#[test]
fn enumeration_is_odometer_ordered() {
    let spec = GenerationSpec::new(vec![
        domain("a", ints(&[1, 2])),
        domain("b", ints(&[10, 20])),
    ]);
    let specifications = generate(&spec);

    let pairs: Vec<(i64, i64)> = specifications
        .iter()
        .map(|s| {
            let a = match s["a"] {
                Value::Int(v) => v,
                _ => unreachable!(),
            };
            let b = match s["b"] {
                Value::Int(v) => v,
                _ => unreachable!(),
            };
            (a, b)
        })
        .collect();
    // Last-declared parameter varies fastest.
    assert_eq!(pairs, vec![(1, 10), (1, 20), (2, 10), (2, 20)]);
}

#[test]
fn empty_domain_yields_empty_sequence() {
    let spec = GenerationSpec::new(vec![
        domain("seed", ints(&[1, 2, 3])),
        domain("rate", Vec::new()),
    ]);
    assert_eq!(spec.combination_count(), 0);
    assert!(generate(&spec).is_empty());
}

#[test]
fn empty_spec_yields_single_empty_specification() {
    let spec = GenerationSpec::new(Vec::new());
    let specifications = generate(&spec);
    assert_eq!(specifications.len(), 1);
    assert!(specifications[0].is_empty());
}

#[test]
fn generation_is_deterministic() {
    let spec = GenerationSpec::new(vec![
        domain("seed", ints(&[3, 1, 2])),
        domain("mode", vec![Value::from("fast"), Value::from("slow")]),
    ]);
    assert_eq!(generate(&spec), generate(&spec));
}
