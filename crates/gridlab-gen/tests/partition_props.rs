use std::collections::BTreeSet;

use gridlab_core::{Specification, Value};
use gridlab_gen::{generate, GenerationSpec, ParameterDomain, PartitionGenerator};
use proptest::prelude::*;

fn int_domain(name: &str, count: usize) -> ParameterDomain {
    ParameterDomain {
        name: name.to_string(),
        values: (0..count as i64).map(Value::Int).collect(),
    }
}

fn demo_spec() -> GenerationSpec {
    GenerationSpec::new(vec![int_domain("seed", 8), int_domain("num_calls", 3)])
}

#[test]
fn two_machines_split_24_specifications_evenly() {
    let spec = demo_spec();
    let share_0 = PartitionGenerator::new(0, 2).expect("generator").generate(&spec);
    let share_1 = PartitionGenerator::new(1, 2).expect("generator").generate(&spec);
    assert_eq!(share_0.len(), 12);
    assert_eq!(share_1.len(), 12);

    let set_0: BTreeSet<Specification> = share_0.into_iter().collect();
    let set_1: BTreeSet<Specification> = share_1.into_iter().collect();
    assert!(set_0.is_disjoint(&set_1));

    let full: BTreeSet<Specification> = generate(&spec).into_iter().collect();
    let union: BTreeSet<Specification> = set_0.union(&set_1).cloned().collect();
    assert_eq!(union, full);
}

#[test]
fn single_machine_receives_everything() {
    let spec = demo_spec();
    let share = PartitionGenerator::new(0, 1).expect("generator").generate(&spec);
    assert_eq!(share, generate(&spec));
}

#[test]
fn constructor_rejects_out_of_range_indices() {
    assert!(PartitionGenerator::new(0, 0).is_err());
    assert!(PartitionGenerator::new(2, 2).is_err());
    assert!(PartitionGenerator::new(5, 3).is_err());
    assert!(PartitionGenerator::new(1, 2).is_ok());
}

fn subsequence_positions(share: &[Specification], full: &[Specification]) -> bool {
    let mut cursor = 0;
    for item in share {
        match full[cursor..].iter().position(|candidate| candidate == item) {
            Some(offset) => cursor += offset + 1,
            None => return false,
        }
    }
    true
}

proptest! {
    #[test]
    fn partitions_cover_the_product_exactly_once(
        sizes in prop::collection::vec(0usize..4, 1..4),
        machine_count in 1usize..6,
    ) {
        let domains = sizes
            .iter()
            .enumerate()
            .map(|(idx, &size)| int_domain(&format!("p{idx}"), size))
            .collect();
        let spec = GenerationSpec::new(domains);
        let full = generate(&spec);

        let mut seen: Vec<Specification> = Vec::new();
        for machine_index in 0..machine_count {
            let generator = PartitionGenerator::new(machine_index, machine_count).unwrap();
            let share = generator.generate(&spec);
            // Each share preserves the full sequence's relative order.
            prop_assert!(subsequence_positions(&share, &full));
            for item in &share {
                prop_assert!(!seen.contains(item));
            }
            seen.extend(share);
        }

        let full_set: BTreeSet<Specification> = full.into_iter().collect();
        let seen_set: BTreeSet<Specification> = seen.iter().cloned().collect();
        prop_assert_eq!(seen.len(), full_set.len());
        prop_assert_eq!(seen_set, full_set);
    }
}
