use dealloc_ir::ValueId;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::AliasRegistry;

fn v(n: u32) -> ValueId {
    ValueId::new(n)
}

#[test]
fn unseen_values_are_singletons() {
    let mut aliases = AliasRegistry::new();
    assert!(aliases.equivalent(v(7), v(7)));
    assert!(!aliases.equivalent(v(7), v(8)));
    assert_eq!(aliases.leader(v(12)), v(12));
}

#[test]
fn union_is_transitive() {
    let mut aliases = AliasRegistry::new();
    aliases.union(v(1), v(2));
    aliases.union(v(3), v(2));
    assert!(aliases.equivalent(v(1), v(3)));
    assert_eq!(aliases.leader(v(1)), aliases.leader(v(3)));
    assert!(!aliases.equivalent(v(1), v(4)));
}

#[test]
fn repeated_union_is_a_no_op() {
    let mut aliases = AliasRegistry::new();
    aliases.union(v(1), v(2));
    let leader = aliases.leader(v(2));
    aliases.union(v(2), v(1));
    aliases.union(v(1), v(1));
    assert_eq!(aliases.leader(v(1)), leader);
}

#[test]
fn set_indicator_records_and_merges() {
    let mut aliases = AliasRegistry::new();
    aliases.set_indicator(v(5), v(9));
    assert_eq!(aliases.indicator_of(v(5)), Some(v(9)));
    assert!(aliases.equivalent(v(5), v(9)));

    aliases.set_indicator(v(5), v(10));
    assert_eq!(aliases.indicator_of(v(5)), Some(v(10)));
    assert!(aliases.equivalent(v(9), v(10)));
}

#[test]
fn take_indicator_keeps_the_class() {
    let mut aliases = AliasRegistry::new();
    aliases.set_indicator(v(0), v(1));
    assert_eq!(aliases.take_indicator(v(0)), Some(v(1)));
    assert_eq!(aliases.take_indicator(v(0)), None);
    assert_eq!(aliases.indicator_of(v(0)), None);
    assert!(aliases.equivalent(v(0), v(1)));
}

/// Naive reference: relabel every member of one class on each union.
fn model_union(labels: &mut [u32], a: usize, b: usize) {
    let (from, to) = (labels[a], labels[b]);
    for label in labels.iter_mut() {
        if *label == from {
            *label = to;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Once merged, values stay merged; the classes match a naive model.
    #[test]
    fn unions_are_monotone(pairs in prop::collection::vec((0u32..24, 0u32..24), 0..48)) {
        let mut aliases = AliasRegistry::new();
        let mut labels: Vec<u32> = (0..24).collect();
        let mut merged: Vec<(u32, u32)> = Vec::new();

        for (a, b) in pairs {
            aliases.union(v(a), v(b));
            model_union(&mut labels, a as usize, b as usize);
            merged.push((a, b));
            for &(x, y) in &merged {
                prop_assert!(aliases.equivalent(v(x), v(y)));
            }
        }

        for x in 0..24u32 {
            for y in 0..24u32 {
                prop_assert_eq!(
                    aliases.equivalent(v(x), v(y)),
                    labels[x as usize] == labels[y as usize]
                );
            }
        }
    }
}
