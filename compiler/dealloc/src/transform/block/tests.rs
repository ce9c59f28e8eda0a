use dealloc_ir::ValueId;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

use crate::alias::AliasRegistry;
use crate::transform::OwnedSet;

use super::{plan_escapes, EscapeGroup};

fn v(n: u32) -> ValueId {
    ValueId::new(n)
}

#[test]
fn one_owned_one_escaping_is_direct() {
    let mut aliases = AliasRegistry::new();
    aliases.set_indicator(v(1), v(2));
    let owned: OwnedSet = [v(2)].into_iter().collect();

    let groups = plan_escapes(&mut aliases, &[v(1)], &owned);

    assert_eq!(groups.len(), 1);
    assert!(groups[0].is_direct());
    assert_eq!(groups[0].owned.as_slice(), &[v(2)]);
}

#[test]
fn duplicate_escapes_keep_their_positions() {
    let mut aliases = AliasRegistry::new();
    aliases.set_indicator(v(1), v(2));
    let owned: OwnedSet = [v(2)].into_iter().collect();

    let groups = plan_escapes(&mut aliases, &[v(1), v(5), v(1)], &owned);

    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups[0],
        EscapeGroup {
            leader: aliases.leader(v(1)),
            escaping: smallvec![(0, v(1)), (2, v(1))],
            owned: smallvec![v(2)],
        }
    );
    assert!(!groups[0].is_direct());
    assert_eq!(groups[1].escaping.as_slice(), &[(1, v(5))]);
    assert!(groups[1].owned.is_empty());
}

#[test]
fn aliased_owners_merge_into_one_group() {
    let mut aliases = AliasRegistry::new();
    aliases.set_indicator(v(1), v(2));
    aliases.set_indicator(v(3), v(4));
    // v(5) merges both allocations, like a loop result would.
    aliases.union(v(5), v(1));
    aliases.union(v(5), v(3));
    let owned: OwnedSet = [v(2), v(4), v(9)].into_iter().collect();

    let groups = plan_escapes(&mut aliases, &[v(5)], &owned);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].owned.as_slice(), &[v(2), v(4)]);
    assert!(!groups[0].is_direct());
}
