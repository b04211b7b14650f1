use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

/// Asserts every B-tree invariant below the root and returns the leaf depth.
fn validate_node<K: Ord + fmt::Debug>(
    node: &Node<K>,
    cfg: SetConfig,
    is_root: bool,
    lower: Option<&K>,
    upper: Option<&K>,
) -> usize {
    let n = node.keys.len();
    assert!(n <= cfg.maximum(), "node overfull: {n} keys");
    if !is_root {
        assert!(n >= cfg.minimum(), "non-root node underfull: {n} keys");
    }

    for pair in node.keys.windows(2) {
        assert!(pair[0] < pair[1], "keys not strictly ascending: {:?}", node.keys);
    }
    if let (Some(lo), Some(first)) = (lower, node.keys.first()) {
        assert!(lo < first, "key {first:?} not above separator {lo:?}");
    }
    if let (Some(hi), Some(last)) = (upper, node.keys.last()) {
        assert!(last < hi, "key {last:?} not below separator {hi:?}");
    }

    if node.is_leaf() {
        return 0;
    }

    assert_eq!(node.children.len(), n + 1, "child count must be key count + 1");
    let mut depth = None;
    for (i, child) in node.children.iter().enumerate() {
        let lo = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
        let hi = if i == n { upper } else { Some(&node.keys[i]) };
        let d = validate_node(child, cfg, false, lo, hi);
        match depth {
            None => depth = Some(d),
            Some(expected) => assert_eq!(d, expected, "leaves at unequal depth"),
        }
    }
    depth.unwrap_or(0) + 1
}

fn validate_tree<K: Ord + fmt::Debug>(t: &Set<K>) {
    if t.root.keys.is_empty() {
        assert!(t.root.children.is_empty(), "keyless root must be a leaf");
        assert_eq!(t.len(), 0, "keyless root means an empty set");
        return;
    }
    let depth = validate_node(&t.root, t.config, true, None, None);
    assert_eq!(depth + 1, t.height(), "height must match leaf depth");

    let mut keys = Vec::new();
    t.root.in_order(&mut keys);
    assert_eq!(keys.len(), t.len(), "reachable key count must match Set::len");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(#[proptest(strategy = "0u16..512")] u16),
    Remove(#[proptest(strategy = "0u16..512")] u16),
    Contains(#[proptest(strategy = "0u16..512")] u16),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(minimum in prop::sample::select(vec![1usize, 2, 3, 5]), ops in ops_strategy()) {
        let mut t: Set<u16> = Set::with_minimum(minimum).unwrap();
        let mut m: BTreeSet<u16> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    prop_assert_eq!(t.insert(key), m.insert(key));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Contains(key) => {
                    prop_assert_eq!(t.contains(&key), m.contains(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let mut got = Vec::new();
        t.root.in_order(&mut got);
        let got: Vec<u16> = got.into_iter().copied().collect();
        let expected: Vec<u16> = m.iter().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_clone_independence(keys in prop::collection::btree_set(0u32..10_000, 1..300)) {
        let original: Set<u32> = keys.iter().copied().collect();
        let mut copy = original.clone();

        for k in &keys {
            prop_assert!(copy.remove(k));
        }
        prop_assert!(copy.is_empty());
        validate_tree(&copy);
        validate_tree(&original);
        for k in &keys {
            prop_assert!(original.contains(k));
        }
    }
}

/// Calls `f` with every ordering of `items`, generated by Heap's algorithm.
fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    let mut perm = items.to_vec();
    let mut counters = vec![0usize; perm.len()];
    f(perm.clone());

    let mut i = 1;
    while i < perm.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            perm.swap(j, i);
            f(perm.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

#[test]
fn permutations_are_distinct_and_complete() {
    let mut seen = BTreeSet::new();
    for_each_permutation(&[1, 2, 3, 4], |perm| {
        assert!(seen.insert(perm), "permutation repeated");
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for minimum in [1, 2] {
        for_each_permutation(&keys, |perm| {
            let mut t: Set<u32> = Set::with_minimum(minimum).unwrap();
            for k in perm {
                assert!(t.insert(k));
                validate_tree(&t);
            }
            let mut got = Vec::new();
            t.root.in_order(&mut got);
            assert!(got.into_iter().copied().eq(keys.iter().copied()));
        });
    }
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for minimum in [1, 2] {
        // Insert in a fixed order, then remove in all permutations.
        let mut base: Set<u32> = Set::with_minimum(minimum).unwrap();
        for &k in &keys {
            base.insert(k);
        }

        for_each_permutation(&keys, |perm| {
            let mut t = base.clone();
            for k in perm {
                assert!(t.remove(&k));
                assert!(!t.contains(&k));
                validate_tree(&t);
            }
            assert!(t.is_empty());
            assert!(t.root.keys.is_empty());
            assert!(t.root.children.is_empty());
        });
    }
}

#[test]
fn randomized_insert_remove_contains() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2);
    for minimum in [1, 2, 4, 8] {
        let mut t: Set<u64> = Set::with_minimum(minimum).unwrap();
        let mut m: BTreeSet<u64> = BTreeSet::new();

        for _ in 0..20_000 {
            let key = rng.gen_range(0..2_000u64);
            match rng.gen_range(0..100) {
                0..=49 => assert_eq!(t.insert(key), m.insert(key)),
                50..=79 => assert_eq!(t.remove(&key), m.remove(&key)),
                _ => assert_eq!(t.contains(&key), m.contains(&key)),
            }
        }

        validate_tree(&t);
        assert_eq!(t.len(), m.len());
        let mut got = Vec::new();
        t.root.in_order(&mut got);
        assert!(got.into_iter().eq(m.iter()));
    }
}
