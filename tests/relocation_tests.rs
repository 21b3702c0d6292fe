//! Relocation bound: with `epsilon = load_factor - 1`, one topology change
//! moves at most `ceil((P / M) / epsilon^2)` of P partitions over M nodes.

use boundring::{NodeIndex, PartitionedRing, RingBuilder};

const PARTITION_COUNT: usize = 1024;
const NODE_COUNT: usize = 64;
const EPSILON: f64 = 0.2;

fn max_relocations() -> usize {
    let average_load = PARTITION_COUNT as f64 / NODE_COUNT as f64;
    (average_load / (EPSILON * EPSILON)).ceil() as usize
}

fn count_relocations(old: &[Option<NodeIndex>], new: &[Option<NodeIndex>]) -> usize {
    old.iter().zip(new).filter(|(a, b)| a != b).count()
}

fn cluster() -> PartitionedRing {
    let mut p = RingBuilder::new()
        .load_factor(1.0 + EPSILON)
        .unwrap()
        .build_partitioned(PARTITION_COUNT)
        .unwrap();
    for i in 0..NODE_COUNT {
        p.add(format!("node{}", i), 100).unwrap();
    }
    p
}

#[test]
fn test_bound_value() {
    assert_eq!(max_relocations(), 400);
}

#[test]
fn test_relocation_on_add_and_remove() {
    let mut p = cluster();
    let mut allocations = p.allocations().unwrap().to_vec();

    let mut check = |p: &mut PartitionedRing| {
        let next = p.allocations().unwrap().to_vec();
        let relocations = count_relocations(&allocations, &next);
        assert!(
            relocations <= max_relocations(),
            "expected at most {} relocations, got {}",
            max_relocations(),
            relocations
        );
        allocations = next;
    };

    for i in 0..10 {
        p.add(format!("node_new{}", i), 100).unwrap();
        check(&mut p);
    }

    for i in 0..10 {
        p.remove(&format!("node{}", i));
        check(&mut p);
    }
}

#[test]
fn test_unchanged_topology_moves_nothing() {
    let mut p = cluster();
    let before = p.allocations().unwrap().to_vec();

    // A rejected mutation leaves the mapping as is.
    assert!(!p.add("node0", 100).unwrap());
    let after = p.allocations().unwrap().to_vec();
    assert_eq!(count_relocations(&before, &after), 0);
}

#[test]
fn test_remove_then_readd_restores_placement_shape() {
    let mut p = cluster();
    let before = p.allocations().unwrap().to_vec();

    p.remove("node5");
    p.allocations().unwrap();
    p.add("node5", 100).unwrap();
    let after = p.allocations().unwrap().to_vec();

    // node5 comes back with a new handle, so only compare the other owners.
    let old5 = before
        .iter()
        .flatten()
        .copied()
        .find(|&index| p.node(index).is_none())
        .unwrap();
    let new5 = p.get("node5").unwrap().index();
    let mapped: Vec<_> = before
        .iter()
        .map(|owner| owner.map(|index| if index == old5 { new5 } else { index }))
        .collect();
    assert_eq!(mapped, after);
}
