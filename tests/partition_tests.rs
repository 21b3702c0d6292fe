use boundring::{PartitionedRing, RingBuilder};
use hashbrown::HashSet;

fn partitioned(load_factor: f64, partitions: usize) -> PartitionedRing {
    RingBuilder::new()
        .load_factor(load_factor)
        .unwrap()
        .build_partitioned(partitions)
        .unwrap()
}

#[test]
fn test_partition_set() {
    let partition_count = 1024;
    let max_difference = 100;

    let mut p = partitioned(1.0, partition_count);
    p.add("node1", 100).unwrap();
    p.add("node2", 200).unwrap();

    let set1 = p.partitions_of("node1").unwrap();
    let set2 = p.partitions_of("node2").unwrap();
    assert_eq!(set1.len() + set2.len(), partition_count);
    assert!((set1.len() as i64 * 2 - set2.len() as i64).abs() <= max_difference);

    p.remove("node1");
    let set2 = p.partitions_of("node2").unwrap();
    assert_eq!(set2.len(), partition_count);

    p.add("node3", 100).unwrap();
    let set2 = p.partitions_of("node2").unwrap();
    let set3 = p.partitions_of("node3").unwrap();
    assert_eq!(set2.len() + set3.len(), partition_count);
    assert!((set2.len() as i64 - set3.len() as i64 * 2).abs() <= max_difference);
}

#[test]
fn test_partition_coverage_and_disjointness() {
    let partition_count = 512;
    let mut p = partitioned(1.25, partition_count);
    for i in 0..7u32 {
        p.add(format!("node{}", i), 20 + i * 10).unwrap();
    }

    let indices: Vec<_> = p.iter().map(|node| node.index()).collect();
    let mut covered = HashSet::new();
    let mut total = 0;
    for index in indices {
        let owned = p.partitions(index).unwrap();
        total += owned.len();
        for partition in owned {
            assert!(covered.insert(partition), "partition {} owned twice", partition);
        }
    }

    assert_eq!(total, partition_count);
    assert_eq!(covered, (0..partition_count).collect::<HashSet<_>>());
}

#[test]
fn test_partitions_of_unknown_node() {
    let mut p = partitioned(1.25, 16);
    p.add("node1", 4).unwrap();
    assert!(p.partitions_of("missing").unwrap().is_empty());
}

#[test]
fn test_locate_uses_partition_owner() {
    let mut p = partitioned(1.25, 100);
    for i in 0..4 {
        p.add(format!("node{}", i), 25).unwrap();
    }

    for i in 0..500u64 {
        let hash = i.wrapping_mul(0x2545_f491_4f6c_dd1d);
        let partition = p.partition_by_hash(hash);
        assert_eq!(p.locate_by_hash(hash).unwrap(), p.owner(partition).unwrap());
    }

    let partition = p.partition_by_key("some-key");
    assert_eq!(p.locate("some-key").unwrap(), p.owner(partition).unwrap());
}

#[test]
fn test_locate_n() {
    let mut p = partitioned(1.25, 100);
    for i in 0..10 {
        p.add(format!("node{}", i), 20).unwrap();
    }

    let located = p.locate("key").unwrap().unwrap();
    let replicas = p.locate_n("key", 3).unwrap();
    assert_eq!(replicas.len(), 3);
    assert_eq!(replicas[0], located);
    assert_eq!(replicas.iter().collect::<HashSet<_>>().len(), 3);

    assert!(p.locate_n("key", 0).unwrap().is_empty());

    let all = p.locate_n("key", 50).unwrap();
    assert_eq!(all.len(), 10);
}

#[test]
fn test_locate_n_walks_partitions_in_order() {
    let mut p = partitioned(1.25, 64);
    for i in 0..5 {
        p.add(format!("node{}", i), 10).unwrap();
    }

    let owners: Vec<_> = p
        .allocations()
        .unwrap()
        .iter()
        .map(|owner| owner.unwrap())
        .collect();

    let hash = 61u64;
    let mut expected = Vec::new();
    for offset in 0..owners.len() {
        let owner = owners[(61 + offset) % owners.len()];
        if !expected.contains(&owner) {
            expected.push(owner);
        }
        if expected.len() == 3 {
            break;
        }
    }
    assert_eq!(p.locate_n_by_hash(hash, 3).unwrap(), expected);
}

#[test]
fn test_allocations_respect_bound() {
    let mut p = partitioned(1.1, 1000);
    p.add("small", 50).unwrap();
    p.add("medium", 100).unwrap();
    p.add("large", 250).unwrap();

    let owners = p.allocations().unwrap().to_vec();
    assert!(owners.iter().all(Option::is_some));

    let stats = p.stats();
    assert_eq!(stats.total_load, 1000);
    assert!(stats.max_utilization <= 1.0);
    for node in &stats.nodes {
        assert!(node.load <= node.max_load);
    }
}
