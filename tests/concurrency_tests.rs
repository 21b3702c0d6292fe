//! The ring is not thread-safe on its own; these tests share it behind a
//! `parking_lot::Mutex` and check that the mapping stays consistent.

use boundring::{PartitionedRing, RingBuilder};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

fn shared(partitions: usize) -> Arc<Mutex<PartitionedRing>> {
    let mut p = RingBuilder::new().build_partitioned(partitions).unwrap();
    for i in 0..8 {
        p.add(format!("node{}", i), 50).unwrap();
    }
    Arc::new(Mutex::new(p))
}

#[test]
fn test_concurrent_locate() {
    let ring = shared(256);
    let expected: Vec<_> = {
        let mut p = ring.lock();
        (0..1000)
            .map(|i| p.locate(format!("key{}", i)).unwrap())
            .collect()
    };
    let expected = Arc::new(expected);

    let mut handles = vec![];
    for _ in 0..4 {
        let ring = Arc::clone(&ring);
        let expected = Arc::clone(&expected);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                let owner = ring.lock().locate(format!("key{}", i)).unwrap();
                assert_eq!(owner, expected[i]);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_churn_then_introspect() {
    let ring = shared(512);
    let mut handles = vec![];

    for t in 0..4 {
        let ring = Arc::clone(&ring);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                let id = format!("t{}_n{}", t, i);
                let mut p = ring.lock();
                assert!(p.add(id.as_str(), 10).unwrap());
                assert!(p.locate(&id).unwrap().is_some());
                drop(p);

                let mut p = ring.lock();
                assert!(p.remove(&id));
                assert!(p.partitions_of(&id).unwrap().is_empty());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let mut p = ring.lock();
    assert_eq!(p.list().len(), 8);
    let indices: Vec<_> = p.iter().map(|node| node.index()).collect();
    let total: usize = indices
        .into_iter()
        .map(|index| p.partitions(index).unwrap().len())
        .sum();
    assert_eq!(total, 512);
}
