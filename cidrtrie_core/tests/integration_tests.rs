use std::{
    sync::{Arc, Barrier},
    thread,
    time::Instant,
};

use cidrtrie_core::{Prefix, PrefixTrie};

/// Helper to turn IPv4 octets plus a length into a key.
fn ipv4(a: u8, b: u8, c: u8, d: u8, len: u8) -> Prefix {
    Prefix::v4([a, b, c, d], len).unwrap()
}

fn key_for(t: usize, i: usize) -> Prefix {
    ipv4(10, t as u8, (i >> 8) as u8, i as u8, 32)
}

#[test]
fn concurrent_distinct_upserts_then_lookups() {
    const THREADS: usize = 8;
    const OPS_PER_THREAD: usize = 1_000;
    let tree = Arc::new(PrefixTrie::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let mut handles = vec![];
    for t in 0..THREADS {
        let tr = Arc::clone(&tree);
        let b = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            b.wait();
            for i in 0..OPS_PER_THREAD {
                assert!(tr.upsert(key_for(t, i), (t, i)).is_none());
            }
        }));
    }
    for h in handles {
        h.join().expect("writer panicked");
    }
    assert_eq!(tree.len(), THREADS * OPS_PER_THREAD);

    let mut handles = vec![];
    for t in 0..THREADS {
        let tr = Arc::clone(&tree);
        let b = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            b.wait();
            for i in 0..OPS_PER_THREAD {
                assert_eq!(tr.get(&key_for(t, i)), Some((t, i)), "lost update {t}/{i}");
            }
        }));
    }
    for h in handles {
        h.join().expect("reader panicked");
    }
}

#[test]
fn readers_never_see_half_applied_batches() {
    // the writer always moves both keys together; a snapshot must agree on both
    let tree = Arc::new(PrefixTrie::new());
    let a = ipv4(192, 0, 2, 0, 24);
    let b = ipv4(198, 51, 100, 0, 24);
    tree.bulk_upsert([(a, 0u64), (b, 0u64)]);

    let writer = {
        let tr = Arc::clone(&tree);
        thread::spawn(move || {
            for n in 1..=2_000u64 {
                tr.bulk_upsert([(a, n), (b, n)]);
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tr = Arc::clone(&tree);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let snap = tr.read();
                    assert_eq!(snap.exact(&a), snap.exact(&b));
                }
            })
        })
        .collect();
    writer.join().expect("writer panicked");
    for r in readers {
        r.join().expect("reader panicked");
    }
    assert_eq!(tree.get(&a), Some(2_000));
}

#[test]
fn racing_add_has_exactly_one_winner() {
    const THREADS: usize = 8;
    let tree = Arc::new(PrefixTrie::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let key = ipv4(203, 0, 113, 0, 24);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let tr = Arc::clone(&tree);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                tr.insert_if_absent(key, t).is_ok()
            })
        })
        .collect();
    let winners: Vec<bool> = handles
        .into_iter()
        .map(|h| h.join().expect("thread failed"))
        .collect();
    assert_eq!(winners.iter().filter(|w| **w).count(), 1);
    assert_eq!(tree.len(), 1);
}

#[test]
fn concurrent_insert_lookup_delete_churn() {
    const THREADS: usize = 8;
    const OPS_PER_THREAD: usize = 1_000;
    let tree = Arc::new(PrefixTrie::new());
    // a covering route nobody deletes
    tree.upsert(ipv4(10, 0, 0, 0, 8), usize::MAX);
    let barrier = Arc::new(Barrier::new(THREADS));

    let mut handles = vec![];
    for t in 0..THREADS {
        let tr = Arc::clone(&tree);
        let b = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            b.wait();
            for i in 0..OPS_PER_THREAD {
                let key = key_for(t, i);
                tr.upsert(key, i);
                assert_eq!(tr.longest_match(&key).map(|m| m.prefix), Some(key));
                tr.delete(key).expect("own key vanished");
                // falls back to the covering /8
                let m = tr.longest_match(&key).expect("cover lost");
                assert_eq!(m.value, usize::MAX);
            }
        }));
    }
    for h in handles {
        h.join().expect("thread failed");
    }
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node_count(), 9);
}

#[test]
fn stress_test_timing() {
    const NUM_KEYS: usize = 20_000;

    let tree = PrefixTrie::with_capacity(NUM_KEYS * 4);
    let keys: Vec<Prefix> = (0..NUM_KEYS)
        .map(|i| Prefix::v6(((i as u128) << 64).to_be_bytes(), 64).unwrap())
        .collect();
    tree.bulk_upsert(keys.iter().map(|k| (*k, ())));

    let start = Instant::now();
    for k in &keys {
        assert!(tree.has_key(k), "Lookup failed for key {} during stress test", k);
    }
    let elapsed = start.elapsed();
    let avg = elapsed.as_micros() as f64 / keys.len() as f64;
    println!("avg lookup ({} keys): {:.2} μs", NUM_KEYS, avg);
}
