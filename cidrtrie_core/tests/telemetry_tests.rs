use cidrtrie_core::telemetry::{init, register_stats_callback};
use cidrtrie_core::{Prefix, PrefixTrie};
use std::sync::Mutex;

static SEEN: Mutex<Vec<(String, u64)>> = Mutex::new(Vec::new());

fn collect(name: &str, value: u64) {
    SEEN.lock().unwrap().push((name.to_string(), value));
}

fn last(name: &str) -> Option<u64> {
    SEEN.lock()
        .unwrap()
        .iter()
        .rev()
        .find(|(n, _)| n == name)
        .map(|(_, v)| *v)
}

#[test]
fn callback_receives_counters_and_gauges() {
    assert!(register_stats_callback(collect));
    assert!(!register_stats_callback(collect), "second registration must be refused");
    init();

    let tree = PrefixTrie::new();
    let k = Prefix::v4([10, 0, 0, 0], 8).unwrap();
    tree.upsert(k, 1);
    assert_eq!(last("cidrtrie_upserts_total"), Some(1));
    assert_eq!(last("cidrtrie_prefixes"), Some(1));
    assert_eq!(last("cidrtrie_nodes"), Some(9));

    assert!(tree.delete(Prefix::v4([11, 0, 0, 0], 8).unwrap()).is_err());
    assert_eq!(last("cidrtrie_rejected_total"), Some(1));

    tree.get(&k);
    assert_eq!(last("cidrtrie_lookups_total"), Some(1));

    tree.clear();
    assert_eq!(last("cidrtrie_nodes"), Some(1));
    assert_eq!(last("cidrtrie_prefixes"), Some(0));
}
