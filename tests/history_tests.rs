//! Integration tests for the bounded history store.

use ahash::AHashMap as HashMap;

use herakles_host_monitor::history::{CounterReading, HistoryStore, TickSamples};

fn tick(cpu: f64, eth0_rx: u64) -> TickSamples {
    let mut network = HashMap::new();
    network.insert(
        "eth0".to_string(),
        CounterReading {
            rx_bytes: eth0_rx,
            tx_bytes: eth0_rx / 2,
        },
    );
    TickSamples {
        cpu: Some(cpu),
        memory: Some(cpu / 2.0),
        network: Some(network),
    }
}

#[test]
fn test_every_series_bounded_by_capacity() {
    let store = HistoryStore::new(4, ["eth0"]);
    for i in 0..10 {
        store.record(1_000 * i, &tick(i as f64, 100 * i as u64));
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.cpu.len(), 4);
    assert_eq!(snapshot.memory.len(), 4);
    assert_eq!(snapshot.network["eth0"].rx_bytes.len(), 4);
    assert_eq!(snapshot.network["eth0"].tx_bytes.len(), 4);

    // Oldest points were evicted first
    let cpu: Vec<f64> = snapshot.cpu.iter().map(|s| s.value).collect();
    assert_eq!(cpu, vec![6.0, 7.0, 8.0, 9.0]);
    assert_eq!(snapshot.cpu[0].timestamp, 6_000);
}

#[test]
fn test_one_timestamp_per_tick_across_series() {
    let store = HistoryStore::new(3, ["eth0"]);
    store.record(5_000, &tick(1.0, 10));
    store.record(10_000, &tick(2.0, 20));

    let snapshot = store.snapshot();
    for (i, sample) in snapshot.cpu.iter().enumerate() {
        assert_eq!(snapshot.memory[i].timestamp, sample.timestamp);
        assert_eq!(snapshot.network["eth0"].rx_bytes[i].timestamp, sample.timestamp);
        assert_eq!(snapshot.network["eth0"].tx_bytes[i].timestamp, sample.timestamp);
    }
}

#[test]
fn test_clock_going_backwards_keeps_order() {
    let store = HistoryStore::new(5, Vec::<String>::new());
    let first = store.record(10_000, &tick(1.0, 0));
    let second = store.record(9_000, &tick(2.0, 0));
    let third = store.record(10_000, &tick(3.0, 0));

    assert!(first < second && second < third);
    let snapshot = store.snapshot();
    assert!(snapshot
        .cpu
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_snapshot_is_a_copy() {
    let store = HistoryStore::new(3, ["eth0"]);
    store.record(1_000, &tick(1.0, 1));

    let before = store.snapshot();
    store.record(2_000, &tick(2.0, 2));

    assert_eq!(before.cpu.len(), 1);
    assert_eq!(store.snapshot().cpu.len(), 2);
    assert_eq!(store.snapshot(), store.snapshot());
}

#[test]
fn test_empty_store_serializes_empty_series() {
    let store = HistoryStore::new(3, ["eth0", "wlan0"]);
    let json = serde_json::to_value(store.snapshot()).unwrap();

    assert_eq!(json["cpu"], serde_json::json!([]));
    assert_eq!(json["memory"], serde_json::json!([]));
    assert_eq!(json["network"]["wlan0"]["rx_bytes"], serde_json::json!([]));
}
