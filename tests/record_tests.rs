use std::collections::BTreeSet;

use procsnap::{ProcessSnapshot, SnapshotRecord};
use serde_json::Value;

const RECORD_KEYS: [&str; 14] = [
    "processId",
    "hostname",
    "fqdn",
    "domain",
    "localFqdn",
    "cpuHandles",
    "cpuThreads",
    "cpuCores",
    "memPeakWorkingSet",
    "memWorkingSet",
    "memPrivateBytes",
    "timeStartup",
    "timeCurrent",
    "uptime",
];

fn to_json(snapshot: &ProcessSnapshot) -> Value {
    serde_json::to_value(snapshot.record()).expect("record must serialize")
}

fn key_set(json: &Value) -> BTreeSet<&str> {
    json.as_object()
        .expect("record must be a flat object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn sampled_record_has_full_key_set_and_live_identity() {
    let mut snapshot = ProcessSnapshot::new().expect("current process must be queryable");
    snapshot.sample();

    let json = to_json(&snapshot);
    assert_eq!(key_set(&json), RECORD_KEYS.iter().copied().collect());
    assert_eq!(json["processId"].as_u64(), Some(u64::from(std::process::id())));
    assert!(json["uptime"].as_i64().unwrap() >= 0);
}

#[test]
fn unsampled_record_reports_zero_counters() {
    let snapshot = ProcessSnapshot::new().unwrap();
    let json = to_json(&snapshot);

    for key in [
        "cpuHandles",
        "cpuThreads",
        "memPeakWorkingSet",
        "memWorkingSet",
        "memPrivateBytes",
    ] {
        assert_eq!(
            json[key].as_u64(),
            Some(0),
            "{key} must be present and zero before the first sample"
        );
    }
    // The key set is full even without sampling.
    assert_eq!(key_set(&json), RECORD_KEYS.iter().copied().collect());
}

#[test]
fn double_serialize_is_stable_except_render_time_fields() {
    let mut snapshot = ProcessSnapshot::new().unwrap();
    snapshot.sample();

    let first = to_json(&snapshot);
    let second = to_json(&snapshot);

    for key in RECORD_KEYS {
        match key {
            // Rendered fresh on every export.
            "timeCurrent" => {}
            "uptime" => {
                assert!(second[key].as_i64().unwrap() >= first[key].as_i64().unwrap());
            }
            _ => assert_eq!(
                first[key], second[key],
                "{key} changed without an intervening sample() call"
            ),
        }
    }
}

#[test]
fn sampled_counters_are_plausible_for_a_live_process() {
    let mut snapshot = ProcessSnapshot::new().unwrap();
    snapshot.sample();

    assert!(snapshot.thread_count >= 1);
    assert!(snapshot.working_set_kb > 0);
    assert!(snapshot.peak_working_set_kb > 0);
    assert!(snapshot.handle_count > 0);
}

#[test]
fn empty_host_names_serialize_as_empty_strings_not_missing_keys() {
    let record = SnapshotRecord {
        process_id: 4242,
        hostname: String::new(),
        fqdn: String::new(),
        domain: String::new(),
        local_fqdn: String::new(),
        cpu_handles: 0,
        cpu_threads: 0,
        cpu_cores: 8,
        mem_peak_working_set: 0,
        mem_working_set: 0,
        mem_private_bytes: 0,
        time_startup: "2026-01-01T00:00:00.000000Z".to_string(),
        time_current: "2026-01-01T00:00:01.000000Z".to_string(),
        uptime: 1_000_000,
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(key_set(&json), RECORD_KEYS.iter().copied().collect());
    for key in ["hostname", "fqdn", "domain", "localFqdn"] {
        assert_eq!(json[key].as_str(), Some(""), "{key} must serialize as \"\"");
    }
}

#[test]
fn multiple_snapshots_of_the_same_process_coexist() {
    // Nothing structurally forbids more than one instance for one pid.
    let mut a = ProcessSnapshot::new().unwrap();
    let b = ProcessSnapshot::new().unwrap();
    a.sample();
    assert_eq!(a.process_id, b.process_id);
    assert_eq!(b.thread_count, 0);
}
