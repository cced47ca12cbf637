//! Tests for loading an exported event, balancing it, and writing the
//! accepted assignment back.

use station_balancer::config::suggested_max_time;
use station_balancer::config::DEFAULT_MAX_ITERATIONS;
use station_balancer::{BalanceConfig, Balancer, BalancerError, EventConfiguration, TestStatus};
use tempfile::TempDir;

const EXPORT: &str = r#"{
  "event_name": "Spring cohort",
  "max_time": 60,
  "stations": [
    {
      "id": "st-1",
      "name": "Motor skills",
      "pin": "4321",
      "member_count": 2,
      "test_count": 3,
      "created_at": "2025-03-01T09:00:00Z",
      "updated_at": "2025-03-01T09:00:00Z",
      "tests": ["grip", "tap", "balance"]
    },
    {
      "id": "st-2",
      "name": "Cognition",
      "status": "online",
      "unread_messages": 2,
      "members": [],
      "member_count": 1,
      "test_count": 1,
      "created_at": "2025-03-01T09:00:00Z",
      "updated_at": "2025-03-01T09:00:00Z",
      "tests": ["recall"]
    },
    {
      "id": "st-3",
      "name": "Vision",
      "member_count": 0,
      "test_count": 0,
      "created_at": "2025-03-01T09:00:00Z",
      "updated_at": "2025-03-01T09:00:00Z",
      "tests": []
    }
  ],
  "members": [
    { "id": "m1", "name": "Ana", "role": "Lead", "email": "ana@example.org" }
  ],
  "tests": [
    { "id": "grip", "name": "Grip strength", "estimatedDuration": 30, "status": "Pending" },
    { "id": "tap", "name": "Finger tapping", "estimatedDuration": 25, "status": "In Progress" },
    { "id": "balance", "name": "Balance board", "estimatedDuration": 20, "status": "Pending" },
    { "id": "recall", "name": "Word recall", "estimatedDuration": 15, "status": "Completed" }
  ],
  "chat": [],
  "location": "Lab B",
  "created_at": "2025-03-01T09:00:00Z",
  "updated_at": "2025-03-01T09:00:00Z"
}"#;

fn write_export(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("event.json");
    std::fs::write(&path, EXPORT).unwrap();
    path
}

#[test]
fn test_load_export() {
    let dir = TempDir::new().unwrap();
    let event = EventConfiguration::load(&write_export(&dir)).unwrap();

    assert_eq!(event.event_name, "Spring cohort");
    assert_eq!(event.configured_max_time(), Some(60));
    assert_eq!(event.stations.len(), 3);
    assert_eq!(event.tests.len(), 4);
    assert_eq!(event.tests[1].status, TestStatus::InProgress);
    assert_eq!(event.members.len(), 1);
    assert!(event.validate().is_ok());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = EventConfiguration::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, BalancerError::Io(_)));
}

#[test]
fn test_balance_and_apply_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir);
    let mut event = EventConfiguration::load(&path).unwrap();

    let config = BalanceConfig::default().with_max_time(event.max_time);
    let result = Balancer::new(config).run(&event.stations, &event.tests);

    // st-1 holds 75 minutes; its 20-minute test moves to the empty station.
    assert_eq!(result.original_max_time, 75);
    assert!(!result.suggestions.is_empty());
    assert_eq!(result.suggestions[0].test_id, "balance");
    assert_eq!(result.suggestions[0].destination_station_id, "st-3");
    assert!(!result.exceeds_max_time(60));

    let changed = event.apply_assignments(&result.suggested_assignments);
    assert!(changed >= 2);
    for station in &event.stations {
        assert_eq!(station.test_count, station.tests.len());
        assert_eq!(
            Some(&station.tests),
            result.suggested_assignments.get(&station.id)
        );
    }

    let out = dir.path().join("balanced.json");
    event.save(&out).unwrap();
    let reloaded = EventConfiguration::load(&out).unwrap();
    assert_eq!(reloaded, event);
    assert!(reloaded.validate().is_ok());

    // Members and chat survive untouched.
    assert_eq!(reloaded.members[0]["email"], "ana@example.org");
    assert!(reloaded.chat.is_empty());

    // So do station fields the balancer never reads.
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["stations"][0]["pin"], "4321");
    assert_eq!(written["stations"][1]["status"], "online");
    assert_eq!(written["stations"][1]["unread_messages"], 2);
    assert_eq!(written["stations"][1]["members"], serde_json::json!([]));
    assert_eq!(written["location"], "Lab B");
}

#[test]
fn test_apply_writes_to_output_path() {
    let dir = TempDir::new().unwrap();
    let path = write_export(&dir);
    let mut event = EventConfiguration::load(&path).unwrap();
    event.validate().unwrap();

    // No explicit cap: the event's stored 60 minutes applies.
    let config = BalanceConfig::for_event(&event, None, false, DEFAULT_MAX_ITERATIONS);
    config.validate().unwrap();
    assert_eq!(config.max_time, Some(60));

    let result = Balancer::new(config).run(&event.stations, &event.tests);
    event.apply_assignments(&result.suggested_assignments);

    let out = dir.path().join("out.json");
    event.save(&out).unwrap();

    let original = EventConfiguration::load(&path).unwrap();
    assert_eq!(original.stations[2].tests, Vec::<String>::new());

    let balanced = EventConfiguration::load(&out).unwrap();
    assert_eq!(balanced.stations[2].tests, vec!["balance".to_string()]);
    assert_eq!(balanced.stations[2].test_count, 1);
    assert_eq!(balanced.stations[0].pin.as_deref(), Some("4321"));
}

#[test]
fn test_no_cap_overrides_stored_cap() {
    let event = EventConfiguration::from_json(EXPORT).unwrap();
    let config = BalanceConfig::for_event(&event, Some(50), true, DEFAULT_MAX_ITERATIONS);
    assert_eq!(config.max_time, None);

    // Without a cap only balancing runs: 75 vs 0 narrows by moving
    // short tests from st-1.
    let result = Balancer::new(config).run(&event.stations, &event.tests);
    assert!(result.adjusted_max_time < 75);
}

#[test]
fn test_suggested_cap_for_export() {
    let event = EventConfiguration::from_json(EXPORT).unwrap();
    // 90 minutes over 3 stations, plus 20% headroom.
    assert_eq!(suggested_max_time(&event.stations, &event.tests), 36);
}

#[test]
fn test_invalid_export_is_rejected() {
    let mut event = EventConfiguration::from_json(EXPORT).unwrap();
    event.stations[2].tests.push("grip".to_string());
    assert!(matches!(
        event.validate(),
        Err(BalancerError::TestAssignedTwice { .. })
    ));
}
