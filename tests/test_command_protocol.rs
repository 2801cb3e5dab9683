//! Integration tests for the atomic command-logging protocol
//!
//! Covers the bounded-history invariants (cap at 100, newest first), the
//! no-mutation guarantees of the precondition checks, and failure
//! propagation when the store drops out.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;

use device_sim_api::command_log::{append_command, command_log_key, COMMAND_HISTORY_LIMIT};
use device_sim_api::directory::get_device;
use device_sim_api::domain::CommandEntry;
use device_sim_api::store::StoreError;
use device_sim_api::test_utils::mock_store::MockRedis;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
}

fn entry(action: &str, seq: i64) -> CommandEntry {
    let mut parameters = HashMap::new();
    parameters.insert("seq".to_string(), serde_json::json!(seq));
    CommandEntry {
        action: action.to_string(),
        parameters,
        timestamp: base_time() + Duration::seconds(seq),
    }
}

fn seq_of(raw: &str) -> i64 {
    let parsed: serde_json::Value = serde_json::from_str(raw).unwrap();
    parsed["parameters"]["seq"].as_i64().unwrap()
}

fn seed_device(mock: &mut MockRedis, id: &str, online: &str) {
    mock.insert_hash(
        &format!("device:{}", id),
        &[("name", "Lamp"), ("type", "light"), ("online", online)],
    );
}

#[tokio::test]
async fn test_append_single_command() {
    let mut mock = MockRedis::new();

    append_command(&mut mock, "d1", &entry("toggle", 0))
        .await
        .unwrap();

    let log = mock.list(&command_log_key("d1"));
    assert_eq!(log.len(), 1);

    let stored: serde_json::Value = serde_json::from_str(&log[0]).unwrap();
    assert_eq!(stored["action"], "toggle");
    assert!(stored["timestamp"]
        .as_str()
        .unwrap()
        .starts_with("2024-01-15T10:30:00"));
}

#[tokio::test]
async fn test_history_is_capped_and_newest_first() {
    let mut mock = MockRedis::new();
    let total = 150;

    for seq in 0..total {
        append_command(&mut mock, "d1", &entry("toggle", seq))
            .await
            .unwrap();
    }

    let log = mock.list(&command_log_key("d1"));
    assert_eq!(log.len(), COMMAND_HISTORY_LIMIT);

    // Strictly newest first: seq 149 at the head, descending from there
    let seqs: Vec<i64> = log.iter().map(|raw| seq_of(raw)).collect();
    let expected: Vec<i64> =
        (total - COMMAND_HISTORY_LIMIT as i64..total).rev().collect();
    assert_eq!(seqs, expected);
}

#[tokio::test]
async fn test_trim_is_never_observably_deferred() {
    let mut mock = MockRedis::new();

    // The cap must hold after every single append, not just eventually
    for seq in 0..120 {
        append_command(&mut mock, "d1", &entry("toggle", seq))
            .await
            .unwrap();
        assert!(mock.list_len(&command_log_key("d1")) <= COMMAND_HISTORY_LIMIT);
    }
}

#[tokio::test]
async fn test_histories_are_per_device() {
    let mut mock = MockRedis::new();

    append_command(&mut mock, "d1", &entry("on", 0)).await.unwrap();
    append_command(&mut mock, "d2", &entry("off", 1)).await.unwrap();

    assert_eq!(mock.list_len(&command_log_key("d1")), 1);
    assert_eq!(mock.list_len(&command_log_key("d2")), 1);
}

#[tokio::test]
async fn test_append_offline_store_fails_without_mutation() {
    let mut mock = MockRedis::new();
    mock.set_offline(true);

    let result = append_command(&mut mock, "d1", &entry("toggle", 0)).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));

    mock.set_offline(false);
    assert_eq!(mock.list_len(&command_log_key("d1")), 0);
}

// The next two tests replicate the handler orchestration: the command log
// itself does not re-check preconditions, so the caller's checks are what
// keeps rejected commands out of the history.

#[tokio::test]
async fn test_offline_device_never_reaches_the_log() {
    let mut mock = MockRedis::new();
    seed_device(&mut mock, "d2", "false");

    let device = get_device(&mut mock, "d2").await.unwrap().unwrap();
    assert!(!device.online, "precondition check must reject the command");

    // Handler bails before append; the history stays absent
    assert_eq!(mock.list_len(&command_log_key("d2")), 0);
}

#[tokio::test]
async fn test_missing_device_never_reaches_the_log() {
    let mut mock = MockRedis::new();

    let device = get_device(&mut mock, "ghost").await.unwrap();
    assert!(device.is_none(), "precondition check must reject the command");

    assert_eq!(mock.list_len(&command_log_key("ghost")), 0);
}

#[tokio::test]
async fn test_full_send_flow_for_online_device() {
    let mut mock = MockRedis::new();
    seed_device(&mut mock, "d1", "true");

    let device = get_device(&mut mock, "d1").await.unwrap().unwrap();
    assert!(device.online);

    append_command(&mut mock, "d1", &entry("toggle", 0))
        .await
        .unwrap();

    let log = mock.list(&command_log_key("d1"));
    assert_eq!(log.len(), 1);
    let stored: serde_json::Value = serde_json::from_str(&log[0]).unwrap();
    assert_eq!(stored["action"], "toggle");
}
