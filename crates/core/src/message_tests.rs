// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::wire;

#[test]
fn empty_filters_match_everything() {
    let filters = ConnectionFilters::match_all();
    let msg = Message::new(MessageKind::JobStatusUpdate, serde_json::json!({})).with_job(JobId::from_string("J1"));
    assert!(filters.accepts(&msg));
}

#[test]
fn job_id_filter_excludes_non_matching_job() {
    let mut filters = ConnectionFilters::match_all();
    filters.job_ids.insert(JobId::from_string("J1"));
    let msg = Message::new(MessageKind::JobStatusUpdate, serde_json::json!({})).with_job(JobId::from_string("J2"));
    assert!(!filters.accepts(&msg));
}

#[test]
fn system_notification_requires_flag() {
    let mut filters = ConnectionFilters::match_all();
    filters.include_system_notifications = false;
    let msg = Message::new(MessageKind::SystemNotification, serde_json::json!({}));
    assert!(!filters.accepts(&msg));
}

#[test]
fn message_without_target_job_passes_job_filter() {
    let mut filters = ConnectionFilters::match_all();
    filters.job_ids.insert(JobId::from_string("J1"));
    let msg = Message::new(MessageKind::SystemNotification, serde_json::json!({}));
    assert!(filters.accepts(&msg));
}

#[test]
fn message_type_filter_restricts_kind() {
    let mut filters = ConnectionFilters::match_all();
    filters.message_types.insert(MessageKind::LogMessage);
    let status = Message::new(MessageKind::JobStatusUpdate, serde_json::json!({}));
    assert!(!filters.accepts(&status));
}

#[test]
fn log_level_filter_restricts_target_level() {
    let mut filters = ConnectionFilters::match_all();
    filters.log_levels.insert(LogLevel::Error);
    let warn_msg = Message::new(MessageKind::LogMessage, serde_json::json!({})).with_level(LogLevel::Warn);
    assert!(!filters.accepts(&warn_msg));
}

#[test]
fn filter_update_parses_valid_payload() {
    let update = FilterUpdate {
        job_ids: vec!["J1".into()],
        log_levels: vec!["ERROR".into()],
        message_types: vec!["job_log_message".into()],
        include_system_notifications: true,
    };
    let filters = update.into_filters().expect("should parse");
    assert!(filters.job_ids.contains(&JobId::from_string("J1")));
    assert!(filters.log_levels.contains(&LogLevel::Error));
    assert!(filters.message_types.contains(&MessageKind::LogMessage));
}

#[test]
fn filter_update_rejects_invalid_job_id() {
    let update = FilterUpdate { job_ids: vec!["bad id".into()], ..Default::default() };
    assert!(update.into_filters().is_err());
}

#[test]
fn filter_update_rejects_unknown_message_type() {
    let update = FilterUpdate { message_types: vec!["not_a_type".into()], ..Default::default() };
    assert!(update.into_filters().is_err());
}

#[test]
fn message_round_trips_through_wire_encode_decode() {
    for kind in MessageKind::ALL {
        let msg = Message::new(kind, serde_json::json!({"k": "v"}))
            .with_job(JobId::from_string("J1"))
            .with_level(LogLevel::Info);
        let encoded = wire::encode(&msg).expect("encode");
        let decoded = wire::decode(&encoded).expect("decode");
        assert_eq!(decoded.kind, msg.kind);
        assert_eq!(decoded.target_job_id, msg.target_job_id);
        assert_eq!(decoded.target_level, msg.target_level);
        assert_eq!(decoded.timestamp, msg.timestamp);
        assert_eq!(decoded.data, msg.data);
    }
}
