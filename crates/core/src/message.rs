// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical message model broadcast to WebSocket sessions.
//!
//! `MessageKind` is the single canonicalized tagged enum: the two legacy
//! `MessageType` enums the original carried are merged into this one.

use crate::ids::JobId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    JobStatusUpdate,
    JobProgressUpdate,
    #[serde(rename = "job_log_message")]
    LogMessage,
    #[serde(rename = "job_metrics_update")]
    MetricsUpdate,
    SystemNotification,
    ConnectionAck,
    ErrorMessage,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::JobStatusUpdate,
        MessageKind::JobProgressUpdate,
        MessageKind::LogMessage,
        MessageKind::MetricsUpdate,
        MessageKind::SystemNotification,
        MessageKind::ConnectionAck,
        MessageKind::ErrorMessage,
    ];
}

/// Log severity, ordered for completeness though filtering only checks set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARN" => Some(Self::Warn),
            "ERROR" => Some(Self::Error),
            "FATAL" => Some(Self::Fatal),
            _ => None,
        }
    }
}

/// A structured message produced by a producer and fanned out to sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: Timestamp,
    pub data: serde_json::Value,
    #[serde(rename = "targetJobId", skip_serializing_if = "Option::is_none")]
    pub target_job_id: Option<JobId>,
    #[serde(rename = "targetLevel", skip_serializing_if = "Option::is_none")]
    pub target_level: Option<LogLevel>,
    #[serde(skip)]
    pub priority: i32,
}

impl Message {
    pub fn new(kind: MessageKind, data: serde_json::Value) -> Self {
        Self { kind, timestamp: Timestamp::now(), data, target_job_id: None, target_level: None, priority: 0 }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.target_job_id = Some(job_id);
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.target_level = Some(level);
        self
    }
}

/// Declarative per-connection filter. An empty set at any dimension means
/// "match all" in that dimension (the boolean "receive all" flag form from
/// the original is dropped, per REDESIGN FLAGS).
#[derive(Debug, Clone, Default)]
pub struct ConnectionFilters {
    pub job_ids: HashSet<JobId>,
    pub message_types: HashSet<MessageKind>,
    pub log_levels: HashSet<LogLevel>,
    pub include_system_notifications: bool,
}

impl ConnectionFilters {
    pub fn match_all() -> Self {
        Self { include_system_notifications: true, ..Default::default() }
    }

    /// Filter matching per §4.3: kind must be in `message_types` (or empty),
    /// target job/level must be in their sets (or empty/absent), and
    /// `SystemNotification` additionally requires `include_system_notifications`.
    pub fn accepts(&self, message: &Message) -> bool {
        if !self.message_types.is_empty() && !self.message_types.contains(&message.kind) {
            return false;
        }
        if let Some(ref job_id) = message.target_job_id {
            if !self.job_ids.is_empty() && !self.job_ids.contains(job_id) {
                return false;
            }
        }
        if let Some(level) = message.target_level {
            if !self.log_levels.is_empty() && !self.log_levels.contains(&level) {
                return false;
            }
        }
        if message.kind == MessageKind::SystemNotification && !self.include_system_notifications {
            return false;
        }
        true
    }
}

/// Wire-protocol filter-update payload (client -> server), §6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterUpdate {
    #[serde(default)]
    pub job_ids: Vec<String>,
    #[serde(default)]
    pub log_levels: Vec<String>,
    #[serde(default)]
    pub message_types: Vec<String>,
    #[serde(default)]
    pub include_system_notifications: bool,
}

impl FilterUpdate {
    /// Convert into `ConnectionFilters`, rejecting unknown log levels or message types.
    pub fn into_filters(self) -> Result<ConnectionFilters, String> {
        let mut job_ids = HashSet::new();
        for id in self.job_ids {
            if !crate::ids::validate_job_id(&id) {
                return Err(format!("invalid jobId: {id}"));
            }
            job_ids.insert(JobId::from_string(id));
        }

        let mut log_levels = HashSet::new();
        for level in self.log_levels {
            log_levels.insert(LogLevel::parse(&level).ok_or_else(|| format!("invalid logLevel: {level}"))?);
        }

        let mut message_types = HashSet::new();
        for kind in self.message_types {
            let parsed: MessageKind = serde_json::from_value(serde_json::Value::String(kind.clone()))
                .map_err(|_| format!("invalid messageType: {kind}"))?;
            message_types.insert(parsed);
        }

        Ok(ConnectionFilters { job_ids, message_types, log_levels, include_system_notifications: self.include_system_notifications })
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
