use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::reading::{format_timestamp, local_now};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditChannel {
    /// Lifecycle, gate toggles and ingestion errors
    Operation,
    /// Threshold breaches
    Anomaly,
}

impl AuditChannel {
    pub fn tag(&self) -> &'static str {
        match self {
            AuditChannel::Operation => "OPERATION",
            AuditChannel::Anomaly => "ANOMALY",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub channel: AuditChannel,
    pub message: String,
}

impl AuditEvent {
    pub fn new(channel: AuditChannel, message: impl Into<String>) -> Self {
        Self {
            time: local_now(),
            channel,
            message: message.into(),
        }
    }

    /// Line written to the durable log.
    pub fn to_line(&self) -> String {
        format!(
            "{} - [{}] {}\n",
            format_timestamp(self.time),
            self.channel.tag(),
            self.message
        )
    }

    /// Entry shown in the dashboard mirror.
    pub fn to_mirror(&self) -> String {
        format!("[{}] {}", self.channel.tag(), self.message)
    }
}
