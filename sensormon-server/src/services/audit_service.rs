use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::configs::Audit;
use crate::errors::LogWriteError;
use crate::models::{AuditChannel, AuditEvent};
use crate::services::{DashboardEvent, DashboardHandle};

struct AuditFile {
    path: PathBuf,
    // Serializes appends so concurrent lines never interleave
    lock: Mutex<()>,
}

impl AuditFile {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn append(&self, line: &str) -> Result<(), LogWriteError> {
        let _guard = self.lock.lock().await;

        let to_error = |source: std::io::Error| LogWriteError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(to_error)?;

        file.write_all(line.as_bytes()).await.map_err(to_error)?;
        file.flush().await.map_err(to_error)?;

        Ok(())
    }
}

/// Append-only operation and anomaly logs, mirrored into the dashboard.
///
/// Recording never fails for the caller: a write error is reported through
/// tracing and the event still reaches the mirror.
pub struct AuditLogger {
    operation: AuditFile,
    anomaly: AuditFile,
    dashboard: DashboardHandle,
}

impl AuditLogger {
    pub fn new(audit: &Audit, dashboard: DashboardHandle) -> Self {
        Self {
            operation: AuditFile::new(&audit.operation_log),
            anomaly: AuditFile::new(&audit.anomaly_log),
            dashboard,
        }
    }

    pub async fn operation(&self, message: impl Into<String>) {
        self.record(AuditEvent::new(AuditChannel::Operation, message)).await;
    }

    pub async fn anomaly(&self, message: impl Into<String>) {
        self.record(AuditEvent::new(AuditChannel::Anomaly, message)).await;
    }

    pub async fn record(&self, event: AuditEvent) {
        let file = match event.channel {
            AuditChannel::Operation => {
                tracing::info!(channel = event.channel.tag(), "{}", event.message);
                &self.operation
            }
            AuditChannel::Anomaly => {
                tracing::warn!(channel = event.channel.tag(), "{}", event.message);
                &self.anomaly
            }
        };

        if let Err(e) = file.append(&event.to_line()).await {
            tracing::error!("audit log write failed: {}", e);
        }

        self.dashboard.publish(DashboardEvent::Audit(event));
    }

    pub fn path(&self, channel: AuditChannel) -> &Path {
        match channel {
            AuditChannel::Operation => &self.operation.path,
            AuditChannel::Anomaly => &self.anomaly.path,
        }
    }
}
