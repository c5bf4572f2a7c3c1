use std::sync::Arc;

use crate::errors::IngestError;
use crate::models::{Reading, local_now};
use crate::repositories::ReadingStore;
use crate::services::{AnomalyEvaluator, AuditLogger, DashboardEvent, DashboardHandle, EquipmentGate, parse_reading};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Persisted and evaluated
    Applied { anomalies: usize },
    /// Received while the equipment was stopped
    Dropped,
}

/// Parse → gate → persist → evaluate → log, for one wire message.
pub struct IngestService {
    gate: Arc<EquipmentGate>,
    store: Arc<dyn ReadingStore>,
    evaluator: AnomalyEvaluator,
    audit: Arc<AuditLogger>,
    dashboard: DashboardHandle,
}

impl IngestService {
    pub fn new(
        gate: Arc<EquipmentGate>,
        store: Arc<dyn ReadingStore>,
        evaluator: AnomalyEvaluator,
        audit: Arc<AuditLogger>,
        dashboard: DashboardHandle,
    ) -> Self {
        Self {
            gate,
            store,
            evaluator,
            audit,
            dashboard,
        }
    }

    pub async fn ingest(&self, payload: &[u8]) -> Result<IngestOutcome, IngestError> {
        let reading = parse_reading(payload, local_now())?;

        self.apply(reading).await
    }

    pub async fn apply(&self, reading: Reading) -> Result<IngestOutcome, IngestError> {
        let Some(_admission) = self.gate.admit().await else {
            self.audit
                .operation(format!(
                    "reading received while equipment stopped, not applied ({:.1}°C, {:.1}%)",
                    reading.temperature, reading.humidity
                ))
                .await;

            return Ok(IngestOutcome::Dropped);
        };

        let id = self.store.insert(&reading).await?;

        tracing::debug!(
            "reading {} stored: {:.1}°C, {:.1}%",
            id,
            reading.temperature,
            reading.humidity
        );

        let anomalies = self.evaluator.evaluate(&reading);
        for anomaly in &anomalies {
            self.audit.anomaly(anomaly.to_string()).await;
        }

        self.dashboard.publish(DashboardEvent::ReadingApplied {
            live_warning: self.evaluator.live_warning(reading.temperature),
        });

        Ok(IngestOutcome::Applied {
            anomalies: anomalies.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::errors::PersistenceError;
    use crate::models::AuditChannel;
    use crate::tests::{TestHarness, read_lines, wait_for_snapshot};

    use super::*;

    #[tokio::test]
    async fn test_temperature_anomaly_scenario() {
        let harness = TestHarness::new();
        harness.gate.toggle_equipment().await;

        let outcome = harness
            .ingest
            .ingest(br#"{"temperature": 26.0, "humidity": 35.0}"#)
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Applied { anomalies: 1 });
        assert_eq!(harness.store.inserted().len(), 1);

        let anomalies = read_lines(harness.audit.path(AuditChannel::Anomaly));
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].ends_with("[ANOMALY] temperature anomaly, 26.0 > 25.0"));

        let snapshot = wait_for_snapshot(&harness.dashboard, Duration::from_secs(1), |snapshot| snapshot.live_warning.is_some())
            .await
            .unwrap();
        assert_eq!(snapshot.live_warning, Some(26.0));
    }

    #[tokio::test]
    async fn test_stopped_gate_drops_reading() {
        let harness = TestHarness::new();

        let outcome = harness
            .ingest
            .ingest(br#"{"temperature": 30.0, "humidity": 50.0}"#)
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Dropped);
        assert!(harness.store.inserted().is_empty());
        assert!(read_lines(harness.audit.path(AuditChannel::Anomaly)).is_empty());

        let operations = read_lines(harness.audit.path(AuditChannel::Operation));
        assert_eq!(operations.len(), 1);
        assert!(operations[0].contains("not applied"));
    }

    #[tokio::test]
    async fn test_same_breach_logged_twice() {
        let harness = TestHarness::new();
        harness.gate.toggle_equipment().await;

        let payload = br#"{"temperature": 26.0, "humidity": 45.0}"#;
        harness.ingest.ingest(payload).await.unwrap();
        harness.ingest.ingest(payload).await.unwrap();

        let anomalies = read_lines(harness.audit.path(AuditChannel::Anomaly));
        assert_eq!(anomalies.len(), 4);
        assert_eq!(harness.store.inserted().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_skips_evaluation() {
        let harness = TestHarness::new();
        harness.gate.toggle_equipment().await;
        harness.store.set_failing(true);

        let result = harness
            .ingest
            .ingest(br#"{"temperature": 30.0, "humidity": 50.0}"#)
            .await;

        assert!(matches!(
            result,
            Err(IngestError::Persistence(PersistenceError::Database(_)))
        ));
        assert!(read_lines(harness.audit.path(AuditChannel::Anomaly)).is_empty());

        harness.store.set_failing(false);
        let outcome = harness
            .ingest
            .ingest(br#"{"temperature": 20.0, "humidity": 30.0}"#)
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Applied { anomalies: 0 });
    }

    #[tokio::test]
    async fn test_malformed_payload_rejected() {
        let harness = TestHarness::new();
        harness.gate.toggle_equipment().await;

        let result = harness.ingest.ingest(br#"{"temp":26.0}"#).await;

        assert!(matches!(result, Err(IngestError::MalformedPayload(_))));
        assert!(harness.store.inserted().is_empty());
    }
}
