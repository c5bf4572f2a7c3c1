use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use crate::models::EquipmentState;
use crate::services::{AuditLogger, DashboardEvent, DashboardHandle, RefreshScheduler};

struct GateState {
    equipment: EquipmentState,
    scheduler: RefreshScheduler,
}

/// Proof that the equipment was running when a reading was admitted. While
/// it is held the gate cannot be switched off.
pub struct Admission<'a> {
    _guard: RwLockReadGuard<'a, GateState>,
}

/// Running/Stopped switch deciding whether readings are applied and whether
/// the refresh scheduler runs.
pub struct EquipmentGate {
    state: RwLock<GateState>,
    audit: Arc<AuditLogger>,
    dashboard: DashboardHandle,
}

impl EquipmentGate {
    pub fn new(scheduler: RefreshScheduler, audit: Arc<AuditLogger>, dashboard: DashboardHandle) -> Self {
        Self {
            state: RwLock::new(GateState {
                equipment: EquipmentState::Stopped,
                scheduler,
            }),
            audit,
            dashboard,
        }
    }

    pub async fn state(&self) -> EquipmentState {
        self.state.read().await.equipment
    }

    /// Flip the equipment state, start or stop the refresh scheduler
    /// accordingly and return the new state.
    pub async fn toggle_equipment(&self) -> EquipmentState {
        let mut state = self.state.write().await;
        state.equipment = state.equipment.toggled();

        match state.equipment {
            EquipmentState::Running => {
                self.audit.operation("equipment started").await;
                state.scheduler.start();
            }
            EquipmentState::Stopped => {
                self.audit.operation("equipment stopped").await;
                state.scheduler.stop().await;
            }
        }

        self.dashboard.publish(DashboardEvent::Equipment(state.equipment));

        state.equipment
    }

    /// `None` while stopped.
    pub async fn admit(&self) -> Option<Admission<'_>> {
        let guard = self.state.read().await;

        guard
            .equipment
            .is_running()
            .then_some(Admission { _guard: guard })
    }

    /// Stop the refresh timer for process teardown, leaving the state as is.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;

        if state.scheduler.stop().await {
            tracing::debug!("refresh scheduler stopped for shutdown");
        }
    }

    pub async fn is_refreshing(&self) -> bool {
        self.state.read().await.scheduler.is_running()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::models::AuditChannel;
    use crate::tests::{TestHarness, read_lines, wait_for_snapshot};

    use super::*;

    #[tokio::test]
    async fn test_toggle_starts_and_stops_scheduler() {
        let harness = TestHarness::new();
        let gate = &harness.gate;

        assert_eq!(gate.state().await, EquipmentState::Stopped);
        assert!(!gate.is_refreshing().await);

        assert_eq!(gate.toggle_equipment().await, EquipmentState::Running);
        assert!(gate.is_refreshing().await);
        assert!(gate.admit().await.is_some());

        assert_eq!(gate.toggle_equipment().await, EquipmentState::Stopped);
        assert!(!gate.is_refreshing().await);
        assert!(gate.admit().await.is_none());

        let lines = read_lines(harness.audit.path(AuditChannel::Operation));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[OPERATION] equipment started"));
        assert!(lines[1].ends_with("[OPERATION] equipment stopped"));

        let snapshot = wait_for_snapshot(&harness.dashboard, Duration::from_secs(1), |snapshot| snapshot.event_log.len() == 2)
            .await
            .unwrap();
        assert_eq!(snapshot.equipment, EquipmentState::Stopped);
    }

    #[tokio::test]
    async fn test_toggle_waits_for_admitted_reading() {
        let harness = TestHarness::new();
        let gate = harness.gate.clone();
        gate.toggle_equipment().await;

        let admission = gate.admit().await.unwrap();

        let toggle = tokio::spawn({
            let gate = gate.clone();
            async move { gate.toggle_equipment().await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!toggle.is_finished());

        drop(admission);
        assert_eq!(toggle.await.unwrap(), EquipmentState::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_stops_refresh() {
        let harness = TestHarness::new();
        harness.gate.toggle_equipment().await;

        harness.gate.shutdown().await;

        assert!(!harness.gate.is_refreshing().await);
        assert_eq!(harness.gate.state().await, EquipmentState::Running);
    }
}
