use std::collections::VecDeque;

use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::models::{AggregateStats, AuditEvent, EquipmentState, ReadingRecord, RecentWindow};

/// Everything one refresh tick derives from the store.
#[derive(Clone, Debug, Default)]
pub struct RefreshView {
    pub aggregates: AggregateStats,
    pub window: RecentWindow,
    pub live_warning: Option<f64>,
    pub statistical_warning: Option<f64>,
}

#[derive(Clone, Debug)]
pub enum DashboardEvent {
    Equipment(EquipmentState),
    ReadingApplied { live_warning: Option<f64> },
    Refreshed(RefreshView),
    Audit(AuditEvent),
}

/// UI-facing state as of the latest processed event.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DashboardSnapshot {
    pub equipment: EquipmentState,
    pub recent: Vec<ReadingRecord>,
    pub temperature_series: Vec<f64>,
    pub humidity_series: Vec<f64>,
    pub labels: Vec<String>,
    pub latest: Option<String>,
    pub aggregates: AggregateStats,
    /// Latest temperature while it is above the live threshold
    pub live_warning: Option<f64>,
    /// Aggregate maximum while it is above the statistical threshold
    pub statistical_warning: Option<f64>,
    pub event_log: VecDeque<String>,
}

/// Single writer of [`DashboardSnapshot`]. Producers send events through a
/// [`DashboardHandle`]; readers get the snapshot republished after each event.
pub struct Dashboard {
    snapshot: DashboardSnapshot,
    mirror_capacity: usize,
    receiver: mpsc::UnboundedReceiver<DashboardEvent>,
    publisher: watch::Sender<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(mirror_capacity: usize) -> (Self, DashboardHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (publisher, snapshot) = watch::channel(DashboardSnapshot::default());

        let dashboard = Self {
            snapshot: DashboardSnapshot::default(),
            mirror_capacity: mirror_capacity.max(1),
            receiver,
            publisher,
        };

        (dashboard, DashboardHandle { sender, snapshot })
    }

    /// Start the consumer loop and return the handle producers write through.
    pub fn spawn(mirror_capacity: usize) -> DashboardHandle {
        let (dashboard, handle) = Self::new(mirror_capacity);

        tokio::spawn(dashboard.run());

        handle
    }

    async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.apply(event);
            self.publisher.send_replace(self.snapshot.clone());
        }

        tracing::debug!("dashboard closed, no producers left");
    }

    fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Equipment(state) => {
                self.snapshot.equipment = state;
            }
            DashboardEvent::ReadingApplied { live_warning } => {
                self.snapshot.live_warning = live_warning;
            }
            DashboardEvent::Refreshed(view) => {
                self.snapshot.temperature_series = view.window.temperatures();
                self.snapshot.humidity_series = view.window.humidities();
                self.snapshot.labels = view.window.labels();
                self.snapshot.latest = view.window.latest_summary();
                self.snapshot.recent = view.window.records().to_vec();
                self.snapshot.aggregates = view.aggregates;
                self.snapshot.statistical_warning = view.statistical_warning;
                if !view.window.is_empty() {
                    self.snapshot.live_warning = view.live_warning;
                }
            }
            DashboardEvent::Audit(event) => {
                if self.snapshot.event_log.len() == self.mirror_capacity {
                    self.snapshot.event_log.pop_front();
                }
                self.snapshot.event_log.push_back(event.to_mirror());
            }
        }
    }
}

#[derive(Clone)]
pub struct DashboardHandle {
    sender: mpsc::UnboundedSender<DashboardEvent>,
    snapshot: watch::Receiver<DashboardSnapshot>,
}

impl DashboardHandle {
    pub fn publish(&self, event: DashboardEvent) {
        if self.sender.send(event).is_err() {
            tracing::warn!("dashboard is closed, event dropped");
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.clone()
    }
}
