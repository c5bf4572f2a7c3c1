use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::errors::PersistenceError;
use crate::models::RecentWindow;
use crate::repositories::ReadingStore;
use crate::services::{AnomalyEvaluator, AuditLogger, DashboardEvent, DashboardHandle, RefreshView};

/// What a refresh tick needs; cloned into the timer task.
#[derive(Clone)]
pub struct RefreshContext {
    pub store: Arc<dyn ReadingStore>,
    pub evaluator: AnomalyEvaluator,
    pub audit: Arc<AuditLogger>,
    pub dashboard: DashboardHandle,
    pub window_size: usize,
}

impl RefreshContext {
    /// One tick: pull aggregates and the recent window, publish the derived view.
    /// A failed query is logged and the tick is skipped.
    pub async fn refresh(&self) {
        match self.load().await {
            Ok(view) => self.dashboard.publish(DashboardEvent::Refreshed(view)),
            Err(e) => {
                self.audit
                    .operation(format!("refresh failed: {e}"))
                    .await
            }
        }
    }

    async fn load(&self) -> Result<RefreshView, PersistenceError> {
        let aggregates = self.store.query_aggregates().await?;
        let records = self.store.query_recent(self.window_size).await?;
        let window = RecentWindow::new(records, self.window_size);

        let live_warning = window
            .latest()
            .and_then(|latest| self.evaluator.live_warning(latest.temperature));
        let statistical_warning = self.evaluator.statistical_warning(&aggregates);

        Ok(RefreshView {
            aggregates,
            window,
            live_warning,
            statistical_warning,
        })
    }
}

struct RunningTimer {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Fixed-interval refresh loop. At most one timer runs at a time.
pub struct RefreshScheduler {
    context: RefreshContext,
    period: Duration,
    timer: Option<RunningTimer>,
}

impl RefreshScheduler {
    pub fn new(context: RefreshContext, period: Duration) -> Self {
        Self {
            context,
            period,
            timer: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Returns `false` when a timer is already running.
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() {
            return false;
        }

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let context = self.context.clone();
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => context.refresh().await,
                }
            }

            tracing::debug!("refresh timer stopped");
        });

        tracing::debug!("refresh timer started, every {:?}", period);

        self.timer = Some(RunningTimer { stop_tx, task });

        true
    }

    /// Waits for an in-flight tick to finish. Returns `false` when nothing
    /// was running.
    pub async fn stop(&mut self) -> bool {
        let Some(timer) = self.timer.take() else {
            return false;
        };

        let _ = timer.stop_tx.send(());

        if let Err(e) = timer.task.await {
            tracing::error!("refresh timer ended abnormally: {}", e);
        }

        true
    }
}
