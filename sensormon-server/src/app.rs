use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::{ReadingRepository, ReadingStore};
use crate::services::*;

/// The wired core: store, audit, dashboard, gate and ingestion.
pub struct App {
    pub storage: Arc<Storage>,
    pub store: Arc<dyn ReadingStore>,
    pub dashboard: DashboardHandle,
    pub audit: Arc<AuditLogger>,
    pub gate: Arc<EquipmentGate>,
    pub ingest: Arc<IngestService>,
}

pub async fn create_app(settings: &Settings) -> anyhow::Result<App> {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .context("failed to open storage")?,
    );
    let store: Arc<dyn ReadingStore> = Arc::new(ReadingRepository::new(storage.clone()));

    let dashboard = Dashboard::spawn(settings.audit.mirror_capacity);
    let audit = Arc::new(AuditLogger::new(&settings.audit, dashboard.clone()));
    let evaluator = AnomalyEvaluator::new(settings.thresholds);

    let scheduler = RefreshScheduler::new(
        RefreshContext {
            store: store.clone(),
            evaluator,
            audit: audit.clone(),
            dashboard: dashboard.clone(),
            window_size: settings.refresh.window_size,
        },
        Duration::from_millis(settings.refresh.interval_ms),
    );
    let gate = Arc::new(EquipmentGate::new(scheduler, audit.clone(), dashboard.clone()));

    let ingest = Arc::new(IngestService::new(
        gate.clone(),
        store.clone(),
        evaluator,
        audit.clone(),
        dashboard.clone(),
    ));

    Ok(App {
        storage,
        store,
        dashboard,
        audit,
        gate,
        ingest,
    })
}

pub fn create_listener(settings: &Settings, app: &App) -> anyhow::Result<ReadingListener> {
    let ip_addr = settings
        .listener
        .host
        .parse::<IpAddr>()
        .context("invalid listener host")?;

    Ok(ReadingListener::new(
        SocketAddr::from((ip_addr, settings.listener.port)),
        app.ingest.clone(),
        app.audit.clone(),
    )
    .with_max_payload(settings.listener.max_payload)
    .with_read_timeout(Duration::from_millis(settings.listener.read_timeout_ms)))
}

pub fn create_router(app: &App) -> Router {
    let dashboard = Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/equipment/toggle", post(toggle_equipment))
        .with_state(DashboardState {
            dashboard: app.dashboard.clone(),
            gate: app.gate.clone(),
        });

    Router::new()
        .route("/health", get(health))
        .merge(dashboard)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
