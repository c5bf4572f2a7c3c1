use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;

use crate::services::{DashboardHandle, EquipmentGate};

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: DashboardHandle,
    pub gate: Arc<EquipmentGate>,
}

pub async fn get_dashboard(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.dashboard.snapshot())
}

pub async fn toggle_equipment(State(state): State<DashboardState>) -> impl IntoResponse {
    let equipment = state.gate.toggle_equipment().await;

    Json(json!({ "equipment": equipment }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
