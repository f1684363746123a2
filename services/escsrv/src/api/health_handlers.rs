//! Health and roster inspection handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use common::{AppError, ServiceStatus, SuccessResponse};

use crate::app_state::AppState;
use crate::dto::{ContactView, HealthInfo};

/// Service health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = SuccessResponse<HealthInfo>)
    ),
    tag = "health"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<HealthInfo>>, AppError> {
    let info = HealthInfo {
        service: state.config.service.name.clone(),
        status: ServiceStatus::Healthy,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        contacts_configured: state.engine.contacts().len(),
        active_runs: state.active_run_count(),
        completed_runs: state.store.len(),
        timestamp: Utc::now(),
    };
    Ok(Json(SuccessResponse::new(info)))
}

/// Configured escalation roster, addresses masked
#[utoipa::path(
    get,
    path = "/api/contacts",
    responses(
        (status = 200, description = "Roster in priority order", body = SuccessResponse<Vec<ContactView>>)
    ),
    tag = "contacts"
)]
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<Vec<ContactView>>>, AppError> {
    let contacts: Vec<ContactView> = state
        .engine
        .contacts()
        .iter()
        .enumerate()
        .map(|(i, c)| ContactView::from_contact(i + 1, c))
        .collect();
    Ok(Json(SuccessResponse::new(contacts)))
}
