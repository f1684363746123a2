//! Run history handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::{AppError, SuccessResponse};

use crate::app_state::AppState;
use crate::dto::{HistoryEntry, HistoryResponse};

/// All recorded run outcomes
#[utoipa::path(
    get,
    path = "/api/history",
    responses(
        (status = 200, description = "Outcomes of completed runs", body = SuccessResponse<HistoryResponse>)
    ),
    tag = "history"
)]
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<HistoryResponse>>, AppError> {
    let outcomes: Vec<HistoryEntry> = state
        .store
        .list_all()
        .into_iter()
        .map(|(alert_id, outcome)| HistoryEntry { alert_id, outcome })
        .collect();
    Ok(Json(SuccessResponse::new(HistoryResponse {
        total: outcomes.len(),
        outcomes,
    })))
}

/// Outcome of one run
#[utoipa::path(
    get,
    path = "/api/history/{alert_id}",
    params(("alert_id" = String, Path, description = "Alert id of the run")),
    responses(
        (status = 200, description = "Outcome of the run", body = SuccessResponse<HistoryEntry>),
        (status = 404, description = "No outcome recorded for this id")
    ),
    tag = "history"
)]
pub async fn get_history_entry(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<SuccessResponse<HistoryEntry>>, AppError> {
    let outcome = state.store.get(&alert_id).ok_or_else(|| {
        AppError::not_found(format!("No outcome recorded for alert {}", alert_id))
    })?;
    Ok(Json(SuccessResponse::new(HistoryEntry {
        alert_id,
        outcome,
    })))
}
