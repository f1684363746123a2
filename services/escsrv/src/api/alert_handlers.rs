//! Alert intake and run control handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use common::{AppError, SuccessResponse};
use tracing::info;

use crate::app_state::{alert_context, AppState};
use crate::dto::{CancelResponse, CascadeAck, GrafanaWebhook};
use crate::engine::Alert;
use crate::error::EscSrvError;

/// Grafana webhook: raise a cascade for the first alert in the payload
#[utoipa::path(
    post,
    path = "/api/alerts/grafana",
    request_body = GrafanaWebhook,
    responses(
        (status = 200, description = "Cascade started", body = SuccessResponse<CascadeAck>),
        (status = 400, description = "Payload carries no alerts"),
        (status = 409, description = "Alert id already has a run")
    ),
    tag = "alerts"
)]
pub async fn grafana_webhook(
    State(state): State<Arc<AppState>>,
    Json(webhook): Json<GrafanaWebhook>,
) -> Result<Json<SuccessResponse<CascadeAck>>, AppError> {
    let labels = webhook
        .first_labels()
        .ok_or_else(|| AppError::bad_request("Webhook payload carries no alerts"))?;

    let dag_id = label_or(labels, "dag_id", "unknown_dag");
    let task_id = label_or(labels, "task_id", "unknown_task");
    let state_label = label_or(labels, "state", "failed");

    let ack = raise_cascade(&state, &dag_id, &task_id, &state_label, "")?;
    Ok(Json(SuccessResponse::new(ack)))
}

/// Manually trigger a test cascade
#[utoipa::path(
    post,
    path = "/api/alerts/test",
    responses(
        (status = 200, description = "Test cascade started", body = SuccessResponse<CascadeAck>)
    ),
    tag = "alerts"
)]
pub async fn trigger_test_alert(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse<CascadeAck>>, AppError> {
    let ack = raise_cascade(&state, "test_dag", "test_task", "failed", "TEST_")?;
    Ok(Json(SuccessResponse::new(ack)))
}

/// Cancel an in-flight cascade run
#[utoipa::path(
    post,
    path = "/api/alerts/{alert_id}/cancel",
    params(("alert_id" = String, Path, description = "Run to cancel")),
    responses(
        (status = 200, description = "Cancellation requested", body = SuccessResponse<CancelResponse>),
        (status = 404, description = "No in-flight run with this id")
    ),
    tag = "alerts"
)]
pub async fn cancel_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<SuccessResponse<CancelResponse>>, AppError> {
    if !state.cancel_run(&alert_id) {
        return Err(AppError::not_found(format!(
            "No in-flight run for alert {}",
            alert_id
        )));
    }
    Ok(Json(SuccessResponse::new(CancelResponse {
        alert_id,
        cancelled: true,
    })))
}

fn raise_cascade(
    state: &Arc<AppState>,
    dag_id: &str,
    task_id: &str,
    state_label: &str,
    id_prefix: &str,
) -> Result<CascadeAck, AppError> {
    let alert_id = format!("{}{}", id_prefix, AppState::make_alert_id(dag_id, task_id));
    let context = alert_context(dag_id, task_id, state_label);
    let contacts_to_call = state.engine.contacts().len();

    info!(
        "Raising cascade {} for {}.{} ({})",
        alert_id, dag_id, task_id, state_label
    );
    state
        .start_run(Alert::new(alert_id.clone(), context))
        .map_err(|e| match e {
            EscSrvError::DuplicateAlert(id) => {
                AppError::conflict(format!("Alert {} already has a run", id))
            },
            other => AppError::from(anyhow::Error::new(other)),
        })?;

    Ok(CascadeAck {
        alert_id,
        dag_id: dag_id.to_string(),
        task_id: task_id.to_string(),
        state: state_label.to_string(),
        contacts_to_call,
        message: "Escalation cascade started".to_string(),
    })
}

fn label_or(labels: &HashMap<String, String>, key: &str, fallback: &str) -> String {
    labels
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}
