//! API Route Configuration
//!
//! Central route definition for all Escalation Service API endpoints

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;

use crate::app_state::AppState;

use crate::api::alert_handlers::{cancel_alert, grafana_webhook, trigger_test_alert};
use crate::api::config_handlers::{get_log_level, update_log_level};
use crate::api::health_handlers::{health_check, list_contacts};
use crate::api::history_handlers::{get_history_entry, list_history};
use crate::api::voice_handlers::voice_alert;

// OpenAPI documentation - only compiled when swagger-ui feature is enabled
#[cfg(feature = "swagger-ui")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health_handlers::health_check,
        crate::api::health_handlers::list_contacts,
        crate::api::alert_handlers::grafana_webhook,
        crate::api::alert_handlers::trigger_test_alert,
        crate::api::alert_handlers::cancel_alert,
        crate::api::history_handlers::list_history,
        crate::api::history_handlers::get_history_entry,
        crate::api::voice_handlers::voice_alert,
        crate::api::config_handlers::get_log_level,
        crate::api::config_handlers::update_log_level
    ),
    components(
        schemas(
            crate::dto::GrafanaWebhook,
            crate::dto::GrafanaAlert,
            crate::dto::CascadeAck,
            crate::dto::HistoryEntry,
            crate::dto::HistoryResponse,
            crate::dto::ContactView,
            crate::dto::CancelResponse,
            crate::dto::HealthInfo,
            crate::dto::LogLevelInfo,
            crate::dto::SetLogLevelRequest,
            crate::engine::Contact,
            crate::engine::Outcome,
            common::ServiceStatus
        )
    ),
    tags(
        (name = "alerts", description = "Alert intake and cascade control"),
        (name = "history", description = "Recorded run outcomes"),
        (name = "voice", description = "Voice content served to the provider"),
        (name = "contacts", description = "Escalation roster"),
        (name = "health", description = "Service health"),
        (name = "config", description = "Runtime configuration")
    )
)]
pub struct EscsrvApiDoc;

/// Create all API routes for the Escalation Service
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and roster
        .route("/health", get(health_check))
        .route("/api/contacts", get(list_contacts))
        // Alert intake
        .route("/api/alerts/grafana", post(grafana_webhook))
        .route("/api/alerts/test", post(trigger_test_alert))
        .route("/api/alerts/{alert_id}/cancel", post(cancel_alert))
        // Runtime configuration
        .route(
            "/api/config/log-level",
            get(get_log_level).put(update_log_level),
        )
        // Run history
        .route("/api/history", get(list_history))
        .route("/api/history/{alert_id}", get(get_history_entry))
        // Voice content, fetched by the provider when a call connects
        .route("/voice/alert", get(voice_alert).post(voice_alert))
        // Apply HTTP request logging middleware
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}
