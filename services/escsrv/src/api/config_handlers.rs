//! Runtime configuration handlers

use axum::Json;
use common::{AppError, SuccessResponse};
use tracing::info;

use crate::dto::{LogLevelInfo, SetLogLevelRequest};

/// Current log filter level
#[utoipa::path(
    get,
    path = "/api/config/log-level",
    responses(
        (status = 200, description = "Active log filter", body = SuccessResponse<LogLevelInfo>)
    ),
    tag = "config"
)]
pub async fn get_log_level() -> Result<Json<SuccessResponse<LogLevelInfo>>, AppError> {
    Ok(Json(SuccessResponse::new(LogLevelInfo {
        level: common::logging::get_log_level(),
    })))
}

/// Change the log filter level without restarting the service
#[utoipa::path(
    put,
    path = "/api/config/log-level",
    request_body = SetLogLevelRequest,
    responses(
        (status = 200, description = "Filter updated", body = SuccessResponse<LogLevelInfo>),
        (status = 400, description = "Invalid filter spec")
    ),
    tag = "config"
)]
pub async fn update_log_level(
    Json(request): Json<SetLogLevelRequest>,
) -> Result<Json<SuccessResponse<LogLevelInfo>>, AppError> {
    common::logging::set_log_level(&request.level).map_err(AppError::bad_request)?;
    info!("Log level set to {} via API", request.level);
    Ok(Json(SuccessResponse::new(LogLevelInfo {
        level: common::logging::get_log_level(),
    })))
}
