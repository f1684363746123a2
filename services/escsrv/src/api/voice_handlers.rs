//! Voice content handler
//!
//! The provider fetches this endpoint when a placed call connects. The
//! alert context rides in the query string, put there by the notifier
//! when it placed the call, so GET and POST share one handler.

use axum::{
    extract::Query,
    http::header,
    response::{IntoResponse, Response},
};

use crate::dto::VoiceQuery;
use crate::render::voice_document;

/// Voice announcement document for an alert
#[utoipa::path(
    get,
    path = "/voice/alert",
    params(VoiceQuery),
    responses(
        (status = 200, description = "Voice markup", content_type = "text/xml")
    ),
    tag = "voice"
)]
pub async fn voice_alert(Query(query): Query<VoiceQuery>) -> Response {
    let document = voice_document(&query.into_context());
    ([(header::CONTENT_TYPE, "text/xml")], document).into_response()
}
