use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::get,
};
use chrono::Utc;

use crate::{
    dto::maintenance::CleanupReport,
    error::AppResult,
    response::{ApiResponse, Meta},
    services::maintenance_service,
    state::AppState,
};

// Schedulers differ in the verb they use, so both are accepted.
pub fn router() -> Router<AppState> {
    Router::new().route("/cleanup-expired", get(cleanup_expired).post(cleanup_expired))
}

#[utoipa::path(
    post,
    path = "/api/maintenance/cleanup-expired",
    responses(
        (status = 200, description = "Expired products removed and their open orders cancelled", body = ApiResponse<CleanupReport>),
        (status = 401, description = "Missing or wrong cron secret")
    ),
    security(("bearer_auth" = [])),
    tag = "Maintenance"
)]
pub async fn cleanup_expired(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<CleanupReport>>> {
    maintenance_service::authorize(&headers, state.config.cron_secret.as_deref())?;
    let report = maintenance_service::cleanup_expired(state.db(), Utc::now()).await?;
    Ok(Json(ApiResponse::success(
        "Cleanup complete",
        report,
        Some(Meta::empty()),
    )))
}
