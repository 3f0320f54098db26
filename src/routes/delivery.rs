use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::delivery::{AvailableOrderList, DeliveryStats, UpdateDeliveryRequest},
    error::AppResult,
    middleware::auth::Session,
    models::DeliveryProfile,
    response::ApiResponse,
    routes::params::LocationParams,
    services::delivery_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/stats", get(stats))
        .route("/orders/available", get(available_orders))
}

#[utoipa::path(
    get,
    path = "/api/delivery/me",
    responses(
        (status = 200, description = "Calling rider's profile", body = ApiResponse<DeliveryProfile>),
        (status = 403, description = "Caller is not a delivery rider")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn get_me(session: Session) -> AppResult<Json<ApiResponse<DeliveryProfile>>> {
    let resp = delivery_service::get_me(&session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery/me",
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<DeliveryProfile>),
        (status = 403, description = "Caller is not a delivery rider")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn update_me(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateDeliveryRequest>,
) -> AppResult<Json<ApiResponse<DeliveryProfile>>> {
    let resp = delivery_service::update_me(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery/orders/available",
    params(LocationParams),
    responses(
        (status = 200, description = "Open orders without a rider", body = ApiResponse<AvailableOrderList>),
        (status = 400, description = "Only one of lat/lng given, or out of range"),
        (status = 403, description = "Caller is not a delivery rider")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn available_orders(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<ApiResponse<AvailableOrderList>>> {
    let resp = delivery_service::available_orders(&state, &session, params).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery/me/stats",
    responses(
        (status = 200, description = "Completed and in-progress counts with earnings", body = ApiResponse<DeliveryStats>),
        (status = 403, description = "Caller is not a delivery rider")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery"
)]
pub async fn stats(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<DeliveryStats>>> {
    let resp = delivery_service::stats(&state, &session).await?;
    Ok(Json(resp))
}
