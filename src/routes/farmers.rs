use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::farmers::{FarmerDashboard, NearbyFarmerList, UpdateFarmerRequest},
    error::AppResult,
    middleware::auth::Session,
    models::Farmer,
    response::ApiResponse,
    routes::params::NearbyParams,
    services::farmer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(nearby))
        .route("/me", get(get_me).patch(update_me))
        .route("/me/dashboard", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/farmers/nearby",
    params(NearbyParams),
    responses(
        (status = 200, description = "Verified farmers, nearest first when a position is given", body = ApiResponse<NearbyFarmerList>),
        (status = 400, description = "Only one of lat/lng given, or out of range")
    ),
    tag = "Farmers"
)]
pub async fn nearby(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> AppResult<Json<ApiResponse<NearbyFarmerList>>> {
    let resp = farmer_service::nearby_farmers(&state, params).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/farmers/me",
    responses(
        (status = 200, description = "Calling farmer's profile", body = ApiResponse<Farmer>),
        (status = 403, description = "Caller is not a farmer")
    ),
    security(("bearer_auth" = [])),
    tag = "Farmers"
)]
pub async fn get_me(session: Session) -> AppResult<Json<ApiResponse<Farmer>>> {
    let resp = farmer_service::get_me(&session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/farmers/me",
    request_body = UpdateFarmerRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<Farmer>),
        (status = 400, description = "Invalid profile fields"),
        (status = 403, description = "Caller is not a farmer")
    ),
    security(("bearer_auth" = [])),
    tag = "Farmers"
)]
pub async fn update_me(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateFarmerRequest>,
) -> AppResult<Json<ApiResponse<Farmer>>> {
    let resp = farmer_service::update_me(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/farmers/me/dashboard",
    responses(
        (status = 200, description = "Product, order and revenue totals", body = ApiResponse<FarmerDashboard>),
        (status = 403, description = "Caller is not a farmer")
    ),
    security(("bearer_auth" = [])),
    tag = "Farmers"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<FarmerDashboard>>> {
    let resp = farmer_service::dashboard(&state, &session).await?;
    Ok(Json(resp))
}
