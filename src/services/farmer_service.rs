use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    domain::{
        geo::GeoCoordinate,
        lifecycle::OrderStatus,
        ranking::{self, Ranked},
    },
    dto::farmers::{FarmerDashboard, NearbyFarmer, NearbyFarmerList, UpdateFarmerRequest},
    entity::{
        farmers::{ActiveModel as FarmerActive, Column as FarmerCol, Entity as Farmers},
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::Farmer,
    response::{ApiResponse, Meta},
    routes::params::NearbyParams,
    state::AppState,
};

pub const DEFAULT_NEARBY_LIMIT: u64 = 5;
pub const MAX_NEARBY_LIMIT: u64 = 50;

pub async fn get_me(session: &Session) -> AppResult<ApiResponse<Farmer>> {
    let farmer = session.farmer()?;
    Ok(ApiResponse::success("Farmer profile", Farmer::from(farmer.clone()), None))
}

pub async fn update_me(
    state: &AppState,
    session: &Session,
    payload: UpdateFarmerRequest,
) -> AppResult<ApiResponse<Farmer>> {
    let farmer = session.farmer()?.clone();

    // Coordinates move together; a lone latitude or longitude is rejected.
    let location = GeoCoordinate::from_parts(payload.latitude, payload.longitude)?;

    let mut active: FarmerActive = farmer.into();
    if let Some(business_name) = payload.business_name {
        let business_name = business_name.trim().to_string();
        if business_name.is_empty() {
            return Err(AppError::Validation("business_name cannot be empty".into()));
        }
        active.business_name = Set(business_name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(state_name) = payload.state {
        active.state = Set(Some(state_name));
    }
    if let Some(location) = location {
        active.latitude = Set(Some(location.latitude));
        active.longitude = Set(Some(location.longitude));
    }

    let updated = active.update(state.db()).await?;
    tracing::info!(farmer_id = %updated.id, "farmer profile updated");

    Ok(ApiResponse::success("Updated", Farmer::from(updated), Some(Meta::empty())))
}

/// Requested result count, defaulted and clamped to `1..=MAX_NEARBY_LIMIT`.
pub fn nearby_limit(requested: Option<u64>) -> usize {
    requested.unwrap_or(DEFAULT_NEARBY_LIMIT).clamp(1, MAX_NEARBY_LIMIT) as usize
}

/// Verified farms, best rated first, re-ranked by distance when the caller gives a position.
pub async fn nearby_farmers(state: &AppState, params: NearbyParams) -> AppResult<ApiResponse<NearbyFarmerList>> {
    let origin = GeoCoordinate::from_parts(params.lat, params.lng)?;
    let limit = nearby_limit(params.limit);

    let farmers: Vec<Farmer> = Farmers::find()
        .filter(FarmerCol::Verified.eq(true))
        .order_by_desc(FarmerCol::Rating)
        .all(state.db())
        .await?
        .into_iter()
        .map(Farmer::from)
        .collect();

    let items: Vec<NearbyFarmer> = ranking::rank(origin, farmers)
        .into_iter()
        .take(limit)
        .map(|Ranked { item, distance_km }| NearbyFarmer {
            farmer: item,
            distance_km,
        })
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Nearby farmers", NearbyFarmerList { items }, Some(meta)))
}

pub async fn dashboard(state: &AppState, session: &Session) -> AppResult<ApiResponse<FarmerDashboard>> {
    let farmer = session.farmer()?;

    let total_products = Products::find()
        .filter(ProductCol::FarmerId.eq(farmer.id))
        .count(state.db())
        .await?;

    let active_orders = Orders::find()
        .filter(OrderCol::FarmerId.eq(farmer.id))
        .filter(OrderCol::Status.is_in(OrderStatus::ACTIVE))
        .count(state.db())
        .await?;

    let revenue = Orders::find()
        .select_only()
        .column(OrderCol::TotalPrice)
        .filter(OrderCol::FarmerId.eq(farmer.id))
        .filter(OrderCol::Status.ne(OrderStatus::Cancelled))
        .into_tuple::<Decimal>()
        .all(state.db())
        .await?
        .into_iter()
        .sum::<Decimal>();

    Ok(ApiResponse::success(
        "Dashboard",
        FarmerDashboard {
            total_products,
            active_orders,
            revenue,
        },
        Some(Meta::empty()),
    ))
}
