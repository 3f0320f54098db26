use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    domain::{
        geo::GeoCoordinate,
        lifecycle::{OrderAction, OrderStatus},
        ranking::{self, Located},
    },
    dto::delivery::{AvailableOrder, AvailableOrderList, DeliveryStats, UpdateDeliveryRequest},
    entity::{
        delivery_boys::ActiveModel as DeliveryActive,
        farmers::Entity as Farmers,
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::AppResult,
    middleware::auth::Session,
    models::{DeliveryProfile, Farmer, Order},
    response::{ApiResponse, Meta},
    routes::params::LocationParams,
    state::AppState,
};

/// Rider share of a completed order's total: 10%.
pub fn commission_rate() -> Decimal {
    Decimal::new(1, 1)
}

impl Located for AvailableOrder {
    fn location(&self) -> Option<GeoCoordinate> {
        self.pickup.as_ref().and_then(Located::location)
    }
}

pub async fn get_me(session: &Session) -> AppResult<ApiResponse<DeliveryProfile>> {
    let rider = session.rider()?;
    Ok(ApiResponse::success(
        "Delivery profile",
        DeliveryProfile::from(rider.clone()),
        None,
    ))
}

pub async fn update_me(
    state: &AppState,
    session: &Session,
    payload: UpdateDeliveryRequest,
) -> AppResult<ApiResponse<DeliveryProfile>> {
    let rider = session.rider()?.clone();

    let mut active: DeliveryActive = rider.into();
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(vehicle_type) = payload.vehicle_type {
        active.vehicle_type = Set(Some(vehicle_type));
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }

    let updated = active.update(state.db()).await?;
    tracing::info!(rider_id = %updated.id, available = updated.is_available, "delivery profile updated");

    Ok(ApiResponse::success(
        "Updated",
        DeliveryProfile::from(updated),
        Some(Meta::empty()),
    ))
}

/// Unassigned orders a rider may still accept, nearest pickup first when a position is given.
pub async fn available_orders(
    state: &AppState,
    session: &Session,
    params: LocationParams,
) -> AppResult<ApiResponse<AvailableOrderList>> {
    session.rider()?;
    let origin = GeoCoordinate::from_parts(params.lat, params.lng)?;

    let open: Vec<AvailableOrder> = Orders::find()
        .filter(OrderCol::DeliveryBoyId.is_null())
        .filter(OrderCol::Status.is_in(OrderAction::Accept.sources().iter().copied()))
        .find_also_related(Farmers)
        .order_by_desc(OrderCol::CreatedAt)
        .all(state.db())
        .await?
        .into_iter()
        .map(|(order, farmer)| AvailableOrder {
            order: Order::from(order),
            pickup: farmer.map(Farmer::from),
            distance_km: None,
        })
        .collect();

    let items: Vec<AvailableOrder> = ranking::rank(origin, open)
        .into_iter()
        .map(|ranked| AvailableOrder {
            distance_km: ranked.distance_km,
            ..ranked.item
        })
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Available orders", AvailableOrderList { items }, Some(meta)))
}

pub async fn stats(state: &AppState, session: &Session) -> AppResult<ApiResponse<DeliveryStats>> {
    let rider = session.rider()?;

    let completed = Orders::find()
        .filter(OrderCol::DeliveryBoyId.eq(rider.id))
        .filter(OrderCol::Status.eq(OrderStatus::Completed))
        .count(state.db())
        .await?;

    let pending = Orders::find()
        .filter(OrderCol::DeliveryBoyId.eq(rider.id))
        .filter(OrderCol::Status.is_in(OrderStatus::ACTIVE))
        .count(state.db())
        .await?;

    let delivered_value = Orders::find()
        .select_only()
        .column(OrderCol::TotalPrice)
        .filter(OrderCol::DeliveryBoyId.eq(rider.id))
        .filter(OrderCol::Status.eq(OrderStatus::Completed))
        .into_tuple::<Decimal>()
        .all(state.db())
        .await?
        .into_iter()
        .sum::<Decimal>();

    Ok(ApiResponse::success(
        "Delivery stats",
        DeliveryStats {
            completed,
            pending,
            earnings: (delivered_value * commission_rate()).round_dp(2),
        },
        Some(Meta::empty()),
    ))
}
