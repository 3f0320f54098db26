use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    domain::lifecycle::{self, Actor, OrderAction, OrderStatus, Transition, TransitionError},
    dto::orders::{CreateOrderRequest, OrderList},
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::profile_service::Profile,
    state::AppState,
};

/// Places a pending order for the calling consumer.
///
/// Stock is checked here and nowhere else; the check and the insert are separate
/// statements, so two consumers racing for the last unit can both succeed.
pub async fn create_order(
    state: &AppState,
    session: &Session,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    session.ensure_consumer()?;

    let delivery_address = payload.delivery_address.trim().to_string();
    if delivery_address.is_empty() {
        return Err(AppError::Validation("delivery_address is required".into()));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(state.db())
        .await?
        .ok_or(AppError::NotFound("Product"))?;

    let total_price = lifecycle::price_order(
        product.price,
        product.quantity_available,
        product.expiration_date.with_timezone(&Utc),
        payload.quantity,
        Utc::now(),
    )?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        consumer_id: Set(session.user.user_id),
        farmer_id: Set(product.farmer_id),
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        total_price: Set(total_price),
        status: Set(OrderStatus::INITIAL),
        delivery_address: Set(delivery_address),
        payment_method: Set(payload.payment_method),
        notes: Set(payload.notes.unwrap_or_default()),
        delivery_boy_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        order_id = %order.id,
        product_id = %order.product_id,
        consumer_id = %order.consumer_id,
        quantity = order.quantity,
        total_price = %order.total_price,
        "order placed"
    );

    Ok(ApiResponse::success(
        "Order placed",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

/// Orders visible to the caller: their purchases, their farm's sales, or their deliveries.
pub async fn list_orders(
    state: &AppState,
    session: &Session,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(participant_condition(session));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(state.db()).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(state.db())
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order(state: &AppState, session: &Session, id: Uuid) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(participant_condition(session)),
        )
        .one(state.db())
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    Ok(ApiResponse::success("OK", Order::from(order), Some(Meta::empty())))
}

/// Runs a farmer or rider action against one order.
pub async fn apply_action(
    state: &AppState,
    session: &Session,
    id: Uuid,
    action: OrderAction,
) -> AppResult<ApiResponse<Order>> {
    let actor = match &session.profile {
        Profile::Farmer(farmer) => Actor::Farmer(farmer.id),
        Profile::Delivery(rider) => Actor::DeliveryRider(rider.id),
        Profile::Consumer => Actor::Consumer(session.user.user_id),
    };

    let order = Orders::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or(AppError::NotFound("Order"))?;

    let step = lifecycle::transition(&order.lifecycle_state(), actor, action)?;
    let updated = persist_transition(state.db(), &order, action, step).await?;

    tracing::info!(
        order_id = %updated.id,
        action = %action,
        from = %step.from,
        to = %step.to,
        actor = ?actor,
        "order transitioned"
    );

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(updated),
        Some(Meta::empty()),
    ))
}

/// Writes `step` with a single conditional update on the status observed when it was
/// validated. A concurrent change makes the update match nothing and the order is left as is.
pub async fn persist_transition<C: ConnectionTrait>(
    db: &C,
    order: &OrderModel,
    action: OrderAction,
    step: Transition,
) -> AppResult<OrderModel> {
    let mut patch = OrderActive {
        status: Set(step.to),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let mut condition = Condition::all()
        .add(OrderCol::Id.eq(order.id))
        .add(OrderCol::Status.eq(step.from));
    if let Some(rider_id) = step.assign_rider {
        patch.delivery_boy_id = Set(Some(rider_id));
        condition = condition.add(OrderCol::DeliveryBoyId.is_null());
    }

    let result = Orders::update_many().set(patch).filter(condition).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(TransitionError {
            from: step.from,
            action,
            reason: "order changed while the update was in flight",
        }
        .into());
    }

    Orders::find_by_id(order.id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Order"))
}

fn participant_condition(session: &Session) -> Condition {
    match &session.profile {
        Profile::Farmer(farmer) => Condition::all().add(OrderCol::FarmerId.eq(farmer.id)),
        Profile::Delivery(rider) => Condition::all().add(OrderCol::DeliveryBoyId.eq(rider.id)),
        Profile::Consumer => Condition::all().add(OrderCol::ConsumerId.eq(session.user.user_id)),
    }
}
