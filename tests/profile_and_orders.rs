use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Transaction, Value};
use uuid::Uuid;

use farmbridge::{
    config::AppConfig,
    domain::lifecycle::{OrderAction, OrderStatus, PaymentMethod, Transition},
    dto::{orders::CreateOrderRequest, products::UpdateProductRequest},
    entity::{delivery_boys, farmers, orders, products},
    error::AppError,
    middleware::auth::{AuthUser, Session},
    services::{maintenance_service, order_service, product_service, profile_service::{self, Profile}},
    state::AppState,
};

fn farmer_row(user_id: Uuid) -> farmers::Model {
    farmers::Model {
        id: Uuid::new_v4(),
        user_id,
        business_name: "Green Valley Farm".into(),
        description: None,
        phone: None,
        address: None,
        city: Some("Bangalore".into()),
        state: None,
        latitude: Some(12.9716),
        longitude: Some(77.5946),
        verified: true,
        rating: 4.5,
        total_reviews: 12,
        created_at: Utc::now().fixed_offset(),
    }
}

fn rider_row(user_id: Uuid) -> delivery_boys::Model {
    delivery_boys::Model {
        id: Uuid::new_v4(),
        user_id,
        phone: None,
        vehicle_type: Some("bike".into()),
        is_available: true,
        created_at: Utc::now().fixed_offset(),
    }
}

fn product_row(farmer_id: Uuid, price: Decimal, quantity_available: i32) -> products::Model {
    let now = Utc::now();
    products::Model {
        id: Uuid::new_v4(),
        farmer_id,
        name: "Tomatoes".into(),
        description: "Vine-ripened".into(),
        price,
        category: "vegetables".into(),
        quantity_available,
        unit: "kg".into(),
        expiration_date: (now + Duration::days(5)).fixed_offset(),
        image_url: None,
        created_at: now.fixed_offset(),
        updated_at: now.fixed_offset(),
    }
}

fn order_row(product: &products::Model, consumer_id: Uuid, quantity: i32, status: OrderStatus) -> orders::Model {
    let now = Utc::now().fixed_offset();
    orders::Model {
        id: Uuid::new_v4(),
        consumer_id,
        farmer_id: product.farmer_id,
        product_id: product.id,
        quantity,
        total_price: product.price * Decimal::from(quantity),
        status,
        delivery_address: "12 MG Road".into(),
        payment_method: PaymentMethod::CashOnDelivery,
        notes: String::new(),
        delivery_boy_id: None,
        created_at: now,
        updated_at: now,
    }
}

fn state_with(db: DatabaseConnection) -> AppState {
    AppState::new(db, AppConfig::for_database("postgres://mock", "test-secret"))
}

/// Statements the mock saw. The state must be the connection's only owner.
fn transaction_log(state: AppState) -> Vec<Transaction> {
    Arc::try_unwrap(state.orm)
        .ok()
        .expect("state still shared")
        .into_transaction_log()
}

fn consumer_session(user_id: Uuid) -> Session {
    Session {
        user: AuthUser {
            user_id,
            email: "consumer@example.com".into(),
        },
        profile: Profile::Consumer,
    }
}

fn farmer_session(farmer: farmers::Model) -> Session {
    Session {
        user: AuthUser {
            user_id: farmer.user_id,
            email: "farmer@example.com".into(),
        },
        profile: Profile::Farmer(farmer),
    }
}

fn order_request(product_id: Uuid, quantity: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        product_id,
        quantity,
        delivery_address: "12 MG Road".into(),
        payment_method: PaymentMethod::CashOnDelivery,
        notes: None,
    }
}

#[tokio::test]
async fn user_with_both_profiles_resolves_to_farmer() {
    let user_id = Uuid::new_v4();
    let farmer = farmer_row(user_id);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![farmer.clone()]])
        .append_query_results([vec![rider_row(user_id)]])
        .into_connection();

    let profile = profile_service::resolve_profile(&db, user_id).await.unwrap();
    assert_eq!(profile, Profile::Farmer(farmer));

    // The delivery table is never consulted once a farmer row is found.
    assert_eq!(db.into_transaction_log().len(), 1);
}

#[tokio::test]
async fn user_without_profiles_is_a_consumer() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<farmers::Model>::new()])
        .append_query_results([Vec::<delivery_boys::Model>::new()])
        .into_connection();

    let profile = profile_service::resolve_profile(&db, user_id).await.unwrap();
    assert_eq!(profile, Profile::Consumer);
    assert_eq!(profile.profile_id(), None);
}

#[tokio::test]
async fn user_with_only_a_rider_profile_is_delivery() {
    let user_id = Uuid::new_v4();
    let rider = rider_row(user_id);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<farmers::Model>::new()])
        .append_query_results([vec![rider.clone()]])
        .into_connection();

    let profile = profile_service::resolve_profile(&db, user_id).await.unwrap();
    assert_eq!(profile.profile_id(), Some(rider.id));
}

#[tokio::test]
async fn create_order_prices_quantity_and_starts_pending() {
    let consumer_id = Uuid::new_v4();
    let product = product_row(Uuid::new_v4(), Decimal::from(50), 10);
    let stored = order_row(&product, consumer_id, 3, OrderStatus::Pending);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .append_query_results([vec![stored.clone()]])
        .into_connection();
    let state = state_with(db);

    let resp = order_service::create_order(&state, &consumer_session(consumer_id), order_request(product.id, 3))
        .await
        .unwrap();
    let order = resp.data.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Decimal::from(150));

    let log = format!("{:?}", transaction_log(state));
    assert!(log.contains("Decimal(Some(150))"), "insert should carry 50 x 3: {log}");
    assert!(log.contains("pending"));
}

#[tokio::test]
async fn create_order_rejects_more_than_stock() {
    let consumer_id = Uuid::new_v4();
    let product = product_row(Uuid::new_v4(), Decimal::from(50), 2);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .into_connection();
    let state = state_with(db);

    let err = order_service::create_order(&state, &consumer_session(consumer_id), order_request(product.id, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn create_order_is_consumer_only() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(db);
    let session = Session {
        user: AuthUser {
            user_id,
            email: "farmer@example.com".into(),
        },
        profile: Profile::Farmer(farmer_row(user_id)),
    };

    let err = order_service::create_order(&state, &session, order_request(Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn two_orders_for_the_last_unit_are_both_accepted() {
    let product = product_row(Uuid::new_v4(), Decimal::from(20), 1);
    let first_consumer = Uuid::new_v4();
    let second_consumer = Uuid::new_v4();

    // Stock is read, never decremented: both reads see the same single unit.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .append_query_results([vec![order_row(&product, first_consumer, 1, OrderStatus::Pending)]])
        .append_query_results([vec![product.clone()]])
        .append_query_results([vec![order_row(&product, second_consumer, 1, OrderStatus::Pending)]])
        .into_connection();
    let state = state_with(db);

    let first = order_service::create_order(&state, &consumer_session(first_consumer), order_request(product.id, 1)).await;
    let second =
        order_service::create_order(&state, &consumer_session(second_consumer), order_request(product.id, 1)).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn invalid_transition_issues_no_update() {
    let user_id = Uuid::new_v4();
    let farmer = farmer_row(user_id);
    let product = product_row(farmer.id, Decimal::from(50), 10);
    let completed = order_row(&product, Uuid::new_v4(), 1, OrderStatus::Completed);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![completed.clone()]])
        .into_connection();
    let state = state_with(db);
    let session = Session {
        user: AuthUser {
            user_id,
            email: "farmer@example.com".into(),
        },
        profile: Profile::Farmer(farmer),
    };

    let err = order_service::apply_action(&state, &session, completed.id, OrderAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    // Only the lookup ran.
    assert_eq!(transaction_log(state).len(), 1);
}

#[tokio::test]
async fn lost_race_on_accept_is_reported_as_invalid_transition() {
    let product = product_row(Uuid::new_v4(), Decimal::from(50), 10);
    let open = order_row(&product, Uuid::new_v4(), 1, OrderStatus::Confirmed);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let step = Transition {
        from: OrderStatus::Confirmed,
        to: OrderStatus::Confirmed,
        assign_rider: Some(Uuid::new_v4()),
    };
    let err = order_service::persist_transition(&db, &open, OrderAction::Accept, step)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn cleanup_removes_expired_products_and_cancels_their_orders() {
    let expired_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "id",
            Value::Uuid(Some(Box::new(expired_id))),
        )])]])
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();

    let report = maintenance_service::cleanup_expired(&db, Utc::now()).await.unwrap();
    assert_eq!(report.deleted_products, 1);
    assert_eq!(report.cancelled_orders, 2);
}

#[tokio::test]
async fn cleanup_with_nothing_expired_reports_zero() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();

    let report = maintenance_service::cleanup_expired(&db, Utc::now()).await.unwrap();
    assert_eq!(report, Default::default());
}

#[tokio::test]
async fn farmer_cannot_update_another_farms_product() {
    let owner = farmer_row(Uuid::new_v4());
    let product = product_row(owner.id, Decimal::from(50), 10);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .into_connection();
    let state = state_with(db);

    let err = product_service::update_product(
        &state,
        &farmer_session(farmer_row(Uuid::new_v4())),
        product.id,
        UpdateProductRequest {
            price: Some(Decimal::from(1)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(transaction_log(state).len(), 1);
}

#[tokio::test]
async fn farmer_cannot_delete_another_farms_product() {
    let owner = farmer_row(Uuid::new_v4());
    let product = product_row(owner.id, Decimal::from(50), 10);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .into_connection();
    let state = state_with(db);

    let err = product_service::delete_product(&state, &farmer_session(farmer_row(Uuid::new_v4())), product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // No DELETE was issued.
    assert_eq!(transaction_log(state).len(), 1);
}

#[tokio::test]
async fn consumer_cannot_manage_products() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(db);

    let err = product_service::delete_product(&state, &consumer_session(Uuid::new_v4()), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn owner_update_with_sub_cent_price_is_rejected_before_writing() {
    let owner = farmer_row(Uuid::new_v4());
    let product = product_row(owner.id, Decimal::from(50), 10);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product.clone()]])
        .into_connection();
    let state = state_with(db);

    let err = product_service::update_product(
        &state,
        &farmer_session(owner),
        product.id,
        UpdateProductRequest {
            price: Some(Decimal::new(12_345, 3)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(transaction_log(state).len(), 1);
}
