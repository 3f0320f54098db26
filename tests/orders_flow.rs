use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use farmbridge::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    domain::lifecycle::{OrderAction, OrderStatus, PaymentMethod},
    dto::{
        auth::{FarmerSignup, RegisterRequest},
        orders::CreateOrderRequest,
        products::{CreateProductRequest, UpdateProductRequest},
    },
    error::AppError,
    middleware::auth::{AuthUser, Session},
    models::Role,
    routes::params::{CatalogParams, OrderListQuery},
    services::{
        auth_service, delivery_service, farmer_service, maintenance_service, order_service, product_service,
        profile_service,
    },
    state::AppState,
};

// Full marketplace flow against a real database:
// register -> list product -> order -> confirm -> accept -> complete, then expiry cleanup.
#[tokio::test]
async fn order_lifecycle_and_cleanup_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, AppConfig::for_database(database_url, "flow-secret"));

    let farmer = register(&state, Role::Farmer).await?;
    let consumer = register(&state, Role::Consumer).await?;
    let rider = register(&state, Role::Delivery).await?;
    assert_eq!(farmer.role(), Role::Farmer);
    assert_eq!(consumer.role(), Role::Consumer);
    assert_eq!(rider.role(), Role::Delivery);

    let product = product_service::create_product(
        &state,
        &farmer,
        CreateProductRequest {
            name: "Flow Tomatoes".into(),
            description: Some("Grown for the integration test".into()),
            price: Decimal::from(50),
            category: "vegetables".into(),
            quantity_available: 10,
            unit: "kg".into(),
            expiration_date: Utc::now() + Duration::days(5),
            image_url: None,
        },
    )
    .await?
    .data
    .expect("product");

    let catalog = product_service::list_catalog(
        &state,
        CatalogParams {
            q: Some("flow tomatoes".into()),
            lat: Some(12.9352),
            lng: Some(77.6245),
            per_page: Some(100),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("catalog");
    let listed = catalog
        .items
        .iter()
        .find(|item| item.product.id == product.id)
        .expect("new product is listed");
    assert!(listed.distance_km.is_some());

    let order = order_service::create_order(
        &state,
        &consumer,
        CreateOrderRequest {
            product_id: product.id,
            quantity: 3,
            delivery_address: "12 MG Road".into(),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: None,
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Decimal::from(150));

    // Consumers cannot move their own order.
    let err = order_service::apply_action(&state, &consumer, order.id, OrderAction::Confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let confirmed = order_service::apply_action(&state, &farmer, order.id, OrderAction::Confirm)
        .await?
        .data
        .expect("confirmed");
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    let board = delivery_service::available_orders(&state, &rider, Default::default())
        .await?
        .data
        .expect("board");
    assert!(board.items.iter().any(|item| item.order.id == order.id));

    let accepted = order_service::apply_action(&state, &rider, order.id, OrderAction::Accept)
        .await?
        .data
        .expect("accepted");
    assert_eq!(accepted.status, OrderStatus::Confirmed);
    assert_eq!(accepted.delivery_boy_id, rider.profile.profile_id());

    // A second accept finds a rider already assigned.
    let err = order_service::apply_action(&state, &rider, order.id, OrderAction::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let completed = order_service::apply_action(&state, &farmer, order.id, OrderAction::Complete)
        .await?
        .data
        .expect("completed");
    assert_eq!(completed.status, OrderStatus::Completed);

    let err = order_service::apply_action(&state, &farmer, order.id, OrderAction::Cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let dashboard = farmer_service::dashboard(&state, &farmer).await?.data.expect("dashboard");
    assert_eq!(dashboard.total_products, 1);
    assert_eq!(dashboard.active_orders, 0);
    assert_eq!(dashboard.revenue, Decimal::from(150));

    let stats = delivery_service::stats(&state, &rider).await?.data.expect("stats");
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.earnings, Decimal::from(15));

    let consumer_orders = order_service::list_orders(&state, &consumer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(consumer_orders.items.len(), 1);

    // Expiry cleanup: an open order on a product that has since expired gets cancelled.
    let open = order_service::create_order(
        &state,
        &consumer,
        CreateOrderRequest {
            product_id: product.id,
            quantity: 1,
            delivery_address: "12 MG Road".into(),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: Some("leave at the gate".into()),
        },
    )
    .await?
    .data
    .expect("open order");

    product_service::update_product(
        &state,
        &farmer,
        product.id,
        UpdateProductRequest {
            expiration_date: Some(Utc::now() - Duration::hours(1)),
            ..Default::default()
        },
    )
    .await?;

    let report = maintenance_service::cleanup_expired(state.db(), Utc::now()).await?;
    assert!(report.deleted_products >= 1);
    assert!(report.cancelled_orders >= 1);

    let after = order_service::get_order(&state, &consumer, open.id)
        .await?
        .data
        .expect("order survives cleanup");
    assert_eq!(after.status, OrderStatus::Cancelled);

    let history = order_service::get_order(&state, &consumer, order.id)
        .await?
        .data
        .expect("completed order survives cleanup");
    assert_eq!(history.status, OrderStatus::Completed);

    Ok(())
}

async fn register(state: &AppState, role: Role) -> anyhow::Result<Session> {
    let email = format!("{}-{}@example.com", role_name(role), Uuid::new_v4());
    let farmer = (role == Role::Farmer).then(|| FarmerSignup {
        business_name: "Flow Farm".into(),
        latitude: Some(12.9716),
        longitude: Some(77.5946),
        ..Default::default()
    });

    let registered = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.clone(),
            password: "password123".into(),
            role,
            full_name: Some("Flow Tester".into()),
            phone: None,
            farmer,
            delivery: None,
        },
    )
    .await?
    .data
    .expect("registered");

    let profile = profile_service::resolve_profile(state.db(), registered.user.id).await?;
    Ok(Session {
        user: AuthUser {
            user_id: registered.user.id,
            email,
        },
        profile,
    })
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Farmer => "farmer",
        Role::Delivery => "rider",
        Role::Consumer => "consumer",
    }
}
