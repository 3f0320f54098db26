use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use farmbridge::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::auth::{DeliverySignup, FarmerSignup, RegisterRequest},
    entity::{
        farmers::{ActiveModel as FarmerActive, Entity as Farmers},
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    models::Role,
    services::{auth_service, profile_service},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(orm, config);

    let farmer_user = ensure_user(
        &state,
        "farmer@example.com",
        Role::Farmer,
        Some(FarmerSignup {
            business_name: "Green Valley Farm".into(),
            description: Some("Organic vegetables from the hills".into()),
            city: Some("Bangalore".into()),
            state: Some("Karnataka".into()),
            latitude: Some(12.9716),
            longitude: Some(77.5946),
            ..Default::default()
        }),
    )
    .await?;
    ensure_user(&state, "consumer@example.com", Role::Consumer, None).await?;
    ensure_user(&state, "rider@example.com", Role::Delivery, None).await?;

    let profile = profile_service::resolve_profile(state.db(), farmer_user).await?;
    let farmer_id = profile
        .profile_id()
        .ok_or_else(|| anyhow::anyhow!("farmer@example.com has no farmer profile"))?;

    // Demo farm shows up in the nearby listing only once verified.
    if let Some(farmer) = Farmers::find_by_id(farmer_id).one(state.db()).await? {
        let mut active: FarmerActive = farmer.into();
        active.verified = Set(true);
        active.rating = Set(4.6);
        active.update(state.db()).await?;
    }

    seed_products(&state, farmer_id).await?;

    println!("Seed completed. Farmer profile ID: {farmer_id}");
    Ok(())
}

async fn ensure_user(
    state: &AppState,
    email: &str,
    role: Role,
    farmer: Option<FarmerSignup>,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(state.db())
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let request = RegisterRequest {
        email: email.to_string(),
        password: "password123".into(),
        role,
        full_name: None,
        phone: None,
        farmer,
        delivery: (role == Role::Delivery).then(|| DeliverySignup {
            vehicle_type: Some("bike".into()),
        }),
    };
    let created = auth_service::register_user(state, request).await?;
    let user_id = created
        .data
        .map(|r| r.user.id)
        .ok_or_else(|| anyhow::anyhow!("registration returned no user"))?;

    println!("Ensured user {email} (role={role:?})");
    Ok(user_id)
}

async fn seed_products(state: &AppState, farmer_id: Uuid) -> anyhow::Result<()> {
    let existing = Products::find()
        .filter(ProductCol::FarmerId.eq(farmer_id))
        .count(state.db())
        .await?;
    if existing > 0 {
        println!("Products already seeded");
        return Ok(());
    }

    let now = Utc::now();
    let products = vec![
        ("Tomatoes", "Vine-ripened", Decimal::new(4000, 2), "vegetables", 120, "kg", 7),
        ("Spinach", "Fresh bunches", Decimal::new(2500, 2), "vegetables", 60, "bunch", 2),
        ("Alphonso Mangoes", "Sweet and ripe", Decimal::new(35000, 2), "fruits", 40, "dozen", 10),
        ("Buffalo Milk", "Morning collection", Decimal::new(6000, 2), "dairy", 30, "litre", 1),
    ];

    for (name, description, price, category, quantity, unit, days) in products {
        ProductActive {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(farmer_id),
            name: Set(name.into()),
            description: Set(description.into()),
            price: Set(price),
            category: Set(category.into()),
            quantity_available: Set(quantity),
            unit: Set(unit.into()),
            expiration_date: Set((now + Duration::days(days)).into()),
            image_url: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(state.db())
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
