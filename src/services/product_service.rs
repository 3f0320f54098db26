use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    domain::catalog::{self, CatalogQuery},
    domain::geo::GeoCoordinate,
    domain::lifecycle::{AMOUNT_SCALE, max_amount},
    dto::products::{CatalogItem, CatalogList, CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        farmers::Entity as Farmers,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::Session,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::CatalogParams,
    state::AppState,
};

/// Consumer catalog: every product with its farm, newest first, then filtered and ranked.
pub async fn list_catalog(state: &AppState, params: CatalogParams) -> AppResult<ApiResponse<CatalogList>> {
    let origin = GeoCoordinate::from_parts(params.lat, params.lng)?;
    let (page, limit, offset) = params.pagination().normalize();

    let now = Utc::now();
    let rows = Products::find()
        .find_also_related(Farmers)
        .order_by_desc(Column::CreatedAt)
        .all(state.db())
        .await?;
    let products = rows
        .into_iter()
        .map(|(product, farmer)| Product::from_entity(product, farmer, now))
        .collect();

    let query = CatalogQuery {
        text: params.q,
        category: params.category,
        origin,
    };
    let ranked = catalog::filter(products, &query, now);
    let total = ranked.len() as i64;

    let items = ranked
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(|r| CatalogItem {
            product: r.item,
            distance_km: r.distance_km,
        })
        .collect();

    Ok(ApiResponse::success(
        "Catalog",
        CatalogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let (product, farmer) = Products::find_by_id(id)
        .find_also_related(Farmers)
        .one(state.db())
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    Ok(ApiResponse::success(
        "Product",
        Product::from_entity(product, farmer, Utc::now()),
        None,
    ))
}

/// Products owned by the calling farmer, newest first, expired ones included.
pub async fn list_own_products(state: &AppState, session: &Session) -> AppResult<ApiResponse<ProductList>> {
    let farmer = session.farmer()?;
    let now = Utc::now();
    let items: Vec<Product> = Products::find()
        .filter(Column::FarmerId.eq(farmer.id))
        .order_by_desc(Column::CreatedAt)
        .all(state.db())
        .await?
        .into_iter()
        .map(|p| Product::from_entity(p, None, now))
        .collect();
    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    session: &Session,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let farmer = session.farmer()?;
    let name = required_text("name", payload.name)?;
    let category = required_text("category", payload.category)?;
    let unit = required_text("unit", payload.unit)?;
    validate_price(payload.price)?;
    validate_quantity(payload.quantity_available)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        farmer_id: Set(farmer.id),
        name: Set(name),
        description: Set(payload.description.unwrap_or_default()),
        price: Set(payload.price),
        category: Set(category),
        quantity_available: Set(payload.quantity_available),
        unit: Set(unit),
        expiration_date: Set(payload.expiration_date.into()),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(state.db()).await?;

    tracing::info!(product_id = %product.id, farmer_id = %farmer.id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        Product::from_entity(product, None, Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    session: &Session,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = find_owned(state, session, id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text("name", name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(required_text("category", category)?);
    }
    if let Some(quantity) = payload.quantity_available {
        validate_quantity(quantity)?;
        active.quantity_available = Set(quantity);
    }
    if let Some(unit) = payload.unit {
        active.unit = Set(required_text("unit", unit)?);
    }
    if let Some(expiration_date) = payload.expiration_date {
        active.expiration_date = Set(expiration_date.into());
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(state.db()).await?;

    tracing::info!(product_id = %product.id, "product updated");

    Ok(ApiResponse::success(
        "Updated",
        Product::from_entity(product, None, Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    session: &Session,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_owned(state, session, id).await?;
    let result = Products::delete_by_id(existing.id).exec(state.db()).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Loads a product that must belong to the calling farmer.
async fn find_owned(state: &AppState, session: &Session, id: Uuid) -> AppResult<ProductModel> {
    let farmer = session.farmer()?;
    let product = Products::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or(AppError::NotFound("Product"))?;
    if product.farmer_id != farmer.id {
        return Err(AppError::Forbidden);
    }
    Ok(product)
}

fn required_text(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation("price must be positive".into()));
    }
    if price.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::Validation(format!(
            "price cannot have more than {AMOUNT_SCALE} decimal places"
        )));
    }
    if price > max_amount() {
        return Err(AppError::Validation(format!("price cannot exceed {}", max_amount())));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::Validation("quantity_available cannot be negative".into()));
    }
    Ok(())
}
