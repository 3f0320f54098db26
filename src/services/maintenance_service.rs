use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    domain::lifecycle::OrderAction,
    dto::maintenance::CleanupReport,
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::bearer_token,
};

/// Checks the caller presents the configured cron secret as a bearer token.
pub fn authorize(headers: &HeaderMap, cron_secret: Option<&str>) -> AppResult<()> {
    let Some(secret) = cron_secret else {
        return Err(AppError::Unauthorized("Maintenance endpoint is disabled".into()));
    };
    let provided = bearer_token(headers)?;
    if !bool::from(secret.as_bytes().ct_eq(provided.as_bytes())) {
        return Err(AppError::Unauthorized("Invalid maintenance secret".into()));
    }
    Ok(())
}

/// Removes every product whose expiration date is at or before `now` and cancels the open
/// orders that referenced them. Both changes commit together or not at all.
pub async fn cleanup_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> AppResult<CleanupReport> {
    let txn = db.begin().await?;

    let expired: Vec<Uuid> = Products::find()
        .select_only()
        .column(ProductCol::Id)
        .filter(ProductCol::ExpirationDate.lte(now))
        .into_tuple()
        .all(&txn)
        .await?;

    if expired.is_empty() {
        txn.commit().await?;
        tracing::debug!("no expired products");
        return Ok(CleanupReport::default());
    }

    let expire = OrderAction::Expire;
    let cancelled = Orders::update_many()
        .set(OrderActive {
            status: Set(expire.target()),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .filter(OrderCol::ProductId.is_in(expired.iter().copied()))
        .filter(OrderCol::Status.is_in(expire.sources().iter().copied()))
        .exec(&txn)
        .await?;

    let deleted = Products::delete_many()
        .filter(ProductCol::Id.is_in(expired.iter().copied()))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let report = CleanupReport {
        deleted_products: deleted.rows_affected,
        cancelled_orders: cancelled.rows_affected,
    };
    tracing::info!(
        deleted_products = report.deleted_products,
        cancelled_orders = report.cancelled_orders,
        "expired products cleaned up"
    );
    Ok(report)
}
