use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CleanupReport {
    pub deleted_products: u64,
    pub cancelled_orders: u64,
}
