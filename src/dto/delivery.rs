use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Farmer, Order};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub phone: Option<String>,
    pub vehicle_type: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableOrder {
    pub order: Order,
    /// Farm the order is picked up from.
    pub pickup: Option<Farmer>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableOrderList {
    pub items: Vec<AvailableOrder>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryStats {
    pub completed: u64,
    pub pending: u64,
    #[schema(value_type = String)]
    pub earnings: Decimal,
}
