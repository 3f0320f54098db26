use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Farmer;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFarmerRequest {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyFarmer {
    #[serde(flatten)]
    pub farmer: Farmer,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyFarmerList {
    pub items: Vec<NearbyFarmer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FarmerDashboard {
    pub total_products: u64,
    pub active_orders: u64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}
