use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    geo::GeoCoordinate,
    lifecycle::{OrderState, OrderStatus, PaymentMethod},
    ranking::Located,
};
use crate::entity::{delivery_boys, farmers, orders, products, users};

/// Products expiring within this window are flagged `expires_soon`.
pub const EXPIRY_WARNING_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Delivery,
    Consumer,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            phone: model.phone,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Farmer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub verified: bool,
    pub rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
}

impl Located for Farmer {
    fn location(&self) -> Option<GeoCoordinate> {
        Some(GeoCoordinate {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

impl From<farmers::Model> for Farmer {
    fn from(model: farmers::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            business_name: model.business_name,
            description: model.description,
            phone: model.phone,
            address: model.address,
            city: model.city,
            state: model.state,
            latitude: model.latitude,
            longitude: model.longitude,
            verified: model.verified,
            rating: model.rating,
            total_reviews: model.total_reviews,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeliveryProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub vehicle_type: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<delivery_boys::Model> for DeliveryProfile {
    fn from(model: delivery_boys::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            phone: model.phone,
            vehicle_type: model.vehicle_type,
            is_available: model.is_available,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub quantity_available: i32,
    pub unit: String,
    pub expiration_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub is_expired: bool,
    pub expires_soon: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer: Option<Farmer>,
}

impl Product {
    /// Read model with expiry flags evaluated against `now`.
    pub fn from_entity(model: products::Model, farmer: Option<farmers::Model>, now: DateTime<Utc>) -> Self {
        let expiration_date = model.expiration_date.with_timezone(&Utc);
        let is_expired = now > expiration_date;
        Self {
            id: model.id,
            farmer_id: model.farmer_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            quantity_available: model.quantity_available,
            unit: model.unit,
            expiration_date,
            image_url: model.image_url,
            is_expired,
            expires_soon: !is_expired && expiration_date - now <= Duration::days(EXPIRY_WARNING_DAYS),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            farmer: farmer.map(Farmer::from),
        }
    }
}

impl Located for Product {
    fn location(&self) -> Option<GeoCoordinate> {
        self.farmer.as_ref().and_then(Located::location)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub farmer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub delivery_boy_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            consumer_id: model.consumer_id,
            farmer_id: model.farmer_id,
            product_id: model.product_id,
            quantity: model.quantity,
            total_price: model.total_price,
            status: model.status,
            delivery_address: model.delivery_address,
            payment_method: model.payment_method,
            notes: model.notes,
            delivery_boy_id: model.delivery_boy_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl orders::Model {
    pub fn lifecycle_state(&self) -> OrderState {
        OrderState {
            status: self.status,
            farmer_id: self.farmer_id,
            delivery_boy_id: self.delivery_boy_id,
        }
    }
}
