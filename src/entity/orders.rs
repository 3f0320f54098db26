use sea_orm::entity::prelude::*;

use crate::domain::lifecycle::{OrderStatus, PaymentMethod};

/// `product_id` is deliberately not a relation: the product row may be gone after expiry cleanup.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub farmer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub delivery_boy_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ConsumerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::farmers::Entity",
        from = "Column::FarmerId",
        to = "super::farmers::Column::Id"
    )]
    Farmers,
    #[sea_orm(
        belongs_to = "super::delivery_boys::Entity",
        from = "Column::DeliveryBoyId",
        to = "super::delivery_boys::Column::Id"
    )]
    DeliveryBoys,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::farmers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farmers.def()
    }
}

impl Related<super::delivery_boys::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryBoys.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
