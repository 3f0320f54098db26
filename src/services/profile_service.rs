use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        delivery_boys::{self, Column as DeliveryCol, Entity as DeliveryBoys},
        farmers::{self, Column as FarmerCol, Entity as Farmers},
    },
    error::AppResult,
    models::Role,
};

/// The role-specific record found for a user, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Farmer(farmers::Model),
    Delivery(delivery_boys::Model),
    /// No profile row: the default role.
    Consumer,
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Farmer(_) => Role::Farmer,
            Profile::Delivery(_) => Role::Delivery,
            Profile::Consumer => Role::Consumer,
        }
    }

    pub fn profile_id(&self) -> Option<Uuid> {
        match self {
            Profile::Farmer(farmer) => Some(farmer.id),
            Profile::Delivery(rider) => Some(rider.id),
            Profile::Consumer => None,
        }
    }
}

/// Works out which role `user_id` plays by probing the profile tables.
///
/// Farmer is checked before delivery, so a user holding both rows is a farmer. Only when
/// neither row exists is the user a consumer.
pub async fn resolve_profile<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Profile> {
    if let Some(farmer) = Farmers::find()
        .filter(FarmerCol::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(Profile::Farmer(farmer));
    }

    if let Some(rider) = DeliveryBoys::find()
        .filter(DeliveryCol::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(Profile::Delivery(rider));
    }

    Ok(Profile::Consumer)
}

pub async fn resolve_role<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Role> {
    Ok(resolve_profile(db, user_id).await?.role())
}
