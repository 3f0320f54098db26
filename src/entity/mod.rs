pub mod delivery_boys;
pub mod farmers;
pub mod orders;
pub mod products;
pub mod users;

pub use delivery_boys::Entity as DeliveryBoys;
pub use farmers::Entity as Farmers;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
