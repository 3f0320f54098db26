pub mod auth;
pub mod delivery;
pub mod farmers;
pub mod maintenance;
pub mod orders;
pub mod products;
