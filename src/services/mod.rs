pub mod auth_service;
pub mod delivery_service;
pub mod farmer_service;
pub mod maintenance_service;
pub mod order_service;
pub mod product_service;
pub mod profile_service;
