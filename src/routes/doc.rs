use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        geo::GeoCoordinate,
        lifecycle::{OrderStatus, PaymentMethod},
    },
    dto::{
        auth::{DeliverySignup, FarmerSignup, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, SessionView},
        delivery::{AvailableOrder, AvailableOrderList, DeliveryStats, UpdateDeliveryRequest},
        farmers::{FarmerDashboard, NearbyFarmer, NearbyFarmerList, UpdateFarmerRequest},
        maintenance::CleanupReport,
        orders::{CreateOrderRequest, OrderList},
        products::{CatalogItem, CatalogList, CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{DeliveryProfile, Farmer, Order, Product, Role, User},
    response::{ApiResponse, Meta},
    routes::{auth, delivery, farmers, health, maintenance, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::session,
        auth::logout,
        products::catalog,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::confirm_order,
        orders::complete_order,
        orders::cancel_order,
        orders::accept_order,
        farmers::nearby,
        farmers::get_me,
        farmers::update_me,
        farmers::dashboard,
        delivery::get_me,
        delivery::update_me,
        delivery::available_orders,
        delivery::stats,
        maintenance::cleanup_expired
    ),
    components(
        schemas(
            User,
            Role,
            Farmer,
            DeliveryProfile,
            Product,
            Order,
            OrderStatus,
            PaymentMethod,
            GeoCoordinate,
            RegisterRequest,
            RegisterResponse,
            FarmerSignup,
            DeliverySignup,
            LoginRequest,
            LoginResponse,
            SessionView,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CatalogItem,
            CatalogList,
            CreateOrderRequest,
            OrderList,
            UpdateFarmerRequest,
            NearbyFarmer,
            NearbyFarmerList,
            FarmerDashboard,
            UpdateDeliveryRequest,
            AvailableOrder,
            AvailableOrderList,
            DeliveryStats,
            CleanupReport,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<CatalogList>,
            ApiResponse<CleanupReport>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign up, sign in and session endpoints"),
        (name = "Catalog", description = "Consumer product search"),
        (name = "Products", description = "Farmer product management"),
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Farmers", description = "Farmer profiles, discovery and dashboard"),
        (name = "Delivery", description = "Delivery rider profile, board and stats"),
        (name = "Maintenance", description = "Scheduled expiry cleanup"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
