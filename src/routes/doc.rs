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
        order::{
            CourierDetails, OrderLine, OrderStatus, PickupCourierDetails, PostDeliveryRequest,
            RequestStatus, ShippingAddress,
        },
        review::Review,
    },
    dto::{
        admin::{DashboardStats, DashboardTotals, LowStockProduct, SalesWindow},
        auth::{AuthResponse, ForgotPasswordResponse, ProfileResponse},
        banners::BannerResponse,
        categories::CategoryResponse,
        orders::{OrderList, OrderOwner, OrderResponse, OrderStats, PaidCounts, StatusCounts},
        products::{CategoryRef, ProductList, ProductResponse},
        users::{UserList, UserSummary},
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, banners, categories, health, orders, products, users},
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
        auth::profile,
        auth::forgot_password,
        auth::reset_password,
        auth::direct_reset_password,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::create_review,
        products::update_review,
        products::delete_review,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        banners::list_banners,
        banners::create_banner,
        banners::update_banner,
        banners::delete_banner,
        orders::create_order,
        orders::my_orders,
        orders::get_order,
        orders::list_orders,
        orders::order_stats,
        orders::update_status,
        orders::mark_paid,
        orders::request_return,
        orders::cancel_return,
        orders::request_replacement,
        orders::cancel_replacement,
        orders::update_return_status,
        orders::update_replacement_status,
        admin::dashboard_stats,
        admin::orders_csv,
        users::list_users,
        users::delete_user
    ),
    components(
        schemas(
            OrderStatus,
            RequestStatus,
            OrderLine,
            ShippingAddress,
            CourierDetails,
            PickupCourierDetails,
            PostDeliveryRequest,
            Review,
            AuthResponse,
            ProfileResponse,
            ForgotPasswordResponse,
            CategoryRef,
            ProductResponse,
            ProductList,
            CategoryResponse,
            BannerResponse,
            OrderOwner,
            OrderResponse,
            StatusCounts,
            OrderList,
            PaidCounts,
            OrderStats,
            DashboardTotals,
            SalesWindow,
            LowStockProduct,
            DashboardStats,
            UserSummary,
            UserList,
            health::HealthData,
            Meta,
            ApiResponse<ProductResponse>,
            ApiResponse<ProductList>,
            ApiResponse<OrderResponse>,
            ApiResponse<OrderList>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password reset"),
        (name = "Products", description = "Catalog and product reviews"),
        (name = "Categories", description = "Product categories"),
        (name = "Banners", description = "Storefront banners"),
        (name = "Orders", description = "Checkout and order lifecycle"),
        (name = "Admin", description = "Dashboard and reports"),
        (name = "Users", description = "User administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
