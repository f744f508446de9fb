use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Service API",
        version = "1.0.0",
        description = "Accounts, catalog and order lifecycle for the storefront.\n\n**Authentication:** the `token` cookie set by login/signup, or a JWT Bearer header.\n\n**Roles:** `/admin/*` routes require the `admin` role."
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::login,
        crate::api::auth::logout,
        crate::api::auth::forgot_password,
        crate::api::auth::reset_password,
        crate::api::auth::me,
        crate::api::auth::update_password,
        crate::api::auth::update_profile,

        // Products
        crate::api::products::get_products,
        crate::api::products::get_product,
        crate::api::products::create_product,
        crate::api::products::update_product,
        crate::api::products::delete_product,

        // Orders
        crate::api::orders::new_order,
        crate::api::orders::get_order,
        crate::api::orders::my_orders,
        crate::api::orders::all_orders,
        crate::api::orders::update_order,
        crate::api::orders::delete_order,

        // Admin users
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::account_service::SignupRequest,
            crate::services::account_service::LoginRequest,
            crate::services::account_service::ForgotPasswordRequest,
            crate::services::account_service::ResetPasswordRequest,
            crate::services::account_service::UpdatePasswordRequest,
            crate::services::account_service::UpdateProfileRequest,
            crate::services::account_service::AdminUpdateUserRequest,
            crate::services::account_service::AuthResponse,
            crate::models::UserProfile,
            crate::models::Role,
            crate::models::Avatar,
            crate::models::CreateProductRequest,
            crate::models::UpdateProductRequest,
            crate::models::NewOrderRequest,
            crate::models::OrderItem,
            crate::models::ShippingInfo,
            crate::models::PaymentInfo,
            crate::models::UpdateOrderStatusRequest,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login, password recovery and the caller's own profile."),
        (name = "Products", description = "Public catalog browsing with keyword, category, price and rating filters."),
        (name = "Orders", description = "Checkout and the caller's orders."),
        (name = "Admin", description = "User directory, catalog edits and order fulfilment. Admin role required."),
        (name = "Health", description = "Liveness and database connectivity."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by login or signup"))
                        .build(),
                ),
            );
        }
    }
}
