use actix_web::{
    cookie::{time::Duration, Cookie},
    web, HttpRequest, HttpResponse,
};

use crate::middleware::{AuthUser, TOKEN_COOKIE};
use crate::models::UserProfile;
use crate::services::account_service::{
    self, AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    UpdatePasswordRequest, UpdateProfileRequest,
};
use crate::state::AppState;
use crate::utils::AppError;

fn token_cookie(token: &str, days: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .max_age(Duration::days(days))
        .finish()
}

/// Sets the token cookie and echoes the session in the body.
fn with_session(mut builder: actix_web::HttpResponseBuilder, state: &AppState, session: AuthResponse) -> HttpResponse {
    builder
        .cookie(token_cookie(&session.token, state.auth.cookie_expires_days))
        .json(session)
}

#[utoipa::path(
    post,
    path = "/api/v1/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered and logged in", body = AuthResponse),
        (status = 400, description = "Invalid fields or duplicate email")
    )
)]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /signup - email: {}", request.email);

    let session = account_service::signup(&state, request.into_inner()).await?;
    Ok(with_session(HttpResponse::Created(), &state, session))
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /login - email: {}", request.email);

    let email = request.email.clone();
    match account_service::login(&state, request.into_inner()).await {
        Ok(session) => {
            log::info!("✅ Login successful: {}", email);
            Ok(with_session(HttpResponse::Ok(), &state, session))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", email, e);
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/logout",
    tag = "Auth",
    responses((status = 200, description = "Token cookie cleared"))
)]
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").http_only(true).finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true,
        "message": "Logged out"
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/password/forgot",
    tag = "Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent"),
        (status = 404, description = "Unknown email"),
        (status = 500, description = "Email could not be sent")
    )
)]
pub async fn forgot_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📨 POST /password/forgot - email: {}", request.email);

    let base_url = {
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    };
    let message = account_service::forgot_password(&state, &request.email, &base_url).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": message
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/password/reset/{token}",
    tag = "Auth",
    params(("token" = String, Path, description = "Raw reset token from the email link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset and logged in", body = AuthResponse),
        (status = 400, description = "Token invalid or expired, or passwords differ")
    )
)]
pub async fn reset_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔑 PUT /password/reset");

    let session = account_service::reset_password(&state, &path, request.into_inner()).await?;
    Ok(with_session(HttpResponse::Ok(), &state, session))
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let user = account_service::profile(&state, &caller.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserProfile::from(user)
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/password/update",
    tag = "Auth",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password changed, new token issued", body = AuthResponse),
        (status = 400, description = "Old password is incorrect")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_password(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
    request: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔑 PUT /password/update - user: {}", caller.id);

    let session = account_service::update_password(&state, &caller.id, request.into_inner()).await?;
    Ok(with_session(HttpResponse::Ok(), &state, session))
}

#[utoipa::path(
    put,
    path = "/api/v1/me/update",
    tag = "Auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Invalid fields")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    state: web::Data<AppState>,
    caller: web::ReqData<AuthUser>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("✏️ PUT /me/update - user: {}", caller.id);

    let user = account_service::update_profile(&state, &caller.id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserProfile::from(user)
    })))
}
