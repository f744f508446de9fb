use actix_web::{web, HttpResponse};

use crate::models::UserProfile;
use crate::services::account_service::{self, AdminUpdateUserRequest};
use crate::state::AppState;
use crate::utils::{parse_object_id, AppError};

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All users"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserProfile> = account_service::list_users(&state)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    log::info!("👥 GET /admin/users - {} users", users.len());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "users": users
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    let user = account_service::get_user(&state, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserProfile::from(user)
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User ObjectId")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    log::info!("✏️ PUT /admin/user/{}", id);

    let user = account_service::update_user(&state, &id, request.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": UserProfile::from(user)
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/user/{id}",
    tag = "Admin",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "User and avatar removed"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path)?;
    log::info!("🗑️ DELETE /admin/user/{}", id);

    account_service::delete_user(&state, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
