use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{
    validate_email, validate_name, validate_password, ResetTokenUpdate, Role, Secrets, User,
    UserProfile, UserUpdate,
};
use crate::services::{CredentialService, AVATAR_FOLDER};
use crate::state::AppState;
use crate::utils::{now_millis, AppError};

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Data URI or URL; the default avatar is used when absent or empty.
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Replaces the current avatar when non-empty.
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// A logged-in user and the token to put in the `token` cookie.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

fn session(credentials: &CredentialService, user: User) -> Result<AuthResponse, AppError> {
    let token = credentials.issue_token(&user.id)?;
    Ok(AuthResponse {
        success: true,
        token,
        user: user.into(),
    })
}

fn user_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("User does not found with id: {}", id))
}

// User registration
pub async fn signup(state: &AppState, request: SignupRequest) -> Result<AuthResponse, AppError> {
    validate_name(&request.name).map_err(AppError::Validation)?;
    validate_email(&request.email).map_err(AppError::Validation)?;
    validate_password(&request.password).map_err(AppError::Validation)?;

    let source = request
        .avatar
        .as_deref()
        .filter(|avatar| !avatar.is_empty())
        .unwrap_or(&state.default_avatar_url);
    let avatar = state.images.upload(source, AVATAR_FOLDER).await?;

    let user = User {
        id: ObjectId::new().to_hex(),
        name: request.name,
        email: request.email,
        password: Some(state.credentials.hash_password(&request.password)?),
        role: Role::Customer,
        avatar: Some(avatar.clone()),
        reset_password_token: None,
        reset_password_expire: None,
        created_at: now_millis(),
    };

    let user = match state.users.create(user).await {
        Ok(user) => user,
        Err(e) => {
            // Release the orphaned upload; the create error is what the caller sees
            if let Err(cleanup) = state.images.destroy(&avatar.public_id).await {
                log::warn!("⚠️  Failed to release avatar {}: {}", avatar.public_id, cleanup);
            }
            return Err(e);
        }
    };

    log::info!("✅ User registered successfully: {}", user.email);
    session(&state.credentials, user)
}

// User login
pub async fn login(state: &AppState, request: LoginRequest) -> Result<AuthResponse, AppError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation("Please enter email & password".to_string()));
    }

    let invalid = || AppError::Unauthorized("Invalid Email or Password".to_string());

    let user = state
        .users
        .find_by_email(&request.email, Secrets::Include)
        .await?
        .ok_or_else(invalid)?;

    let stored = user.password.as_deref().ok_or_else(invalid)?;
    if !state.credentials.verify_password(&request.password, stored) {
        return Err(invalid());
    }

    session(&state.credentials, user)
}

/// Mails a reset link built on `reset_base_url` (`{scheme}://{host}`).
pub async fn forgot_password(
    state: &AppState,
    email: &str,
    reset_base_url: &str,
) -> Result<String, AppError> {
    let user = state
        .users
        .find_by_email(email, Secrets::Exclude)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found with this email".to_string()))?;

    let reset = state.credentials.generate_reset_token();
    state
        .users
        .update_fields(
            &user.id,
            UserUpdate {
                reset: Some(ResetTokenUpdate::Set {
                    digest: reset.digest,
                    expires_at: reset.expires_at,
                }),
                ..Default::default()
            },
        )
        .await?;

    let reset_url = format!("{}/password/reset/{}", reset_base_url, reset.raw);

    if let Err(e) = state
        .mailer
        .send_password_reset(&user.email, &user.name, &reset_url)
        .await
    {
        log::error!("❌ Password reset email to {} failed: {}", user.email, e);
        state
            .users
            .update_fields(
                &user.id,
                UserUpdate {
                    reset: Some(ResetTokenUpdate::Clear),
                    ..Default::default()
                },
            )
            .await?;
        return Err(e);
    }

    Ok(format!("Email sent to: {}", user.email))
}

pub async fn reset_password(
    state: &AppState,
    raw_token: &str,
    request: ResetPasswordRequest,
) -> Result<AuthResponse, AppError> {
    let digest = CredentialService::hash_reset_token(raw_token);

    let user = state
        .users
        .find_by_reset_digest(&digest, now_millis())
        .await?
        .ok_or_else(|| {
            AppError::Validation("Password reset token is invalid or has been expired".to_string())
        })?;

    if request.password != request.confirm_password {
        return Err(AppError::Validation("Password does not match".to_string()));
    }
    validate_password(&request.password).map_err(AppError::Validation)?;

    let user = state
        .users
        .update_fields(
            &user.id,
            UserUpdate {
                password_hash: Some(state.credentials.hash_password(&request.password)?),
                reset: Some(ResetTokenUpdate::Clear),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| user_not_found(&user.id))?;

    log::info!("🔑 Password reset for user {}", user.id);
    session(&state.credentials, user)
}

// Get current user
pub async fn profile(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state
        .users
        .find_by_id(user_id, Secrets::Exclude)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn update_password(
    state: &AppState,
    user_id: &str,
    request: UpdatePasswordRequest,
) -> Result<AuthResponse, AppError> {
    let user = state
        .users
        .find_by_id(user_id, Secrets::Include)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    let matched = user
        .password
        .as_deref()
        .is_some_and(|stored| state.credentials.verify_password(&request.old_password, stored));
    if !matched {
        return Err(AppError::Validation("Old password is incorrect".to_string()));
    }
    validate_password(&request.password).map_err(AppError::Validation)?;

    let user = state
        .users
        .update_fields(
            user_id,
            UserUpdate {
                password_hash: Some(state.credentials.hash_password(&request.password)?),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    session(&state.credentials, user)
}

pub async fn update_profile(
    state: &AppState,
    user_id: &str,
    request: UpdateProfileRequest,
) -> Result<User, AppError> {
    if let Some(name) = &request.name {
        validate_name(name).map_err(AppError::Validation)?;
    }
    if let Some(email) = &request.email {
        validate_email(email).map_err(AppError::Validation)?;
    }

    let mut update = UserUpdate {
        name: request.name,
        email: request.email,
        ..Default::default()
    };

    if let Some(source) = request.avatar.as_deref().filter(|avatar| !avatar.is_empty()) {
        let current = profile(state, user_id).await?;
        if let Some(old) = &current.avatar {
            state.images.destroy(&old.public_id).await?;
        }
        update.avatar = Some(state.images.upload(source, AVATAR_FOLDER).await?);
    }

    state
        .users
        .update_fields(user_id, update)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

// Admin Routes

pub async fn list_users(state: &AppState) -> Result<Vec<User>, AppError> {
    state.users.find_all().await
}

pub async fn get_user(state: &AppState, user_id: &str) -> Result<User, AppError> {
    profile(state, user_id).await
}

pub async fn update_user(
    state: &AppState,
    user_id: &str,
    request: AdminUpdateUserRequest,
) -> Result<User, AppError> {
    if let Some(name) = &request.name {
        validate_name(name).map_err(AppError::Validation)?;
    }
    if let Some(email) = &request.email {
        validate_email(email).map_err(AppError::Validation)?;
    }

    state
        .users
        .update_fields(
            user_id,
            UserUpdate {
                name: request.name,
                email: request.email,
                role: request.role,
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

/// Removes the avatar from the image host, then the account.
pub async fn delete_user(state: &AppState, user_id: &str) -> Result<(), AppError> {
    let user = profile(state, user_id).await?;

    if let Some(avatar) = &user.avatar {
        state.images.destroy(&avatar.public_id).await?;
    }

    if !state.users.delete(user_id).await? {
        return Err(user_not_found(user_id));
    }

    log::info!("🗑️ User {} deleted", user_id);
    Ok(())
}
