use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Reference to an image stored on the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub public_id: String,
    pub url: String,
}

/// User document (stored in MongoDB)
///
/// `password` and the reset fields are only populated when the store was asked
/// for secrets; they are skipped when absent so partial reads never serialize
/// placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_expire: Option<i64>,
    pub created_at: i64,
}

/// Whether a directory read includes the password hash and reset fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secrets {
    Exclude,
    Include,
}

pub enum ResetTokenUpdate {
    Set { digest: String, expires_at: i64 },
    Clear,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub avatar: Option<Avatar>,
    pub password_hash: Option<String>,
    pub reset: Option<ResetTokenUpdate>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.avatar.is_none()
            && self.password_hash.is_none()
            && self.reset.is_none()
    }
}

/// What the API returns for a user. Never carries credentials.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: Option<Avatar>,
    pub created_at: i64,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

pub const NAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 6;

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Please enter your name".to_string());
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(format!("Your name cannot exceed {} characters", NAME_MAX_LEN));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err("Please enter valid email address".to_string())
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Your password must be longer than {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    Ok(())
}
