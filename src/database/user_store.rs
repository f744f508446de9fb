use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use super::{MongoDB, USERS};
use crate::models::{ResetTokenUpdate, Secrets, User, UserUpdate};
use crate::utils::{is_duplicate_key, AppError};

/// Account records. Reads exclude the password hash and reset fields unless
/// [`Secrets::Include`] is passed.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fails with [`AppError::Conflict`] when the email is taken.
    async fn create(&self, user: User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str, secrets: Secrets) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str, secrets: Secrets) -> Result<Option<User>, AppError>;
    /// Only matches while `resetPasswordExpire` is after `now`.
    async fn find_by_reset_digest(&self, digest: &str, now: i64) -> Result<Option<User>, AppError>;
    async fn find_all(&self) -> Result<Vec<User>, AppError>;
    /// Returns the updated user without secrets, or `None` when no user has `id`.
    async fn update_fields(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

pub struct MongoUserDirectory {
    collection: Collection<User>,
}

impl MongoUserDirectory {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<User>(USERS),
        }
    }
}

/// An empty projection returns every field.
fn projection(secrets: Secrets) -> Document {
    match secrets {
        Secrets::Include => doc! {},
        Secrets::Exclude => doc! {
            "password": 0,
            "resetPasswordToken": 0,
            "resetPasswordExpire": 0,
        },
    }
}

fn update_document(update: UserUpdate) -> Result<Document, AppError> {
    let mut set = doc! {};
    let mut unset = doc! {};

    if let Some(name) = update.name {
        set.insert("name", name);
    }
    if let Some(email) = update.email {
        set.insert("email", email);
    }
    if let Some(role) = update.role {
        set.insert("role", mongodb::bson::to_bson(&role)?);
    }
    if let Some(avatar) = update.avatar {
        set.insert("avatar", mongodb::bson::to_bson(&avatar)?);
    }
    if let Some(hash) = update.password_hash {
        set.insert("password", hash);
    }
    match update.reset {
        Some(ResetTokenUpdate::Set { digest, expires_at }) => {
            set.insert("resetPasswordToken", digest);
            set.insert("resetPasswordExpire", expires_at);
        }
        Some(ResetTokenUpdate::Clear) => {
            unset.insert("resetPasswordToken", "");
            unset.insert("resetPasswordExpire", "");
        }
        None => {}
    }

    let mut document = doc! {};
    if !set.is_empty() {
        document.insert("$set", set);
    }
    if !unset.is_empty() {
        document.insert("$unset", unset);
    }
    Ok(document)
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn create(&self, user: User) -> Result<User, AppError> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str, secrets: Secrets) -> Result<Option<User>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id })
            .projection(projection(secrets))
            .await?)
    }

    async fn find_by_email(&self, email: &str, secrets: Secrets) -> Result<Option<User>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "email": email })
            .projection(projection(secrets))
            .await?)
    }

    async fn find_by_reset_digest(&self, digest: &str, now: i64) -> Result<Option<User>, AppError> {
        Ok(self
            .collection
            .find_one(doc! {
                "resetPasswordToken": digest,
                "resetPasswordExpire": { "$gt": now },
            })
            .projection(projection(Secrets::Exclude))
            .await?)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let cursor = self
            .collection
            .find(doc! {})
            .projection(projection(Secrets::Exclude))
            .await?;
        Ok(cursor.try_collect::<Vec<User>>().await?)
    }

    async fn update_fields(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError> {
        if update.is_empty() {
            return self.find_by_id(id, Secrets::Exclude).await;
        }

        let email = update.email.clone();
        let document = update_document(update)?;

        match self
            .collection
            .find_one_and_update(doc! { "_id": id }, document)
            .return_document(ReturnDocument::After)
            .projection(projection(Secrets::Exclude))
            .await
        {
            Ok(user) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(email.unwrap_or_default())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
