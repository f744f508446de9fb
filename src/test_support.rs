//! Fakes and an in-memory `AppState` for service and route tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::AuthConfig;
use crate::database::memory::{MemoryCatalogStore, MemoryOrderLedger, MemoryUserDirectory};
use crate::database::UserDirectory;
use crate::models::{Avatar, Role, User};
use crate::services::{ImageHost, Mailer};
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Default)]
pub struct FakeImageHost {
    uploads: Mutex<Vec<String>>,
    live: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeImageHost {
    /// Sources passed to `upload`, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Public ids uploaded and not yet destroyed.
    pub fn live(&self) -> Vec<String> {
        self.live.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, source: &str, folder: &str) -> Result<Avatar, AppError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("{}/img{}", folder, n);
        self.uploads.lock().unwrap().push(source.to_string());
        self.live.lock().unwrap().push(public_id.clone());
        Ok(Avatar {
            url: format!("https://img.test/{}", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        self.live.lock().unwrap().retain(|id| id != public_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl FakeMailer {
    /// `(to_email, reset_url)` pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_password_reset(&self, to_email: &str, _to_name: &str, reset_url: &str) -> Result<(), AppError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(AppError::Upstream("Email could not be sent".to_string()));
        }
        self.sent.lock().unwrap().push((to_email.to_string(), reset_url.to_string()));
        Ok(())
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub users: Arc<MemoryUserDirectory>,
    pub products: Arc<MemoryCatalogStore>,
    pub orders: Arc<MemoryOrderLedger>,
    pub images: Arc<FakeImageHost>,
    pub mailer: Arc<FakeMailer>,
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        jwt_expires_days: 7,
        cookie_expires_days: 7,
        bcrypt_cost: 4,
        reset_token_ttl_minutes: 30,
    }
}

pub fn test_state() -> TestHarness {
    let users = Arc::new(MemoryUserDirectory::default());
    let products = Arc::new(MemoryCatalogStore::default());
    let orders = Arc::new(MemoryOrderLedger::default());
    let images = Arc::new(FakeImageHost::default());
    let mailer = Arc::new(FakeMailer::default());

    let state = AppState::new(
        users.clone(),
        products.clone(),
        orders.clone(),
        images.clone(),
        mailer.clone(),
        test_auth_config(),
        "https://img.test/default-avatar.png".to_string(),
    );

    TestHarness { state, users, products, orders, images, mailer }
}

impl TestHarness {
    /// Inserts a user with password `secret123` and returns it with a valid token.
    pub async fn seed_user(&self, email: &str, role: Role) -> (User, String) {
        let user = User {
            id: ObjectId::new().to_hex(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password: Some(self.state.credentials.hash_password("secret123").unwrap()),
            role,
            avatar: None,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: 0,
        };
        let user = self.users.create(user).await.unwrap();
        let token = self.state.credentials.issue_token(&user.id).unwrap();
        (user, token)
    }
}
