//! In-memory stores with the same semantics as the MongoDB ones, for tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{CatalogStore, OrderLedger, UserDirectory};
use crate::models::{
    Order, OrderStatus, Product, ProductPage, ProductQuery, ResetTokenUpdate, Secrets, User,
    UserUpdate, RESULTS_PER_PAGE,
};
use crate::utils::AppError;

fn strip(mut user: User, secrets: Secrets) -> User {
    if secrets == Secrets::Exclude {
        user.password = None;
        user.reset_password_token = None;
        user.reset_password_expire = None;
    }
    user
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<Vec<User>>,
}

impl MemoryUserDirectory {
    /// Raw record including secrets, bypassing the projection rules.
    pub fn raw(&self, id: &str) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(user.email));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str, secrets: Secrets) -> Result<Option<User>, AppError> {
        Ok(self.raw(id).map(|u| strip(u, secrets)))
    }

    async fn find_by_email(&self, email: &str, secrets: Secrets) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned().map(|u| strip(u, secrets)))
    }

    async fn find_by_reset_digest(&self, digest: &str, now: i64) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| {
                u.reset_password_token.as_deref() == Some(digest)
                    && u.reset_password_expire.is_some_and(|expire| expire > now)
            })
            .cloned()
            .map(|u| strip(u, Secrets::Exclude)))
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().cloned().map(|u| strip(u, Secrets::Exclude)).collect())
    }

    async fn update_fields(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &update.email {
            if users.iter().any(|u| &u.email == email && u.id != id) {
                return Err(AppError::Conflict(email.clone()));
            }
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(hash) = update.password_hash {
            user.password = Some(hash);
        }
        match update.reset {
            Some(ResetTokenUpdate::Set { digest, expires_at }) => {
                user.reset_password_token = Some(digest);
                user.reset_password_expire = Some(expires_at);
            }
            Some(ResetTokenUpdate::Clear) => {
                user.reset_password_token = None;
                user.reset_password_expire = None;
            }
            None => {}
        }
        Ok(Some(strip(user.clone(), Secrets::Exclude)))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryCatalogStore {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: Mutex::new(products) }
    }

    pub fn stock_of(&self, id: &str) -> Option<i64> {
        self.products.lock().unwrap().iter().find(|p| p.id == id).map(|p| p.stock)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError> {
        Ok(self.products.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find(&self, query: &ProductQuery) -> Result<ProductPage, AppError> {
        let products = self.products.lock().unwrap();
        let mut filtered: Vec<Product> = products.iter().filter(|p| query.matches(p)).cloned().collect();
        filtered.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ProductPage {
            products_count: products.len() as u64,
            filtered_products_count: filtered.len() as u64,
            products: filtered
                .into_iter()
                .skip(query.skip() as usize)
                .take(RESULTS_PER_PAGE as usize)
                .collect(),
            res_per_page: RESULTS_PER_PAGE,
        })
    }

    async fn decrement_stock(&self, id: &str, quantity: u32) -> Result<(), AppError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(AppError::product_not_found)?;
        if product.stock < i64::from(quantity) {
            return Err(AppError::InsufficientStock(id.to_string()));
        }
        product.stock -= i64::from(quantity);
        Ok(())
    }

    async fn create(&self, product: Product) -> Result<Product, AppError> {
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn save(&self, product: &Product) -> Result<bool, AppError> {
        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryOrderLedger {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderLedger {
    pub fn raw(&self, id: &str) -> Option<Order> {
        self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned()
    }
}

#[async_trait]
impl OrderLedger for MemoryOrderLedger {
    async fn create(&self, order: Order) -> Result<Order, AppError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.raw(id))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Order>, AppError> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().filter(|o| o.user.id() == owner_id).cloned().collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn update_status(
        &self,
        id: &str,
        status: &OrderStatus,
        delivered_at: i64,
    ) -> Result<bool, AppError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.order_status = status.clone();
                order.delivered_at = Some(delivered_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        Ok(orders.len() < before)
    }
}
