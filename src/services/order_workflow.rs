use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::database::{CatalogStore, OrderLedger, UserDirectory};
use crate::middleware::AuthUser;
use crate::models::{
    NewOrderRequest, Order, OrderOwner, OrderStatus, OwnerSummary, Secrets,
};
use crate::utils::{now_millis, AppError};

/// Order creation, reads, and the admin status transition with its stock side effect.
#[derive(Clone)]
pub struct OrderWorkflow {
    orders: Arc<dyn OrderLedger>,
    products: Arc<dyn CatalogStore>,
    users: Arc<dyn UserDirectory>,
}

impl OrderWorkflow {
    pub fn new(
        orders: Arc<dyn OrderLedger>,
        products: Arc<dyn CatalogStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self { orders, products, users }
    }

    /// Persists a checkout as-is. Stock is not checked or reserved here; it is
    /// only touched when the order is delivered.
    pub async fn create_order(&self, request: NewOrderRequest, owner_id: &str) -> Result<Order, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let now = now_millis();
        let order = Order {
            id: ObjectId::new().to_hex(),
            order_items: request.order_items,
            shipping_info: request.shipping_info,
            items_price: request.items_price,
            tax_price: request.tax_price,
            shipping_price: request.shipping_price,
            total_price: request.total_price,
            payment_info: request.payment_info,
            user: OrderOwner::Id(owner_id.to_string()),
            order_status: OrderStatus::Processing,
            paid_at: now,
            delivered_at: None,
            created_at: now,
        };

        let order = self.orders.create(order).await?;
        log::info!("🧾 Order {} created for user {} ({} items)", order.id, owner_id, order.order_items.len());
        Ok(order)
    }

    /// Single order with the owner's name and email. Customers may only read their own.
    pub async fn get_order(&self, order_id: &str, caller: &AuthUser) -> Result<Order, AppError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(AppError::order_not_found)?;

        if !caller.is_admin() && order.user.id() != caller.id {
            return Err(AppError::Forbidden(
                "You are not allowed to access this order".to_string(),
            ));
        }

        // A deleted owner leaves the bare id in place
        if let Some(owner) = self.users.find_by_id(order.user.id(), Secrets::Exclude).await? {
            order.user = OrderOwner::Populated(OwnerSummary {
                id: owner.id,
                name: owner.name,
                email: owner.email,
            });
        }

        Ok(order)
    }

    pub async fn list_orders_of(&self, owner_id: &str) -> Result<Vec<Order>, AppError> {
        self.orders.find_by_owner(owner_id).await
    }

    /// Every order plus the sum of their `totalPrice`.
    pub async fn list_all_orders_with_total(&self) -> Result<(Vec<Order>, f64), AppError> {
        let orders = self.orders.find_all().await?;
        let total_amount = orders.iter().map(|order| order.total_price).sum();
        Ok((orders, total_amount))
    }

    /// Moves an order to `new_status` and takes its items out of stock.
    ///
    /// `Delivered` orders are final. Items are decremented one at a time; the
    /// first failure is returned and earlier decrements stay applied.
    /// `deliveredAt` is stamped whatever the target status is.
    pub async fn advance_status(&self, order_id: &str, new_status: OrderStatus) -> Result<Order, AppError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(AppError::order_not_found)?;

        if order.order_status.is_delivered() {
            return Err(AppError::AlreadyDelivered);
        }

        for item in &order.order_items {
            if let Err(e) = self.products.decrement_stock(&item.product, item.quantity).await {
                log::error!(
                    "❌ Stock update failed for product {} on order {}: {}",
                    item.product, order_id, e
                );
                return Err(e);
            }
            log::debug!("📦 Product {} stock -{}", item.product, item.quantity);
        }

        let delivered_at = now_millis();
        if !self.orders.update_status(order_id, &new_status, delivered_at).await? {
            return Err(AppError::order_not_found());
        }

        log::info!("🚚 Order {}: {} -> {}", order_id, order.order_status, new_status);

        order.order_status = new_status;
        order.delivered_at = Some(delivered_at);
        Ok(order)
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), AppError> {
        if !self.orders.delete(order_id).await? {
            return Err(AppError::order_not_found());
        }
        log::info!("🗑️ Order {} deleted", order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{MemoryCatalogStore, MemoryOrderLedger, MemoryUserDirectory};
    use crate::models::{OrderItem, PaymentInfo, Product, Role, ShippingInfo, User};

    struct Fixture {
        workflow: OrderWorkflow,
        orders: Arc<MemoryOrderLedger>,
        products: Arc<MemoryCatalogStore>,
        users: Arc<MemoryUserDirectory>,
    }

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            price: 10.0,
            stock,
            ratings: 0.0,
            num_of_reviews: 0,
            category: "Electronics".to_string(),
            seller: String::new(),
            created_at: 0,
        }
    }

    fn fixture(products: Vec<Product>) -> Fixture {
        let orders = Arc::new(MemoryOrderLedger::default());
        let products = Arc::new(MemoryCatalogStore::with_products(products));
        let users = Arc::new(MemoryUserDirectory::default());
        Fixture {
            workflow: OrderWorkflow::new(orders.clone(), products.clone(), users.clone()),
            orders,
            products,
            users,
        }
    }

    fn checkout(items: &[(&str, u32)], total_price: f64) -> NewOrderRequest {
        NewOrderRequest {
            order_items: items
                .iter()
                .map(|(product, quantity)| OrderItem {
                    product: product.to_string(),
                    name: String::new(),
                    quantity: *quantity,
                    price: 10.0,
                    image: String::new(),
                })
                .collect(),
            shipping_info: ShippingInfo {
                address: "1 Main St".to_string(),
                city: "Lisbon".to_string(),
                phone_no: "123456789".to_string(),
                postal_code: "1000-001".to_string(),
                country: "Portugal".to_string(),
            },
            items_price: total_price,
            tax_price: 0.0,
            shipping_price: 0.0,
            total_price,
            payment_info: PaymentInfo { id: "pi_123".to_string(), status: "succeeded".to_string() },
        }
    }

    fn caller(id: &str, role: Role) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            name: "Caller".to_string(),
            email: "caller@example.com".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_order_stamps_paid_at_and_leaves_stock_alone() {
        let f = fixture(vec![product("p1", 10)]);
        let before = now_millis();

        let order = f.workflow.create_order(checkout(&[("p1", 3)], 30.0), "u1").await.unwrap();

        assert_eq!(order.order_status, OrderStatus::Processing);
        assert!(order.paid_at >= before);
        assert!(order.delivered_at.is_none());
        assert_eq!(order.user.id(), "u1");
        assert_eq!(f.products.stock_of("p1"), Some(10));
    }

    #[tokio::test]
    async fn test_create_order_rejects_zero_quantity() {
        let f = fixture(vec![product("p1", 10)]);
        let result = f.workflow.create_order(checkout(&[("p1", 0)], 0.0), "u1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(f.orders.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_decrements_stock() {
        let f = fixture(vec![product("p1", 10)]);
        let order = f.workflow.create_order(checkout(&[("p1", 3)], 30.0), "u1").await.unwrap();
        let before = now_millis();

        f.workflow.advance_status(&order.id, OrderStatus::Delivered).await.unwrap();

        let stored = f.orders.raw(&order.id).unwrap();
        assert_eq!(f.products.stock_of("p1"), Some(7));
        assert_eq!(stored.order_status, OrderStatus::Delivered);
        assert!(stored.delivered_at.unwrap() >= before);
    }

    #[tokio::test]
    async fn test_any_status_decrements_and_stamps_delivered_at() {
        let f = fixture(vec![product("p1", 10), product("p2", 4)]);
        let order = f
            .workflow
            .create_order(checkout(&[("p1", 2), ("p2", 4)], 60.0), "u1")
            .await
            .unwrap();

        f.workflow.advance_status(&order.id, OrderStatus::Shipped).await.unwrap();

        let stored = f.orders.raw(&order.id).unwrap();
        assert_eq!(stored.order_status, OrderStatus::Shipped);
        assert!(stored.delivered_at.is_some());
        assert_eq!(f.products.stock_of("p1"), Some(8));
        assert_eq!(f.products.stock_of("p2"), Some(0));
    }

    #[tokio::test]
    async fn test_non_terminal_status_can_be_advanced_again() {
        let f = fixture(vec![product("p1", 10)]);
        let order = f.workflow.create_order(checkout(&[("p1", 1)], 10.0), "u1").await.unwrap();

        f.workflow.advance_status(&order.id, OrderStatus::Shipped).await.unwrap();
        f.workflow.advance_status(&order.id, OrderStatus::Delivered).await.unwrap();

        // Each transition takes the items out of stock again
        assert_eq!(f.products.stock_of("p1"), Some(8));
    }

    #[tokio::test]
    async fn test_delivered_order_is_final() {
        let f = fixture(vec![product("p1", 10)]);
        let order = f.workflow.create_order(checkout(&[("p1", 3)], 30.0), "u1").await.unwrap();
        f.workflow.advance_status(&order.id, OrderStatus::Delivered).await.unwrap();
        let snapshot = f.orders.raw(&order.id).unwrap();

        let result = f.workflow.advance_status(&order.id, OrderStatus::from("Processing")).await;

        assert!(matches!(result, Err(AppError::AlreadyDelivered)));
        assert_eq!(f.orders.raw(&order.id).unwrap(), snapshot);
        assert_eq!(f.products.stock_of("p1"), Some(7));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let f = fixture(vec![]);
        let result = f.workflow.advance_status("64b7f0c2a1b2c3d4e5f60718", OrderStatus::Delivered).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_product_fails_fast_without_rollback() {
        let f = fixture(vec![product("p1", 10), product("p3", 10)]);
        let order = f
            .workflow
            .create_order(checkout(&[("p1", 2), ("gone", 1), ("p3", 5)], 80.0), "u1")
            .await
            .unwrap();

        let result = f.workflow.advance_status(&order.id, OrderStatus::Delivered).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(f.products.stock_of("p1"), Some(8));
        assert_eq!(f.products.stock_of("p3"), Some(10));
        let stored = f.orders.raw(&order.id).unwrap();
        assert_eq!(stored.order_status, OrderStatus::Processing);
        assert!(stored.delivered_at.is_none());
    }

    #[tokio::test]
    async fn test_stock_never_goes_negative() {
        let f = fixture(vec![product("p1", 2)]);
        let order = f.workflow.create_order(checkout(&[("p1", 3)], 30.0), "u1").await.unwrap();

        let result = f.workflow.advance_status(&order.id, OrderStatus::Delivered).await;

        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
        assert_eq!(f.products.stock_of("p1"), Some(2));
    }

    #[tokio::test]
    async fn test_total_amount() {
        let f = fixture(vec![product("p1", 10)]);

        let (orders, total) = f.workflow.list_all_orders_with_total().await.unwrap();
        assert!(orders.is_empty());
        assert_eq!(total, 0.0);

        f.workflow.create_order(checkout(&[("p1", 1)], 12.5), "u1").await.unwrap();
        f.workflow.create_order(checkout(&[("p1", 2)], 30.25), "u2").await.unwrap();

        let (orders, total) = f.workflow.list_all_orders_with_total().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!((total - 42.75).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_list_orders_of_owner() {
        let f = fixture(vec![product("p1", 10)]);
        f.workflow.create_order(checkout(&[("p1", 1)], 10.0), "u1").await.unwrap();
        f.workflow.create_order(checkout(&[("p1", 1)], 10.0), "u2").await.unwrap();

        let mine = f.workflow.list_orders_of("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user.id(), "u1");
    }

    #[tokio::test]
    async fn test_get_order_populates_owner_and_enforces_ownership() {
        let f = fixture(vec![product("p1", 10)]);
        f.users
            .create(User {
                id: "u1".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: Some("hash".to_string()),
                role: Role::Customer,
                avatar: None,
                reset_password_token: None,
                reset_password_expire: None,
                created_at: 0,
            })
            .await
            .unwrap();
        let order = f.workflow.create_order(checkout(&[("p1", 1)], 10.0), "u1").await.unwrap();

        let own = f.workflow.get_order(&order.id, &caller("u1", Role::Customer)).await.unwrap();
        match own.user {
            OrderOwner::Populated(owner) => {
                assert_eq!(owner.name, "Ana");
                assert_eq!(owner.email, "ana@example.com");
            }
            OrderOwner::Id(_) => panic!("owner should be populated"),
        }

        let stranger = f.workflow.get_order(&order.id, &caller("u2", Role::Customer)).await;
        assert!(matches!(stranger, Err(AppError::Forbidden(_))));

        assert!(f.workflow.get_order(&order.id, &caller("admin", Role::Admin)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_order() {
        let f = fixture(vec![product("p1", 10)]);
        let order = f.workflow.create_order(checkout(&[("p1", 1)], 10.0), "u1").await.unwrap();

        f.workflow.delete_order(&order.id).await.unwrap();

        assert!(f.orders.raw(&order.id).is_none());
        assert!(matches!(f.workflow.delete_order(&order.id).await, Err(AppError::NotFound(_))));
    }
}
