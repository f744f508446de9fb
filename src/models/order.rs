use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status as set by admins.
///
/// Any string is accepted; the three named states are the ones the storefront
/// uses, and only `Delivered` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Other(String),
}

impl OrderStatus {
    pub fn is_delivered(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Other(other) => other,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Processing" => OrderStatus::Processing,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id
    pub product: String,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    /// Unit price at checkout
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub phone_no: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaymentInfo {
    pub id: String,
    pub status: String,
}

/// Order owner: an id in storage, or the owner's public fields on single-order reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderOwner {
    Id(String),
    Populated(OwnerSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl OrderOwner {
    pub fn id(&self) -> &str {
        match self {
            OrderOwner::Id(id) => id,
            OrderOwner::Populated(owner) => &owner.id,
        }
    }
}

/// Order document (stored in MongoDB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_items: Vec<OrderItem>,
    pub shipping_info: ShippingInfo,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub payment_info: PaymentInfo,
    pub user: OrderOwner,
    #[serde(default)]
    pub order_status: OrderStatus,
    pub paid_at: i64,
    #[serde(default)]
    pub delivered_at: Option<i64>,
    pub created_at: i64,
}

/// Checkout payload for `POST /order/new`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub order_items: Vec<OrderItem>,
    pub shipping_info: ShippingInfo,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub payment_info: PaymentInfo,
}

impl NewOrderRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.order_items.is_empty() {
            return Err("Order must contain at least one item".to_string());
        }
        if let Some(item) = self.order_items.iter().find(|item| item.quantity == 0) {
            return Err(format!("Quantity for product {} must be at least 1", item.product));
        }
        if self.order_items.iter().any(|item| !valid_price(item.price)) {
            return Err("Item price must be a non-negative number".to_string());
        }
        let prices = [self.items_price, self.tax_price, self.shipping_price, self.total_price];
        if !prices.iter().copied().all(valid_price) {
            return Err("Order prices must be non-negative numbers".to_string());
        }
        Ok(())
    }
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

/// Admin status change for `PUT /admin/order/{id}`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}
