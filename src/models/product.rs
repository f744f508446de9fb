use serde::{Deserialize, Serialize};

/// Categories the storefront browses by.
pub const CATEGORIES: [&str; 12] = [
    "Electronics",
    "Cameras",
    "Laptops",
    "Accessories",
    "Headphones",
    "Food",
    "Books",
    "Clothes/Shoes",
    "Beauty/Health",
    "Sports",
    "Outdoor",
    "Home",
];

pub const RESULTS_PER_PAGE: u64 = 8;

/// Catalog product (stored in MongoDB)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Units on hand; decremented when an order is delivered.
    pub stock: i64,
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub num_of_reviews: u32,
    pub category: String,
    #[serde(default)]
    pub seller: String,
    pub created_at: i64,
}

impl Product {
    /// Admin-facing validation. Stock decrements from the order workflow skip it.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Please enter product name".to_string());
        }
        if self.name.chars().count() > 100 {
            return Err("Product name cannot exceed 100 characters".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Please enter a valid product price".to_string());
        }
        if self.stock < 0 {
            return Err("Product stock cannot be negative".to_string());
        }
        if !(0.0..=5.0).contains(&self.ratings) {
            return Err("Product ratings must be between 0 and 5".to_string());
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err("Please select correct category for product".to_string());
        }
        Ok(())
    }
}

/// Admin payload for `POST /admin/product/new`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub seller: String,
}

/// Partial admin edit for `PUT /admin/product/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
}

impl UpdateProductRequest {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(seller) = &self.seller {
            product.seller = seller.clone();
        }
    }
}

/// Catalog filters, as sent by the storefront's category page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "price[gte]")]
    pub price_gte: Option<f64>,
    #[serde(rename = "price[lte]")]
    pub price_lte: Option<f64>,
    #[serde(rename = "ratings[gte]")]
    pub ratings_gte: Option<f64>,
    pub page: Option<u64>,
}

impl ProductQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Saturates for absurd page numbers and stays within MongoDB's signed skip range.
    pub fn skip(&self) -> u64 {
        (self.page() - 1)
            .saturating_mul(RESULTS_PER_PAGE)
            .min(i64::MAX as u64)
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// MongoDB filter equivalent of [`ProductQuery::matches`].
    pub fn to_filter(&self) -> mongodb::bson::Document {
        use mongodb::bson::doc;

        let mut filter = doc! {};
        if let Some(keyword) = self.keyword() {
            // Literal substring match, same as `matches`
            filter.insert("name", doc! { "$regex": regex::escape(keyword), "$options": "i" });
        }
        if let Some(category) = self.category() {
            filter.insert("category", category);
        }
        let mut price = doc! {};
        if let Some(gte) = self.price_gte {
            price.insert("$gte", gte);
        }
        if let Some(lte) = self.price_lte {
            price.insert("$lte", lte);
        }
        if !price.is_empty() {
            filter.insert("price", price);
        }
        if let Some(ratings) = self.ratings_gte {
            filter.insert("ratings", doc! { "$gte": ratings });
        }
        filter
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(keyword) = self.keyword() {
            if !product.name.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category() {
            if product.category != category {
                return false;
            }
        }
        if self.price_gte.is_some_and(|gte| product.price < gte) {
            return false;
        }
        if self.price_lte.is_some_and(|lte| product.price > lte) {
            return false;
        }
        if self.ratings_gte.is_some_and(|gte| product.ratings < gte) {
            return false;
        }
        true
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub products_count: u64,
    pub filtered_products_count: u64,
    pub res_per_page: u64,
}
