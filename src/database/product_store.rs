use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;

use super::{MongoDB, PRODUCTS};
use crate::models::{Product, ProductPage, ProductQuery, RESULTS_PER_PAGE};
use crate::utils::AppError;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError>;
    async fn find(&self, query: &ProductQuery) -> Result<ProductPage, AppError>;
    /// System-driven stock adjustment; skips [`Product::validate`].
    ///
    /// Fails with `NotFound` for an unknown product and `InsufficientStock`
    /// when the decrement would leave stock below zero.
    async fn decrement_stock(&self, id: &str, quantity: u32) -> Result<(), AppError>;
    async fn create(&self, product: Product) -> Result<Product, AppError>;
    /// Replaces an already validated product document.
    async fn save(&self, product: &Product) -> Result<bool, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

pub struct MongoCatalogStore {
    collection: Collection<Product>,
}

impl MongoCatalogStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<Product>(PRODUCTS),
        }
    }
}

#[async_trait]
impl CatalogStore for MongoCatalogStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find(&self, query: &ProductQuery) -> Result<ProductPage, AppError> {
        let filter = query.to_filter();

        let products_count = self.collection.count_documents(doc! {}).await?;
        let filtered_products_count = self.collection.count_documents(filter.clone()).await?;

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(query.skip())
            .limit(RESULTS_PER_PAGE as i64)
            .await?;
        let products = cursor.try_collect::<Vec<Product>>().await?;

        Ok(ProductPage {
            products,
            products_count,
            filtered_products_count,
            res_per_page: RESULTS_PER_PAGE,
        })
    }

    async fn decrement_stock(&self, id: &str, quantity: u32) -> Result<(), AppError> {
        let quantity = i64::from(quantity);

        // Guarded $inc: the stock check and the write happen in one operation
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "stock": { "$gte": quantity } },
                doc! { "$inc": { "stock": -quantity } },
            )
            .await?;

        if result.matched_count > 0 {
            return Ok(());
        }

        match self.find_by_id(id).await? {
            Some(_) => Err(AppError::InsufficientStock(id.to_string())),
            None => Err(AppError::product_not_found()),
        }
    }

    async fn create(&self, product: Product) -> Result<Product, AppError> {
        self.collection.insert_one(&product).await?;
        Ok(product)
    }

    async fn save(&self, product: &Product) -> Result<bool, AppError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": &product.id }, product)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
