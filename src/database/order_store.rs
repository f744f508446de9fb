use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;

use super::{MongoDB, ORDERS};
use crate::models::{Order, OrderStatus};
use crate::utils::AppError;

#[async_trait]
pub trait OrderLedger: Send + Sync {
    async fn create(&self, order: Order) -> Result<Order, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError>;
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Order>, AppError>;
    async fn find_all(&self) -> Result<Vec<Order>, AppError>;
    /// Returns `false` when no order has `id`.
    async fn update_status(
        &self,
        id: &str,
        status: &OrderStatus,
        delivered_at: i64,
    ) -> Result<bool, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

pub struct MongoOrderLedger {
    collection: Collection<Order>,
}

impl MongoOrderLedger {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection::<Order>(ORDERS),
        }
    }
}

#[async_trait]
impl OrderLedger for MongoOrderLedger {
    async fn create(&self, order: Order) -> Result<Order, AppError> {
        self.collection.insert_one(&order).await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Order>, AppError> {
        let cursor = self.collection.find(doc! { "user": owner_id }).await?;
        Ok(cursor.try_collect::<Vec<Order>>().await?)
    }

    async fn find_all(&self) -> Result<Vec<Order>, AppError> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect::<Vec<Order>>().await?)
    }

    async fn update_status(
        &self,
        id: &str,
        status: &OrderStatus,
        delivered_at: i64,
    ) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "orderStatus": status.as_str(),
                    "deliveredAt": delivered_at,
                }},
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
