use mongodb::{Client, Collection, Database};
use std::error::Error;

pub mod order_store;
pub mod product_store;
pub mod user_store;

#[cfg(test)]
pub mod memory;

pub use order_store::{MongoOrderLedger, OrderLedger};
pub use product_store::{CatalogStore, MongoCatalogStore};
pub use user_store::{MongoUserDirectory, UserDirectory};

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("storefront");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS);

        // Unique email backs the duplicate-email check on signup and profile updates
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(email_index).await?;
        log::info!("   ✅ Index created: users(email) unique");

        let reset_index = IndexModel::builder()
            .keys(doc! { "resetPasswordToken": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();

        match users.create_index(reset_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(resetPasswordToken)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let orders = self.collection::<mongodb::bson::Document>(ORDERS);
        let orders_user_index = IndexModel::builder().keys(doc! { "user": 1 }).build();

        match orders.create_index(orders_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: orders(user)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let products = self.collection::<mongodb::bson::Document>(PRODUCTS);
        let category_index = IndexModel::builder().keys(doc! { "category": 1 }).build();

        match products.create_index(category_index).await {
            Ok(_) => log::info!("   ✅ Index created: products(category)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> Result<bool, mongodb::error::Error> {
        self.db.list_collection_names().await?;
        Ok(true)
    }
}
