use std::sync::Arc;

use crate::config::AuthConfig;
use crate::database::{CatalogStore, OrderLedger, UserDirectory};
use crate::services::{CredentialService, ImageHost, Mailer, OrderWorkflow};

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub products: Arc<dyn CatalogStore>,
    pub images: Arc<dyn ImageHost>,
    pub mailer: Arc<dyn Mailer>,
    pub credentials: CredentialService,
    pub workflow: OrderWorkflow,
    pub auth: AuthConfig,
    pub default_avatar_url: String,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        products: Arc<dyn CatalogStore>,
        orders: Arc<dyn OrderLedger>,
        images: Arc<dyn ImageHost>,
        mailer: Arc<dyn Mailer>,
        auth: AuthConfig,
        default_avatar_url: String,
    ) -> Self {
        let workflow = OrderWorkflow::new(orders, products.clone(), users.clone());
        Self {
            users,
            products,
            images,
            mailer,
            credentials: CredentialService::new(&auth),
            workflow,
            auth,
            default_avatar_url,
        }
    }
}
