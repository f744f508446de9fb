pub mod account_service;
pub mod catalog_service;
pub mod credential_service;
pub mod image_host;
pub mod mailer;
pub mod order_workflow;

pub use credential_service::*;
pub use image_host::*;
pub use mailer::*;
pub use order_workflow::*;
