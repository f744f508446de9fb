pub mod auth;
pub mod error_translator;
pub mod security_headers;

pub use auth::{AuthMiddleware, AuthUser, TOKEN_COOKIE};
pub use error_translator::ErrorTranslator;
pub use security_headers::SecurityHeaders;
