mod auth;

pub use auth::{AuthManager, EXPIRY_MARGIN};
