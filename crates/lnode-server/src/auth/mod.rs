//! Authentication for the Lnode API.
//!
//! Provides JWT token management, password hashing, and the bearer-token
//! middleware that guards every route except register, login and health.

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtManager;
pub use middleware::require_auth;
