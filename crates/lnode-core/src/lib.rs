//! `Lnode` Core Library
//!
//! Shared functionality for `Lnode` components:
//! - `SQLite` pool helpers and the shared `DatabaseError`
//! - Pagination arithmetic for list endpoints
//! - Input validation for emails and hex-encoded device credentials
//! - Common error types

pub mod db;
pub mod error;
pub mod pagination;
pub mod validate;

pub use error::{Error, Result};
pub use pagination::{PageMeta, PageRequest};
