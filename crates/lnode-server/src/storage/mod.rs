//! SQLite storage for the Lnode server.
//!
//! Provides persistence for users, the device catalog, the credential
//! allow-list, and per-user device records.

mod db;
mod models;
mod queries_catalog;
mod queries_devices;
mod queries_users;


pub use db::Database;
pub use lnode_core::db::DatabaseError;
pub use models::*;
pub use queries_devices::NewDevice;
