//! `Lnode` provisioning server library.
//!
//! Accounts, a device catalog, a credential allow-list and a device
//! registry behind a JSON HTTP API. New accounts and devices are mirrored
//! onto a LoRaWAN network server as a best-effort step.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod platform;
pub mod provisioning;
pub mod storage;
