//! Platform gateway: a typed client for the ChirpStack-compatible
//! device-management REST API.
//!
//! The [`PlatformGateway`] trait is the seam the provisioning workflows
//! depend on; [`PlatformClient`] is the reqwest-backed implementation.

pub mod client;
pub mod profile;
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;

use async_trait::async_trait;

pub use client::{PlatformClient, PlatformConfig, PlatformError};
pub use types::{DeviceActivation, DeviceInfo};

/// Remote operations the provisioning workflows mirror onto the platform.
///
/// Every call is a single attempt. Callers check [`is_enabled`] first.
///
/// [`is_enabled`]: PlatformGateway::is_enabled
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Integration flag set and a non-empty API token configured.
    fn is_enabled(&self) -> bool;

    /// Create a tenant and return its id.
    async fn create_tenant(&self, name: &str) -> Result<String, PlatformError>;

    /// Create an application under a tenant and return its id.
    async fn create_application(&self, tenant_id: &str, name: &str)
    -> Result<String, PlatformError>;

    /// Create the standard ABP device profile under a tenant and return its id.
    async fn create_device_profile(&self, tenant_id: &str) -> Result<String, PlatformError>;

    async fn create_device(&self, device: &DeviceInfo) -> Result<(), PlatformError>;

    async fn activate_device(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
    ) -> Result<(), PlatformError>;

    async fn delete_device(&self, dev_eui: &str) -> Result<(), PlatformError>;
}
