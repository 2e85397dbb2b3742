//! ChirpStack-compatible REST API client.
//!
//! Uses reqwest to create tenants, applications, device profiles and
//! devices, and to activate and delete devices.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::PlatformGateway;
use super::profile::DeviceProfile;
use super::types::{
    ActivateDeviceRequest, Application, CreateApplicationRequest, CreateDeviceProfileRequest,
    CreateDeviceRequest, CreateTenantRequest, DeviceActivation, DeviceInfo, IdResponse, Tenant,
};

/// Platform API client errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Platform API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected platform response ({status}): {body}")]
    Decode { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform integration is disabled")]
    Disabled,
}

/// Connection settings for the platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// API token; an empty token disables the integration.
    pub token: String,
    pub enabled: bool,
    /// Wall-clock bound applied to each request.
    pub timeout: Duration,
}

impl PlatformConfig {
    pub const fn is_enabled(&self) -> bool {
        self.enabled && !self.token.is_empty()
    }

    /// `{scheme}://{host}:{port}/api`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/api", self.scheme, self.host, self.port)
    }
}

/// Platform REST API client.
#[derive(Debug)]
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    enabled: bool,
}

impl PlatformClient {
    /// Create a client. A disabled configuration still yields a client whose
    /// calls all fail with [`PlatformError::Disabled`].
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        if config.host.is_empty() {
            return Err(PlatformError::Config("host is empty".into()));
        }

        let mut headers = HeaderMap::new();
        if !config.token.is_empty() {
            let token_val = HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| PlatformError::Config("Invalid token format".into()))?;
            headers.insert(AUTHORIZATION, token_val);
        }

        // reqwest is built with rustls-no-provider; Err means already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            enabled: config.is_enabled(),
        })
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    const fn ensure_enabled(&self) -> Result<(), PlatformError> {
        if self.enabled {
            Ok(())
        } else {
            Err(PlatformError::Disabled)
        }
    }

    /// Read the body and fail on any non-2xx status.
    async fn check_status(resp: reqwest::Response) -> Result<(u16, String), PlatformError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PlatformError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok((status.as_u16(), body))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, String), PlatformError> {
        self.ensure_enabled()?;
        let resp = self.http.post(self.api_url(path)).json(body).send().await?;
        let (status, body) = Self::check_status(resp).await?;
        debug!(path, status, "Platform request succeeded");
        Ok((status, body))
    }

    async fn post_for_id<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, PlatformError> {
        let (status, raw) = self.post(path, body).await?;
        let parsed: IdResponse = serde_json::from_str(&raw)
            .map_err(|_| PlatformError::Decode { status, body: raw })?;
        Ok(parsed.id)
    }
}

#[async_trait]
impl PlatformGateway for PlatformClient {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn create_tenant(&self, name: &str) -> Result<String, PlatformError> {
        let req = CreateTenantRequest {
            tenant: Tenant::named(name),
        };
        self.post_for_id("/tenants", &req).await
    }

    async fn create_application(
        &self,
        tenant_id: &str,
        name: &str,
    ) -> Result<String, PlatformError> {
        let req = CreateApplicationRequest {
            application: Application {
                tenant_id: tenant_id.to_string(),
                name: name.to_string(),
                description: format!("Application for {name}"),
                tags: BTreeMap::new(),
            },
        };
        self.post_for_id("/applications", &req).await
    }

    async fn create_device_profile(&self, tenant_id: &str) -> Result<String, PlatformError> {
        let req = CreateDeviceProfileRequest {
            device_profile: DeviceProfile::rak_abp(tenant_id),
        };
        self.post_for_id("/device-profiles", &req).await
    }

    async fn create_device(&self, device: &DeviceInfo) -> Result<(), PlatformError> {
        self.post("/devices", &CreateDeviceRequest { device }).await?;
        Ok(())
    }

    async fn activate_device(
        &self,
        dev_eui: &str,
        activation: &DeviceActivation,
    ) -> Result<(), PlatformError> {
        let req = ActivateDeviceRequest {
            device_activation: activation,
        };
        self.post(&format!("/devices/{dev_eui}/activate"), &req).await?;
        Ok(())
    }

    async fn delete_device(&self, dev_eui: &str) -> Result<(), PlatformError> {
        self.ensure_enabled()?;
        let resp = self
            .http
            .delete(self.api_url(&format!("/devices/{dev_eui}")))
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }
}
