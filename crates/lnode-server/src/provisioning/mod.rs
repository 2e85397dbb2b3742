//! Provisioning workflows: registration, login, device creation and
//! deletion.
//!
//! Local state is the source of truth. Each workflow commits its local
//! writes first, then mirrors them onto the platform as a best-effort step
//! whose failure is logged and recorded, never propagated.

mod mirror;


use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use lnode_core::validate;

use crate::auth::{JwtManager, password};
use crate::error::{AppError, AppResult};
use crate::platform::{DeviceActivation, DeviceInfo, PlatformGateway};
use crate::storage::{AllowedDevice, Database, Device, NewDevice, PlatformIdentity, User};

pub use mirror::MirrorOutcome;

/// Application created under every new tenant.
pub const APPLICATION_NAME: &str = "Lnode";

/// Result of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub token: String,
    pub user: User,
    pub platform: MirrorOutcome<PlatformIdentity>,
}

/// Fields a caller supplies to claim a device.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDevice {
    pub name: String,
    pub version_id: String,
    pub dev_eui: String,
    pub description: Option<String>,
}

/// Runs the multi-step workflows against the store and the platform.
pub struct Provisioner {
    db: Database,
    jwt: Arc<JwtManager>,
    platform: Arc<dyn PlatformGateway>,
}

impl Provisioner {
    pub fn new(db: Database, jwt: Arc<JwtManager>, platform: Arc<dyn PlatformGateway>) -> Self {
        Self { db, jwt, platform }
    }

    /// Create an account, issue a token, then mirror a tenant hierarchy.
    #[instrument(skip(self, email, password, full_name), fields(workflow = "Register"))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AppResult<Registration> {
        let email = validate::normalize_email(email);
        validate::email(&email)?;
        validate::password(password)?;
        validate::required("full_name", full_name)?;
        let full_name = full_name.trim();

        if self.db.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "user with email {email} already exists"
            )));
        }

        let hash = password::hash_password(password).map_err(AppError::internal)?;
        let user_id = uuid::Uuid::new_v4().to_string();
        let user = self
            .db
            .create_user(&user_id, &email, &hash, full_name)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict(format!("user with email {email} already exists"))
                }
                other => other,
            })?;

        let token = self
            .jwt
            .issue_token(&user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {e}")))?;

        info!(user_id = %user.id, "User registered");

        let platform = self.mirror_tenant(&user).await;
        let user = if platform.is_success() {
            self.db.get_user(&user.id).await?
        } else {
            user
        };

        Ok(Registration {
            token,
            user,
            platform,
        })
    }

    /// Check credentials and issue a token.
    #[instrument(skip(self, email, password), fields(workflow = "Login"))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let email = validate::normalize_email(email);
        let invalid = || AppError::Unauthorized("invalid email or password".into());

        let Some(user) = self.db.find_user_by_email(&email).await? else {
            return Err(invalid());
        };

        let valid = password::verify_password(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {e}")))?;
        if !valid {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }

        let token = self
            .jwt
            .issue_token(&user.id, &user.email)
            .map_err(|e| AppError::Internal(format!("Token creation failed: {e}")))?;

        info!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    /// Claim an allow-listed device for a user and mirror it onto the
    /// user's platform application.
    #[instrument(skip(self, req), fields(workflow = "CreateDevice"))]
    pub async fn create_device(&self, user_id: &str, req: &CreateDevice) -> AppResult<Device> {
        validate::required("name", &req.name)?;
        let dev_eui = req.dev_eui.trim().to_uppercase();
        validate::dev_eui(&dev_eui)?;
        if uuid::Uuid::parse_str(&req.version_id).is_err() {
            return Err(AppError::validation("version_id must be a UUID"));
        }

        let user = self.db.get_user(user_id).await?;
        if user.platform_target().is_none() {
            return Err(AppError::FailedPrecondition(
                "device cannot be created without platform identity".into(),
            ));
        }

        let allowed = match self.db.get_allowed_device(&dev_eui).await {
            Ok(allowed) => allowed,
            Err(e) if e.is_not_found() => {
                return Err(AppError::NotFound(format!(
                    "device {dev_eui} is not in allow-list"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        self.db.get_device_version(&req.version_id).await?;

        let claimed = self.db.count_devices_with_dev_eui(&dev_eui).await?;
        if claimed > 0 {
            warn!(dev_eui = %dev_eui, claimed, "DevEUI already backs another device");
        }

        let device_id = uuid::Uuid::new_v4().to_string();
        let device = self
            .db
            .create_device(&NewDevice {
                id: &device_id,
                user_id: &user.id,
                version_id: &req.version_id,
                name: req.name.trim(),
                dev_eui: &dev_eui,
                description: req.description.as_deref(),
            })
            .await?;

        info!(device_id = %device.id, dev_eui = %dev_eui, "Device created");

        if self.mirror_device(&device, &user, &allowed).await.is_success() {
            return Ok(self.db.get_device(&device.id).await?);
        }
        Ok(device)
    }

    /// Remove a device remotely (best effort) and then locally.
    #[instrument(skip(self), fields(workflow = "DeleteDevice"))]
    pub async fn delete_device(&self, id: &str) -> AppResult<()> {
        let device = self.db.get_device(id).await?;

        if self.platform.is_enabled() && device.chirpstack_device_created {
            match self.platform.delete_device(&device.dev_eui).await {
                Ok(()) => info!(dev_eui = %device.dev_eui, "Platform device deleted"),
                Err(e) => {
                    warn!(dev_eui = %device.dev_eui, error = %e, "Failed to delete platform device");
                }
            }
        }

        self.db.delete_device(id).await?;
        info!(device_id = %id, "Device deleted");
        Ok(())
    }

    /// Tenant, application and device profile for a new user, persisted onto
    /// the user row.
    async fn mirror_tenant(&self, user: &User) -> MirrorOutcome<PlatformIdentity> {
        if !self.platform.is_enabled() {
            return MirrorOutcome::skipped("platform integration disabled");
        }

        let identity = match self.create_tenant_hierarchy(&user.email).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Failed to provision platform tenant");
                return MirrorOutcome::failed(e);
            }
        };

        if let Err(e) = self.db.set_user_platform_identity(&user.id, &identity).await {
            warn!(user_id = %user.id, error = %e, "Failed to store platform identity");
            return MirrorOutcome::failed(e);
        }

        info!(
            user_id = %user.id,
            tenant_id = %identity.tenant_id,
            application_id = %identity.application_id,
            device_profile_id = %identity.device_profile_id,
            "Platform tenant provisioned"
        );
        MirrorOutcome::Success(identity)
    }

    async fn create_tenant_hierarchy(
        &self,
        email: &str,
    ) -> Result<PlatformIdentity, crate::platform::PlatformError> {
        let tenant_id = self.platform.create_tenant(email).await?;
        let application_id = self
            .platform
            .create_application(&tenant_id, APPLICATION_NAME)
            .await?;
        let device_profile_id = self.platform.create_device_profile(&tenant_id).await?;
        Ok(PlatformIdentity {
            tenant_id,
            application_id,
            device_profile_id,
        })
    }

    /// Create and activate the device remotely. Both progress flags are set
    /// only when both calls succeed.
    async fn mirror_device(
        &self,
        device: &Device,
        user: &User,
        allowed: &AllowedDevice,
    ) -> MirrorOutcome<()> {
        if !self.platform.is_enabled() {
            return MirrorOutcome::skipped("platform integration disabled");
        }
        let Some((application_id, device_profile_id)) = user.platform_target() else {
            return MirrorOutcome::skipped("user has no platform application");
        };

        let info = DeviceInfo::abp(
            application_id,
            device_profile_id,
            &device.dev_eui,
            &device.name,
            device
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(&device.name),
        );
        if let Err(e) = self.platform.create_device(&info).await {
            warn!(dev_eui = %device.dev_eui, error = %e, "Failed to create platform device");
            return MirrorOutcome::failed(e);
        }

        let activation =
            DeviceActivation::from_keys(&allowed.nwk_key, &allowed.app_key, &allowed.addr_key);
        if let Err(e) = self.platform.activate_device(&device.dev_eui, &activation).await {
            warn!(dev_eui = %device.dev_eui, error = %e, "Failed to activate platform device");
            return MirrorOutcome::failed(e);
        }

        if let Err(e) = self
            .db
            .set_device_platform_status(&device.id, true, true)
            .await
        {
            warn!(device_id = %device.id, error = %e, "Failed to record platform status");
            return MirrorOutcome::failed(e);
        }

        info!(dev_eui = %device.dev_eui, "Platform device created and activated");
        MirrorOutcome::Success(())
    }
}
