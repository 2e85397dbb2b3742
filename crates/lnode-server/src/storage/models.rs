//! Data models for Lnode storage.

use serde::{Deserialize, Serialize};

/// An account. The platform identity triple is assigned after registration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_profile_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Application and device-profile ids, present only once tenant
    /// provisioning has succeeded for this account.
    pub fn platform_target(&self) -> Option<(&str, &str)> {
        match (&self.application_id, &self.device_profile_id) {
            (Some(app), Some(profile)) => Some((app.as_str(), profile.as_str())),
            _ => None,
        }
    }
}

/// User projection without credentials or platform identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Tenant, application and device-profile ids created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIdentity {
    pub tenant_id: String,
    pub application_id: String,
    pub device_profile_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Already hashed; never the plaintext.
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.password_hash.is_none()
    }
}

/// Device catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceVersion {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceVersionChanges {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl DeviceVersionChanges {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none() && self.description.is_none()
    }
}

/// Allow-listed hardware credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AllowedDevice {
    pub id: String,
    pub dev_eui: String,
    pub nwk_key: String,
    pub app_key: String,
    pub addr_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllowedDeviceChanges {
    pub nwk_key: Option<String>,
    pub app_key: Option<String>,
    pub addr_key: Option<String>,
    pub description: Option<String>,
}

impl AllowedDeviceChanges {
    pub const fn is_empty(&self) -> bool {
        self.nwk_key.is_none()
            && self.app_key.is_none()
            && self.addr_key.is_none()
            && self.description.is_none()
    }
}

/// A user's device, joined with its catalog entry when that still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub user_id: String,
    pub version_id: String,
    pub name: String,
    pub dev_eui: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub chirpstack_device_created: bool,
    pub chirpstack_device_activated: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<DeviceVersion>,
}

/// Flat row of `devices LEFT JOIN device_versions`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DeviceRow {
    pub id: String,
    pub user_id: String,
    pub version_id: String,
    pub name: String,
    pub dev_eui: String,
    pub description: Option<String>,
    pub chirpstack_device_created: bool,
    pub chirpstack_device_activated: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub v_id: Option<String>,
    pub v_name: Option<String>,
    pub v_version: Option<String>,
    pub v_description: Option<String>,
    pub v_created_at: Option<i64>,
    pub v_updated_at: Option<i64>,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        let version = match (row.v_id, row.v_name, row.v_version) {
            (Some(id), Some(name), Some(version)) => Some(DeviceVersion {
                id,
                name,
                version,
                description: row.v_description,
                created_at: row.v_created_at.unwrap_or_default(),
                updated_at: row.v_updated_at.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            version_id: row.version_id,
            name: row.name,
            dev_eui: row.dev_eui,
            description: row.description,
            chirpstack_device_created: row.chirpstack_device_created,
            chirpstack_device_activated: row.chirpstack_device_activated,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub version_id: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl DeviceChanges {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.version_id.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }
}
