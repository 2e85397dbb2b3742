//! Device registry queries.

use lnode_core::PageRequest;
use lnode_core::db::{DatabaseError, unix_timestamp};
use sqlx::{QueryBuilder, Sqlite};

use super::db::Database;
use super::models::{Device, DeviceChanges, DeviceRow};

const DEVICE_SELECT: &str = "SELECT d.id, d.user_id, d.version_id, d.name, d.dev_eui, d.description, \
     d.chirpstack_device_created, d.chirpstack_device_activated, d.is_active, d.created_at, d.updated_at, \
     v.id AS v_id, v.name AS v_name, v.version AS v_version, v.description AS v_description, \
     v.created_at AS v_created_at, v.updated_at AS v_updated_at \
     FROM devices d LEFT JOIN device_versions v ON d.version_id = v.id";

/// Fields of a device at creation time.
#[derive(Debug, Clone)]
pub struct NewDevice<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub version_id: &'a str,
    pub name: &'a str,
    pub dev_eui: &'a str,
    pub description: Option<&'a str>,
}

impl Database {
    /// Insert a device with both platform progress flags cleared.
    pub async fn create_device(&self, device: &NewDevice<'_>) -> Result<Device, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO devices (id, user_id, version_id, name, dev_eui, description, \
             chirpstack_device_created, chirpstack_device_activated, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, 0, 1, ?, ?)",
        )
        .bind(device.id)
        .bind(device.user_id)
        .bind(device.version_id)
        .bind(device.name)
        .bind(device.dev_eui)
        .bind(device.description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_device(device.id).await
    }

    /// Get a device joined with its version.
    pub async fn get_device(&self, id: &str) -> Result<Device, DatabaseError> {
        sqlx::query_as::<_, DeviceRow>(&format!("{DEVICE_SELECT} WHERE d.id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(Device::from)
            .ok_or_else(|| DatabaseError::NotFound(format!("Device {id}")))
    }

    /// List a user's devices, newest first.
    pub async fn list_user_devices(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Device>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;

        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "{DEVICE_SELECT} WHERE d.user_id = ? ORDER BY d.created_at DESC, d.rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((rows.into_iter().map(Device::from).collect(), total))
    }

    /// List every device, newest first.
    pub async fn list_all_devices(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<Device>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices")
            .fetch_one(self.pool())
            .await?;

        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "{DEVICE_SELECT} ORDER BY d.created_at DESC, d.rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((rows.into_iter().map(Device::from).collect(), total))
    }

    /// Number of device records claiming a `DevEUI`.
    pub async fn count_devices_with_dev_eui(&self, dev_eui: &str) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devices WHERE dev_eui = ?")
            .bind(dev_eui)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Apply a partial update. `changes` must not be empty.
    pub async fn update_device(
        &self,
        id: &str,
        changes: &DeviceChanges,
    ) -> Result<Device, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE devices SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &changes.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(version_id) = &changes.version_id {
                set.push("version_id = ")
                    .push_bind_unseparated(version_id.clone());
            }
            if let Some(description) = &changes.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            if let Some(is_active) = changes.is_active {
                set.push("is_active = ").push_bind_unseparated(is_active);
            }
            set.push("updated_at = ").push_bind_unseparated(unix_timestamp());
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device {id}")));
        }

        self.get_device(id).await
    }

    /// Write both platform progress flags in one statement.
    pub async fn set_device_platform_status(
        &self,
        id: &str,
        created: bool,
        activated: bool,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE devices SET chirpstack_device_created = ?, chirpstack_device_activated = ?, updated_at = ? WHERE id = ?",
        )
        .bind(created)
        .bind(activated)
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device {id}")));
        }
        Ok(())
    }

    pub async fn delete_device(&self, id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device {id}")));
        }
        Ok(())
    }
}
