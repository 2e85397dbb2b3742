//! Device catalog (versions) and credential allow-list queries.

use lnode_core::PageRequest;
use lnode_core::db::{DatabaseError, unix_timestamp};
use sqlx::{QueryBuilder, Sqlite};

use super::db::Database;
use super::models::{AllowedDevice, AllowedDeviceChanges, DeviceVersion, DeviceVersionChanges};

impl Database {
    // =========================================================================
    // Device versions
    // =========================================================================

    pub async fn create_device_version(
        &self,
        id: &str,
        name: &str,
        version: &str,
        description: Option<&str>,
    ) -> Result<DeviceVersion, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO device_versions (id, name, version, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(version)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_device_version(id).await
    }

    pub async fn get_device_version(&self, id: &str) -> Result<DeviceVersion, DatabaseError> {
        sqlx::query_as::<_, DeviceVersion>("SELECT * FROM device_versions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Device version {id}")))
    }

    pub async fn list_device_versions(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<DeviceVersion>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM device_versions")
            .fetch_one(self.pool())
            .await?;

        let versions = sqlx::query_as::<_, DeviceVersion>(
            "SELECT * FROM device_versions ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((versions, total))
    }

    /// Apply a partial update. `changes` must not be empty.
    pub async fn update_device_version(
        &self,
        id: &str,
        changes: &DeviceVersionChanges,
    ) -> Result<DeviceVersion, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE device_versions SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &changes.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(version) = &changes.version {
                set.push("version = ").push_bind_unseparated(version.clone());
            }
            if let Some(description) = &changes.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            set.push("updated_at = ").push_bind_unseparated(unix_timestamp());
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device version {id}")));
        }

        self.get_device_version(id).await
    }

    pub async fn delete_device_version(&self, id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM device_versions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Device version {id}")));
        }
        Ok(())
    }

    // =========================================================================
    // Allow-list
    // =========================================================================

    pub async fn create_allowed_device(
        &self,
        id: &str,
        dev_eui: &str,
        nwk_key: &str,
        app_key: &str,
        addr_key: &str,
        description: Option<&str>,
    ) -> Result<AllowedDevice, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO allowed_devices (id, dev_eui, nwk_key, app_key, addr_key, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(dev_eui)
        .bind(nwk_key)
        .bind(app_key)
        .bind(addr_key)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_allowed_device(dev_eui).await
    }

    /// Look up allow-listed credentials by `DevEUI`.
    pub async fn get_allowed_device(&self, dev_eui: &str) -> Result<AllowedDevice, DatabaseError> {
        sqlx::query_as::<_, AllowedDevice>("SELECT * FROM allowed_devices WHERE dev_eui = ?")
            .bind(dev_eui)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Allowed device {dev_eui}")))
    }

    pub async fn list_allowed_devices(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<AllowedDevice>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM allowed_devices")
            .fetch_one(self.pool())
            .await?;

        let devices = sqlx::query_as::<_, AllowedDevice>(
            "SELECT * FROM allowed_devices ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((devices, total))
    }

    /// Apply a partial update. `changes` must not be empty.
    pub async fn update_allowed_device(
        &self,
        dev_eui: &str,
        changes: &AllowedDeviceChanges,
    ) -> Result<AllowedDevice, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE allowed_devices SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(key) = &changes.nwk_key {
                set.push("nwk_key = ").push_bind_unseparated(key.clone());
            }
            if let Some(key) = &changes.app_key {
                set.push("app_key = ").push_bind_unseparated(key.clone());
            }
            if let Some(key) = &changes.addr_key {
                set.push("addr_key = ").push_bind_unseparated(key.clone());
            }
            if let Some(description) = &changes.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            set.push("updated_at = ").push_bind_unseparated(unix_timestamp());
        }
        qb.push(" WHERE dev_eui = ").push_bind(dev_eui.to_string());

        let result = qb.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Allowed device {dev_eui}")));
        }

        self.get_allowed_device(dev_eui).await
    }

    pub async fn delete_allowed_device(&self, dev_eui: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM allowed_devices WHERE dev_eui = ?")
            .bind(dev_eui)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Allowed device {dev_eui}")));
        }
        Ok(())
    }
}
