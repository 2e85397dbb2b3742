//! User directory queries.

use lnode_core::PageRequest;
use lnode_core::db::unix_timestamp;
use sqlx::{QueryBuilder, Sqlite};

use super::db::Database;
use super::models::{PlatformIdentity, User, UserChanges};
use lnode_core::db::DatabaseError;

/// Escape `LIKE` wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl Database {
    /// Create a new user.
    pub async fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, full_name, full_name_lower, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(full_name.to_lowercase())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Find a user by exact email. Callers pass the normalized form.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// List users, newest first.
    pub async fn list_users(&self, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((users, total))
    }

    /// Case-insensitive substring search over email and full name. Matches
    /// against the stored lowercase name so non-ASCII letters fold too.
    pub async fn search_users(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), DatabaseError> {
        let pattern = like_pattern(query);

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE LOWER(email) LIKE ?1 ESCAPE '\\' OR full_name_lower LIKE ?1 ESCAPE '\\'",
        )
        .bind(&pattern)
        .fetch_one(self.pool())
        .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) LIKE ?1 ESCAPE '\\' OR full_name_lower LIKE ?1 ESCAPE '\\' \
             ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
        )
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        Ok((users, total))
    }

    /// Apply a partial update. `changes` must not be empty.
    pub async fn update_user(&self, id: &str, changes: &UserChanges) -> Result<User, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE users SET ");
        {
            let mut set = qb.separated(", ");
            if let Some(email) = &changes.email {
                set.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(full_name) = &changes.full_name {
                set.push("full_name = ").push_bind_unseparated(full_name.clone());
                set.push("full_name_lower = ")
                    .push_bind_unseparated(full_name.to_lowercase());
            }
            if let Some(hash) = &changes.password_hash {
                set.push("password_hash = ").push_bind_unseparated(hash.clone());
            }
            set.push("updated_at = ").push_bind_unseparated(unix_timestamp());
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb.build().execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }

        self.get_user(id).await
    }

    /// Record the platform identity assigned to a user.
    pub async fn set_user_platform_identity(
        &self,
        id: &str,
        identity: &PlatformIdentity,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET tenant_id = ?, application_id = ?, device_profile_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&identity.tenant_id)
        .bind(&identity.application_id)
        .bind(&identity.device_profile_id)
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(())
    }

    /// Delete a user. Their devices are left in place.
    pub async fn delete_user(&self, id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(())
    }
}
