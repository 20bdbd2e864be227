// src/core/database.rs
//! Local SQLite role store

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

use crate::auth::{Role, RoleStore, RoleStoreError};
use crate::core::FsOps;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL CHECK (role IN ('admin', 'recruiter', 'job_seeker')),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_roles table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_roles_role ON user_roles(role);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRole {
    pub id: i64,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRole {
    pub fn role(&self) -> Result<Role> {
        self.role.parse()
    }
}

pub struct UserRoleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRoleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user(&self, user_id: &str) -> sqlx::Result<Option<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            r#"
            SELECT id, user_id, role, created_at, updated_at
            FROM user_roles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }

    /// Insert or replace the single role record of `user_id`
    pub async fn upsert(&self, user_id: &str, role: Role) -> sqlx::Result<UserRole> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                role = excluded.role,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!("Assigned role {} to user {}", role, user_id);
        self.find_by_user(user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn remove(&self, user_id: &str) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("Removed role record for user {}", user_id);
        }
        Ok(removed)
    }

    pub async fn list(&self) -> sqlx::Result<Vec<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            r#"
            SELECT id, user_id, role, created_at, updated_at
            FROM user_roles
            ORDER BY role ASC, user_id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    pub async fn list_by_role(&self, role: Role) -> sqlx::Result<Vec<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            r#"
            SELECT id, user_id, role, created_at, updated_at
            FROM user_roles
            WHERE role = ?
            ORDER BY user_id ASC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(self.pool)
        .await
    }
}

/// [`RoleStore`] over the local `user_roles` table
pub struct SqliteRoleStore {
    db: Database,
}

impl SqliteRoleStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleStore for SqliteRoleStore {
    async fn get_role(&self, user_id: &str) -> Result<Option<Role>, RoleStoreError> {
        let record = UserRoleRepository::new(self.db.pool())
            .find_by_user(user_id)
            .await?;

        record
            .map(|r| r.role())
            .transpose()
            .map_err(|e| RoleStoreError::InvalidResponse(e.to_string()))
    }
}
