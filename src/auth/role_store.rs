// src/auth/role_store.rs
use super::{Role, RoleStoreError};
use async_trait::async_trait;

/// Single-record-per-user role lookup
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// `Ok(None)` means no role record exists for the user yet
    async fn get_role(&self, user_id: &str) -> Result<Option<Role>, RoleStoreError>;
}
