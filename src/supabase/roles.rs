// src/supabase/roles.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::auth::{Role, RoleStore, RoleStoreError};
use crate::core::SupabaseClient;
use crate::types::response::RoleRow;

const USER_ROLES_TABLE: &str = "user_roles";

/// Role lookup against the hosted `user_roles` table
pub struct SupabaseRoleStore {
    client: Arc<SupabaseClient>,
}

impl SupabaseRoleStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleStore for SupabaseRoleStore {
    async fn get_role(&self, user_id: &str) -> Result<Option<Role>, RoleStoreError> {
        let rows: Vec<RoleRow> = self
            .client
            .rest_get(
                USER_ROLES_TABLE,
                &[
                    ("select", "role".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                ],
            )
            .await?;
        debug!("{} role row(s) for user {}", rows.len(), user_id);
        role_from_rows(&rows, user_id)
    }
}

fn role_from_rows(rows: &[RoleRow], user_id: &str) -> Result<Option<Role>, RoleStoreError> {
    match rows {
        [] => Ok(None),
        [row] => row
            .role
            .parse::<Role>()
            .map(Some)
            .map_err(|e| RoleStoreError::InvalidResponse(e.to_string())),
        _ => Err(RoleStoreError::InvalidResponse(format!(
            "{} role records for user {}",
            rows.len(),
            user_id
        ))),
    }
}
