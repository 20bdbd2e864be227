// src/core/service_client.rs
//! HTTP client for the hosted backend (auth + REST endpoints)

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, trace};

use crate::auth::{ProviderError, RoleStoreError};
use crate::core::config_manager::SupabaseConfig;
use crate::types::response::parse_error_body;

pub const AUTH_PREFIX: &str = "/auth/v1";
pub const REST_PREFIX: &str = "/rest/v1";

pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    /// Token sent with REST calls so row-level security sees the user
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    fn url(&self, prefix: &str, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, prefix, endpoint)
    }

    /// POST to an auth endpoint. Returns `None` for empty success bodies.
    pub async fn auth_post<T, R>(
        &self,
        endpoint: &str,
        payload: &T,
        bearer: Option<&str>,
    ) -> Result<Option<R>, ProviderError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(AUTH_PREFIX, endpoint);
        trace!("Calling auth endpoint: {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(payload);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        trace!("Auth response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            let err = parse_error_body(status.as_u16(), &body);
            error!("Auth endpoint {} failed: {}", endpoint, err);
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ProviderError::InvalidResponse(format!("{}: {}", e, body)))
    }

    /// GET rows from a REST table with PostgREST query parameters
    pub async fn rest_get<R>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<R, RoleStoreError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(REST_PREFIX, &format!("/{}", table));
        trace!("Querying table: {}", url);

        let bearer = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<R>().await?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(RoleStoreError::Transport(format!(
                "HTTP {} from {}: {}",
                status, table, error_text
            )))
        }
    }
}
