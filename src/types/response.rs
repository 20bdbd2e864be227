// src/types/response.rs
//! Wire types of the hosted auth (GoTrue) and REST (PostgREST) endpoints

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Principal, ProviderError, Session};

/// Free-form data written at sign-up; only the display name is read back.
/// Unknown keys are ignored so client-written values never fail a parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

impl From<GoTrueUser> for Principal {
    fn from(user: GoTrueUser) -> Self {
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            full_name: user.user_metadata.and_then(|m| m.full_name),
        }
    }
}

/// Body of token and sign-up responses. Sign-up with pending email
/// confirmation returns the bare user instead, so every token field is
/// optional and the user may sit at top level.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub expires_at: Option<i64>,
    pub user: Option<GoTrueUser>,
}

impl TokenResponse {
    /// `Ok(None)` when the response carries no session
    pub fn into_session(self, now: DateTime<Utc>) -> Result<Option<Session>, ProviderError> {
        let Some(access_token) = self.access_token else {
            return Ok(None);
        };
        let refresh_token = self
            .refresh_token
            .ok_or_else(|| ProviderError::InvalidResponse("missing refresh_token".into()))?;
        let user = self
            .user
            .ok_or_else(|| ProviderError::InvalidResponse("missing user".into()))?;

        let expires_at = match (self.expires_at, self.expires_in) {
            (Some(at), _) => Utc
                .timestamp_opt(at, 0)
                .single()
                .ok_or_else(|| ProviderError::InvalidResponse(format!("bad expires_at {}", at)))?,
            (None, Some(secs)) => now + chrono::Duration::seconds(secs),
            (None, None) => {
                return Err(ProviderError::InvalidResponse(
                    "missing expires_at and expires_in".into(),
                ))
            }
        };

        Ok(Some(Session {
            access_token,
            refresh_token,
            expires_at,
            user: user.into(),
        }))
    }
}

/// Both error shapes GoTrue has shipped
#[derive(Debug, Default, Deserialize)]
pub struct GoTrueError {
    pub error_code: Option<String>,
    pub msg: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub message: Option<String>,
}

impl GoTrueError {
    pub fn into_provider_error(self, status: u16) -> ProviderError {
        let code = self
            .error_code
            .or(self.error)
            .unwrap_or_else(|| format!("http_{}", status));
        let message = self
            .msg
            .or(self.error_description)
            .or(self.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        ProviderError::api(status, code, message)
    }
}

pub fn parse_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<GoTrueError>(body) {
        Ok(err) => err.into_provider_error(status),
        Err(_) => ProviderError::api(
            status,
            format!("http_{}", status),
            if body.is_empty() { "Unknown error" } else { body },
        ),
    }
}

/// One row of `user_roles` as selected by the role lookup
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRow {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a crate::auth::SignUpMetadata,
}
