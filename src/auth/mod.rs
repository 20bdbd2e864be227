// src/auth/mod.rs
//! Session lifecycle and role resolution

pub mod error;
pub mod gate;
pub mod provider;
pub mod role_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ProviderError, RoleStoreError};
pub use gate::{GateStatus, SessionRoleGate, StatusWatcher};
pub use provider::{IdentityProvider, ListenerRegistry, SessionListener, Subscription};
pub use role_store::RoleStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of roles a principal can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Recruiter,
    JobSeeker,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Recruiter, Role::JobSeeker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::JobSeeker => "job_seeker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "recruiter" => Ok(Role::Recruiter),
            "job_seeker" | "job-seeker" | "jobseeker" => Ok(Role::JobSeeker),
            other => anyhow::bail!(
                "Unknown role: {}. Use admin, recruiter or job_seeker",
                other
            ),
        }
    }
}

/// Authenticated user identity derived from a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Principal {
    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Provider-issued proof of authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Principal,
}

impl Session {
    /// True when the token expires within `margin_secs` of `now`
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.expires_at <= now + chrono::Duration::seconds(margin_secs)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keeps passwords out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Account metadata attached at sign-up, used later for role provisioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub role: Role,
}
