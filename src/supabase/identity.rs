// src/supabase/identity.rs
//! Identity provider backed by the hosted auth API

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{
    Credentials, IdentityProvider, ListenerRegistry, ProviderError, Session, SessionListener,
    SignUpMetadata, Subscription,
};
use crate::core::{FsOps, SupabaseClient};
use crate::types::response::{PasswordGrant, RefreshGrant, SignUpRequest, TokenResponse};

/// Refresh tokens this many seconds before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

const PASSWORD_GRANT_ENDPOINT: &str = "/token?grant_type=password";
const REFRESH_GRANT_ENDPOINT: &str = "/token?grant_type=refresh_token";
const SIGNUP_ENDPOINT: &str = "/signup";
const LOGOUT_ENDPOINT: &str = "/logout";

pub struct SupabaseIdentity {
    client: Arc<SupabaseClient>,
    session: Mutex<Option<Session>>,
    session_path: Option<PathBuf>,
    listeners: Arc<ListenerRegistry>,
}

impl SupabaseIdentity {
    /// Build the provider, restoring a session persisted by an earlier run
    pub async fn new(client: Arc<SupabaseClient>, session_path: Option<PathBuf>) -> Self {
        let restored = match &session_path {
            Some(path) => load_session(path).await,
            None => None,
        };
        if let Some(session) = &restored {
            debug!("Restored session for {}", session.user.email);
        }
        client.set_access_token(restored.as_ref().map(|s| s.access_token.clone()));

        Self {
            client,
            session: Mutex::new(restored),
            session_path,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Replace the cached session, persist it and notify listeners on change
    async fn store(&self, session: Option<Session>) {
        let changed = {
            let mut current = self.session.lock();
            let changed = *current != session;
            *current = session.clone();
            changed
        };
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));

        if let Some(path) = &self.session_path {
            let result = match &session {
                Some(session) => match serde_json::to_string_pretty(session) {
                    Ok(content) => FsOps::write_file_safe(path, &content).await,
                    Err(e) => Err(e.into()),
                },
                None => FsOps::remove_file_if_exists(path).await,
            };
            if let Err(e) = result {
                warn!("Failed to persist session to {}: {:#}", path.display(), e);
            }
        }

        if changed {
            self.listeners.notify(session);
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response: Option<TokenResponse> = self
            .client
            .auth_post(REFRESH_GRANT_ENDPOINT, &RefreshGrant { refresh_token }, None)
            .await?;
        session_from(response)
    }
}

fn session_from(response: Option<TokenResponse>) -> Result<Session, ProviderError> {
    response
        .ok_or_else(|| ProviderError::InvalidResponse("empty token response".into()))?
        .into_session(Utc::now())?
        .ok_or_else(|| ProviderError::InvalidResponse("token response without session".into()))
}

async fn load_session(path: &std::path::Path) -> Option<Session> {
    let content = FsOps::read_file_safe(path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}

/// Sign-out answers meaning the server already forgot the session
fn session_already_gone(err: &ProviderError) -> bool {
    matches!(err, ProviderError::Api { status: 401 | 403 | 404, .. })
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ProviderError> {
        let grant = PasswordGrant {
            email: &credentials.email,
            password: &credentials.password,
        };
        let response = self
            .client
            .auth_post(PASSWORD_GRANT_ENDPOINT, &grant, None)
            .await?;
        let session = session_from(response)?;

        info!("Password sign-in succeeded for {}", session.user.email);
        self.store(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &SignUpMetadata,
    ) -> Result<Option<Session>, ProviderError> {
        let request = SignUpRequest {
            email: &credentials.email,
            password: &credentials.password,
            data: metadata,
        };
        let response: Option<TokenResponse> = self
            .client
            .auth_post(SIGNUP_ENDPOINT, &request, None)
            .await?;

        let session = match response {
            Some(response) => response.into_session(Utc::now())?,
            None => None,
        };
        if let Some(session) = &session {
            self.store(Some(session.clone())).await;
        }
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let token = self.session.lock().as_ref().map(|s| s.access_token.clone());

        if let Some(token) = token {
            let result: Result<Option<serde_json::Value>, ProviderError> = self
                .client
                .auth_post(LOGOUT_ENDPOINT, &serde_json::json!({}), Some(token.as_str()))
                .await;
            match result {
                Ok(_) => {}
                Err(e) if session_already_gone(&e) => {
                    debug!("Session already revoked server-side: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        self.store(None).await;
        Ok(())
    }

    async fn get_current_session(&self) -> Result<Option<Session>, ProviderError> {
        let current = self.session.lock().clone();
        let Some(session) = current else {
            return Ok(None);
        };

        if !session.expires_within(Utc::now(), REFRESH_MARGIN_SECS) {
            return Ok(Some(session));
        }

        debug!("Session for {} expiring, refreshing", session.user.email);
        match self.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store(Some(refreshed.clone())).await;
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!("Session refresh failed: {}", e);
                self.store(None).await;
                Err(e)
            }
        }
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}
