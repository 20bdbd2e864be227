// src/auth/testing.rs
//! In-memory identity provider and role store for gate tests

use super::{
    Credentials, IdentityProvider, ListenerRegistry, Principal, ProviderError, Role, RoleStore,
    RoleStoreError, Session, SessionListener, SignUpMetadata, Subscription,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn session_for(user_id: &str) -> Session {
    Session {
        access_token: format!("access-{}", user_id),
        refresh_token: format!("refresh-{}", user_id),
        expires_at: Utc::now() + chrono::Duration::hours(1),
        user: Principal {
            id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            full_name: None,
        },
    }
}

#[derive(Default)]
struct FakeIdentityState {
    session: Option<Session>,
    probe_error: Option<ProviderError>,
    sign_up_error: Option<ProviderError>,
    sign_out_error: Option<ProviderError>,
    silent_sign_out: bool,
    passwords: HashMap<(String, String), Session>,
    last_sign_up: Option<SignUpMetadata>,
    probe_hold: Option<Arc<Notify>>,
}

pub struct FakeIdentity {
    state: Mutex<FakeIdentityState>,
    listeners: Arc<ListenerRegistry>,
    probes: AtomicUsize,
}

impl FakeIdentity {
    fn with_session(session: Option<Session>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeIdentityState {
                session,
                ..Default::default()
            }),
            listeners: ListenerRegistry::new(),
            probes: AtomicUsize::new(0),
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Self::with_session(None)
    }

    pub fn signed_in(session: Session) -> Arc<Self> {
        Self::with_session(Some(session))
    }

    pub fn fail_probe(&self, err: ProviderError) {
        self.state.lock().probe_error = Some(err);
    }

    /// Block the session probe until the returned handle is notified. The
    /// probe answers with the session it saw when it started.
    pub fn hold_probe(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().probe_hold = Some(notify.clone());
        notify
    }

    pub fn fail_sign_up(&self, err: ProviderError) {
        self.state.lock().sign_up_error = Some(err);
    }

    pub fn fail_sign_out(&self, err: ProviderError) {
        self.state.lock().sign_out_error = Some(err);
    }

    /// Sign-out succeeds without broadcasting a change
    pub fn silence_sign_out(&self) {
        self.state.lock().silent_sign_out = true;
    }

    pub fn accept_password(&self, email: &str, password: &str, session: Session) {
        self.state
            .lock()
            .passwords
            .insert((email.to_string(), password.to_string()), session);
    }

    pub fn last_sign_up(&self) -> Option<SignUpMetadata> {
        self.state.lock().last_sign_up.clone()
    }

    /// Simulate a provider-side session change
    pub fn emit(&self, session: Option<Session>) {
        self.state.lock().session = session.clone();
        self.listeners.notify(session);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, ProviderError> {
        let session = self
            .state
            .lock()
            .passwords
            .get(&(credentials.email.clone(), credentials.password.clone()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::api(400, "invalid_credentials", "Invalid login credentials")
            })?;
        self.emit(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        _credentials: &Credentials,
        metadata: &SignUpMetadata,
    ) -> Result<Option<Session>, ProviderError> {
        let mut state = self.state.lock();
        if let Some(err) = state.sign_up_error.clone() {
            return Err(err);
        }
        state.last_sign_up = Some(metadata.clone());
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let silent = {
            let mut state = self.state.lock();
            if let Some(err) = state.sign_out_error.clone() {
                return Err(err);
            }
            state.session = None;
            state.silent_sign_out
        };
        if !silent {
            self.listeners.notify(None);
        }
        Ok(())
    }

    async fn get_current_session(&self) -> Result<Option<Session>, ProviderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let (answer, hold) = {
            let state = self.state.lock();
            let answer = match &state.probe_error {
                Some(err) => Err(err.clone()),
                None => Ok(state.session.clone()),
            };
            (answer, state.probe_hold.clone())
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }
        answer
    }

    fn on_session_change(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RoleReply {
    Found(Role),
    Missing,
    Fail,
}

#[derive(Default)]
pub struct FakeRoleStore {
    replies: Mutex<HashMap<String, RoleReply>>,
    holds: Mutex<HashMap<String, Arc<Notify>>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl FakeRoleStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, user_id: &str, reply: RoleReply) {
        self.replies.lock().insert(user_id.to_string(), reply);
    }

    /// Block lookups for `user_id` until the returned handle is notified
    pub fn hold(&self, user_id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.holds
            .lock()
            .insert(user_id.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for FakeRoleStore {
    async fn get_role(&self, user_id: &str) -> Result<Option<Role>, RoleStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let hold = self.holds.lock().get(user_id).cloned();
        if let Some(hold) = hold {
            hold.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .get(user_id)
            .copied()
            .unwrap_or(RoleReply::Missing);
        self.completed.fetch_add(1, Ordering::SeqCst);

        match reply {
            RoleReply::Found(role) => Ok(Some(role)),
            RoleReply::Missing => Ok(None),
            RoleReply::Fail => Err(RoleStoreError::Transport("connection reset".into())),
        }
    }
}
