// src/auth/provider.rs
//! Identity provider contract and listener bookkeeping

use super::{Credentials, ProviderError, Session, SignUpMetadata};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Callback invoked with the new session (or `None`) on every change
pub type SessionListener = Arc<dyn Fn(Option<Session>) + Send + Sync>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, credentials: &Credentials)
        -> Result<Session, ProviderError>;

    /// Returns `None` when the account still needs confirmation
    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &SignUpMetadata,
    ) -> Result<Option<Session>, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    async fn get_current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Register a change listener. Dropping the handle deregisters it.
    fn on_session_change(&self, listener: SessionListener) -> Subscription;
}

/// Unsubscribe handle returned by [`IdentityProvider::on_session_change`]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Listener table shared by provider implementations
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: BTreeMap<u64, SessionListener>,
}

impl ListenerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe(self: &Arc<Self>, listener: SessionListener) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.insert(id, listener);
            id
        };
        tracing::debug!(listener_id = id, "Session listener registered");

        let registry: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.inner.lock().listeners.remove(&id);
                tracing::debug!(listener_id = id, "Session listener removed");
            }
        })
    }

    /// Call every listener in registration order. The lock is released
    /// before any callback runs so listeners may re-enter the registry.
    pub fn notify(&self, session: Option<Session>) {
        let listeners: Vec<SessionListener> =
            self.inner.lock().listeners.values().cloned().collect();
        for listener in listeners {
            listener(session.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
