// src/auth/gate.rs
//! Session/role gate.
//!
//! The gate owns the one listener registered with the identity provider and
//! folds session changes into a single [`GateStatus`]. Every session
//! transition bumps an epoch; role lookups carry the epoch they were issued
//! under and their result is dropped if a newer transition has started.

use super::{
    Credentials, IdentityProvider, Principal, ProviderError, Role, RoleStore, Session,
    SessionListener, SignUpMetadata, Subscription,
};
use crate::job_cache::JobListCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Externally observable state of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum GateStatus {
    Uninitialized,
    Loading,
    Unauthenticated,
    Authenticated(Role),
    /// Signed in, but no role record could be read (yet)
    RoleUnresolved,
}

impl GateStatus {
    /// Neither uninitialized nor waiting on a lookup
    pub fn is_settled(&self) -> bool {
        !matches!(self, GateStatus::Uninitialized | GateStatus::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            GateStatus::Authenticated(_) | GateStatus::RoleUnresolved
        )
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            GateStatus::Authenticated(role) => Some(*role),
            _ => None,
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStatus::Uninitialized => f.write_str("uninitialized"),
            GateStatus::Loading => f.write_str("loading"),
            GateStatus::Unauthenticated => f.write_str("unauthenticated"),
            GateStatus::Authenticated(role) => write!(f, "authenticated ({})", role),
            GateStatus::RoleUnresolved => f.write_str("authenticated (role unresolved)"),
        }
    }
}

#[derive(Debug, Clone)]
struct GateState {
    epoch: u64,
    session: Option<Session>,
    status: GateStatus,
}

/// Read side handed to observers
#[derive(Clone)]
pub struct StatusWatcher {
    rx: watch::Receiver<GateState>,
}

impl StatusWatcher {
    pub fn current(&self) -> GateStatus {
        self.rx.borrow().status
    }

    /// Wait until the status satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&GateStatus) -> bool,
    ) -> Result<GateStatus, watch::error::RecvError> {
        let state = self.rx.wait_for(|state| predicate(&state.status)).await?;
        Ok(state.status)
    }

    pub async fn settled(&mut self) -> Result<GateStatus, watch::error::RecvError> {
        self.wait_for(GateStatus::is_settled).await
    }
}

struct GateInner {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<dyn RoleStore>,
    jobs: Arc<JobListCache>,
    state: watch::Sender<GateState>,
    runtime: OnceLock<Handle>,
}

impl GateInner {
    /// Start a transition with no session attached yet
    fn begin_probe(&self) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            state.epoch += 1;
            state.status = GateStatus::Loading;
            epoch = state.epoch;
        });
        epoch
    }

    /// Apply the initial probe unless a notification already superseded it
    fn apply_probe(self: &Arc<Self>, probe_epoch: u64, session: Option<Session>) {
        self.transition(Some(probe_epoch), session);
    }

    fn apply_session(self: &Arc<Self>, session: Option<Session>) {
        self.transition(None, session);
    }

    /// Install `session`. With `expected_epoch`, the check and the write
    /// happen under the same state update.
    fn transition(self: &Arc<Self>, expected_epoch: Option<u64>, session: Option<Session>) {
        let mut superseded = false;
        let mut owner_changed = false;
        let mut lookup: Option<(u64, Principal)> = None;

        self.state.send_if_modified(|state| {
            if expected_epoch.is_some_and(|epoch| epoch != state.epoch) {
                superseded = true;
                return false;
            }

            let previous = state.session.as_ref().map(|s| s.user.id.as_str());
            let next = session.as_ref().map(|s| s.user.id.as_str());
            owner_changed = previous.is_some() && previous != next;

            let Some(session) = &session else {
                let changed =
                    state.session.is_some() || state.status != GateStatus::Unauthenticated;
                state.epoch += 1;
                state.session = None;
                state.status = GateStatus::Unauthenticated;
                return changed;
            };

            if !owner_changed
                && state.session.is_some()
                && matches!(state.status, GateStatus::Authenticated(_))
            {
                // token refresh for an already resolved user
                state.session = Some(session.clone());
                return false;
            }

            state.epoch += 1;
            state.session = Some(session.clone());
            state.status = GateStatus::Loading;
            lookup = Some((state.epoch, session.user.clone()));
            true
        });

        if superseded {
            debug!("Initial session probe superseded by a change notification");
            return;
        }
        if owner_changed {
            self.reset_job_lists();
        }
        match lookup {
            Some((epoch, principal)) => {
                debug!(epoch, user_id = %principal.id, "Session present, resolving role");
                self.spawn_role_lookup(epoch, principal);
            }
            None if session.is_none() => debug!("Session absent, gate unauthenticated"),
            None => {}
        }
    }

    fn clear_session(&self) {
        self.state.send_if_modified(|state| {
            let changed = state.session.is_some() || state.status != GateStatus::Unauthenticated;
            state.epoch += 1;
            state.session = None;
            state.status = GateStatus::Unauthenticated;
            changed
        });
        debug!("Session cleared locally");
    }

    fn runtime(&self) -> Option<Handle> {
        self.runtime
            .get()
            .cloned()
            .or_else(|| Handle::try_current().ok())
    }

    /// Drop the previous owner's job lists; the file is rewritten in the background
    fn reset_job_lists(&self) {
        if !self.jobs.clear_in_memory() {
            return;
        }
        info!("Session owner changed, cleared job lists");
        if let Some(runtime) = self.runtime() {
            let jobs = Arc::clone(&self.jobs);
            runtime.spawn(async move {
                if let Err(e) = jobs.persist().await {
                    warn!("Failed to persist cleared job lists: {:#}", e);
                }
            });
        }
    }

    fn spawn_role_lookup(self: &Arc<Self>, epoch: u64, principal: Principal) {
        let Some(runtime) = self.runtime() else {
            warn!(user_id = %principal.id, "No async runtime available for role lookup");
            self.resolve(epoch, GateStatus::RoleUnresolved);
            return;
        };

        let inner = Arc::clone(self);
        runtime.spawn(async move {
            let status = match inner.roles.get_role(&principal.id).await {
                Ok(Some(role)) => {
                    info!("User {} resolved to role {}", principal.email, role);
                    GateStatus::Authenticated(role)
                }
                Ok(None) => {
                    warn!("No role record for user {} yet", principal.email);
                    GateStatus::RoleUnresolved
                }
                Err(e) => {
                    warn!("Role lookup failed for user {}: {}", principal.email, e);
                    GateStatus::RoleUnresolved
                }
            };
            inner.resolve(epoch, status);
        });
    }

    /// Write a lookup result if its epoch is still current
    fn resolve(&self, epoch: u64, status: GateStatus) {
        let applied = self.state.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            state.status = status;
            true
        });
        if !applied {
            debug!(epoch, "Discarding role lookup for a superseded session");
        }
    }
}

/// Owns the session lifecycle and exposes the resolved [`GateStatus`]
pub struct SessionRoleGate {
    inner: Arc<GateInner>,
    subscription: Mutex<Option<Subscription>>,
    initialized: AtomicBool,
}

impl SessionRoleGate {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        roles: Arc<dyn RoleStore>,
        jobs: Arc<JobListCache>,
    ) -> Self {
        let (state, _) = watch::channel(GateState {
            epoch: 0,
            session: None,
            status: GateStatus::Uninitialized,
        });

        Self {
            inner: Arc::new(GateInner {
                identity,
                roles,
                jobs,
                state,
                runtime: OnceLock::new(),
            }),
            subscription: Mutex::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Register the change listener and probe for an existing session.
    /// Later calls are no-ops until [`shutdown`](Self::shutdown).
    pub async fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let _ = self.inner.runtime.set(Handle::current());
        let probe_epoch = self.inner.begin_probe();

        let weak = Arc::downgrade(&self.inner);
        let listener: SessionListener = Arc::new(move |session: Option<Session>| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_session(session);
            }
        });
        *self.subscription.lock() = Some(self.inner.identity.on_session_change(listener));

        let session = match self.inner.identity.get_current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session probe failed, treating as signed out: {}", e);
                None
            }
        };
        self.inner.apply_probe(probe_epoch, session);
    }

    /// Latest status; never waits
    pub fn current_status(&self) -> GateStatus {
        self.inner.state.borrow().status
    }

    pub fn principal(&self) -> Option<Principal> {
        self.inner
            .state
            .borrow()
            .session
            .as_ref()
            .map(|session| session.user.clone())
    }

    pub fn subscribe(&self) -> StatusWatcher {
        StatusWatcher {
            rx: self.inner.state.subscribe(),
        }
    }

    pub fn job_lists(&self) -> &Arc<JobListCache> {
        &self.inner.jobs
    }

    /// Sign in. The status follows through the change notification.
    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, ProviderError> {
        let session = self
            .inner
            .identity
            .sign_in_with_password(credentials)
            .await
            .inspect_err(|e| warn!("Login failed for {}: {}", credentials.email, e))?;

        info!("User {} signed in", session.user.email);
        Ok(session.user)
    }

    pub async fn register(
        &self,
        credentials: &Credentials,
        display_name: &str,
        role: Role,
    ) -> Result<Option<Principal>, ProviderError> {
        let metadata = SignUpMetadata {
            full_name: display_name.to_string(),
            role,
        };
        let session = self
            .inner
            .identity
            .sign_up(credentials, &metadata)
            .await
            .inspect_err(|e| warn!("Registration failed for {}: {}", credentials.email, e))?;

        info!(
            "Registered {} as {} ({})",
            credentials.email,
            role,
            if session.is_some() {
                "signed in"
            } else {
                "confirmation pending"
            }
        );
        Ok(session.map(|s| s.user))
    }

    /// Sign out and clear local state before returning
    pub async fn logout(&self) -> Result<(), ProviderError> {
        self.inner
            .identity
            .sign_out()
            .await
            .inspect_err(|e| warn!("Logout failed: {}", e))?;

        self.inner.clear_session();
        if let Err(e) = self.inner.jobs.clear().await {
            warn!("Failed to clear session job lists: {:#}", e);
        }

        info!("Signed out");
        Ok(())
    }

    /// Deregister the change listener. The gate may be initialized again.
    pub fn shutdown(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
        self.initialized.store(false, Ordering::SeqCst);
    }
}

impl Drop for SessionRoleGate {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{session_for, FakeIdentity, FakeRoleStore, RoleReply};
    use std::time::Duration;

    fn gate(identity: &Arc<FakeIdentity>, roles: &Arc<FakeRoleStore>) -> SessionRoleGate {
        SessionRoleGate::new(
            identity.clone(),
            roles.clone(),
            Arc::new(JobListCache::in_memory()),
        )
    }

    async fn settle(gate: &SessionRoleGate) -> GateStatus {
        let mut watcher = gate.subscribe();
        tokio::time::timeout(Duration::from_secs(2), watcher.settled())
            .await
            .expect("gate did not settle")
            .expect("gate dropped")
    }

    #[tokio::test]
    async fn test_starts_uninitialized() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);
        assert_eq!(gate.current_status(), GateStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_absent_session_settles_unauthenticated_without_lookup() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::Unauthenticated);
        assert_eq!(roles.calls(), 0);
    }

    #[tokio::test]
    async fn test_present_session_resolves_role() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Recruiter));
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(
            settle(&gate).await,
            GateStatus::Authenticated(Role::Recruiter)
        );
        assert_eq!(gate.principal().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_missing_role_is_unresolved_not_defaulted() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::RoleUnresolved);
        assert_eq!(gate.current_status().role(), None);
    }

    #[tokio::test]
    async fn test_role_store_error_is_unresolved() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Fail);
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::RoleUnresolved);
    }

    #[tokio::test]
    async fn test_failed_probe_is_unauthenticated() {
        let identity = FakeIdentity::signed_out();
        identity.fail_probe(ProviderError::Transport("offline".into()));
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::Unauthenticated);
        assert_eq!(roles.calls(), 0);
    }

    #[tokio::test]
    async fn test_current_status_reports_loading_while_lookup_pending() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Admin));
        let release = roles.hold("u1");
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        assert_eq!(gate.current_status(), GateStatus::Loading);

        release.notify_one();
        assert_eq!(settle(&gate).await, GateStatus::Authenticated(Role::Admin));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);

        gate.initialize().await;
        gate.initialize().await;
        assert_eq!(identity.listener_count(), 1);
        assert_eq!(identity.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_teardown_deregisters_listener() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();

        {
            let gate = gate(&identity, &roles);
            gate.initialize().await;
            assert_eq!(identity.listener_count(), 1);
        }
        assert_eq!(identity.listener_count(), 0);

        let gate = gate(&identity, &roles);
        gate.initialize().await;
        gate.shutdown();
        assert_eq!(identity.listener_count(), 0);

        gate.initialize().await;
        assert_eq!(identity.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_login_surfaces_error_and_keeps_status() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        let before = settle(&gate).await;

        let err = gate
            .login(&Credentials::new("a@b.com", "bad"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_credentials");
        assert_eq!(gate.current_status(), before);
    }

    #[tokio::test]
    async fn test_login_resolves_through_notification() {
        let identity = FakeIdentity::signed_out();
        identity.accept_password("a@b.com", "secret", session_for("u9"));
        let roles = FakeRoleStore::new();
        roles.set("u9", RoleReply::Found(Role::JobSeeker));
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        settle(&gate).await;

        let principal = gate
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();
        assert_eq!(principal.id, "u9");

        let mut watcher = gate.subscribe();
        let status = tokio::time::timeout(
            Duration::from_secs(2),
            watcher.wait_for(|s| *s == GateStatus::Authenticated(Role::JobSeeker)),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(status, GateStatus::Authenticated(Role::JobSeeker));
    }

    #[tokio::test]
    async fn test_register_passes_role_metadata() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);
        gate.initialize().await;

        let principal = gate
            .register(&Credentials::new("r@b.com", "pw"), "Rita", Role::Recruiter)
            .await
            .unwrap();

        assert!(principal.is_none());
        assert_eq!(
            identity.last_sign_up(),
            Some(SignUpMetadata {
                full_name: "Rita".into(),
                role: Role::Recruiter,
            })
        );
    }

    #[tokio::test]
    async fn test_register_error_is_verbatim() {
        let identity = FakeIdentity::signed_out();
        identity.fail_sign_up(ProviderError::api(422, "user_already_exists", "User already registered"));
        let roles = FakeRoleStore::new();
        let gate = gate(&identity, &roles);

        let err = gate
            .register(&Credentials::new("r@b.com", "pw"), "Rita", Role::Recruiter)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::api(422, "user_already_exists", "User already registered")
        );
    }

    #[tokio::test]
    async fn test_logout_clears_immediately_and_empties_job_lists() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        identity.silence_sign_out();
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Admin));
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::Authenticated(Role::Admin));

        gate.job_lists().toggle_saved("job-1").await.unwrap();
        gate.job_lists().mark_applied("job-2").await.unwrap();

        gate.logout().await.unwrap();
        assert_eq!(gate.current_status(), GateStatus::Unauthenticated);
        assert!(gate.principal().is_none());
        assert!(gate.job_lists().saved_ids().is_empty());
        assert!(gate.job_lists().applied_ids().is_empty());
    }

    #[tokio::test]
    async fn test_failed_logout_leaves_state() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        identity.fail_sign_out(ProviderError::Transport("offline".into()));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Admin));
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        settle(&gate).await;
        gate.job_lists().toggle_saved("job-1").await.unwrap();

        assert!(gate.logout().await.is_err());
        assert_eq!(gate.current_status(), GateStatus::Authenticated(Role::Admin));
        assert!(gate.job_lists().is_saved("job-1"));
    }

    #[tokio::test]
    async fn test_superseded_lookup_is_discarded() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        roles.set("p1", RoleReply::Found(Role::Recruiter));
        roles.set("p2", RoleReply::Found(Role::Admin));
        let release_p1 = roles.hold("p1");
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        settle(&gate).await;

        identity.emit(Some(session_for("p1")));
        identity.emit(Some(session_for("p2")));
        assert_eq!(settle(&gate).await, GateStatus::Authenticated(Role::Admin));

        release_p1.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(roles.completed(), 2);
        assert_eq!(gate.current_status(), GateStatus::Authenticated(Role::Admin));
        assert_eq!(gate.principal().unwrap().id, "p2");
    }

    #[tokio::test]
    async fn test_sign_out_notification_while_lookup_pending() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Admin));
        let release = roles.hold("u1");
        let gate = gate(&identity, &roles);
        gate.initialize().await;

        identity.emit(None);
        assert_eq!(gate.current_status(), GateStatus::Unauthenticated);

        release.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gate.current_status(), GateStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_token_refresh_keeps_resolved_role() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Recruiter));
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        settle(&gate).await;

        let mut refreshed = session_for("u1");
        refreshed.access_token = "rotated".into();
        identity.emit(Some(refreshed));

        assert_eq!(
            gate.current_status(),
            GateStatus::Authenticated(Role::Recruiter)
        );
        assert_eq!(roles.calls(), 1);
    }

    #[tokio::test]
    async fn test_each_transition_settles_to_expected_status() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        roles.set("a", RoleReply::Found(Role::Admin));
        roles.set("b", RoleReply::Missing);
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        assert_eq!(settle(&gate).await, GateStatus::Unauthenticated);

        let steps = [
            (Some(session_for("a")), GateStatus::Authenticated(Role::Admin)),
            (None, GateStatus::Unauthenticated),
            (Some(session_for("b")), GateStatus::RoleUnresolved),
            (Some(session_for("a")), GateStatus::Authenticated(Role::Admin)),
            (None, GateStatus::Unauthenticated),
        ];
        for (session, expected) in steps {
            identity.emit(session);
            assert_eq!(settle(&gate).await, expected);
        }
        assert_eq!(roles.calls(), 3);
    }

    #[tokio::test]
    async fn test_stale_probe_does_not_override_sign_out() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let release = identity.hold_probe();
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Admin));
        let gate = gate(&identity, &roles);

        tokio::join!(gate.initialize(), async {
            tokio::task::yield_now().await;
            identity.emit(None);
            release.notify_one();
        });

        assert_eq!(settle(&gate).await, GateStatus::Unauthenticated);
        assert!(gate.principal().is_none());
        assert_eq!(roles.calls(), 0);
    }

    #[tokio::test]
    async fn test_owner_change_drops_previous_job_lists() {
        let identity = FakeIdentity::signed_out();
        let roles = FakeRoleStore::new();
        roles.set("p1", RoleReply::Found(Role::JobSeeker));
        roles.set("p2", RoleReply::Found(Role::JobSeeker));
        let gate = gate(&identity, &roles);
        gate.initialize().await;

        identity.emit(Some(session_for("p1")));
        settle(&gate).await;
        gate.job_lists().toggle_saved("job-1").await.unwrap();

        let mut refreshed = session_for("p1");
        refreshed.access_token = "rotated".into();
        identity.emit(Some(refreshed));
        assert!(gate.job_lists().is_saved("job-1"));

        identity.emit(Some(session_for("p2")));
        assert!(gate.job_lists().saved_ids().is_empty());
        assert_eq!(settle(&gate).await, GateStatus::Authenticated(Role::JobSeeker));
    }

    #[tokio::test]
    async fn test_session_end_notification_drops_job_lists() {
        let identity = FakeIdentity::signed_in(session_for("u1"));
        let roles = FakeRoleStore::new();
        roles.set("u1", RoleReply::Found(Role::Recruiter));
        let gate = gate(&identity, &roles);
        gate.initialize().await;
        settle(&gate).await;
        gate.job_lists().mark_applied("job-3").await.unwrap();

        identity.emit(None);
        assert!(gate.job_lists().applied_ids().is_empty());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            GateStatus::Authenticated(Role::JobSeeker).to_string(),
            "authenticated (job_seeker)"
        );
        assert!(!GateStatus::Loading.is_settled());
        assert!(GateStatus::RoleUnresolved.is_authenticated());
    }
}
