//! Session and role gate for the HireLoom job board.
//!
//! [`SessionRoleGate`] tracks the signed-in user through an
//! [`IdentityProvider`], resolves their role through a [`RoleStore`] and
//! publishes a single [`GateStatus`] that pages use to decide what to show.

pub mod app;
pub mod auth;
pub mod core;
pub mod job_cache;
pub mod role_cli;
pub mod routing;
pub mod supabase;
pub mod types;

pub use auth::{
    Credentials, GateStatus, IdentityProvider, Principal, ProviderError, Role, RoleStore,
    Session, SessionRoleGate, StatusWatcher,
};
pub use job_cache::JobListCache;
pub use routing::{decide, DashboardView, Route, RouteDecision};
