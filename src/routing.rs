// src/routing.rs
//! What to render for a page given the gate status

use serde::Serialize;

use crate::auth::{GateStatus, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Feed,
    SavedJobs,
    AppliedJobs,
    Profile,
    NetworkSearch,
    SearchResults,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::Feed => "/feed",
            Route::SavedJobs => "/saved",
            Route::AppliedJobs => "/applied",
            Route::Profile => "/profile",
            Route::NetworkSearch => "/network",
            Route::SearchResults => "/search",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Landing | Route::Login | Route::Register)
    }
}

/// Dashboard variant, chosen by exact role match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    Admin,
    Recruiter,
    JobSeeker,
}

impl From<Role> for DashboardView {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => DashboardView::Admin,
            Role::Recruiter => DashboardView::Recruiter,
            Role::JobSeeker => DashboardView::JobSeeker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    RedirectToLogin,
    ShowLoading,
    /// Signed in, role record not available yet
    ShowRolePending,
    Render { route: Route },
    RenderDashboard { view: DashboardView },
}

pub fn decide(route: Route, status: GateStatus) -> RouteDecision {
    if !route.requires_session() {
        return RouteDecision::Render { route };
    }

    match status {
        GateStatus::Uninitialized | GateStatus::Loading => RouteDecision::ShowLoading,
        GateStatus::Unauthenticated => RouteDecision::RedirectToLogin,
        GateStatus::RoleUnresolved if route == Route::Dashboard => RouteDecision::ShowRolePending,
        GateStatus::RoleUnresolved => RouteDecision::Render { route },
        GateStatus::Authenticated(role) if route == Route::Dashboard => {
            RouteDecision::RenderDashboard { view: role.into() }
        }
        GateStatus::Authenticated(_) => RouteDecision::Render { route },
    }
}
