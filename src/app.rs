// src/app.rs
//! Wiring of the gate to its collaborators, and the user-facing commands

use anyhow::{Context, Result};
use clap::Subcommand;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{Credentials, GateStatus, Role, RoleStore, SessionRoleGate};
use crate::core::{ConfigManager, Database, RoleSource, SqliteRoleStore, SupabaseClient};
use crate::job_cache::JobListCache;
use crate::routing::{decide, Route, RouteDecision};
use crate::supabase::{SupabaseIdentity, SupabaseRoleStore};

#[derive(Subcommand)]
pub enum JobCommand {
    /// Save a job, or unsave it if already saved
    Save { job_id: String },
    /// Record an application to a job
    Apply { job_id: String },
    /// Show saved and applied jobs
    List,
}

#[derive(Subcommand)]
pub enum GateCommand {
    /// Show the current session status and dashboard
    Status {
        /// Seconds to wait for role resolution
        #[arg(long, default_value_t = 10)]
        wait_secs: u64,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "job_seeker")]
        role: Role,
    },
    Logout,
    /// Session-scoped saved/applied job lists
    Jobs {
        #[command(subcommand)]
        command: JobCommand,
    },
}

/// Build a gate over the hosted identity provider and configured role store
pub async fn build_gate(config: &ConfigManager) -> Result<SessionRoleGate> {
    let supabase = config.require_supabase()?;
    let client = Arc::new(SupabaseClient::new(supabase)?);

    let identity = Arc::new(
        SupabaseIdentity::new(client.clone(), Some(config.paths.session_path.clone())).await,
    );

    let roles: Arc<dyn RoleStore> = match config.role_source {
        RoleSource::Supabase => Arc::new(SupabaseRoleStore::new(client)),
        RoleSource::Sqlite => {
            let db = Database::new(&config.paths.database_path)
                .await
                .context("Failed to open local role store")?;
            Arc::new(SqliteRoleStore::new(db))
        }
    };
    info!("Role source: {:?}", config.role_source);

    let jobs = Arc::new(JobListCache::load(&config.paths.job_cache_path).await);
    Ok(SessionRoleGate::new(identity, roles, jobs))
}

async fn wait_settled(gate: &SessionRoleGate, wait: Duration) -> GateStatus {
    let mut watcher = gate.subscribe();
    match tokio::time::timeout(wait, watcher.settled()).await {
        Ok(Ok(status)) => status,
        _ => gate.current_status(),
    }
}

fn describe(decision: RouteDecision) -> String {
    match decision {
        RouteDecision::RedirectToLogin => format!("redirect to {}", Route::Login.path()),
        RouteDecision::ShowLoading => "loading".to_string(),
        RouteDecision::ShowRolePending => "role pending, ask an admin to assign a role".to_string(),
        RouteDecision::Render { route } => format!("render {}", route.path()),
        RouteDecision::RenderDashboard { view } => format!("{:?} dashboard", view),
    }
}

pub async fn run_gate_command(command: GateCommand, config: &ConfigManager) -> Result<()> {
    let gate = build_gate(config).await?;
    gate.initialize().await;
    let wait = Duration::from_secs(config.supabase.timeout_seconds);

    match command {
        GateCommand::Status { wait_secs } => {
            let status = wait_settled(&gate, Duration::from_secs(wait_secs)).await;
            println!("Status: {}", status);
            if let Some(principal) = gate.principal() {
                println!("User:   {} <{}>", principal.display_name(), principal.email);
            }
            println!("Dashboard: {}", describe(decide(Route::Dashboard, status)));
        }

        GateCommand::Login { email, password } => {
            let credentials = Credentials::new(email, password);
            let principal = gate
                .login(&credentials)
                .await
                .context("Login failed")?;
            println!("✅ Signed in as {}", principal.display_name());

            let status = wait_settled(&gate, wait).await;
            println!("Status: {}", status);
        }

        GateCommand::Register {
            email,
            password,
            name,
            role,
        } => {
            let credentials = Credentials::new(email, password);
            match gate
                .register(&credentials, &name, role)
                .await
                .context("Registration failed")?
            {
                Some(principal) => {
                    println!("✅ Registered and signed in as {}", principal.display_name());
                    println!("Status: {}", wait_settled(&gate, wait).await);
                }
                None => println!("✅ Registered. Confirm your email, then log in."),
            }
        }

        GateCommand::Logout => {
            gate.logout().await.context("Logout failed")?;
            println!("✅ Signed out. Status: {}", gate.current_status());
        }

        GateCommand::Jobs { command } => {
            let status = wait_settled(&gate, wait).await;
            let route = match command {
                JobCommand::Apply { .. } => Route::AppliedJobs,
                _ => Route::SavedJobs,
            };
            match decide(route, status) {
                RouteDecision::RedirectToLogin => {
                    anyhow::bail!("Login required: run `hireloom login` first")
                }
                RouteDecision::ShowLoading => {
                    anyhow::bail!("Session still loading, try again")
                }
                _ => {}
            }

            let jobs = gate.job_lists();
            match command {
                JobCommand::Save { job_id } => {
                    if jobs.toggle_saved(&job_id).await? {
                        println!("✅ Job {} saved", job_id);
                    } else {
                        println!("✅ Job {} removed from saved", job_id);
                    }
                }
                JobCommand::Apply { job_id } => {
                    if jobs.mark_applied(&job_id).await? {
                        println!("✅ Application to {} recorded", job_id);
                    } else {
                        println!("Already applied to {}", job_id);
                    }
                }
                JobCommand::List => {
                    let lists = jobs.snapshot();
                    println!("Saved jobs ({}):", lists.saved.len());
                    for id in &lists.saved {
                        println!("  {}", id);
                    }
                    println!("Applied jobs ({}):", lists.applied.len());
                    for id in &lists.applied {
                        println!("  {}", id);
                    }
                }
            }
        }
    }

    gate.shutdown();
    Ok(())
}
