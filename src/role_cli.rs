// src/role_cli.rs
use crate::auth::Role;
use crate::core::{Database, UserRoleRepository};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Args)]
#[command(about = "Manage the local user_roles table")]
pub struct RoleCli {
    #[command(subcommand)]
    pub command: RoleCommand,

    /// Defaults to the configured database_path
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum RoleCommand {
    /// Assign (or replace) the role of a user
    Set { user_id: String, role: Role },
    /// Delete the role record of a user
    Remove { user_id: String },
    /// List all role records
    List {
        #[arg(long)]
        role: Option<Role>,
    },
    /// Show the role a user would resolve to
    Check { user_id: String },
    /// Import `user_id,role` rows from a CSV file
    Import { csv_file: PathBuf },
    /// Create the database and tables
    Init,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

pub async fn handle_role_command(cli: RoleCli, default_path: &Path) -> Result<()> {
    let database_path = cli
        .database_path
        .unwrap_or_else(|| default_path.to_path_buf());
    let db = Database::new(&database_path).await?;
    let repo = UserRoleRepository::new(db.pool());

    match cli.command {
        RoleCommand::Set { user_id, role } => match repo.upsert(&user_id, role).await {
            Ok(record) => {
                println!("✅ {} is now {}", record.user_id, record.role);
            }
            Err(e) => {
                error!("Failed to assign role: {}", e);
                println!("❌ Error: {}", e);
            }
        },

        RoleCommand::Remove { user_id } => match repo.remove(&user_id).await {
            Ok(true) => println!("✅ Role record removed for {}", user_id),
            Ok(false) => println!("❌ No role record found for {}", user_id),
            Err(e) => {
                error!("Failed to remove role record: {}", e);
                println!("❌ Error: {}", e);
            }
        },

        RoleCommand::List { role } => {
            let records = match role {
                Some(role) => repo.list_by_role(role).await?,
                None => repo.list().await?,
            };

            if records.is_empty() {
                println!("No role records found.");
            } else {
                println!("{:<5} {:<40} {:<12} {:<20}", "ID", "User", "Role", "Updated");
                println!("{}", "-".repeat(80));
                for record in records {
                    println!(
                        "{:<5} {:<40} {:<12} {:<20}",
                        record.id,
                        record.user_id,
                        record.role,
                        record.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        RoleCommand::Check { user_id } => match repo.find_by_user(&user_id).await? {
            Some(record) => println!("✅ {} resolves to role: {}", user_id, record.role),
            None => println!(
                "⚠️  {} has no role record; the gate will report it as unresolved",
                user_id
            ),
        },

        RoleCommand::Import { csv_file } => {
            if !csv_file.exists() {
                println!("❌ CSV file not found: {}", csv_file.display());
                return Ok(());
            }

            let content = tokio::fs::read_to_string(&csv_file).await?;
            let summary = import_roles(&repo, &content).await;

            println!("\nImport completed:");
            println!("  ✅ Imported: {}", summary.imported);
            println!("  ❌ Skipped:  {}", summary.skipped);
        }

        RoleCommand::Init => {
            println!("✅ Database initialized at: {}", database_path.display());
            println!("   Tables created: user_roles");
        }
    }

    Ok(())
}

/// Parse `user_id,role` records (with header) and upsert each valid one
pub async fn import_roles(repo: &UserRoleRepository<'_>, content: &str) -> ImportSummary {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut summary = ImportSummary::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                summary.skipped += 1;
                info!("CSV parsing error: {}", e);
                continue;
            }
        };

        let user_id = record.get(0).unwrap_or("").trim();
        let role = record.get(1).unwrap_or("").trim();
        if user_id.is_empty() {
            summary.skipped += 1;
            info!("Skipping record without user_id");
            continue;
        }

        let role = match role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                summary.skipped += 1;
                info!("Skipping {}: {}", user_id, e);
                continue;
            }
        };

        match repo.upsert(user_id, role).await {
            Ok(_) => summary.imported += 1,
            Err(e) => {
                summary.skipped += 1;
                error!("Failed to import {}: {}", user_id, e);
            }
        }
    }

    summary
}
