// src/core/mod.rs
//! Shared plumbing: configuration, HTTP client, local storage

pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod service_client;

pub use config_manager::{ConfigManager, RoleSource};
pub use database::{Database, SqliteRoleStore, UserRoleRepository};
pub use fs_ops::FsOps;
pub use service_client::SupabaseClient;
