// src/supabase/mod.rs
//! Hosted backend implementations of the identity provider and role store

pub mod identity;
pub mod roles;

pub use identity::SupabaseIdentity;
pub use roles::SupabaseRoleStore;
