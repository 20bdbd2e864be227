// src/core/config_manager.rs
//! Configuration loading: config.yaml sections plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    Supabase,
    Sqlite,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub supabase: SupabaseConfig,
    pub paths: PathConfig,
    pub role_source: RoleSource,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PathConfig {
    pub session_path: PathBuf,
    pub job_cache_path: PathBuf,
    pub database_path: PathBuf,
}

/// One environment section of config.yaml; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
struct EnvironmentSection {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    timeout_seconds: Option<u64>,
    session_path: Option<PathBuf>,
    job_cache_path: Option<PathBuf>,
    database_path: Option<PathBuf>,
    role_source: Option<RoleSource>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl ConfigManager {
    /// Load configuration for the current environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = std::env::var("HIRELOOM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let section = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::select_section(&content, &environment)?
        } else {
            info!(
                "{} not found, using defaults and environment",
                config_path.display()
            );
            EnvironmentSection::default()
        };

        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::from_section(
            environment,
            section,
            &base_dir,
            std::env::var("SUPABASE_URL").ok(),
            std::env::var("SUPABASE_ANON_KEY").ok(),
        )
    }

    fn get_environment() -> String {
        std::env::var("HIRELOOM_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn select_section(content: &str, environment: &str) -> Result<EnvironmentSection> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    fn from_section(
        environment: String,
        section: EnvironmentSection,
        base_dir: &Path,
        url_override: Option<String>,
        key_override: Option<String>,
    ) -> Result<Self> {
        let url = url_override
            .or(section.supabase_url)
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();
        let anon_key = key_override.or(section.supabase_anon_key).unwrap_or_default();

        let resolve = |path: Option<PathBuf>, default: &str| {
            let path = path.unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        Ok(Self {
            environment,
            supabase: SupabaseConfig {
                url,
                anon_key,
                timeout_seconds: section.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            paths: PathConfig {
                session_path: resolve(section.session_path, ".hireloom/session.json"),
                job_cache_path: resolve(section.job_cache_path, ".hireloom/jobs.json"),
                database_path: resolve(section.database_path, ".hireloom/roles.db"),
            },
            role_source: section.role_source.unwrap_or(RoleSource::Supabase),
        })
    }

    /// Fail early when the hosted backend is needed but not configured
    pub fn require_supabase(&self) -> Result<&SupabaseConfig> {
        if self.supabase.url.is_empty() {
            anyhow::bail!("SUPABASE_URL is not set (environment or config.yaml)");
        }
        if self.supabase.anon_key.is_empty() {
            anyhow::bail!("SUPABASE_ANON_KEY is not set (environment or config.yaml)");
        }
        Ok(&self.supabase)
    }
}
