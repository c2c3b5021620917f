//! Configuration service implementation.
//!
//! Loads `RootConfig` from `config.toml` (see [`HireflowPaths`]) and applies
//! environment overrides on top:
//!
//! - `HIREFLOW_BACKEND_URL` replaces `backend.base_url`
//! - `HIREFLOW_API_TOKEN` replaces `backend.api_token`
//!
//! A missing file yields the defaults.

use crate::paths::{CONFIG_PATH_ENV, HireflowPaths};
use hireflow_core::config::RootConfig;
use hireflow_core::error::{HireError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const BACKEND_URL_ENV: &str = "HIREFLOW_BACKEND_URL";
pub const API_TOKEN_ENV: &str = "HIREFLOW_API_TOKEN";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration service that loads and caches the root configuration.
#[derive(Clone)]
pub struct ConfigService {
    /// Explicit file location; resolved from the environment when `None`
    path: Option<PathBuf>,
    env: EnvLookup,
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the process environment.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new() -> Self {
        Self {
            path: None,
            env: Arc::new(|key| std::env::var(key).ok()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads from a fixed file instead of the resolved default.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replaces the environment lookup used for overrides.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// The config file this service reads.
    pub fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let override_path = (self.env)(CONFIG_PATH_ENV);
        HireflowPaths::resolve_config_file(override_path.as_deref())
            .map_err(|e| HireError::config(e.to_string()))
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// An unreadable file is logged and replaced by defaults (with overrides).
    pub fn get_config(&self) -> RootConfig {
        if let Some(cached) = self.read_cache() {
            return cached;
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] Falling back to defaults: {}", e);
                self.apply_env(RootConfig::default())
            }
        };

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }
        loaded
    }

    /// Loads the configuration from disk, bypassing the cache.
    pub fn load(&self) -> Result<RootConfig> {
        let path = self.config_path()?;
        let config = Self::read_file(&path)?;
        Ok(self.apply_env(config))
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    /// Writes a default `config.toml` when none exists; returns its path.
    pub fn write_default(&self) -> Result<PathBuf> {
        let path = self.config_path()?;
        if path.exists() {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&RootConfig::default())?;
        std::fs::write(&path, content)?;
        tracing::info!("[ConfigService] Wrote default config to {}", path.display());
        Ok(path)
    }

    fn read_cache(&self) -> Option<RootConfig> {
        self.config.read().ok().and_then(|cache| cache.clone())
    }

    fn read_file(path: &Path) -> Result<RootConfig> {
        if !path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                path.display()
            );
            return Ok(RootConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env(&self, mut config: RootConfig) -> RootConfig {
        if let Some(url) = (self.env)(BACKEND_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.backend.base_url = url.trim().to_string();
        }
        if let Some(token) = (self.env)(API_TOKEN_ENV).filter(|value| !value.trim().is_empty()) {
            config.backend.api_token = Some(token.trim().to_string());
        }
        config
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
