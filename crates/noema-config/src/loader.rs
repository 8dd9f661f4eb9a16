use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::NoemaConfig;

/// Loads the Noema configuration and hands out shared snapshots.
/// Runtime reconfiguration goes through the governor's update
/// operation; the loader only reads the file.
pub struct ConfigLoader {
    config: Arc<RwLock<NoemaConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > NOEMA_CONFIG env > ~/.noema/noema.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("NOEMA_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".noema")
            .join("noema.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> noema_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<NoemaConfig>(&raw).map_err(|e| {
                noema_core::NoemaError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            NoemaConfig::default()
        };

        // Apply environment variable overrides
        let config = Self::apply_env_overrides(config);

        // Validate config — log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(noema_core::NoemaError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> NoemaConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for injection into the runtime.
    pub fn shared(&self) -> Arc<RwLock<NoemaConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (NOEMA_MAX_CONCURRENT, NOEMA_LOG_LEVEL, etc.)
    fn apply_env_overrides(mut config: NoemaConfig) -> NoemaConfig {
        if let Ok(v) = std::env::var("NOEMA_MAX_CONCURRENT") {
            if let Ok(limit) = v.parse::<usize>() {
                config.scheduler.max_concurrent = limit;
            }
        }
        if let Ok(v) = std::env::var("NOEMA_MONITOR_INTERVAL") {
            if let Ok(secs) = v.parse::<u64>() {
                config.monitor.interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("NOEMA_FALLBACK_TRUST") {
            if let Ok(trust) = v.parse::<f64>() {
                config.governance.fallback_trust = trust;
            }
        }
        if let Ok(v) = std::env::var("NOEMA_LOG_LEVEL") {
            config.logging.level = v;
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> noema_core::Result<()> {
        if !self.config_path.exists() {
            return Err(noema_core::NoemaError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.config_path)?;
        let new_config = toml::from_str::<NoemaConfig>(&raw).map_err(|e| {
            noema_core::NoemaError::Config(format!(
                "failed to parse {}: {}",
                self.config_path.display(),
                e
            ))
        })?;
        let new_config = Self::apply_env_overrides(new_config);
        if let Err(e) = new_config.validate() {
            return Err(noema_core::NoemaError::Config(e));
        }
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
