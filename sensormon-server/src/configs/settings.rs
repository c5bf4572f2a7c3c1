use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

const DEFAULT_SETTINGS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../",
    "configs/default.toml"
));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

/// Raw socket readings are pushed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    pub host: String,
    pub port: u16,
    /// Largest accepted message in bytes
    pub max_payload: usize,
    pub read_timeout_ms: u64,
}

/// Operator API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub clean_start: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub operation_log: String,
    pub anomaly_log: String,
    pub mirror_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refresh {
    pub interval_ms: u64,
    pub window_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Latest temperature above this raises the live warning
    pub live_temp_warn: f64,
    /// Aggregate maximum temperature above this raises the statistical warning
    pub stat_temp_warn: f64,
    pub anomaly_temp: f64,
    pub anomaly_humidity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            live_temp_warn: 25.0,
            stat_temp_warn: 40.0,
            anomaly_temp: 25.0,
            anomaly_humidity: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub listener: Listener,
    pub server: Server,
    pub database: Database,
    pub audit: Audit,
    pub refresh: Refresh,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Settings {
    /// Resolution order: `SENSORMON_CONFIG`, then `configs/<RUN_MODE>.toml`,
    /// then the defaults compiled into the binary.
    pub fn new() -> Result<Self, SettingsError> {
        Self::resolve(
            env::var("SENSORMON_CONFIG").ok(),
            env::var("RUN_MODE").ok(),
            Path::new("configs"),
        )
    }

    /// Same order as [`Settings::new`] with the environment lookups passed in.
    pub fn resolve(
        config_path: Option<String>,
        run_mode: Option<String>,
        config_dir: &Path,
    ) -> Result<Self, SettingsError> {
        if let Some(path) = config_path {
            return Self::from_file(path);
        }

        let run_mode = run_mode.unwrap_or("development".into());
        let candidate = config_dir.join(format!("{run_mode}.toml"));

        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            Self::from_toml(DEFAULT_SETTINGS)
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path.as_ref())?;

        tracing::debug!("load settings from {}", path.as_ref().display());

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;

        settings.validate()?;

        settings.audit.operation_log = Self::normalize_path(&settings.audit.operation_log)?
            .to_string_lossy()
            .to_string();
        settings.audit.anomaly_log = Self::normalize_path(&settings.audit.anomaly_log)?
            .to_string_lossy()
            .to_string();

        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.listener.max_payload == 0 {
            return Err(SettingsError::Invalid("listener.max_payload must be positive".into()));
        }
        if self.refresh.interval_ms == 0 {
            return Err(SettingsError::Invalid("refresh.interval_ms must be positive".into()));
        }
        if self.refresh.window_size == 0 {
            return Err(SettingsError::Invalid("refresh.window_size must be positive".into()));
        }
        if self.audit.mirror_capacity == 0 {
            return Err(SettingsError::Invalid("audit.mirror_capacity must be positive".into()));
        }

        Ok(())
    }

    fn normalize_path(path: &str) -> io::Result<PathBuf> {
        let path_buf = PathBuf::from(path);

        Ok(if path_buf.is_absolute() {
            path_buf
        } else {
            env::current_dir()?.join(&path_buf)
        })
    }
}

fn default_max_connections() -> u32 {
    10
}
