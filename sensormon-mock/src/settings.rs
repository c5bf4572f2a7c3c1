use std::env;
use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mock {
    /// Address of the reading listener
    pub target: String,
    pub interval_ms: u64,
}

/// The simulator reads only its own tables from the shared config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub mock: Mock,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let mut settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))?;

        if let Ok(target) = env::var("SENSORMON_TARGET") {
            settings.mock.target = target;
        }

        Ok(settings)
    }
}
