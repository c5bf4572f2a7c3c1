use std::io;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
