pub mod audit;
pub mod ingest;
pub mod persistence;
pub mod settings;

pub use audit::LogWriteError;
pub use ingest::IngestError;
pub use persistence::PersistenceError;
pub use settings::SettingsError;
