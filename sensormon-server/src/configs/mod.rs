mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{Audit, Database, Listener, Logger, Refresh, Server, Settings, Thresholds};
pub use storage::Storage;
