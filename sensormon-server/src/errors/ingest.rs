use std::io;
use std::time::Duration;

use super::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    #[error("No payload received within {0:?}")]
    ReadTimeout(Duration),
}

impl IngestError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        IngestError::MalformedPayload(reason.into())
    }
}
