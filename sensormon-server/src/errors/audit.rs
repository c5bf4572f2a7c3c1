use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LogWriteError {
    #[error("Failed to append to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
