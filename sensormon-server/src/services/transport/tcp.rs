use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::errors::IngestError;
use crate::services::{AuditLogger, IngestOutcome, IngestService};

/// Accepts device connections, one reading per connection.
pub struct ReadingListener {
    addr: SocketAddr,
    ingest: Arc<IngestService>,
    audit: Arc<AuditLogger>,
    max_payload: usize,
    read_timeout: Duration,
}

impl ReadingListener {
    pub fn new(addr: SocketAddr, ingest: Arc<IngestService>, audit: Arc<AuditLogger>) -> Self {
        Self {
            addr,
            ingest,
            audit,
            max_payload: 1024,
            read_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub async fn start(&self) -> Result<ListenerHandle, std::io::Error> {
        let listener = TcpListener::bind(&self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("reading listener on {}", local_addr);

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let ingest = self.ingest.clone();
        let audit = self.audit.clone();
        let max_payload = self.max_payload;
        let read_timeout = self.read_timeout;

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::info!("reading listener shutting down");
                        break;
                    },
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, addr)) => {
                                let ingest = ingest.clone();
                                let audit = audit.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(
                                        stream,
                                        addr,
                                        ingest,
                                        audit,
                                        max_payload,
                                        read_timeout,
                                    ).await;
                                });
                            },
                            Err(e) => {
                                tracing::error!("Failed to accept TCP connection: {}", e);
                            }
                        }
                    }
                }
            }
        });

        Ok(ListenerHandle {
            local_addr,
            stop_tx,
            task,
        })
    }

    async fn handle_connection(
        mut stream: TcpStream,
        addr: SocketAddr,
        ingest: Arc<IngestService>,
        audit: Arc<AuditLogger>,
        max_payload: usize,
        read_timeout: Duration,
    ) {
        let result = match read_payload(&mut stream, max_payload, read_timeout).await {
            Ok(payload) => ingest.ingest(&payload).await,
            Err(e) => Err(e),
        };

        // Connection closes here, nothing is written back
        drop(stream);

        match result {
            Ok(IngestOutcome::Applied { anomalies }) => {
                tracing::debug!("reading from {} applied, {} anomalies", addr, anomalies);
            }
            Ok(IngestOutcome::Dropped) => {
                tracing::debug!("reading from {} dropped, equipment stopped", addr);
            }
            Err(e) => {
                audit.operation(format!("ingestion error from {addr}: {e}")).await;
            }
        }
    }
}

/// Single bounded read. Anything larger than `max_payload` or an empty read
/// is malformed.
async fn read_payload(
    stream: &mut TcpStream,
    max_payload: usize,
    read_timeout: Duration,
) -> Result<Vec<u8>, IngestError> {
    let mut buffer = vec![0u8; max_payload + 1];

    let read = tokio::time::timeout(read_timeout, stream.read(&mut buffer))
        .await
        .map_err(|_| IngestError::ReadTimeout(read_timeout))??;

    if read == 0 {
        return Err(IngestError::malformed("empty payload"));
    }
    if read > max_payload {
        return Err(IngestError::malformed(format!(
            "payload exceeds {max_payload} bytes"
        )));
    }

    buffer.truncate(read);

    Ok(buffer)
}

pub struct ListenerHandle {
    local_addr: SocketAddr,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections. Connections already accepted finish
    /// on their own tasks.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());

        if let Err(e) = self.task.await {
            tracing::error!("reading listener ended abnormally: {}", e);
        }
    }
}
