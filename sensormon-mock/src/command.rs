use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// A reading typed by the operator, sent as is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualReading {
    pub temperature: f64,
    pub humidity: f64,
}

/// `<temperature> <humidity>`, whitespace separated.
pub fn parse_command(line: &str) -> Option<ManualReading> {
    let mut parts = line.split_whitespace();

    let temperature = parts.next()?.parse().ok()?;
    let humidity = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some(ManualReading {
        temperature,
        humidity,
    })
}

pub struct CommandHandler {
    pub cmd_tx: mpsc::Sender<ManualReading>,
    pub cmd_rx: mpsc::Receiver<ManualReading>,
}

impl CommandHandler {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        CommandHandler { cmd_tx, cmd_rx }
    }

    /// Forward stdin lines as manual readings until stdin closes.
    pub fn start_stdin_processor(&self) {
        let cmd_tx = self.cmd_tx.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match parse_command(&line) {
                        Some(reading) => {
                            tracing::debug!("Receive: {:?}", reading);

                            if cmd_tx.send(reading).await.is_err() {
                                break;
                            }
                        }
                        None => tracing::warn!("expected `<temperature> <humidity>`, got {:?}", line),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("stdin read failed: {}", e);
                        break;
                    }
                }
            }

            tracing::debug!("stdin closed, manual readings disabled");
        });
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
