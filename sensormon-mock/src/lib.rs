use std::error::Error;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ::time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time;

use crate::command::CommandHandler;
use crate::settings::Settings;
use crate::simulate::{Simulator, day_fraction};

mod command;
pub mod settings;
mod simulate;

/// Wire payload understood by the reading listener.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SensorPayload {
    pub temperature: f64,
    pub humidity: f64,
}

pub async fn run(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let simulator = Simulator::new(0.3, 1.0)?;
    let mut command_handler = CommandHandler::new();
    command_handler.start_stdin_processor();

    let period = Duration::from_millis(settings.mock.interval_ms);
    let mut interval = time::interval(period);

    tracing::info!("pushing readings to {} every {:?}", settings.mock.target, period);

    loop {
        tokio::select! {
            Some(reading) = command_handler.cmd_rx.recv() => {
                let payload = SensorPayload {
                    temperature: reading.temperature,
                    humidity: reading.humidity,
                };

                send_reading(&settings.mock.target, payload).await;
            },
            _ = interval.tick() => {
                let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
                let (temperature, humidity) = simulator.sample(&mut rand::rng(), day_fraction(now));

                send_reading(&settings.mock.target, SensorPayload { temperature, humidity }).await;
            }
        }
    }
}

/// One connection per reading. A refused connection is logged and the
/// simulator keeps going.
async fn send_reading(target: &str, payload: SensorPayload) {
    if let Err(e) = push(target, payload).await {
        tracing::warn!("failed to send reading to {}: {}", target, e);
    }
}

async fn push(target: &str, payload: SensorPayload) -> Result<(), Box<dyn Error>> {
    let body = serde_json::to_vec(&payload)?;

    let mut stream = TcpStream::connect(target).await?;
    stream.write_all(&body).await?;
    stream.shutdown().await?;

    tracing::debug!("Send: {}", String::from_utf8_lossy(&body));

    Ok(())
}
