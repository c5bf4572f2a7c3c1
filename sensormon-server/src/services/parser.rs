use serde_json::Value;
use time::OffsetDateTime;

use crate::errors::IngestError;
use crate::models::Reading;

/// Decode one wire message `{"temperature": <number>, "humidity": <number>}`.
///
/// Any client supplied time is ignored; the reading carries `received_at`.
pub fn parse_reading(payload: &[u8], received_at: OffsetDateTime) -> Result<Reading, IngestError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| IngestError::malformed(format!("payload is not UTF-8: {e}")))?;

    let value: Value = serde_json::from_str(text)
        .map_err(|e| IngestError::malformed(format!("payload is not JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| IngestError::malformed("payload is not a JSON object"))?;

    let field = |name: &str| -> Result<f64, IngestError> {
        object
            .get(name)
            .ok_or_else(|| IngestError::malformed(format!("missing field `{name}`")))?
            .as_f64()
            .ok_or_else(|| IngestError::malformed(format!("field `{name}` is not a number")))
    };

    Ok(Reading {
        time: received_at,
        temperature: field("temperature")?,
        humidity: field("humidity")?,
    })
}
