//! Binary encoding of stored sample payloads.
//!
//! Values are protobuf messages with a fixed schema. Only the payload is
//! encoded; the identifier, and with it the timestamp, lives in the key.
//!
//! ```text
//! message TimedResponse {
//!   int32 status = 1;
//!   google.protobuf.Duration server = 2;
//!   google.protobuf.Duration total = 3;
//! }
//! ```
//!
//! New fields must be appended as optional fields with fresh tags; existing
//! tags are never renumbered.

use std::time::Duration;

use prost::Message;

use crate::error::{ArgumentError, CorruptError, Result};

/// Protobuf types for stored values.
///
/// Hand-written prost derives so no protoc step is needed.
pub mod proto {
    /// The stored form of one health-check result.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct TimedResponse {
        /// Status or result code of the check.
        #[prost(int32, tag = "1")]
        pub status: i32,
        /// Time spent on the server side.
        #[prost(message, optional, tag = "2")]
        pub server: Option<prost_types::Duration>,
        /// End-to-end time of the check.
        #[prost(message, optional, tag = "3")]
        pub total: Option<prost_types::Duration>,
    }
}

/// The decoded fields of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    /// Status or result code.
    pub status: i32,
    /// Server-side duration.
    pub server: Duration,
    /// Total duration.
    pub total: Duration,
}

/// Encodes a payload into its stored form.
///
/// # Errors
///
/// Returns [`ArgumentError::DurationOutOfRange`] if a duration has more
/// seconds than the protobuf duration type can carry.
pub fn encode(payload: &Payload) -> Result<Vec<u8>> {
    let message = proto::TimedResponse {
        status: payload.status,
        server: Some(to_proto("server", payload.server)?),
        total: Some(to_proto("total", payload.total)?),
    };
    Ok(message.encode_to_vec())
}

/// Decodes a stored value.
///
/// `key` only labels errors. Missing duration fields decode as zero.
///
/// # Errors
///
/// Returns [`CorruptError::Value`] if the bytes are not a valid message and
/// [`CorruptError::Duration`] if a stored duration is negative.
pub fn decode(key: &[u8], bytes: &[u8]) -> Result<Payload> {
    let message = proto::TimedResponse::decode(bytes).map_err(|source| CorruptError::Value {
        key: hex::encode(key),
        source,
    })?;

    Ok(Payload {
        status: message.status,
        server: from_proto(key, "server", message.server)?,
        total: from_proto(key, "total", message.total)?,
    })
}

fn to_proto(field: &'static str, value: Duration) -> Result<prost_types::Duration> {
    prost_types::Duration::try_from(value)
        .map_err(|_| ArgumentError::DurationOutOfRange { field, value }.into())
}

fn from_proto(
    key: &[u8],
    field: &'static str,
    value: Option<prost_types::Duration>,
) -> Result<Duration> {
    let Some(value) = value else {
        return Ok(Duration::ZERO);
    };
    Duration::try_from(value).map_err(|source| {
        CorruptError::Duration {
            key: hex::encode(key),
            field,
            source,
        }
        .into()
    })
}
