//! The health-check sample stored per service.

use std::time::{Duration, SystemTime};

use crate::codec::{self, Payload};
use crate::error::{CorruptError, Result};
use crate::id::Id;

/// One periodic health-check result for a monitored service.
///
/// The timestamp is not a field: it is derived from [`Sample::id`] via
/// [`Sample::at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Time-ordered identifier, [`Id::NIL`] until the sample is saved.
    pub id: Id,
    /// The service this sample belongs to. Must be non-empty to be saved.
    pub service_id: String,
    /// Time spent on the server side.
    pub server: Duration,
    /// End-to-end duration of the check.
    pub total: Duration,
    /// Status or result code.
    pub status: i32,
}

impl Sample {
    /// Creates an unsaved sample with no identifier.
    pub fn new(
        service_id: impl Into<String>,
        status: i32,
        server: Duration,
        total: Duration,
    ) -> Self {
        Self {
            id: Id::NIL,
            service_id: service_id.into(),
            server,
            total,
            status,
        }
    }

    /// Sets a caller-supplied identifier, which saving will keep.
    #[must_use]
    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    /// Returns the time embedded in the identifier.
    pub fn at(&self) -> SystemTime {
        self.id.time()
    }

    pub(crate) fn payload(&self) -> Payload {
        Payload {
            status: self.status,
            server: self.server,
            total: self.total,
        }
    }

    /// Rebuilds a sample from a namespace-relative key and its stored value.
    pub(crate) fn from_entry(service_id: &str, key: &[u8], value: &[u8]) -> Result<Self> {
        let id = Id::from_bytes(key).map_err(|_| CorruptError::Key { length: key.len() })?;
        let payload = codec::decode(key, value)?;

        Ok(Self {
            id,
            service_id: service_id.to_string(),
            server: payload.server,
            total: payload.total,
            status: payload.status,
        })
    }
}
