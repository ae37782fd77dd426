//! Key-space layout: one sub-namespace per service.
//!
//! The database holds two column families:
//!
//! ```text
//! services   <service id>                          -> (empty)
//! history    <len: u32 BE><service id><id: 12 B>   -> encoded payload
//! ```
//!
//! `history` is the top-level collection of samples. A service's
//! sub-namespace is the contiguous run of `history` keys sharing its
//! length-framed prefix; the length frame keeps `"svc"` and `"svc-1"` from
//! sharing a prefix. `services` records which sub-namespaces exist so that a
//! read can tell "unknown service" apart from "service with no samples".
//!
//! Iteration over a sub-namespace is bounded with lower and upper iterate
//! bounds, so no other service's keys are ever visited.

use rocksdb::{ColumnFamily, ReadOptions, Snapshot, WriteBatch};

use crate::error::{Result, StorageError, VigilError};
use crate::id::Id;

/// Column family holding every sample, keyed by namespace prefix + id.
pub const HISTORY_CF: &str = "history";

/// Column family registering which services own a sub-namespace.
pub const SERVICES_CF: &str = "services";

/// Handle to one service's sub-namespace inside [`HISTORY_CF`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    service_id: String,
    prefix: Vec<u8>,
}

impl Namespace {
    /// Computes the sub-namespace of `service_id`.
    pub fn new(service_id: &str) -> Self {
        #[allow(clippy::cast_possible_truncation)] // service ids are far shorter than 4 GiB
        let len = service_id.len() as u32;

        let mut prefix = Vec::with_capacity(4 + service_id.len());
        prefix.extend_from_slice(&len.to_be_bytes());
        prefix.extend_from_slice(service_id.as_bytes());

        Self {
            service_id: service_id.to_string(),
            prefix,
        }
    }

    /// Returns the service this namespace belongs to.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Returns the key prefix shared by every key in this namespace.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the full `history` key for a sample identifier.
    pub fn key(&self, id: &Id) -> Vec<u8> {
        self.key_for(id.as_bytes())
    }

    /// Returns the full `history` key for a namespace-relative key.
    pub fn key_for(&self, relative: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + relative.len());
        key.extend_from_slice(&self.prefix);
        key.extend_from_slice(relative);
        key
    }

    /// Returns the exclusive upper bound of this namespace, if one exists.
    pub fn upper_bound(&self) -> Option<Vec<u8>> {
        prefix_successor(&self.prefix)
    }

    /// Builds read options that confine iteration to this namespace.
    pub fn read_options(&self) -> ReadOptions {
        let mut options = ReadOptions::default();
        options.set_iterate_lower_bound(self.prefix.clone());
        if let Some(upper) = self.upper_bound() {
            options.set_iterate_upper_bound(upper);
        }
        options
    }
}

/// Returns the smallest key greater than every key starting with `prefix`.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut successor = prefix.to_vec();
    while let Some(last) = successor.pop() {
        if last < u8::MAX {
            successor.push(last + 1);
            return Some(successor);
        }
    }
    None
}

/// Looks up an existing sub-namespace on a read path.
///
/// # Errors
///
/// Returns [`VigilError::NotFound`] if the service has never been written to,
/// or a storage error if the registry cannot be read.
pub(crate) fn resolve(
    snapshot: &Snapshot<'_>,
    services: &ColumnFamily,
    service_id: &str,
) -> Result<Namespace> {
    let registered = snapshot
        .get_cf(services, service_id.as_bytes())
        .map_err(|source| StorageError::Read { source })?;

    match registered {
        Some(_) => Ok(Namespace::new(service_id)),
        None => Err(VigilError::NotFound {
            service: service_id.to_string(),
        }),
    }
}

/// Registers the sub-namespace in `batch` and returns it.
///
/// Registration is an idempotent put, so writing to an existing service just
/// rewrites its registry entry inside the same batch as the sample.
pub(crate) fn resolve_or_create(
    batch: &mut WriteBatch,
    services: &ColumnFamily,
    service_id: &str,
) -> Namespace {
    batch.put_cf(services, service_id.as_bytes(), b"");
    Namespace::new(service_id)
}
