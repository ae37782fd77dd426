//! Store module for the vigil sample store.
//!
//! This module provides the top-level API that ties all components together.
//! The [`Store`] owns the RocksDB handle and exposes the four sample
//! operations plus service enumeration.
//!
//! # Design
//!
//! - Reads pin a snapshot: the registry lookup and the cursor walk see the
//!   same consistent view and never block writers
//! - Writes are a single atomic write batch: the sub-namespace registration
//!   and the sample land together or not at all
//! - No internal threads, locks, or caches beyond RocksDB's own
//!
//! # Directory Layout
//!
//! ```text
//! store_dir/
//! ├── CURRENT, MANIFEST-*, OPTIONS-*   <- RocksDB bookkeeping
//! ├── *.sst, *.log                     <- Column families `services`, `history`
//! └── LOCK
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use vigil::{Order, Sample, Store};
//! use std::time::{Duration, SystemTime};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::open("./vigil_data")?;
//!
//! let mut sample = Sample::new("api", 200, Duration::from_millis(12), Duration::from_millis(40));
//! store.save(&mut sample)?;
//! assert!(!sample.id.is_nil());
//!
//! let newest = store.page("api", 10, Order::Descending)?;
//! let last_hour = store.range(
//!     "api",
//!     SystemTime::now() - Duration::from_secs(3600),
//!     SystemTime::now(),
//! )?;
//! println!("{} recent, {} in the last hour", newest.len(), last_hour.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::{Instant, SystemTime};

use rocksdb::{ColumnFamily, DB, IteratorMode, Options, WriteBatch, WriteOptions};

use crate::codec;
use crate::config::StoreConfig;
use crate::cursor::{self, BucketCursor};
use crate::error::{ArgumentError, CorruptError, Operation, Result, StorageError};
use crate::id::Id;
use crate::layout::{self, HISTORY_CF, SERVICES_CF};
use crate::page::{Order, Paginator};
use crate::range;
use crate::sample::Sample;

/// Top-level handle for storing and querying samples.
///
/// # Thread Safety
///
/// `Store` is `Send + Sync`. Share it by reference or behind an `Arc`;
/// concurrent reads and writes are isolated by RocksDB itself.
pub struct Store {
    db: DB,
    config: StoreConfig,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.config.path)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Opens or creates a store at `path` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(StoreConfig::new(path))
    }

    /// Opens a store with explicit settings.
    ///
    /// Both column families are created if they do not exist yet, so a
    /// freshly opened store is ready for reads and writes.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::InvalidConfig`] if the configuration is invalid
    /// - [`StorageError::Open`] if the database cannot be opened
    pub fn open_with(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let mut options = Options::default();
        options.create_if_missing(config.create_if_missing);
        options.create_missing_column_families(true);

        let db = DB::open_cf(&options, &config.path, [SERVICES_CF, HISTORY_CF]).map_err(
            |source| StorageError::Open {
                path: config.path.clone(),
                source,
            },
        )?;

        tracing::info!(path = %config.path.display(), "store opened");
        Ok(Self { db, config })
    }

    /// Persists one sample.
    ///
    /// A nil identifier is replaced by a freshly minted one; a caller-supplied
    /// identifier is kept. `sample.id` is only updated once the write has
    /// committed, so a failed save never leaves a generated identifier behind.
    ///
    /// # Errors
    ///
    /// - [`ArgumentError::EmptyServiceId`] if `service_id` is empty (no I/O
    ///   is performed)
    /// - [`ArgumentError::DurationOutOfRange`] if a duration cannot be encoded
    /// - [`StorageError::Write`] if the write batch fails to commit
    pub fn save(&self, sample: &mut Sample) -> Result<()> {
        self.save_sample(sample)
            .map_err(|e| e.context(Operation::Save, &sample.service_id))
    }

    fn save_sample(&self, sample: &mut Sample) -> Result<()> {
        let start = Instant::now();
        if sample.service_id.is_empty() {
            return Err(ArgumentError::EmptyServiceId.into());
        }

        let id = if sample.id.is_nil() { Id::new() } else { sample.id };
        let value = codec::encode(&sample.payload())?;

        let services = self.column_family(SERVICES_CF)?;
        let history = self.column_family(HISTORY_CF)?;

        let mut batch = WriteBatch::default();
        let namespace = layout::resolve_or_create(&mut batch, services, &sample.service_id);
        batch.put_cf(history, namespace.key(&id), value);

        let mut write_options = WriteOptions::default();
        write_options.set_sync(self.config.sync_writes);
        self.db
            .write_opt(batch, &write_options)
            .map_err(|source| StorageError::Write { source })?;

        sample.id = id;
        tracing::debug!(
            id = %id,
            service = %sample.service_id,
            took = ?start.elapsed(),
            "saved sample"
        );
        Ok(())
    }

    /// Returns the samples of `service_id` starting at `from`.
    ///
    /// The scan seeks to the first sample at or after `from` (second
    /// granularity) and stops after the first sample whose time is not
    /// before `to`; that sample is included. Use [`range::trim_to`] for a
    /// strict `[from, to)` window.
    ///
    /// # Errors
    ///
    /// - [`VigilError::NotFound`](crate::VigilError::NotFound) if the service
    ///   has no sub-namespace
    /// - a corrupt-record error if any entry fails to decode; no partial
    ///   results are returned
    pub fn range(&self, service_id: &str, from: SystemTime, to: SystemTime) -> Result<Vec<Sample>> {
        self.with_cursor(service_id, |mut cursor| {
            range::scan_range(&mut cursor, service_id, from, to)
        })
        .inspect(|samples| {
            tracing::trace!(service = service_id, count = samples.len(), "range query");
        })
        .map_err(|e| e.context(Operation::Range, service_id))
    }

    /// Returns up to `limit` samples of `service_id` in the given order.
    ///
    /// A `limit` of 0 returns every sample. [`Order::Ascending`] starts from
    /// the oldest sample, [`Order::Descending`] from the newest.
    ///
    /// # Errors
    ///
    /// - [`VigilError::NotFound`](crate::VigilError::NotFound) if the service
    ///   has no sub-namespace
    /// - a corrupt-record error if any entry fails to decode
    pub fn page(&self, service_id: &str, limit: usize, order: Order) -> Result<Vec<Sample>> {
        self.with_cursor(service_id, |cursor| {
            Paginator::new(cursor, service_id, limit, order).collect::<Result<Vec<_>>>()
        })
        .inspect(|samples| {
            tracing::trace!(service = service_id, count = samples.len(), ?order, "page query");
        })
        .map_err(|e| e.context(Operation::Page, service_id))
    }

    /// Counts the samples of `service_id` with a full scan.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::NotFound`](crate::VigilError::NotFound) if the
    /// service has no sub-namespace.
    pub fn count(&self, service_id: &str) -> Result<usize> {
        self.with_cursor(service_id, |mut cursor| cursor::count_entries(&mut cursor))
            .map_err(|e| e.context(Operation::Count, service_id))
    }

    /// Lists every service that owns a sub-namespace, in byte order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the registry cannot be read, or a
    /// corrupt-record error if a registered name is not UTF-8.
    pub fn services(&self) -> Result<Vec<String>> {
        let services = self.column_family(SERVICES_CF)?;
        self.db
            .iterator_cf(services, IteratorMode::Start)
            .map(|item| -> Result<String> {
                let (key, _) = item.map_err(|source| StorageError::Read { source })?;
                String::from_utf8(key.into_vec())
                    .map_err(|source| CorruptError::ServiceName { source }.into())
            })
            .collect()
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the path to the store directory.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Resolves the sub-namespace under a fresh snapshot and hands `f` a
    /// cursor confined to it.
    fn with_cursor<T, F>(&self, service_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(BucketCursor<'_>) -> Result<T>,
    {
        let services = self.column_family(SERVICES_CF)?;
        let history = self.column_family(HISTORY_CF)?;

        let snapshot = self.db.snapshot();
        let namespace = layout::resolve(&snapshot, services, service_id)?;
        let raw = snapshot.raw_iterator_cf_opt(history, namespace.read_options());

        f(BucketCursor::new(raw, &namespace))
    }

    fn column_family(&self, name: &'static str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::MissingColumnFamily { name }.into())
    }
}
