//! # vigil
//!
//! Embedded time-ordered storage for service health-check samples.
//!
//! vigil persists periodic check results (status code, server and total
//! durations) for a set of monitored services in an embedded RocksDB
//! database, and reads them back either as a time range or as a bounded,
//! optionally reversed page.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Keys are 12-byte time-ordered identifiers: byte order is time order
//! - Time-range queries seek straight to a timestamp prefix, no time index
//! - One independently scannable sub-namespace per service
//! - Snapshot reads, single-batch atomic writes
//! - No background threads, no caches beyond RocksDB's own
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vigil::{Order, Sample, Store};
//! use std::time::{Duration, SystemTime};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::open("./vigil_data")?;
//!
//! // Record a check result; an identifier is minted on save
//! let mut sample = Sample::new("api", 200, Duration::from_millis(8), Duration::from_millis(31));
//! store.save(&mut sample)?;
//!
//! // Most recent ten results
//! for s in store.page("api", 10, Order::Descending)? {
//!     println!("{:?} {} {:?}", s.at(), s.status, s.total);
//! }
//!
//! // Everything since an hour ago
//! let since = SystemTime::now() - Duration::from_secs(3600);
//! let recent = store.range("api", since, SystemTime::now())?;
//! println!("{} samples, {} total", recent.len(), store.count("api")?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`Store`]: Top-level handle; opens a directory, saves and queries samples
//! - [`Sample`]: One check result; its time is derived from its [`Id`]
//! - [`Id`]: 12-byte identifier whose byte order equals mint order
//! - [`StoreConfig`]: Open-time settings, loadable from JSON
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`store`]: Store lifecycle, save, range, page, count
//! - [`id`]: Time-ordered identifiers
//! - [`codec`]: Protobuf value encoding
//! - [`layout`]: Column families and per-service key prefixes
//! - [`cursor`]: Namespace-relative cursors
//! - [`range`]: Time-range scans
//! - [`page`]: Limited forward/backward pagination
//! - [`config`]: Store configuration
//! - [`error`]: Error types

pub mod codec;
pub mod config;
pub mod cursor;
pub mod error;
pub mod id;
pub mod layout;
pub mod page;
pub mod range;
pub mod sample;
pub mod store;

// Re-export primary API types at crate root for convenience.
pub use config::StoreConfig;
pub use error::{ErrorKind, Result, VigilError};
pub use id::Id;
pub use page::Order;
pub use sample::Sample;
pub use store::Store;
