//! Time-ordered 12-byte identifiers.
//!
//! Every stored sample is keyed by an [`Id`]. The high-order bytes hold the
//! creation time, so byte-lexicographic order of identifiers is the order in
//! which they were minted, and a range query can compute its seek position
//! straight from a wall-clock bound.
//!
//! # Layout
//!
//! ```text
//! 0        4         7     9        12
//! ├────────┼─────────┼─────┼────────┤
//! │ secs   │ machine │ pid │ counter│
//! │ u32 BE │ 3 bytes │ u16 │ u24 BE │
//! └────────┴─────────┴─────┴────────┘
//! ```
//!
//! - `secs`: seconds since the Unix epoch, big-endian
//! - `machine`: random discriminator chosen once per process
//! - `pid`: low 16 bits of the process id
//! - `counter`: per-process atomic counter, big-endian
//!
//! Identifiers minted in the same process and the same second differ in the
//! counter, which increases with every mint, so they stay strictly ordered.
//! Identifiers from different processes collide only if both the
//! discriminator and pid collide and the counters line up.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{ArgumentError, Result};

/// Length of an identifier in bytes.
pub const ID_LEN: usize = 12;

/// Number of leading bytes that carry the timestamp.
pub const TIMESTAMP_LEN: usize = 4;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Process-wide minting state.
struct Generator {
    machine: [u8; 3],
    pid: [u8; 2],
    counter: AtomicU32,
}

static GENERATOR: LazyLock<Generator> = LazyLock::new(|| {
    #[allow(clippy::cast_possible_truncation)] // only the low 16 bits are kept
    let pid = (std::process::id() & 0xFFFF) as u16;
    Generator {
        machine: rand::random(),
        pid: pid.to_be_bytes(),
        // Seeded in the lower half of the 24-bit space so a process can mint
        // millions of identifiers before the counter wraps.
        counter: AtomicU32::new(rand::random::<u32>() & 0x007F_FFFF),
    }
});

impl Generator {
    fn mint(&self, secs: u32) -> Id {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..7].copy_from_slice(&self.machine);
        bytes[7..9].copy_from_slice(&self.pid);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Id(bytes)
    }
}

/// A 12-byte identifier whose byte order equals its creation-time order.
///
/// `Ord` compares the raw bytes, which is the same order the store keeps keys
/// in.
///
/// # Examples
///
/// ```
/// use vigil::Id;
///
/// let first = Id::new();
/// let second = Id::new();
/// assert!(first < second);
///
/// let parsed = Id::from_bytes(first.as_bytes())?;
/// assert_eq!(parsed, first);
/// # Ok::<(), vigil::VigilError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// The all-zero identifier, meaning "no identifier assigned yet".
    pub const NIL: Id = Id([0u8; ID_LEN]);

    /// Mints a fresh identifier stamped with the current time.
    pub fn new() -> Self {
        Self::with_time(SystemTime::now())
    }

    /// Mints an identifier stamped with `time`, truncated to whole seconds.
    ///
    /// Times before the Unix epoch clamp to zero and times beyond what four
    /// bytes of seconds can hold clamp to the maximum.
    pub fn with_time(time: SystemTime) -> Self {
        GENERATOR.mint(epoch_secs(time))
    }

    /// Parses an identifier from its 12 raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MalformedId`] if `bytes` is not exactly 12
    /// bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ID_LEN] = bytes.try_into().map_err(|_| ArgumentError::MalformedId {
            length: bytes.len(),
        })?;
        Ok(Id(array))
    }

    /// Returns the raw bytes, which are also the storage key.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Returns the leading timestamp bytes, usable as a seek prefix.
    pub fn timestamp_prefix(&self) -> &[u8] {
        &self.0[..TIMESTAMP_LEN]
    }

    /// Returns the embedded creation time (second granularity).
    pub fn time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.secs()))
    }

    /// Returns the embedded seconds since the Unix epoch.
    pub fn secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns the embedded counter value.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }

    /// Returns `true` for [`Id::NIL`].
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }
}

fn epoch_secs(time: SystemTime) -> u32 {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = crate::error::VigilError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|_| ArgumentError::MalformedIdString {
            input: s.to_string(),
        })?;
        if bytes.len() != ID_LEN {
            return Err(ArgumentError::MalformedIdString {
                input: s.to_string(),
            }
            .into());
        }
        Self::from_bytes(&bytes)
    }
}
