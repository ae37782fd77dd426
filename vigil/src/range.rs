//! Time-range scans over a service's samples.
//!
//! Identifiers carry their timestamp in the leading bytes, so the first sample
//! at or after `from` is found with a plain lower-bound seek on
//! `Id::with_time(from).timestamp_prefix()`. No secondary time index exists.
//!
//! # Upper bound
//!
//! The scan stops *after* the first sample whose time is not before `to`:
//! that sample is included in the result. Callers that need a strict
//! `[from, to)` window should trim the tail with [`trim_to`].

use std::time::SystemTime;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::id::Id;
use crate::sample::Sample;

/// Scans `cursor` from `from`, stopping after the first sample not before
/// `to`.
///
/// Results are in ascending time order. A decode failure aborts the scan and
/// discards everything collected so far.
///
/// # Errors
///
/// Returns a corrupt-record error if an entry fails to decode, or a storage
/// error if the cursor fails.
pub fn scan_range<C: Cursor>(
    cursor: &mut C,
    service_id: &str,
    from: SystemTime,
    to: SystemTime,
) -> Result<Vec<Sample>> {
    let seek = Id::with_time(from);
    let mut samples = Vec::new();

    cursor.seek(seek.timestamp_prefix())?;
    while let Some((key, value)) = cursor.entry() {
        let sample = Sample::from_entry(service_id, key, value)?;
        let reached_end = sample.at() >= to;
        samples.push(sample);
        if reached_end {
            break;
        }
        cursor.advance()?;
    }

    Ok(samples)
}

/// Drops trailing samples that are not strictly before `to`.
pub fn trim_to(mut samples: Vec<Sample>, to: SystemTime) -> Vec<Sample> {
    while samples.last().is_some_and(|s| s.at() >= to) {
        samples.pop();
    }
    samples
}
