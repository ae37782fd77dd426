//! Positional cursors over one sub-namespace.
//!
//! A [`Cursor`] walks the keys of a single service in byte order. Keys it
//! yields are namespace-relative, i.e. the bare 12 identifier bytes; the
//! framing prefix is added on seek and stripped on read. The range engine and
//! the paginator are written against this trait, so they never see how the
//! sub-namespace is laid out in storage.

use rocksdb::{DB, DBRawIteratorWithThreadMode};

use crate::error::{Result, StorageError};
use crate::layout::Namespace;

/// A bidirectional cursor over the entries of one sub-namespace.
///
/// Positioning methods move the cursor; [`Cursor::entry`] reads the entry it
/// currently points at, or `None` once it has moved past either end.
pub trait Cursor {
    /// Positions at the first entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    fn first(&mut self) -> Result<()>;

    /// Positions at the last entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    fn last(&mut self) -> Result<()>;

    /// Positions at the first entry whose key is `>= key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    fn seek(&mut self, key: &[u8]) -> Result<()>;

    /// Moves to the next entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    fn advance(&mut self) -> Result<()>;

    /// Moves to the previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage fails.
    fn retreat(&mut self) -> Result<()>;

    /// Returns the current `(key, value)`, or `None` if unpositioned.
    fn entry(&self) -> Option<(&[u8], &[u8])>;
}

/// Counts every entry with a full forward scan.
///
/// # Errors
///
/// Returns an error if the underlying storage fails.
pub fn count_entries<C: Cursor>(cursor: &mut C) -> Result<usize> {
    let mut count = 0;
    cursor.first()?;
    while cursor.entry().is_some() {
        count += 1;
        cursor.advance()?;
    }
    Ok(count)
}

/// [`Cursor`] over a RocksDB raw iterator bounded to one namespace.
///
/// The iterator is expected to have been created with
/// [`Namespace::read_options`], so `seek_to_first`/`seek_to_last` land on the
/// namespace's own ends.
pub struct BucketCursor<'a> {
    raw: DBRawIteratorWithThreadMode<'a, DB>,
    namespace: &'a Namespace,
}

impl<'a> BucketCursor<'a> {
    /// Wraps a raw iterator confined to `namespace`.
    pub fn new(raw: DBRawIteratorWithThreadMode<'a, DB>, namespace: &'a Namespace) -> Self {
        Self { raw, namespace }
    }

    fn check(&self) -> Result<()> {
        if self.raw.valid() {
            return Ok(());
        }
        self.raw
            .status()
            .map_err(|source| StorageError::Read { source }.into())
    }
}

impl Cursor for BucketCursor<'_> {
    fn first(&mut self) -> Result<()> {
        self.raw.seek_to_first();
        self.check()
    }

    fn last(&mut self) -> Result<()> {
        self.raw.seek_to_last();
        self.check()
    }

    fn seek(&mut self, key: &[u8]) -> Result<()> {
        self.raw.seek(self.namespace.key_for(key));
        self.check()
    }

    fn advance(&mut self) -> Result<()> {
        self.raw.next();
        self.check()
    }

    fn retreat(&mut self) -> Result<()> {
        self.raw.prev();
        self.check()
    }

    fn entry(&self) -> Option<(&[u8], &[u8])> {
        let (key, value) = self.raw.item()?;
        let relative = key.strip_prefix(self.namespace.prefix())?;
        Some((relative, value))
    }
}

/// In-memory cursor over sorted entries, for exercising cursor consumers.
#[cfg(test)]
pub(crate) struct MemCursor {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    position: Option<usize>,
}

#[cfg(test)]
impl MemCursor {
    pub(crate) fn new(mut entries: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        entries.sort();
        Self {
            entries,
            position: None,
        }
    }
}

#[cfg(test)]
impl Cursor for MemCursor {
    fn first(&mut self) -> Result<()> {
        self.position = if self.entries.is_empty() { None } else { Some(0) };
        Ok(())
    }

    fn last(&mut self) -> Result<()> {
        self.position = self.entries.len().checked_sub(1);
        Ok(())
    }

    fn seek(&mut self, key: &[u8]) -> Result<()> {
        let index = self.entries.partition_point(|(k, _)| k.as_slice() < key);
        self.position = (index < self.entries.len()).then_some(index);
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        self.position = self
            .position
            .map(|p| p + 1)
            .filter(|&p| p < self.entries.len());
        Ok(())
    }

    fn retreat(&mut self) -> Result<()> {
        self.position = self.position.and_then(|p| p.checked_sub(1));
        Ok(())
    }

    fn entry(&self) -> Option<(&[u8], &[u8])> {
        let (key, value) = self.entries.get(self.position?)?;
        Some((key.as_slice(), value.as_slice()))
    }
}
