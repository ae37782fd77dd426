//! Error types for the vigil sample store.

use std::fmt;

use thiserror::Error;

/// The main error type for all vigil operations.
///
/// Failures from the public [`Store`](crate::store::Store) operations arrive
/// wrapped in [`VigilError::Context`], naming the operation and the service it
/// ran against. Use [`VigilError::kind`] to classify an error without caring
/// about that wrapping.
#[derive(Error, Debug)]
pub enum VigilError {
    /// The service has no sub-namespace yet.
    ///
    /// This is distinct from a service whose sub-namespace exists but holds
    /// zero samples, which is an empty success.
    #[error("service '{service}' not found")]
    NotFound {
        /// The service that was looked up.
        service: String,
    },

    /// A caller-supplied value was rejected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// A stored key or value could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(#[from] CorruptError),

    /// The underlying database could not be opened, read, or written.
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    /// A failure annotated with the operation and service it occurred in.
    #[error("{operation} failed for service '{service}': {source}")]
    Context {
        /// The store operation that failed.
        operation: Operation,
        /// The service the operation targeted.
        service: String,
        /// The underlying error.
        #[source]
        source: Box<VigilError>,
    },
}

/// Coarse classification of a [`VigilError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`VigilError::NotFound`].
    NotFound,
    /// See [`VigilError::InvalidArgument`].
    InvalidArgument,
    /// See [`VigilError::Corrupt`].
    Corrupt,
    /// See [`VigilError::Storage`].
    StorageUnavailable,
}

/// Public store operations, used to annotate errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `Store::save`.
    Save,
    /// `Store::range`.
    Range,
    /// `Store::page`.
    Page,
    /// `Store::count`.
    Count,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Save => "save",
            Operation::Range => "range query",
            Operation::Page => "page query",
            Operation::Count => "count",
        };
        f.write_str(name)
    }
}

impl VigilError {
    /// Returns the classification of this error, looking through any
    /// [`VigilError::Context`] wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VigilError::NotFound { .. } => ErrorKind::NotFound,
            VigilError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            VigilError::Corrupt(_) => ErrorKind::Corrupt,
            VigilError::Storage(_) => ErrorKind::StorageUnavailable,
            VigilError::Context { source, .. } => source.kind(),
        }
    }

    /// Wraps this error with the operation and service it occurred in.
    #[must_use]
    pub fn context(self, operation: Operation, service: &str) -> Self {
        VigilError::Context {
            operation,
            service: service.to_string(),
            source: Box::new(self),
        }
    }
}

/// Caller-supplied values that are rejected.
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// A sample must name its service before it can be saved.
    #[error("sample has no service id")]
    EmptyServiceId,

    /// Identifier bytes were not exactly 12 bytes long.
    #[error("malformed identifier: expected 12 bytes, got {length}")]
    MalformedId {
        /// The length that was supplied.
        length: usize,
    },

    /// An identifier string was not 24 hexadecimal characters.
    #[error("malformed identifier string '{input}'")]
    MalformedIdString {
        /// The rejected input.
        input: String,
    },

    /// A duration does not fit the wire format's duration type.
    #[error("{field} duration {value:?} is out of range")]
    DurationOutOfRange {
        /// Which payload field overflowed.
        field: &'static str,
        /// The rejected duration.
        value: std::time::Duration,
    },

    /// The store configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of what is wrong.
        reason: String,
    },
}

/// Stored data that could not be decoded.
#[derive(Error, Debug)]
pub enum CorruptError {
    /// A value is not a valid encoded payload.
    #[error("failed to decode value for key {key}: {source}")]
    Value {
        /// Hex form of the offending key.
        key: String,
        /// The protobuf decoding error.
        #[source]
        source: prost::DecodeError,
    },

    /// A stored duration is negative or otherwise unrepresentable.
    #[error("{field} duration in value for key {key} is invalid: {source}")]
    Duration {
        /// Hex form of the offending key.
        key: String,
        /// Which payload field was invalid.
        field: &'static str,
        /// The conversion error.
        #[source]
        source: prost_types::DurationError,
    },

    /// A stored key is not a 12-byte identifier.
    #[error("stored key is {length} bytes, expected a 12-byte identifier")]
    Key {
        /// The length of the key inside its namespace.
        length: usize,
    },

    /// A registered service name is not valid UTF-8.
    #[error("registered service name is not valid UTF-8: {source}")]
    ServiceName {
        /// The UTF-8 error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Failures of the underlying database.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The database directory could not be opened or created.
    #[error("failed to open database at '{}': {source}", path.display())]
    Open {
        /// The database directory.
        path: std::path::PathBuf,
        /// The underlying RocksDB error.
        #[source]
        source: rocksdb::Error,
    },

    /// A read or iteration failed.
    #[error("read failed: {source}")]
    Read {
        /// The underlying RocksDB error.
        #[source]
        source: rocksdb::Error,
    },

    /// A write batch failed to commit.
    #[error("write batch failed to commit: {source}")]
    Write {
        /// The underlying RocksDB error.
        #[source]
        source: rocksdb::Error,
    },

    /// A column family expected to exist after open is missing.
    #[error("column family '{name}' is missing")]
    MissingColumnFamily {
        /// The column family name.
        name: &'static str,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration '{}': {source}", path.display())]
    ConfigRead {
        /// The configuration file path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for `Result<T, VigilError>`.
pub type Result<T> = std::result::Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_context() {
        let err = VigilError::NotFound {
            service: "svc-1".to_string(),
        }
        .context(Operation::Range, "svc-1");

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "range query failed for service 'svc-1': service 'svc-1' not found"
        );
    }

    #[test]
    fn test_argument_errors_classify_as_invalid_argument() {
        let err: VigilError = ArgumentError::EmptyServiceId.into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = err.context(Operation::Save, "");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_corrupt_key_classifies_as_corrupt() {
        let err: VigilError = CorruptError::Key { length: 3 }.into();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert!(err.to_string().contains("3 bytes"));
    }
}
