//! Error types for Graf

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for Graf operations
pub type Result<T> = std::result::Result<T, GrafError>;

/// Coordinate dimension named by a range error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Stage (1-based, bounded by the header's stage range)
    Stage,
    /// Scenario (1-based)
    Scenario,
    /// Block or hour within a stage (1-based)
    Block,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage => f.write_str("stage"),
            Self::Scenario => f.write_str("scenario"),
            Self::Block => f.write_str("block"),
        }
    }
}

/// Errors that can occur in Graf
#[derive(Debug, Error)]
pub enum GrafError {
    /// File could not be opened
    #[error("could not open file {}: {source}", .path.display())]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Fewer bytes available than the layout requires
    #[error("could not read {requested} bytes from file {}{}", .path.display(), os_detail(.source.as_ref()))]
    Truncated {
        /// Number of bytes the read asked for
        requested: usize,
        /// File being read
        path: PathBuf,
        /// Underlying OS error, when the read failed rather than hit end-of-file
        #[source]
        source: Option<io::Error>,
    },

    /// Structurally invalid header
    #[error("Invalid header format: {0}")]
    InvalidFormat(String),

    /// Text bytes invalid for the declared encoding
    #[error("bytes {bytes:02x?} are not valid {encoding}")]
    Decode {
        /// Encoding name
        encoding: &'static str,
        /// Offending raw bytes
        bytes: Vec<u8>,
    },

    /// Encoding label not recognised
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// Coordinate outside the header's bounds
    #[error("{dimension} {value} out of range ({min}..={max})")]
    OutOfRange {
        /// Offending dimension
        dimension: Dimension,
        /// Requested value
        value: i32,
        /// Smallest valid value
        min: i32,
        /// Largest valid value
        max: i32,
    },

    /// Operation on a closed session
    #[error("binary session is closed")]
    Closed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn os_detail(source: Option<&io::Error>) -> String {
    match source {
        Some(err) => format!(": {err}"),
        None => String::new(),
    }
}

impl GrafError {
    /// Map a failed exact read into a truncation error
    ///
    /// End-of-file carries no OS error text, any other failure keeps it.
    pub(crate) fn truncated(requested: usize, path: impl Into<PathBuf>, err: io::Error) -> Self {
        let source = if err.kind() == io::ErrorKind::UnexpectedEof {
            None
        } else {
            Some(err)
        };
        Self::Truncated {
            requested,
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports a short read
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
