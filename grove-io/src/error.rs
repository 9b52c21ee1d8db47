use std::path::PathBuf;

use thiserror::Error;

use crate::base::FileFormat;

/// The failure modes of the read/save entry points in [`crate::base`].
///
/// The codecs themselves report `anyhow` errors with full context chains; the
/// entry points sort those into this taxonomy so callers can react to the class
/// of failure without string-matching messages. No variant is ever substituted
/// with a default value: a failed or empty parse is an error, not a fallback.
#[derive(Debug, Error)]
pub enum PointSetIoError {
    /// The path could not be opened, or the underlying stream failed
    /// mid-operation. A failed save leaves the destination file in an
    /// undefined, possibly truncated state.
    #[error("cannot access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The file extension names no format that supports the requested operation
    #[error("unsupported point set format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
    /// The codec matching the extension rejected the stream contents
    #[error("corrupt {} data in {}", .format, .path.display())]
    CorruptFormat {
        path: PathBuf,
        format: FileFormat,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Parsing succeeded but the file contains no points
    #[error("no point data in {}", .path.display())]
    EmptyData { path: PathBuf },
}
