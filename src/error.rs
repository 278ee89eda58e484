//! Error types for femtojpeg

use std::fmt;

/// Result type for femtojpeg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for femtojpeg operations.
///
/// All errors are raised synchronously before any container bytes are
/// emitted; a failed call never returns a partial container.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Image dimensions are zero, odd, or exceed the 16-bit frame header
    /// fields. 4:2:0 subsampling requires even width and height.
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },
    /// A quantization step or symbol count exceeds its container field width
    TableOverflow {
        table: &'static str,
        value: u32,
        max: u32,
    },
    /// A code table spec has non-monotonic offsets or an impossible
    /// code-length distribution
    MalformedCodeSpec(&'static str),
    /// The entropy payload would push the container past its addressable size
    PayloadTooLarge { length: usize, max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid dimensions {}x{}: {}", width, height, reason)
            }
            Error::TableOverflow { table, value, max } => {
                write!(f, "{} value {} exceeds field maximum {}", table, value, max)
            }
            Error::MalformedCodeSpec(reason) => {
                write!(f, "Malformed Huffman code spec: {}", reason)
            }
            Error::PayloadTooLarge { length, max } => {
                write!(f, "Entropy payload of {} bytes exceeds maximum {}", length, max)
            }
        }
    }
}

impl std::error::Error for Error {}
