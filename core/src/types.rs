use std::io;

use thiserror::Error;
use tracing::warn;

/// Unified stream error.
/// - Exactly one variant per failure class; every failure of a call maps to one of them.
/// - The underlying serde_json / I/O error is kept as `source()`.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The value could not be turned into JSON text.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Decompressed bytes are not valid JSON for the requested shape.
    #[error("deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The gzip writer failed while compressing or finalizing.
    #[error("compression error: {0}")]
    Compression(#[source] io::Error),

    /// The source is not a valid gzip envelope: bad header, corrupt deflate
    /// data, CRC or size mismatch, or truncation.
    #[error("invalid compressed format: {0}")]
    InvalidCompressedFormat(#[source] io::Error),

    /// The caller's output sink rejected a write or flush.
    #[error("sink error: {0}")]
    Sink(#[source] io::Error),

    /// The caller's input source failed a read.
    #[error("source error: {0}")]
    Source(#[source] io::Error),
}

pub type Result<T, E = StreamError> = std::result::Result<T, E>;

impl StreamError {
    /// Classify an error raised on the write side of the gzip envelope.
    /// `sink_faulted` tells whether the caller's sink itself returned the error.
    pub fn from_sink_side(err: io::Error, sink_faulted: bool) -> Self {
        if sink_faulted {
            StreamError::Sink(err)
        } else {
            StreamError::Compression(err)
        }
    }

    /// Classify an error raised on the read side of the gzip envelope.
    /// `source_faulted` tells whether the caller's source itself returned the error.
    pub fn from_source_side(err: io::Error, source_faulted: bool) -> Self {
        if source_faulted {
            StreamError::Source(err)
        } else {
            StreamError::InvalidCompressedFormat(err)
        }
    }

    /// Short stable label, used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            StreamError::Serialization(_) => "serialization",
            StreamError::Deserialization(_) => "deserialization",
            StreamError::Compression(_) => "compression",
            StreamError::InvalidCompressedFormat(_) => "invalid_compressed_format",
            StreamError::Sink(_) => "sink",
            StreamError::Source(_) => "source",
        }
    }
}

/// Combine two outcomes of one call: the earlier failure wins, the later is logged and dropped.
pub fn first_error<T>(first: Result<()>, later: Result<T>) -> Result<T> {
    match (first, later) {
        (Ok(()), later) => later,
        (Err(first), Ok(_)) => Err(first),
        (Err(first), Err(later)) => {
            warn!(reported = first.label(), discarded = %later, "discarding later stage error");
            Err(first)
        }
    }
}
