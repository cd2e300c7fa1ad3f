//! constants.rs
//! Pipeline sizing defaults and gzip envelope constants.

/// gzip member magic (RFC 1952, ID1 ID2).
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Fixed gzip member header length (without optional fields).
pub const GZIP_HEADER_LEN: usize = 10;
/// gzip trailer: CRC32 + ISIZE.
pub const GZIP_TRAILER_LEN: usize = 8;

/// Defaults when Option<T> is None
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024; // 8 KiB
/// Smallest conduit chunk; anything lower is rounded up.
pub const MIN_CHUNK_SIZE: usize = 64;
/// Max chunk size sanity bound (1 MiB).
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Number of chunks the conduit holds before the producer blocks.
pub const DEFAULT_PIPE_CAPACITY: usize = 4;
pub const MIN_PIPE_CAPACITY: usize = 1;
pub const MAX_PIPE_CAPACITY: usize = 256;

/// Record separator written after every encoded value.
pub const VALUE_TERMINATOR: &[u8] = b"\n";
