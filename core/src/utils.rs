use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_PIPE_CAPACITY, GZIP_HEADER_LEN, GZIP_MAGIC, MAX_CHUNK_SIZE,
    MAX_PIPE_CAPACITY, MIN_CHUNK_SIZE, MIN_PIPE_CAPACITY,
};

/// Resolve a requested conduit chunk size.
/// - `None` → `DEFAULT_CHUNK_SIZE`
/// - clamps into `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`
/// - rounds up to the next power of two so chunks line up with the codec's buffers
pub fn best_chunk_size(requested: Option<usize>) -> usize {
    match requested {
        None => DEFAULT_CHUNK_SIZE,
        Some(size) => {
            if size >= MAX_CHUNK_SIZE {
                return MAX_CHUNK_SIZE;
            }
            if size <= MIN_CHUNK_SIZE {
                return MIN_CHUNK_SIZE;
            }
            size.next_power_of_two().min(MAX_CHUNK_SIZE)
        }
    }
}

/// Resolve a requested conduit capacity (in chunks).
pub fn best_pipe_capacity(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_PIPE_CAPACITY)
        .clamp(MIN_PIPE_CAPACITY, MAX_PIPE_CAPACITY)
}

/// Cheap sniff: does the buffer start like a gzip member?
/// Only a hint for diagnostics; the decoder is the authority on validity.
pub fn looks_like_gzip(buf: &[u8]) -> bool {
    buf.len() >= GZIP_HEADER_LEN && buf[..GZIP_MAGIC.len()] == GZIP_MAGIC
}
