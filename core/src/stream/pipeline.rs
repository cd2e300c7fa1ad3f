//! stream/pipeline.rs
//! Pure pipeline wiring: serializer ⇄ conduit ⇄ gzip envelope.
//!
//! Two realizations of the same contract:
//! - `Inline`: one thread, the serializer pushes straight into the gzip writer
//!   (decode: the deserializer pulls straight from the gzip reader).
//! - `Threaded`: two scoped threads joined by a bounded `pipe`. Both stages
//!   always terminate before the call returns.
//!
//! Only the threaded realization needs `Send` I/O.

use std::io::{self, BufRead, Read, Write};
use std::thread::{self, ScopedJoinHandle};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::compression::{compress_stream, EnvelopeReader, EnvelopeWriter, FaultProbe};
use crate::constants::VALUE_TERMINATOR;
use crate::stream::pipe::{pipe, PipeWriter};
use crate::types::{first_error, Result, StreamError};
use crate::utils::{best_chunk_size, best_pipe_capacity};

// ============================================================
// Config
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    /// Serializer and codec interleaved on the calling thread.
    #[default]
    Inline,
    /// Serializer and codec on separate threads joined by a bounded conduit.
    Threaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    /// Conduit capacity in chunks (threaded mode only).
    pub pipe_capacity: usize,
    /// Conduit chunk size and codec read buffer size.
    pub chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl PipelineConfig {
    /// `None` fields resolve to the defaults; out-of-range sizes are clamped.
    pub fn new(
        mode: Option<PipelineMode>,
        pipe_capacity: Option<usize>,
        chunk_size: Option<usize>,
    ) -> Self {
        Self {
            mode: mode.unwrap_or_default(),
            pipe_capacity: best_pipe_capacity(pipe_capacity),
            chunk_size: best_chunk_size(chunk_size),
        }
    }

    pub fn inline() -> Self {
        Self::new(Some(PipelineMode::Inline), None, None)
    }

    pub fn threaded() -> Self {
        Self::new(Some(PipelineMode::Threaded), None, None)
    }

    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = best_pipe_capacity(Some(capacity));
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = best_chunk_size(Some(chunk_size));
        self
    }

    /// Same config with every size forced back into range.
    /// Public fields can be set directly, so the pipelines never trust them as-is.
    pub fn normalized(&self) -> Self {
        Self::new(Some(self.mode), Some(self.pipe_capacity), Some(self.chunk_size))
    }
}

// ============================================================
// Shared stage helpers
// ============================================================

/// Serialize one value as a JSON text record.
fn write_value<W, T>(mut writer: W, value: &T) -> serde_json::Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(&mut writer, value)?;
    writer.write_all(VALUE_TERMINATOR).map_err(serde_json::Error::io)
}

/// Deserialize exactly one value; whatever follows it is left unread.
fn read_value<T: DeserializeOwned, R: Read>(reader: R) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    T::deserialize(&mut de)
}

fn join_stage<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(out) => out,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn abort_reason(err: &StreamError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

fn log_outcome<T>(direction: &str, outcome: &Result<T>) {
    match outcome {
        Ok(_) => debug!(direction, "pipeline finished"),
        Err(e) => warn!(direction, error = %e, kind = e.label(), "pipeline failed"),
    }
}

// ============================================================
// Encode pipeline
// ============================================================

/// Serialize `value` and compress it as one gzip member onto `sink`,
/// in the configured mode.
pub fn run_encode_pipeline<W, T>(sink: W, value: &T, config: &PipelineConfig) -> Result<()>
where
    W: Write + FaultProbe + Send,
    T: Serialize + ?Sized,
{
    let config = config.normalized();
    match config.mode {
        PipelineMode::Inline => run_encode_inline(sink, value),
        PipelineMode::Threaded => {
            debug!(mode = ?config.mode, "encode pipeline start");
            let outcome = encode_threaded(sink, value, &config);
            log_outcome("encode", &outcome);
            outcome
        }
    }
}

/// Inline encode on the calling thread. The sink need not be `Send`.
pub fn run_encode_inline<W, T>(sink: W, value: &T) -> Result<()>
where
    W: Write + FaultProbe,
    T: Serialize + ?Sized,
{
    debug!(mode = ?PipelineMode::Inline, "encode pipeline start");
    let mut envelope = EnvelopeWriter::new(sink);

    // An I/O error inside the serializer came from the envelope underneath it.
    let serialized = write_value(&mut envelope, value).map_err(|e| {
        if e.is_io() {
            envelope.classify(e.into())
        } else {
            StreamError::Serialization(e)
        }
    });
    let outcome = first_error(serialized, envelope.finish()).map(|_| ());
    log_outcome("encode", &outcome);
    outcome
}

/// Producer stage: the writer is closed on success and dropped on failure,
/// so the compressor always sees the end of the conduit.
fn serialize_stage<T>(mut writer: PipeWriter, value: &T) -> serde_json::Result<()>
where
    T: Serialize + ?Sized,
{
    write_value(&mut writer, value)?;
    writer.close().map_err(serde_json::Error::io)
}

fn encode_threaded<W, T>(sink: W, value: &T, config: &PipelineConfig) -> Result<()>
where
    W: Write + FaultProbe + Send,
    T: Serialize + ?Sized,
{
    let (writer, reader) = pipe(config.pipe_capacity, config.chunk_size);
    let chunk_size = config.chunk_size;

    let (serialized, compressed) = thread::scope(|scope| {
        let compressor =
            scope.spawn(move || compress_stream(reader, sink, chunk_size).map(|_| ()));
        let serialized = serialize_stage(writer, value);
        (serialized, join_stage(compressor))
    });

    match (serialized, compressed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), compressed) if !e.is_io() => {
            if let Err(later) = compressed {
                warn!(discarded = %later, "compression error dropped after serialization failure");
            }
            Err(StreamError::Serialization(e))
        }
        // The serializer only hit I/O because the compressor stopped reading.
        (Err(e), Err(root)) => {
            debug!(error = %e, "serializer released by compressor failure");
            Err(root)
        }
        (Err(e), Ok(())) => Err(StreamError::Compression(e.into())),
        (Ok(()), Err(e)) => Err(e),
    }
}

// ============================================================
// Decode pipeline
// ============================================================

/// Decompress one gzip member from `source` and deserialize one value from it,
/// in the configured mode.
/// On success `source` is positioned right after the member.
pub fn run_decode_pipeline<B, T>(source: B, config: &PipelineConfig) -> Result<T>
where
    B: BufRead + FaultProbe + Send,
    T: DeserializeOwned,
{
    let config = config.normalized();
    match config.mode {
        PipelineMode::Inline => run_decode_inline(source, config.chunk_size),
        PipelineMode::Threaded => {
            debug!(mode = ?config.mode, "decode pipeline start");
            let outcome = decode_threaded(source, &config);
            log_outcome("decode", &outcome);
            outcome
        }
    }
}

/// Inline decode on the calling thread. The source need not be `Send`.
pub fn run_decode_inline<B, T>(source: B, chunk_size: usize) -> Result<T>
where
    B: BufRead + FaultProbe,
    T: DeserializeOwned,
{
    debug!(mode = ?PipelineMode::Inline, "decode pipeline start");
    let outcome = decode_inline(source, best_chunk_size(Some(chunk_size)));
    log_outcome("decode", &outcome);
    outcome
}

fn decode_inline<B, T>(source: B, chunk_size: usize) -> Result<T>
where
    B: BufRead + FaultProbe,
    T: DeserializeOwned,
{
    let mut envelope = EnvelopeReader::open(source, chunk_size)?;
    let value = read_value::<T, _>(&mut envelope).map_err(|e| envelope.classify_json(e))?;
    envelope.finish()?;
    Ok(value)
}

/// Producer stage on the decode path: gzip member → conduit.
/// Any envelope failure is forwarded down the conduit as an error so the
/// deserializer never mistakes a truncated payload for malformed JSON.
fn decompress_stage<B>(source: B, mut writer: PipeWriter, chunk_size: usize) -> Result<()>
where
    B: BufRead + FaultProbe,
{
    let mut envelope = match EnvelopeReader::open(source, chunk_size) {
        Ok(envelope) => envelope,
        Err(e) => {
            writer.abort(&abort_reason(&e));
            return Err(e);
        }
    };

    let mut buf = vec![0u8; chunk_size];
    loop {
        match envelope.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = writer.write_all(&buf[..n]) {
                    // Deserializer gave up first; its error is the one reported.
                    debug!(error = %e, "decompressor released by deserializer");
                    return Err(StreamError::Deserialization(serde_json::Error::io(e)));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let err = envelope.classify(e);
                writer.abort(&abort_reason(&err));
                return Err(err);
            }
        }
    }

    if let Err(e) = envelope.finish() {
        writer.abort(&abort_reason(&e));
        return Err(e);
    }
    writer
        .close()
        .map_err(|e| StreamError::Deserialization(serde_json::Error::io(e)))
}

fn decode_threaded<B, T>(source: B, config: &PipelineConfig) -> Result<T>
where
    B: BufRead + FaultProbe + Send,
    T: DeserializeOwned,
{
    let (writer, mut reader) = pipe(config.pipe_capacity, config.chunk_size);
    let chunk_size = config.chunk_size;

    let (value, decompressed) = thread::scope(|scope| {
        let decompressor = scope.spawn(move || decompress_stage(source, writer, chunk_size));

        let value = read_value::<T, _>(&mut reader);
        if value.is_ok() {
            // Let the decompressor reach the trailer; its verdict arrives via join.
            let _ = reader.drain();
        }
        drop(reader);

        (value, join_stage(decompressor))
    });

    match (value, decompressed) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), decompressed) if !e.is_io() => {
            if let Err(later) = decompressed {
                debug!(discarded = %later, "decompressor outcome dropped after bad json");
            }
            Err(StreamError::Deserialization(e))
        }
        // The conduit was aborted: the decompressor holds the real cause.
        (Err(_), Err(root)) => Err(root),
        (Err(e), Ok(())) => Err(StreamError::InvalidCompressedFormat(e.into())),
        (Ok(_), Err(e)) => Err(e),
    }
}
