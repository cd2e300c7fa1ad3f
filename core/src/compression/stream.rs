//! compression/stream.rs
//! Streaming gzip writer/reader that classify their failures.
use std::io::{self, BufRead, BufReader, Read, Write};

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, warn};

use crate::compression::types::FaultProbe;
use crate::types::{first_error, Result, StreamError};
use crate::utils::looks_like_gzip;

// ================= Write side =================

/// gzip writer over a caller sink.
pub struct EnvelopeWriter<W: Write> {
    encoder: GzEncoder<W>,
}

impl<W: Write + FaultProbe> EnvelopeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            encoder: GzEncoder::new(sink, Compression::default()),
        }
    }

    /// Map an error from this writer to `Sink` or `Compression`.
    pub fn classify(&self, err: io::Error) -> StreamError {
        StreamError::from_sink_side(err, self.encoder.get_ref().faulted())
    }

    /// Write the trailer and flush the sink. Returns the sink.
    ///
    /// Must be called even when the producer failed: the member is then
    /// well-formed framing around a truncated payload.
    pub fn finish(mut self) -> Result<W> {
        if let Err(e) = self.encoder.try_finish() {
            return Err(self.classify(e));
        }
        let mut sink = match self.encoder.finish() {
            Ok(sink) => sink,
            Err(e) => return Err(StreamError::Compression(e)),
        };
        sink.flush()
            .map_err(|e| StreamError::from_sink_side(e, sink.faulted()))?;
        Ok(sink)
    }
}

impl<W: Write> Write for EnvelopeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

/// Compress everything `reader` yields into one gzip member on `sink`.
/// - Reads in `chunk_size` blocks.
/// - Drops `reader` before finalizing so a blocked producer is released.
/// - Always finalizes; the first error wins.
///
/// Returns the sink.
pub fn compress_stream<R: Read, W: Write + FaultProbe>(
    mut reader: R,
    sink: W,
    chunk_size: usize,
) -> Result<W> {
    let mut envelope = EnvelopeWriter::new(sink);
    let mut buf = vec![0u8; chunk_size];

    let copied = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(e) = envelope.write_all(&buf[..n]) {
                    break Err(envelope.classify(e));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // The producer end of a conduit failing is a compression-stage failure.
            Err(e) => break Err(StreamError::Compression(e)),
        }
    };
    drop(reader);

    first_error(copied, envelope.finish())
}

// ================= Read side =================

/// gzip reader over a caller source, positioned on one member.
///
/// The source is only advanced as far as the member extends, so a
/// following member (or any trailing bytes) stays in `B`.
pub struct EnvelopeReader<B: BufRead> {
    decoder: BufReader<GzDecoder<B>>,
}

impl<B: BufRead + FaultProbe> EnvelopeReader<B> {
    /// Open a member and validate its header before anything is handed to a consumer.
    pub fn open(mut source: B, capacity: usize) -> Result<Self> {
        let sniff = match source.fill_buf().map(looks_like_gzip) {
            Ok(sniff) => sniff,
            Err(e) => return Err(StreamError::from_source_side(e, source.faulted())),
        };

        let mut decoder = BufReader::with_capacity(capacity, GzDecoder::new(source));
        let primed = decoder.fill_buf().map(|_| ());
        if let Err(e) = primed {
            let err = StreamError::from_source_side(e, decoder.get_ref().get_ref().faulted());
            warn!(gzip_magic = sniff, error = %err, "gzip envelope rejected");
            return Err(err);
        }
        if decoder.get_ref().header().is_none() {
            warn!(gzip_magic = sniff, "gzip envelope has no header");
            return Err(StreamError::InvalidCompressedFormat(io::Error::new(
                io::ErrorKind::InvalidData,
                "source does not start with a gzip header",
            )));
        }
        debug!("gzip header accepted");

        Ok(Self { decoder })
    }

    /// Map an error from this reader to `Source` or `InvalidCompressedFormat`.
    pub fn classify(&self, err: io::Error) -> StreamError {
        StreamError::from_source_side(err, self.decoder.get_ref().get_ref().faulted())
    }

    /// Map a deserializer error. I/O failures underneath it belong to this reader.
    pub fn classify_json(&self, err: serde_json::Error) -> StreamError {
        if err.is_io() {
            self.classify(err.into())
        } else {
            StreamError::Deserialization(err)
        }
    }

    /// Drain the rest of the member so the CRC/size trailer is verified,
    /// then hand the source back positioned right after it.
    pub fn finish(mut self) -> Result<B> {
        let mut scratch = [0u8; 1024];
        loop {
            match self.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.classify(e)),
            }
        }
        Ok(self.decoder.into_inner().into_inner())
    }
}

impl<B: BufRead> Read for EnvelopeReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.decoder.read(buf)
    }
}
