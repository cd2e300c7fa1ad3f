//! stream/pipe.rs
//! Bounded, blocking in-process conduit.
//!
//! `PipeWriter` batches writes into `Bytes` chunks and pushes them through a
//! `crossbeam` bounded channel; `PipeReader` pulls them back out as `Read`/`BufRead`.
//!
//! Closing rules:
//! - `PipeWriter::close` sends what is buffered, then the reader sees EOF.
//! - Dropping the writer without `close` discards its unsent bytes; the reader still sees EOF.
//! - `PipeWriter::abort` makes the reader's next read fail with the given error kind.
//! - Dropping the reader makes every later writer send fail with `BrokenPipe`,
//!   which also releases a writer blocked on a full channel.

use std::io::{self, BufRead, Read, Write};

use bytes::{Buf, Bytes, BytesMut};
use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::trace;

/// Create a conduit holding at most `capacity` chunks of `chunk_size` bytes.
pub fn pipe(capacity: usize, chunk_size: usize) -> (PipeWriter, PipeReader) {
    let chunk_size = chunk_size.max(1);
    let (tx, rx) = bounded::<io::Result<Bytes>>(capacity.max(1));
    (
        PipeWriter {
            tx,
            buf: BytesMut::with_capacity(chunk_size),
            chunk_size,
        },
        PipeReader {
            rx,
            current: Bytes::new(),
            done: false,
        },
    )
}

fn broken_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "conduit reader dropped")
}

pub struct PipeWriter {
    tx: Sender<io::Result<Bytes>>,
    buf: BytesMut,
    chunk_size: usize,
}

impl PipeWriter {
    /// Send any buffered bytes, then close the conduit.
    pub fn close(mut self) -> io::Result<()> {
        self.send_pending()
    }

    /// Close the conduit with an error instead of EOF.
    /// Buffered bytes are discarded.
    pub fn abort(self, err: &io::Error) {
        trace!(kind = ?err.kind(), "conduit aborted");
        // A dropped reader has nothing left to tell.
        let _ = self.tx.send(Err(io::Error::new(err.kind(), err.to_string())));
    }

    fn send_pending(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = self.buf.split().freeze();
        let len = chunk.len();
        self.tx.send(Ok(chunk)).map_err(|_| broken_pipe())?;
        trace!(len, "conduit chunk sent");
        Ok(())
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let room = self.chunk_size - self.buf.len();
        let n = data.len().min(room);
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() >= self.chunk_size {
            self.send_pending()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_pending()
    }
}

pub struct PipeReader {
    rx: Receiver<io::Result<Bytes>>,
    current: Bytes,
    done: bool,
}

impl PipeReader {
    /// Read and discard everything up to EOF (or the first error).
    pub fn drain(&mut self) -> io::Result<u64> {
        io::copy(self, &mut io::sink())
    }
}

impl BufRead for PipeReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.current.is_empty() && !self.done {
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    trace!(len = chunk.len(), "conduit chunk received");
                    self.current = chunk;
                }
                Ok(Err(e)) => {
                    self.done = true;
                    return Err(e);
                }
                // Every writer is gone: EOF.
                Err(_) => self.done = true,
            }
        }
        Ok(&self.current[..])
    }

    fn consume(&mut self, amt: usize) {
        self.current.advance(amt.min(self.current.len()));
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
