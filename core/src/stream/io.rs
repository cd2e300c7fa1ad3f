//! stream/io.rs
//! Adapter wrapped around caller-owned I/O for the duration of a call.

use std::io::{self, BufRead, Read, Write};

use crate::compression::FaultProbe;

/// Remembers whether the wrapped sink/source itself failed.
///
/// A sink that accepts zero bytes of a non-empty buffer has rejected the
/// write, even without returning an error.
#[derive(Debug)]
pub struct FaultTracker<T> {
    inner: T,
    faulted: bool,
}

impl<T> FaultTracker<T> {
    pub fn new(inner: T) -> Self {
        Self { inner, faulted: false }
    }

    /// Clear the fault flag before a new call.
    pub fn reset_fault(&mut self) {
        self.faulted = false;
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn track<V>(&mut self, res: io::Result<V>) -> io::Result<V> {
        if let Err(e) = &res {
            if e.kind() != io::ErrorKind::Interrupted {
                self.faulted = true;
            }
        }
        res
    }
}

impl<T> FaultProbe for FaultTracker<T> {
    fn faulted(&self) -> bool {
        self.faulted
    }
}

impl<W: Write> Write for FaultTracker<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res = self.inner.write(buf);
        let n = self.track(res)?;
        if n == 0 && !buf.is_empty() {
            self.faulted = true;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let res = self.inner.flush();
        self.track(res)
    }
}

impl<R: Read> Read for FaultTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let res = self.inner.read(buf);
        self.track(res)
    }
}

impl<R: BufRead> BufRead for FaultTracker<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.inner.fill_buf() {
            Ok(buf) => Ok(buf),
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.faulted = true;
                }
                Err(e)
            }
        }
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}
