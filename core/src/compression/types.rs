//! compression/types.rs
//! Capability seam between the gzip stages and the caller's I/O objects.

/// Reports whether the caller-owned byte sink/source underneath has failed.
///
/// The gzip writer/reader surface every failure as a plain `io::Error`;
/// this probe is what lets the envelope stages tell a codec failure
/// (`Compression`, `InvalidCompressedFormat`) from an I/O failure (`Sink`, `Source`).
pub trait FaultProbe {
    fn faulted(&self) -> bool;
}

impl<T: FaultProbe + ?Sized> FaultProbe for &mut T {
    fn faulted(&self) -> bool {
        (**self).faulted()
    }
}
