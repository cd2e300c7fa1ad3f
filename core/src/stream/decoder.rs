//! stream/decoder.rs
//! Streaming decoder: one value out of one gzip member per `decode` call.

use std::io::{BufRead, BufReader, Read};

use serde::de::DeserializeOwned;

use crate::compression::FaultProbe;
use crate::stream::io::FaultTracker;
use crate::stream::pipeline::{run_decode_inline, run_decode_pipeline, PipelineConfig};
use crate::types::{Result, StreamError};

/// Wraps a caller-owned source.
///
/// A single `BufReader` is kept across calls: the gzip reader only consumes
/// up to the end of its member, so the next member stays buffered here.
pub struct Decoder<R: Read> {
    source: FaultTracker<BufReader<R>>,
    config: PipelineConfig,
}

impl<R: Read> Decoder<R> {
    pub fn new(source: R) -> Self {
        Self::with_config(source, PipelineConfig::default())
    }

    pub fn with_config(source: R, config: PipelineConfig) -> Self {
        let config = config.normalized();
        Self {
            source: FaultTracker::new(BufReader::with_capacity(config.chunk_size, source)),
            config,
        }
    }

    /// Decode on the calling thread whatever the configured mode.
    /// Works with sources that are not `Send`.
    pub fn decode_inline<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.source.reset_fault();
        run_decode_inline(&mut self.source, self.config.chunk_size)
    }

    /// `true` once the source has no bytes left.
    pub fn is_exhausted(&mut self) -> Result<bool> {
        self.source.reset_fault();
        let empty = self.source.fill_buf().map(|buf| buf.is_empty());
        empty.map_err(|e| StreamError::from_source_side(e, self.source.faulted()))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &R {
        self.source.get_ref().get_ref()
    }

    /// Returns the caller's source. Read-ahead bytes not yet decoded are lost.
    pub fn into_inner(self) -> R {
        self.source.into_inner().into_inner()
    }
}

impl<R: Read + Send> Decoder<R> {
    /// Read the next gzip member and deserialize one value from it.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.source.reset_fault();
        run_decode_pipeline(&mut self.source, &self.config)
    }

    /// Like `decode`, but populates an existing destination.
    /// On error `dest` is left untouched.
    pub fn decode_into<T: DeserializeOwned>(&mut self, dest: &mut T) -> Result<()> {
        *dest = self.decode()?;
        Ok(())
    }
}
