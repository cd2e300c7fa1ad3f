//! stream/encoder.rs
//! Streaming encoder: one gzip member of JSON text per `encode` call.

use std::io::Write;

use serde::Serialize;

use crate::stream::io::FaultTracker;
use crate::stream::pipeline::{run_encode_inline, run_encode_pipeline, PipelineConfig};
use crate::types::Result;

/// Wraps a caller-owned sink.
///
/// - The sink is never closed; `into_inner` hands it back.
/// - After a failed `encode` the bytes already written to the sink are not a
///   usable artifact and must be discarded by the caller.
pub struct Encoder<W: Write> {
    sink: FaultTracker<W>,
    config: PipelineConfig,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, PipelineConfig::default())
    }

    pub fn with_config(sink: W, config: PipelineConfig) -> Self {
        Self {
            sink: FaultTracker::new(sink),
            config: config.normalized(),
        }
    }

    /// Encode on the calling thread whatever the configured mode.
    /// Works with sinks that are not `Send`.
    pub fn encode_inline<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.sink.reset_fault();
        run_encode_inline(&mut self.sink, value)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        self.sink.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.sink.get_mut()
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write + Send> Encoder<W> {
    /// Serialize `value`, compress it, and append the gzip member to the sink.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.sink.reset_fault();
        run_encode_pipeline(&mut self.sink, value, &self.config)
    }
}
