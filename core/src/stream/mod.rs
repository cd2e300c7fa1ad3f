//! stream: JSON ⇄ gzip streaming bridge.
//!
//! Layers, bottom-up:
//! - `io`: fault tracking around caller I/O.
//! - `pipe`: bounded in-process conduit used by the threaded pipelines.
//! - `pipeline`: serializer/compressor composition, inline or threaded.
//! - `encoder` / `decoder`: long-lived wrappers over a caller sink/source.
//! - `core`: one-shot API.

pub mod io;
pub mod pipe;
pub mod pipeline;
pub mod encoder;
pub mod decoder;
pub mod core;

pub use pipeline::{PipelineConfig, PipelineMode};

pub use encoder::Encoder;
pub use decoder::Decoder;

pub use self::core::{
    marshal,
    marshal_with,
    unmarshal,
    unmarshal_into,
    unmarshal_with,
};
