//! gzjson-core
//!
//! Streaming bridge between serde_json and gzip.
//! Values are serialized straight into the compressor (and back) without
//! holding the whole JSON text in memory.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod compression;

// Stream layer
pub mod stream;

pub use stream::{
    marshal, marshal_with, unmarshal, unmarshal_into, unmarshal_with, Decoder, Encoder,
    PipelineConfig, PipelineMode,
};
pub use types::{Result, StreamError};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::stream::{Decoder, Encoder, PipelineConfig, PipelineMode};
    pub use crate::types::{Result, StreamError};
    pub use crate::{marshal, unmarshal};
}
