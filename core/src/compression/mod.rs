//! compression/mod.rs
//! gzip envelope stages.
//!
//! Notes:
//! - The envelope is the codec's standard gzip member; nothing is added around it.
//! - Level is the codec default, no dictionaries.
//! - Stages only see `Write` / `BufRead` plus a `FaultProbe`, never concrete sinks.

pub mod stream;
pub mod types;

pub use stream::*;
pub use types::*;
