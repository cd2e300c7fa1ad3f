// One-shot API over `Encoder` / `Decoder`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::stream::decoder::Decoder;
use crate::stream::encoder::Encoder;
use crate::stream::pipeline::PipelineConfig;
use crate::types::Result;

/// 📦 Serialize and compress `value` into a fresh buffer.
/// On error no bytes are returned.
pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    marshal_with(value, PipelineConfig::default())
}

pub fn marshal_with<T: Serialize + ?Sized>(value: &T, config: PipelineConfig) -> Result<Vec<u8>> {
    let mut encoder = Encoder::with_config(Vec::new(), config);
    encoder.encode(value)?;
    Ok(encoder.into_inner())
}

/// 📭 Decompress and deserialize one value from `bytes`.
pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    unmarshal_with(bytes, PipelineConfig::default())
}

pub fn unmarshal_with<T: DeserializeOwned>(bytes: &[u8], config: PipelineConfig) -> Result<T> {
    Decoder::with_config(bytes, config).decode()
}

/// Populate an existing destination. On error `dest` is left untouched.
pub fn unmarshal_into<T: DeserializeOwned>(bytes: &[u8], dest: &mut T) -> Result<()> {
    *dest = unmarshal(bytes)?;
    Ok(())
}
