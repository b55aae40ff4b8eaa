//! Caching layer: decoded-image LRU (C10) and derived display/processing
//! scale cache (C11).

pub mod decode;
pub mod scale;

pub use decode::{CacheStats, DecodeCache, DecodedVariant, LoadVariant};
pub use scale::ScaleCache;
