//! Asset normalization: arbitrary input bytes to a canonical RGBA bitmap.

/// Byte-buffer decoding and vector-markup classification.
pub mod decode;

pub use decode::{decode_asset, looks_like_vector};
