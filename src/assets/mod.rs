//! Image sources, decoding, caching and fonts.

pub mod cache;
pub mod decode;
pub mod fonts;
pub mod loader;
