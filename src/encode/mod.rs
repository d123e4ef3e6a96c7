//! Export encodings.

/// Data URL encoders for raster frames and vector markup.
pub mod data_url;
