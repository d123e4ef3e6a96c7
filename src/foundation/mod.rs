//! Geometry, colour and error primitives shared by every layer.

/// Surface geometry and the rendering context.
pub mod core;
/// CSS colour parsing.
pub mod color;
/// Crate error type.
pub mod error;
