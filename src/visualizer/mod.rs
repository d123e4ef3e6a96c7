//! The controller that owns a surface, and the host capabilities it is mounted into.

/// Page visualizer and its builder.
pub mod controller;
/// Mount target capability.
pub mod mount;
