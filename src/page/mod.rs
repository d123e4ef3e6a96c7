//! Boundary page model and visualizer configuration.

pub mod model;
pub mod styles;
