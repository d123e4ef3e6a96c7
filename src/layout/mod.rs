//! Unit resolution, text wrapping and paint order.

pub mod stacking;
pub mod text;
pub mod units;
