//! Boundary validation.
//!
//! Payloads are checked here before any renderer sees them; violations surface as
//! [`PagevisError::Validation`](crate::PagevisError::Validation).

pub mod validate;
