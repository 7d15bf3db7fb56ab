//! Common types used across the application.

pub mod money;

pub use money::{is_settled, round2, ROUNDING_TOLERANCE};
