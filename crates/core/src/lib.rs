//! Core settlement logic for Khata.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All money-movement rules, allocation policies, and calculations live here.
//!
//! # Modules
//!
//! - `settlement` - Totals resolution, payment methods, oldest-first allocation
//! - `invoice` - Invoice number sequencing and fiscal-year formatting

pub mod invoice;
pub mod settlement;
