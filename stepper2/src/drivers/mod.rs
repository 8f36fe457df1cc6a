// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the capability traits in `hw/` and
//! below the application logic.
//!
//! ## Existing drivers
//!
//! - [`a4988`] – Allegro A4988 step/direction stepper driver (Stepper 2 click)

pub mod a4988;

pub use a4988::{InitError, A4988};
