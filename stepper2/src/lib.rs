// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Stepper 2 Click Driver
//!
//! This crate drives a two-phase stepper motor through the Allegro A4988 step/direction driver
//! found on the MikroElektronika Stepper 2 click board. It is hardware-agnostic: pins come in as
//! `embedded-hal` output pins, and the step pulse generator and step timer come in through the
//! small traits in [`hw`].
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Capabilities the driver consumes (PWM pulse train, periodic timer, pin bundle) |
//! | [`drivers`] | Device-level drivers (A4988) |
//! | [`config`] | Driver configuration and speed/frequency conversions |
//! | [`error`] | Error kinds returned by every fallible operation |
//!
//! ## Getting Started
//!
//! ```ignore
//! let mut motor = A4988::new(pins, pwm, timer, delay, Config::default())?;
//!
//! motor.set_speed(120)?;
//! motor.start()?;
//! ```
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Run the host-side tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! ## Features
//!
//! - `defmt` – log state transitions with `defmt` and derive `defmt::Format` on public types.
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod drivers;
pub mod error;
pub mod hw;

pub use config::Config;
pub use drivers::a4988::{Direction, InitError, State, A4988};
pub use error::Error;
