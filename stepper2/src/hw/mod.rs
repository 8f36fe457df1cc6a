// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware Capabilities
//!
//! Traits the driver consumes from the surrounding board support code. GPIO lines use the
//! `embedded-hal` [`OutputPin`](embedded_hal::digital::OutputPin) trait directly; the step pulse
//! generator and the periodic step timer have no `embedded-hal` equivalent and are defined here.
//!
//! ## Modules
//!
//! - [`pins`] - Bundle of the five A4988 control lines.
//! - [`pwm`] - Variable-frequency pulse train on the STEP line.
//! - [`timer`] - Periodic timer used for bounded, interrupt-driven stepping.

pub mod pins;
pub mod pwm;
pub mod timer;

pub use pins::A4988Pins;
pub use pwm::{Polarity, PulseGenerator};
pub use timer::StepTimer;
