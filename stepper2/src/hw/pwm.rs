// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pulse generator driving the STEP line.

use crate::error::PwmError;

/// Output polarity of the pulse train.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pulse is high for the duty portion of the period.
    ActiveHigh,
    ActiveLow,
}

/// Hardware PWM channel routed to the STEP pin.
///
/// While stopped, the channel must release the pin so that writes through the STEP
/// [`OutputPin`](embedded_hal::digital::OutputPin) take effect.
pub trait PulseGenerator {
    /// Start emitting pulses at the configured frequency and duty cycle.
    fn start(&mut self) -> Result<(), PwmError>;

    /// Stop emitting pulses.
    fn stop(&mut self) -> Result<(), PwmError>;

    /// Set the duty cycle in percent (0..=100).
    fn set_duty_cycle_percent(&mut self, percent: u8) -> Result<(), PwmError>;

    /// Tear down and reconfigure the channel for a new frequency.
    ///
    /// The duty cycle is not guaranteed to survive; callers set it again afterwards.
    fn reconfigure(&mut self, frequency_hz: u32, polarity: Polarity) -> Result<(), PwmError>;

    /// Frequency actually produced by the peripheral, after prescaler rounding.
    fn frequency_hz(&self) -> u32;
}
