// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Driver configuration and speed conversions.
//!
//! Speeds are expressed in whole revolutions per minute. One full step is one rising edge on the
//! STEP line, so a motor turning at `rpm` needs a step frequency of
//! `rpm * steps_per_revolution / 60` Hz.

use crate::error::Error;

/// Full steps per revolution of a 1.8° motor.
pub const DEFAULT_STEPS_PER_REVOLUTION: u32 = 200;

/// Default speed ceiling.
pub const DEFAULT_MAX_RPM: u32 = 320;

/// Minimum time the A4988 needs after SLEEP is released before it accepts steps.
pub const MIN_WAKE_DELAY_US: u32 = 1_000;

/// Default RESET low time. The A4988 needs far less; this leaves margin for slow edges.
pub const DEFAULT_RESET_PULSE_US: u32 = 10;

/// Static configuration of one motor + driver pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    steps_per_revolution: u32,
    max_rpm: u32,
    wake_delay_us: u32,
    reset_pulse_us: u32,
}

impl Config {
    /// Create a configuration with the given motor resolution and speed ceiling.
    pub const fn new(steps_per_revolution: u32, max_rpm: u32) -> Self {
        Self {
            steps_per_revolution,
            max_rpm,
            wake_delay_us: MIN_WAKE_DELAY_US,
            reset_pulse_us: DEFAULT_RESET_PULSE_US,
        }
    }

    /// Set the speed ceiling.
    pub const fn with_max_rpm(mut self, max_rpm: u32) -> Self {
        self.max_rpm = max_rpm;
        self
    }

    /// Set the motor resolution (full steps, times the microstep factor strapped on MS1..MS3).
    pub const fn with_steps_per_revolution(mut self, steps: u32) -> Self {
        self.steps_per_revolution = steps;
        self
    }

    /// Set the wake-up delay. Values below [`MIN_WAKE_DELAY_US`] are raised to it.
    pub const fn with_wake_delay_us(mut self, us: u32) -> Self {
        self.wake_delay_us = if us < MIN_WAKE_DELAY_US {
            MIN_WAKE_DELAY_US
        } else {
            us
        };
        self
    }

    /// Set the RESET low time.
    pub const fn with_reset_pulse_us(mut self, us: u32) -> Self {
        self.reset_pulse_us = us;
        self
    }

    #[inline]
    pub const fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution
    }

    #[inline]
    pub const fn max_rpm(&self) -> u32 {
        self.max_rpm
    }

    #[inline]
    pub const fn wake_delay_us(&self) -> u32 {
        self.wake_delay_us
    }

    #[inline]
    pub const fn reset_pulse_us(&self) -> u32 {
        self.reset_pulse_us
    }

    /// Reject configurations no motor can run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.steps_per_revolution == 0 || self.max_rpm == 0 {
            return Err(Error::InvalidConfiguration);
        }
        Ok(())
    }

    /// Step frequency (Hz) for a speed in RPM. Truncates toward zero.
    pub fn step_frequency_hz(&self, rpm: u32) -> u32 {
        let hz = rpm as u64 * self.steps_per_revolution as u64 / 60;
        hz.min(u32::MAX as u64) as u32
    }

    /// Speed in RPM produced by a step frequency (Hz). Truncates toward zero.
    pub fn rpm_for_frequency(&self, frequency_hz: u32) -> u32 {
        if self.steps_per_revolution == 0 {
            return 0;
        }
        let rpm = frequency_hz as u64 * 60 / self.steps_per_revolution as u64;
        rpm.min(u32::MAX as u64) as u32
    }

    /// Timer ticks between two STEP-line toggles at `rpm`, given a timer running at `tick_hz`.
    ///
    /// Each toggle is half a step, so the toggle rate is twice the step frequency. Returns `None`
    /// when the interval rounds to zero ticks (timer too slow for this speed) or when `rpm` is 0.
    pub fn toggle_interval_ticks(&self, rpm: u32, tick_hz: u32) -> Option<u32> {
        let denom = rpm as u64 * self.steps_per_revolution as u64 * 2;
        if denom == 0 {
            return None;
        }
        let ticks = tick_hz as u64 * 60 / denom;
        match ticks {
            0 => None,
            t => u32::try_from(t).ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS_PER_REVOLUTION, DEFAULT_MAX_RPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.steps_per_revolution(), 200);
        assert_eq!(cfg.max_rpm(), 320);
        assert_eq!(cfg.wake_delay_us(), MIN_WAKE_DELAY_US);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_resolution_or_ceiling_is_rejected() {
        assert_eq!(
            Config::new(0, 320).validate(),
            Err(Error::InvalidConfiguration)
        );
        assert_eq!(
            Config::new(200, 0).validate(),
            Err(Error::InvalidConfiguration)
        );
    }

    #[test]
    fn wake_delay_never_below_minimum() {
        let cfg = Config::default().with_wake_delay_us(10);
        assert_eq!(cfg.wake_delay_us(), MIN_WAKE_DELAY_US);

        let cfg = Config::default().with_wake_delay_us(5_000);
        assert_eq!(cfg.wake_delay_us(), 5_000);
    }

    #[test]
    fn frequency_and_rpm_agree() {
        let cfg = Config::new(200, 320);
        // 60 rpm * 200 steps / 60 s
        assert_eq!(cfg.step_frequency_hz(60), 200);
        assert_eq!(cfg.rpm_for_frequency(200), 60);

        // 64 Hz on a 15-step motor is 256 rpm.
        let cfg = Config::new(15, 320);
        assert_eq!(cfg.rpm_for_frequency(64), 256);
        assert_eq!(cfg.step_frequency_hz(256), 64);
    }

    #[test]
    fn slow_speeds_truncate_to_zero_hz() {
        let cfg = Config::new(15, 320);
        assert_eq!(cfg.step_frequency_hz(3), 0);
    }

    #[test]
    fn toggle_interval() {
        let cfg = Config::new(200, 320);
        // 60 rpm -> 200 steps/s -> 400 toggles/s; 1 MHz timer -> 2500 ticks.
        assert_eq!(cfg.toggle_interval_ticks(60, 1_000_000), Some(2_500));
        assert_eq!(cfg.toggle_interval_ticks(0, 1_000_000), None);
        // 32.768 kHz timer cannot toggle 400 000 times a second.
        assert_eq!(cfg.toggle_interval_ticks(60_000, 32_768), None);
    }
}
