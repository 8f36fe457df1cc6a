// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error kinds returned by the driver.

use core::fmt;

use embedded_hal::digital;

/// Errors reported by a [`PulseGenerator`](crate::hw::PulseGenerator).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Frequency cannot be produced by the timer backing the channel.
    InvalidFrequency,
    /// Duty cycle outside 0..=100 %.
    InvalidDutyCycle,
    /// Any other peripheral misconfiguration.
    ConfigurationError,
}

/// Errors reported by a [`StepTimer`](crate::hw::StepTimer).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Interval is zero or larger than the counter can hold.
    InvalidInterval,
    ConfigurationError,
}

/// Driver error.
///
/// The first three variants are precondition failures: they are returned before anything is
/// written to the hardware. The remaining ones carry a failure reported by a collaborator, after
/// which the driver sits in [`State::Error`](crate::State::Error) until [`reset`] or
/// [`enable(false)`](crate::A4988::enable) is called.
///
/// [`reset`]: crate::A4988::reset
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Argument outside its allowed domain (e.g. speed above the configured maximum).
    InvalidParameter,
    /// Operation not permitted in the current state.
    InvalidState,
    /// A derived value violates a driver invariant (e.g. PWM frequency maps above max RPM).
    InvalidConfiguration,
    /// A GPIO write failed.
    Gpio(digital::ErrorKind),
    Pwm(PwmError),
    Timer(TimerError),
}

impl From<PwmError> for Error {
    fn from(e: PwmError) -> Self {
        Error::Pwm(e)
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Error::Timer(e)
    }
}

impl Error {
    /// Wrap any `embedded-hal` pin error.
    pub fn gpio<E: digital::Error>(e: E) -> Self {
        Error::Gpio(e.kind())
    }

    /// True for failures reported by the hardware rather than by argument/state checks.
    pub fn is_hardware(&self) -> bool {
        matches!(self, Error::Gpio(_) | Error::Pwm(_) | Error::Timer(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter => f.write_str("invalid parameter"),
            Error::InvalidState => f.write_str("invalid state"),
            Error::InvalidConfiguration => f.write_str("invalid configuration"),
            Error::Gpio(kind) => write!(f, "gpio error: {:?}", kind),
            Error::Pwm(e) => write!(f, "pwm error: {:?}", e),
            Error::Timer(e) => write!(f, "timer error: {:?}", e),
        }
    }
}
