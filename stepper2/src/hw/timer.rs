// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic timer used by [`A4988::step`](crate::A4988::step).
//!
//! The driver never registers a callback itself. Instead, the interrupt handler of the timer
//! (or whatever dispatches its expiry) calls [`A4988::on_timer_tick`](crate::A4988::on_timer_tick)
//! once per period.

use crate::error::TimerError;

pub trait StepTimer {
    /// Fire every `interval_ticks` ticks until [`stop`](Self::stop) is called.
    fn start_periodic(&mut self, interval_ticks: u32) -> Result<(), TimerError>;

    /// Stop firing. Stopping an idle timer is not an error.
    fn stop(&mut self) -> Result<(), TimerError>;

    /// Tick rate of the timer counter in Hz.
    fn tick_frequency_hz(&self) -> u32;
}
