// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick busy-wait delay exposed through `embedded-hal` 1.0.

use cortex_m::delay::Delay;
use embedded_hal::delay::DelayNs;

pub struct SysDelay {
    delay: Delay,
}

impl SysDelay {
    pub fn new(delay: Delay) -> Self {
        Self { delay }
    }
}

impl DelayNs for SysDelay {
    /// SysTick resolution is 1 µs; round up so the delay is never shorter than asked.
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_us(ns.div_ceil(1_000));
    }

    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
