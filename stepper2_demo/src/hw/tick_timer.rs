// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic tick source on TIM2 for timer-paced step runs.
//!
//! TIM2 is a 32-bit counter, so any interval the driver computes fits the auto-reload register.
//! The update interrupt has to be unmasked in the NVIC by the application, and its handler must
//! call [`TickTimer::acknowledge`] before forwarding the tick to the driver.

use stepper2::error::TimerError;
use stepper2::hw::StepTimer;
use stm32f7xx_hal::{pac, rcc::Clocks};

pub struct TickTimer {
    tim: pac::TIM2,
    tick_hz: u32,
}

impl TickTimer {
    /// Configure TIM2 to count at `tick_hz` (rounded to what the prescaler can reach). The counter
    /// stays stopped until [`StepTimer::start_periodic`].
    pub fn new(tim2: pac::TIM2, clocks: &Clocks, tick_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let timclk_hz = clocks.timclk1().raw();
        let psc = (timclk_hz / tick_hz.max(1)).clamp(1, 0x1_0000) - 1;

        let tim = tim2;

        // Disable counter while configuring. Only overflows raise the update interrupt, not UG.
        tim.cr1.modify(|_, w| w.cen().clear_bit().urs().set_bit());
        tim.dier.modify(|_, w| w.uie().clear_bit());
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.egr.write(|w| w.ug().set_bit());

        Self {
            tim,
            tick_hz: timclk_hz / (psc + 1),
        }
    }

    /// Clear the pending update flag. Call first thing in the TIM2 handler.
    #[inline]
    pub fn acknowledge() {
        let tim = unsafe { &*pac::TIM2::ptr() };
        tim.sr.modify(|_, w| w.uif().clear_bit());
    }
}

impl StepTimer for TickTimer {
    fn start_periodic(&mut self, interval_ticks: u32) -> Result<(), TimerError> {
        if interval_ticks == 0 {
            return Err(TimerError::InvalidInterval);
        }

        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.arr.write(|w| w.bits(interval_ticks - 1));
        self.tim.cnt.write(|w| w.bits(0));
        self.tim.egr.write(|w| w.ug().set_bit());
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
        self.tim.dier.modify(|_, w| w.uie().set_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        self.tim.dier.modify(|_, w| w.uie().clear_bit());
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
        Ok(())
    }

    fn tick_frequency_hz(&self) -> u32 {
        self.tick_hz
    }
}
