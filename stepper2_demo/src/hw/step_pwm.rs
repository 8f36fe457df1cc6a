// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STEP output on TIM4 channel 1 (PD12).
//!
//! The pin stays in alternate function mode the whole time. While the counter runs the channel is
//! in PWM mode 1; while it is stopped the channel output is forced, which is how [`StepLine`] drives
//! the pin as a plain GPIO for timer-paced step runs.

use core::convert::Infallible;
use core::ops::Deref;

use embedded_hal::digital::{ErrorType, OutputPin};
use stepper2::error::PwmError;
use stepper2::hw::{Polarity, PulseGenerator};
use stm32f7xx_hal::{
    gpio::{gpiod, Alternate},
    pac,
    rcc::Clocks,
};

// CCMR1 output compare mode for channel 1, bits 6:4.
const OC1M_MASK: u32 = 0b111 << 4;
const OC1M_FORCE_INACTIVE: u32 = 0b100 << 4;
const OC1M_FORCE_ACTIVE: u32 = 0b101 << 4;
const OC1M_PWM1: u32 = 0b110 << 4;
const OC1PE: u32 = 1 << 3;

const CC1E: u32 = 1 << 0;
const CC1P: u32 = 1 << 1;

type Tim4Regs = <pac::TIM4 as Deref>::Target;

/// Write the channel 1 output compare mode, keeping the rest of CCMR1.
fn set_oc1m(tim: &Tim4Regs, mode: u32) {
    tim.ccmr1_output()
        .modify(|r, w| unsafe { w.bits((r.bits() & !OC1M_MASK) | mode) });
}

/// Force the pin to an absolute level regardless of the configured polarity.
fn force_level(tim: &Tim4Regs, high: bool) {
    let active_low = tim.ccer.read().bits() & CC1P != 0;
    let mode = if high != active_low {
        OC1M_FORCE_ACTIVE
    } else {
        OC1M_FORCE_INACTIVE
    };
    set_oc1m(tim, mode);
}

pub struct StepPwm {
    tim: pac::TIM4,
    _pin: gpiod::PD12<Alternate<2>>,
    timclk_hz: u32,
    duty_percent: u8,
    running: bool,
}

impl StepPwm {
    /// Take TIM4 and PD12, program `frequency_hz` and return the PWM together with the GPIO view of
    /// the same pin. The output starts stopped and low.
    pub fn new(
        tim4: pac::TIM4,
        pin: gpiod::PD12<Alternate<2>>,
        clocks: &Clocks,
        frequency_hz: u32,
    ) -> Result<(Self, StepLine), PwmError> {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;

        // Disable counter while configuring, buffer ARR.
        tim.cr1.modify(|_, w| w.cen().clear_bit().arpe().set_bit());

        // Output compare, preload CCR1, forced low until started.
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(OC1M_FORCE_INACTIVE | OC1PE) });
        tim.ccer
            .modify(|r, w| unsafe { w.bits((r.bits() & !CC1P) | CC1E) });

        let mut pwm = Self {
            tim,
            _pin: pin,
            timclk_hz: clocks.timclk1().raw(),
            duty_percent: 50,
            running: false,
        };
        pwm.reconfigure(frequency_hz, Polarity::ActiveHigh)?;

        Ok((pwm, StepLine { _private: () }))
    }

    #[inline]
    fn period_ticks(&self) -> u32 {
        self.tim.arr.read().bits() + 1
    }

    fn write_compare(&mut self) {
        let ccr = self.period_ticks() * self.duty_percent as u32 / 100;
        self.tim.ccr1().write(|w| unsafe { w.bits(ccr) });
    }
}

impl PulseGenerator for StepPwm {
    fn start(&mut self) -> Result<(), PwmError> {
        set_oc1m(&self.tim, OC1M_PWM1);
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
        // Latch PSC/ARR/CCR1 preloads before the first period.
        self.tim.egr.write(|w| w.ug().set_bit());
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PwmError> {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
        force_level(&self.tim, false);
        self.running = false;
        Ok(())
    }

    fn set_duty_cycle_percent(&mut self, percent: u8) -> Result<(), PwmError> {
        if percent > 100 {
            return Err(PwmError::InvalidDutyCycle);
        }
        self.duty_percent = percent;
        self.write_compare();
        Ok(())
    }

    fn reconfigure(&mut self, frequency_hz: u32, polarity: Polarity) -> Result<(), PwmError> {
        if frequency_hz == 0 {
            return Err(PwmError::InvalidFrequency);
        }
        let cycles = self.timclk_hz / frequency_hz;
        if cycles < 2 {
            return Err(PwmError::InvalidFrequency);
        }

        // Smallest prescaler that keeps the period inside the 16-bit counter.
        let psc = (cycles - 1) >> 16;
        if psc > 0xFFFF {
            return Err(PwmError::InvalidFrequency);
        }
        let arr = cycles / (psc + 1) - 1;

        self.tim.psc.write(|w| unsafe { w.bits(psc) });
        self.tim.arr.write(|w| unsafe { w.bits(arr) });
        self.write_compare();

        self.tim.ccer.modify(|r, w| unsafe {
            match polarity {
                Polarity::ActiveHigh => w.bits(r.bits() & !CC1P),
                Polarity::ActiveLow => w.bits(r.bits() | CC1P),
            }
        });
        if !self.running {
            force_level(&self.tim, false);
            self.tim.egr.write(|w| w.ug().set_bit());
        }
        Ok(())
    }

    fn frequency_hz(&self) -> u32 {
        let psc = self.tim.psc.read().bits() + 1;
        self.timclk_hz / (psc * self.period_ticks())
    }
}

/// GPIO view of the STEP pin, usable while [`StepPwm`] is stopped.
///
/// Writes go through the channel's forced output modes. Writing while the PWM runs hands the pin
/// back to forced mode and ends the waveform, so the driver only does it with the PWM stopped.
pub struct StepLine {
    _private: (),
}

impl StepLine {
    fn write(&mut self, high: bool) {
        let tim = unsafe { &*pac::TIM4::ptr() };
        force_level(tim, high);
    }
}

impl ErrorType for StepLine {
    type Error = Infallible;
}

impl OutputPin for StepLine {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}
