// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USER button (PC13) on EXTI line 13.
//!
//! The interrupt handler only latches a flag; the main loop drains it with [`UserButton::take_press`].

use core::sync::atomic::{AtomicBool, Ordering};

use stm32f7xx_hal::{
    gpio::{gpioc, Floating, Input},
    pac,
};

const LINE: u32 = 13;

static PRESSED: AtomicBool = AtomicBool::new(false);

pub struct UserButton {
    _pin: gpioc::PC13<Input<Floating>>,
}

impl UserButton {
    /// Route PC13 to EXTI13 and interrupt on the rising edge (button press on the NUCLEO board).
    pub fn new(pin: gpioc::PC13<Input<Floating>>, syscfg: &pac::SYSCFG, exti: &pac::EXTI) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.syscfgen().set_bit());

        // EXTICR4 bits 7:4 select the port for line 13; 0b0010 = port C.
        syscfg
            .exticr4
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0xF << 4)) | (0x2 << 4)) });

        exti.rtsr
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });
        exti.ftsr
            .modify(|r, w| unsafe { w.bits(r.bits() & !(1 << LINE)) });
        exti.pr.write(|w| unsafe { w.bits(1 << LINE) });
        exti.imr
            .modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });

        Self { _pin: pin }
    }

    /// Clear the pending bit and latch the press. Call from the `EXTI15_10` handler.
    pub fn on_interrupt() {
        let exti = unsafe { &*pac::EXTI::ptr() };
        if exti.pr.read().bits() & (1 << LINE) != 0 {
            exti.pr.write(|w| unsafe { w.bits(1 << LINE) });
            PRESSED.store(true, Ordering::Release);
        }
    }

    /// A press is latched and not yet taken.
    #[inline]
    pub fn is_pending(&self) -> bool {
        PRESSED.load(Ordering::Acquire)
    }

    /// True once per press since the last call.
    pub fn take_press(&self) -> bool {
        PRESSED.swap(false, Ordering::AcqRel)
    }
}
