// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin assignments for the NUCLEO-F767ZI carrying an A4988 breakout.
//!
//! | Signal | Pin  | Notes                        |
//! |--------|------|------------------------------|
//! | STEP   | PD12 | TIM4_CH1, AF2                |
//! | DIR    | PD13 | high = clockwise             |
//! | ENABLE | PE4  | active low                   |
//! | RESET  | PE11 | active low                   |
//! | SLEEP  | PA4  | active low                   |
//! | button | PC13 | USER button, EXTI13          |
//! | LED    | PB7  | LD3 (blue), lit while moving |

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpioc, gpiod, gpioe, Alternate, Floating, Input, Output, PushPull},
    pac,
    prelude::*,
};

pub struct BoardPins {
    pub stepper: StepperPins,
    pub usart3: Usart3Pins,
    pub led: gpiob::PB7<Output<PushPull>>, // LD3
    pub button: gpioc::PC13<Input<Floating>>,
}

/// Control lines wired to the A4988.
///
/// Levels are not touched here; the driver sets every line during its own initialisation.
pub struct StepperPins {
    pub step: gpiod::PD12<Alternate<2>>,
    pub dir: gpiod::PD13<Output<PushPull>>,
    pub enable: gpioe::PE4<Output<PushPull>>,
    pub reset: gpioe::PE11<Output<PushPull>>,
    pub sleep: gpioa::PA4<Output<PushPull>>,
}

pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

impl BoardPins {
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            stepper: StepperPins {
                step: gpiod.pd12.into_alternate::<2>(),
                dir: gpiod.pd13.into_push_pull_output(),
                enable: gpioe.pe4.into_push_pull_output(),
                reset: gpioe.pe11.into_push_pull_output(),
                sleep: gpioa.pa4.into_push_pull_output(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            led: gpiob.pb7.into_push_pull_output(),
            button: gpioc.pc13.into_floating_input(),
        }
    }
}
