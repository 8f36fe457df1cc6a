// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers that plug STM32F767 peripherals into the `stepper2` capability traits.

pub mod button;
pub mod delay;
pub mod gpio;
pub mod led;
pub mod pins;
pub mod step_pwm;
pub mod tick_timer;
pub mod usart;

pub use button::UserButton;
pub use delay::SysDelay;
pub use gpio::Line;
pub use led::Led;
pub use pins::BoardPins;
pub use step_pwm::{StepLine, StepPwm};
pub use tick_timer::TickTimer;
pub use usart::Usart;
