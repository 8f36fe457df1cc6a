// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Push-pull output line exposed through `embedded-hal` 1.0.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32f7xx_hal::gpio::{self, Output, PushPull};

/// Push-pull output generic over any GPIO pin.
pub struct Line<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
}

impl<const P: char, const N: u8> Line<P, N> {
    /// Wrap a push-pull output and drive it to `initial_high`.
    pub fn new(mut pin: gpio::Pin<P, N, Output<PushPull>>, initial_high: bool) -> Self {
        if initial_high {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Self { pin }
    }
}

impl<const P: char, const N: u8> ErrorType for Line<P, N> {
    type Error = Infallible;
}

impl<const P: char, const N: u8> OutputPin for Line<P, N> {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high();
        Ok(())
    }
}
