use embedded_hal::digital::OutputPin;

/// Status LED, active high on the NUCLEO board.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(mut pin: PIN) -> Self {
        pin.set_low().ok();
        Self { pin }
    }

    /// Drive the LED ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
    }
}
