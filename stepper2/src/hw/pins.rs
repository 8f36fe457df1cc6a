// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Control lines of the Stepper 2 click.

/// The five A4988 control lines, moved into the driver at construction.
///
/// Levels as seen by the A4988:
/// - `step`: rising edge advances one (micro)step
/// - `dir`: high = clockwise, low = counter-clockwise
/// - `enable`: active low (`ENABLE` on the datasheet)
/// - `reset`: active low
/// - `sleep`: active low
pub struct A4988Pins<STEP, DIR, EN, RST, SLP> {
    pub step: STEP,
    pub dir: DIR,
    pub enable: EN,
    pub reset: RST,
    pub sleep: SLP,
}

impl<STEP, DIR, EN, RST, SLP> A4988Pins<STEP, DIR, EN, RST, SLP> {
    pub fn new(step: STEP, dir: DIR, enable: EN, reset: RST, sleep: SLP) -> Self {
        Self {
            step,
            dir,
            enable,
            reset,
            sleep,
        }
    }
}
