// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Allegro A4988 step/direction driver.
//!
//! The A4988 advances the motor by one step on every rising edge of STEP, in the direction given
//! by DIR. This module wraps the five control lines plus a PWM channel on STEP into a small state
//! machine:
//!
//! ```text
//!              enable(false)               start()
//!   Disabled <-------------- Idle ------------------> Running
//!            --------------->    <------------------
//!              enable(true)        stop() / set_direction()
//!                                  / step run completes
//!
//!   Idle | Running --sleep()--> Sleep --wakeup()--> Idle
//!   any but Disabled --reset()--> Idle
//!   Error --enable(false)--> Disabled
//! ```
//!
//! Continuous motion is a hardware PWM pulse train at `rpm * steps_per_revolution / 60` Hz.
//! Bounded motion ([`A4988::step`]) toggles STEP from a periodic timer instead, so it needs the
//! timer's interrupt handler to call [`A4988::on_timer_tick`]:
//!
//! ```ignore
//! #[interrupt]
//! fn TIM2() {
//!     cortex_m::interrupt::free(|cs| {
//!         if let Some(motor) = MOTOR.borrow(cs).borrow_mut().as_mut() {
//!             let _ = motor.on_timer_tick();
//!         }
//!     });
//! }
//! ```
//!
//! The driver holds no lock and no global state. Every operation takes `&mut self`, so the main
//! loop and the interrupt handler can only touch the driver one at a time.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use core::fmt;

use crate::config::Config;
use crate::error::Error;
use crate::hw::{A4988Pins, Polarity, PulseGenerator, StepTimer};

/// STEP pulse train duty cycle.
const STEP_DUTY_PERCENT: u8 = 50;

/// Driver state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Output bridge off (ENABLE high). Motor shaft is free.
    Disabled,
    /// Enabled and holding position.
    Idle,
    /// Emitting step pulses, continuously or as a bounded step run.
    Running,
    /// A4988 in low-power sleep (SLEEP low).
    Sleep,
    /// A collaborator failed mid-operation. [`A4988::reset`] recovers to Idle;
    /// `enable(false)` switches the bridge off and lands in Disabled.
    Error,
}

/// Rotation direction as seen from the shaft end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// DIR level for this direction (high = clockwise).
    #[inline]
    fn dir_high(self) -> bool {
        matches!(self, Direction::Clockwise)
    }
}

/// A4988 driver bound to its control lines, step pulse generator, step timer and delay source.
pub struct A4988<STEP, DIR, EN, RST, SLP, PWM, TIM, D> {
    step: STEP,
    dir: DIR,
    enable: EN,
    reset: RST,
    sleep: SLP,
    pwm: PWM,
    timer: TIM,
    delay: D,
    config: Config,

    state: State,
    direction: Direction,
    speed_rpm: u32,

    /// Last level written to STEP.
    step_high: bool,
    /// STEP toggles done / requested by the current step run. Both 0 when no run is in flight.
    current_step_count: u32,
    target_step_count: u32,
}

/// [`A4988::new`] failed. Carries the hardware back so the caller can retry or release it.
///
/// If the bring-up got as far as touching the pins, ENABLE has been driven high again (best
/// effort), so a failed constructor never leaves the bridge energized.
pub struct InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D> {
    error: Error,
    pins: A4988Pins<STEP, DIR, EN, RST, SLP>,
    pwm: PWM,
    timer: TIM,
    delay: D,
}

impl<STEP, DIR, EN, RST, SLP, PWM, TIM, D> InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D> {
    #[inline]
    pub fn error(&self) -> Error {
        self.error
    }

    /// Hand the hardware back.
    pub fn free(self) -> (A4988Pins<STEP, DIR, EN, RST, SLP>, PWM, TIM, D) {
        (self.pins, self.pwm, self.timer, self.delay)
    }
}

impl<STEP, DIR, EN, RST, SLP, PWM, TIM, D> fmt::Debug
    for InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InitError").field(&self.error).finish()
    }
}

impl<STEP, DIR, EN, RST, SLP, PWM, TIM, D> From<InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D>>
    for Error
{
    fn from(e: InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D>) -> Self {
        e.error
    }
}

#[inline]
fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), Error> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(Error::gpio)
}

impl<STEP, DIR, EN, RST, SLP, PWM, TIM, D> A4988<STEP, DIR, EN, RST, SLP, PWM, TIM, D>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    RST: OutputPin,
    SLP: OutputPin,
    PWM: PulseGenerator,
    TIM: StepTimer,
    D: DelayNs,
{
    /// Bind the driver to its hardware and bring the A4988 up enabled and awake.
    ///
    /// The initial speed is read back from the frequency `pwm` is already configured for. Fails
    /// with [`Error::InvalidConfiguration`] if `config` is unusable or that speed is above
    /// `config.max_rpm()`; in that case nothing has been written to the hardware. On any failure
    /// the hardware comes back inside the [`InitError`].
    #[allow(clippy::type_complexity)]
    pub fn new(
        pins: A4988Pins<STEP, DIR, EN, RST, SLP>,
        pwm: PWM,
        timer: TIM,
        delay: D,
        config: Config,
    ) -> Result<Self, InitError<STEP, DIR, EN, RST, SLP, PWM, TIM, D>> {
        let A4988Pins {
            step,
            dir,
            enable,
            reset,
            sleep,
        } = pins;

        let mut this = Self {
            step,
            dir,
            enable,
            reset,
            sleep,
            pwm,
            timer,
            delay,
            config,
            state: State::Idle,
            direction: Direction::Clockwise,
            speed_rpm: 0,
            step_high: false,
            current_step_count: 0,
            target_step_count: 0,
        };

        match this.bring_up() {
            Ok(()) => {
                info!("a4988: initialized at {} rpm", this.speed_rpm);
                Ok(this)
            }
            Err(error) => {
                let (pins, pwm, timer, delay) = this.free();
                Err(InitError {
                    error,
                    pins,
                    pwm,
                    timer,
                    delay,
                })
            }
        }
    }

    fn bring_up(&mut self) -> Result<(), Error> {
        self.config.validate()?;

        let speed_rpm = self.config.rpm_for_frequency(self.pwm.frequency_hz());
        if speed_rpm > self.config.max_rpm() {
            warn!(
                "a4988: pwm maps to {} rpm, above max {}",
                speed_rpm,
                self.config.max_rpm()
            );
            return Err(Error::InvalidConfiguration);
        }
        self.speed_rpm = speed_rpm;

        if let Err(e) = self.init() {
            warn!("a4988: init failed: {:?}", e);
            if drive(&mut self.enable, true).is_err() {
                warn!("a4988: could not release ENABLE");
            }
            return Err(e);
        }
        Ok(())
    }

    /// ENABLE goes low last, once every other line and the PWM are in their idle configuration.
    fn init(&mut self) -> Result<(), Error> {
        self.pwm.stop()?;
        self.drive_step(false)?;
        drive(&mut self.reset, true)?;
        drive(&mut self.dir, self.direction.dir_high())?;
        drive(&mut self.sleep, true)?;
        self.pwm.set_duty_cycle_percent(STEP_DUTY_PERCENT)?;
        drive(&mut self.enable, false)
    }

    /// Release the hardware.
    pub fn free(self) -> (A4988Pins<STEP, DIR, EN, RST, SLP>, PWM, TIM, D) {
        (
            A4988Pins {
                step: self.step,
                dir: self.dir,
                enable: self.enable,
                reset: self.reset,
                sleep: self.sleep,
            },
            self.pwm,
            self.timer,
            self.delay,
        )
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Configured speed in RPM.
    #[inline]
    pub fn speed_rpm(&self) -> u32 {
        self.speed_rpm
    }

    #[inline]
    pub fn steps_per_revolution(&self) -> u32 {
        self.config.steps_per_revolution()
    }

    #[inline]
    pub fn max_rpm(&self) -> u32 {
        self.config.max_rpm()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// STEP toggles done so far in the current step run (two per full step).
    #[inline]
    pub fn current_step_count(&self) -> u32 {
        self.current_step_count
    }

    /// STEP toggles requested by the current step run, or 0 when none is in flight.
    #[inline]
    pub fn target_step_count(&self) -> u32 {
        self.target_step_count
    }

    /// True while a bounded [`step`](Self::step) run is in flight.
    #[inline]
    pub fn is_stepping(&self) -> bool {
        self.target_step_count != 0
    }

    /// Enable (`true`) or disable (`false`) the output bridge.
    ///
    /// Disabling a running motor stops the pulse train before ENABLE is released. Re-enabling
    /// always lands in [`State::Idle`]; the motor has to be started again explicitly. Asking for
    /// the state the driver is already in is a no-op.
    ///
    /// `enable(false)` also works from [`State::Error`], as an emergency stop: ENABLE is released
    /// first, then the timer and PWM are stopped on a best-effort basis. Only a failure to release
    /// ENABLE is reported; the driver then stays in [`State::Error`].
    pub fn enable(&mut self, on: bool) -> Result<(), Error> {
        match (self.state, on) {
            (State::Disabled, false) | (State::Idle, true) | (State::Running, true) => Ok(()),
            (State::Disabled, true) => {
                let res = drive(&mut self.enable, false);
                self.settle(res)?;
                self.transition(State::Idle);
                Ok(())
            }
            (State::Idle, false) | (State::Running, false) => {
                let res = self.disable_outputs();
                self.settle(res)?;
                self.transition(State::Disabled);
                Ok(())
            }
            (State::Error, false) => {
                drive(&mut self.enable, true)?;
                self.quiesce();
                self.transition(State::Disabled);
                Ok(())
            }
            (State::Sleep, _) | (State::Error, true) => Err(Error::InvalidState),
        }
    }

    /// Stop every pulse source and park STEP low, ignoring (but logging) failures.
    fn quiesce(&mut self) {
        if let Err(e) = self.timer.stop() {
            warn!("a4988: timer stop failed: {:?}", e);
        }
        if let Err(e) = self.pwm.stop() {
            warn!("a4988: pwm stop failed: {:?}", e);
        }
        self.clear_step_run();
        if let Err(e) = self.drive_step(false) {
            warn!("a4988: STEP low failed: {:?}", e);
        }
    }

    fn disable_outputs(&mut self) -> Result<(), Error> {
        if self.state == State::Running {
            self.halt_motion()?;
        }
        drive(&mut self.enable, true)
    }

    /// Start a continuous pulse train at the configured speed.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.state != State::Idle {
            return Err(Error::InvalidState);
        }
        self.check_speed()?;

        let res = self.pwm.start().map_err(Error::from);
        self.settle(res)?;
        self.transition(State::Running);
        Ok(())
    }

    /// Stop the motor and park STEP low.
    ///
    /// During a bounded step run this cancels the run: the step timer is stopped and the
    /// remaining toggles are discarded.
    pub fn stop(&mut self) -> Result<(), Error> {
        if self.state != State::Running {
            return Err(Error::InvalidState);
        }

        let res = self.halt_motion();
        self.settle(res)?;
        self.transition(State::Idle);
        Ok(())
    }

    /// Cancel an in-flight [`step`](Self::step) run.
    pub fn cancel_step(&mut self) -> Result<(), Error> {
        if !self.is_stepping() {
            return Err(Error::InvalidState);
        }
        debug!(
            "a4988: cancelling step run at {}/{}",
            self.current_step_count, self.target_step_count
        );
        self.stop()
    }

    /// Change the rotation direction.
    ///
    /// A running motor is stopped first and left in [`State::Idle`]: the DIR line never changes
    /// while pulses are live, and resuming is up to the caller. Setting the current direction
    /// again does nothing.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), Error> {
        if self.state == State::Error {
            return Err(Error::InvalidState);
        }
        if direction == self.direction {
            return Ok(());
        }

        if self.state == State::Running {
            self.stop()?;
        }

        let res = drive(&mut self.dir, direction.dir_high());
        self.settle(res)?;
        self.direction = direction;
        debug!("a4988: direction {:?}", direction);
        Ok(())
    }

    /// Change the speed of continuous motion.
    ///
    /// The bridge is disabled while the PWM is reprogrammed to
    /// `rpm * steps_per_revolution / 60` Hz, then re-enabled. A motor that was running keeps
    /// running at the new speed.
    pub fn set_speed(&mut self, rpm: u32) -> Result<(), Error> {
        if rpm > self.config.max_rpm() {
            return Err(Error::InvalidParameter);
        }
        let frequency_hz = self.config.step_frequency_hz(rpm);
        if frequency_hz == 0 {
            return Err(Error::InvalidParameter);
        }

        let was_running = match self.state {
            State::Idle => false,
            State::Running if !self.is_stepping() => true,
            _ => return Err(Error::InvalidState),
        };

        let res = self.reprogram_pwm(frequency_hz, was_running);
        self.settle(res)?;
        self.speed_rpm = rpm;
        debug!("a4988: speed {} rpm ({} Hz)", rpm, frequency_hz);
        Ok(())
    }

    fn reprogram_pwm(&mut self, frequency_hz: u32, was_running: bool) -> Result<(), Error> {
        drive(&mut self.enable, true)?;
        if was_running {
            self.pwm.stop()?;
        }
        self.pwm.reconfigure(frequency_hz, Polarity::ActiveHigh)?;
        self.pwm.set_duty_cycle_percent(STEP_DUTY_PERCENT)?;
        drive(&mut self.enable, false)?;
        if was_running {
            self.pwm.start()?;
        }
        Ok(())
    }

    /// Move exactly `steps` steps at the configured speed without blocking.
    ///
    /// Arms the step timer to toggle STEP twice per step and returns in [`State::Running`]. The
    /// driver drops back to [`State::Idle`] on its own from [`on_timer_tick`](Self::on_timer_tick)
    /// once the last toggle is out.
    pub fn step(&mut self, steps: u32) -> Result<(), Error> {
        if self.state != State::Idle {
            return Err(Error::InvalidState);
        }
        self.check_speed()?;
        let toggles = match steps.checked_mul(2) {
            Some(0) | None => return Err(Error::InvalidParameter),
            Some(t) => t,
        };
        let interval = self
            .config
            .toggle_interval_ticks(self.speed_rpm, self.timer.tick_frequency_hz())
            .ok_or(Error::InvalidConfiguration)?;

        let res = self.arm_step_run(interval, toggles);
        self.settle(res)?;
        self.transition(State::Running);
        debug!("a4988: stepping {} steps, {} ticks/toggle", steps, interval);
        Ok(())
    }

    fn arm_step_run(&mut self, interval_ticks: u32, toggles: u32) -> Result<(), Error> {
        self.drive_step(false)?;
        self.current_step_count = 0;
        self.target_step_count = toggles;
        self.timer.start_periodic(interval_ticks)?;
        Ok(())
    }

    /// Advance the step run by one STEP toggle. Call once per step-timer period.
    ///
    /// Returns `Ok(true)` on the tick that completes the run. Ticks arriving while no run is in
    /// flight are ignored and return `Ok(false)`.
    pub fn on_timer_tick(&mut self) -> Result<bool, Error> {
        if self.state != State::Running || !self.is_stepping() {
            return Ok(false);
        }
        let res = self.advance_step_run();
        self.settle(res)
    }

    fn advance_step_run(&mut self) -> Result<bool, Error> {
        let level = !self.step_high;
        self.drive_step(level)?;
        self.current_step_count += 1;

        if self.current_step_count < self.target_step_count {
            return Ok(false);
        }

        self.timer.stop()?;
        self.drive_step(false)?;
        self.clear_step_run();
        self.transition(State::Idle);
        Ok(true)
    }

    /// Reset the A4988 translator and return to [`State::Idle`].
    ///
    /// Motion is halted, RESET is pulsed low, and the bridge is re-enabled. From
    /// [`State::Sleep`] or [`State::Error`] the chip is also woken up. This is how the driver
    /// recovers from [`State::Error`] straight to [`State::Idle`]; ENABLE is released before the
    /// pulse sources are stopped.
    pub fn reset(&mut self) -> Result<(), Error> {
        if self.state == State::Disabled {
            return Err(Error::InvalidState);
        }

        let res = self.pulse_reset();
        self.settle(res)?;
        self.transition(State::Idle);
        Ok(())
    }

    fn pulse_reset(&mut self) -> Result<(), Error> {
        match self.state {
            State::Running => self.halt_motion()?,
            State::Error => {
                // Unknown hardware state: de-energize, then force everything quiet.
                drive(&mut self.enable, true)?;
                self.timer.stop()?;
                self.pwm.stop()?;
                self.clear_step_run();
                self.drive_step(false)?;
            }
            _ => {}
        }

        drive(&mut self.enable, true)?;
        drive(&mut self.reset, false)?;
        self.delay.delay_us(self.config.reset_pulse_us());
        drive(&mut self.reset, true)?;

        if matches!(self.state, State::Sleep | State::Error) {
            drive(&mut self.sleep, true)?;
            self.delay.delay_us(self.config.wake_delay_us());
        }

        drive(&mut self.enable, false)
    }

    /// Put the A4988 to sleep. A running motor is stopped first.
    pub fn sleep(&mut self) -> Result<(), Error> {
        if !matches!(self.state, State::Idle | State::Running) {
            return Err(Error::InvalidState);
        }

        let res = self.enter_sleep();
        self.settle(res)?;
        self.transition(State::Sleep);
        Ok(())
    }

    fn enter_sleep(&mut self) -> Result<(), Error> {
        self.disable_outputs()?;
        drive(&mut self.sleep, false)
    }

    /// Wake the A4988 and re-enable it.
    ///
    /// Blocks for the configured wake delay (at least 1 ms) so the charge pump is up before the
    /// first step.
    pub fn wakeup(&mut self) -> Result<(), Error> {
        if self.state != State::Sleep {
            return Err(Error::InvalidState);
        }

        let res = self.leave_sleep();
        self.settle(res)?;
        self.transition(State::Idle);
        Ok(())
    }

    fn leave_sleep(&mut self) -> Result<(), Error> {
        drive(&mut self.sleep, true)?;
        self.delay.delay_us(self.config.wake_delay_us());
        drive(&mut self.enable, false)
    }

    fn check_speed(&self) -> Result<(), Error> {
        if self.speed_rpm == 0 || self.speed_rpm > self.config.max_rpm() {
            return Err(Error::InvalidConfiguration);
        }
        Ok(())
    }

    /// Stop whichever source is producing step pulses and park STEP low.
    fn halt_motion(&mut self) -> Result<(), Error> {
        if self.is_stepping() {
            self.timer.stop()?;
            self.clear_step_run();
        } else {
            self.pwm.stop()?;
        }
        self.drive_step(false)
    }

    #[inline]
    fn drive_step(&mut self, high: bool) -> Result<(), Error> {
        drive(&mut self.step, high)?;
        self.step_high = high;
        Ok(())
    }

    #[inline]
    fn clear_step_run(&mut self) {
        self.current_step_count = 0;
        self.target_step_count = 0;
    }

    fn transition(&mut self, to: State) {
        if self.state != to {
            debug!("a4988: {:?} -> {:?}", self.state, to);
        }
        self.state = to;
    }

    /// Move to [`State::Error`] if `res` carries a hardware failure.
    fn settle<T>(&mut self, res: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &res {
            if e.is_hardware() {
                warn!("a4988: {:?} in {:?}", e, self.state);
                if self.is_stepping() {
                    // Keep a half-finished run from ticking on.
                    if let Err(e) = self.timer.stop() {
                        warn!("a4988: timer stop failed: {:?}", e);
                    }
                    self.clear_step_run();
                }
                self.transition(State::Error);
            }
        }
        res
    }
}
