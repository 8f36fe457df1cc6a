// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! A4988 demo for the NUCLEO-F767ZI.
//!
//! Runs one revolution as a timer-paced step run, then reverses and spins continuously from the
//! TIM4 pulse train. The USER button toggles an emergency stop: a press while the motor is powered
//! disables the bridge, the next press re-enables it and restarts motion. This also holds after a
//! hardware fault: the first press switches the bridge off even if the pulse sources cannot be
//! stopped. Status goes out on USART3 (ST-LINK VCP, 115200 baud).

#![no_main]
#![no_std]

mod hw;

use core::cell::RefCell;
use core::fmt::{self, Write};

use cortex_m::{delay::Delay, interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{self, Instance, Serial},
};
use stm32f7xx_hal as hal;

use stepper2::{hw::A4988Pins, Config, Direction, Error, State, A4988};

use crate::hw::{BoardPins, Led, Line, StepLine, StepPwm, SysDelay, TickTimer, UserButton, Usart};

const STEPS_PER_REV: u32 = 200; // 1.8° motor, full-step
const MAX_RPM: u32 = 320;
const INITIAL_STEP_HZ: u32 = 200; // 60 rpm
const CRUISE_RPM: u32 = 120;
const TICK_HZ: u32 = 1_000_000;

type Motor = A4988<
    StepLine,
    Line<'D', 13>,
    Line<'E', 4>,
    Line<'E', 11>,
    Line<'A', 4>,
    StepPwm,
    TickTimer,
    SysDelay,
>;

static MOTOR: Mutex<RefCell<Option<Motor>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

    // USART3 via ST-LINK (PD8/PD9)
    let cfg = serial::Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let mut usart = Usart::new(Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        cfg,
    ));
    usart.println("stepper2 demo");

    let mut led = Led::new(Line::new(pins.led, false));
    let button = UserButton::new(pins.button, &dp.SYSCFG, &dp.EXTI);

    // STEP pulse train (TIM4_CH1 on PD12) and step-run ticks (TIM2)
    let stepper = pins.stepper;
    let (pwm, step) = match StepPwm::new(dp.TIM4, stepper.step, &clocks, INITIAL_STEP_HZ) {
        Ok(parts) => parts,
        Err(e) => halt(&mut usart, format_args!("pwm setup failed: {:?}", e)),
    };
    let timer = TickTimer::new(dp.TIM2, &clocks, TICK_HZ);
    let delay = SysDelay::new(Delay::new(cp.SYST, clocks.sysclk().raw()));

    let motor_pins = A4988Pins::new(
        step,
        Line::new(stepper.dir, true),
        Line::new(stepper.enable, true),
        Line::new(stepper.reset, true),
        Line::new(stepper.sleep, true),
    );
    let config = Config::new(STEPS_PER_REV, MAX_RPM);
    let motor = match A4988::new(motor_pins, pwm, timer, delay, config) {
        Ok(motor) => motor,
        Err(e) => halt(&mut usart, format_args!("driver init failed: {}", e.error())),
    };
    let _ = writeln!(
        usart,
        "A4988 ready at {} rpm, {} steps/rev\r",
        motor.speed_rpm(),
        motor.steps_per_revolution()
    );

    cortex_m::interrupt::free(|cs| *MOTOR.borrow(cs).borrow_mut() = Some(motor));
    unsafe {
        NVIC::unmask(pac::Interrupt::TIM2);
        NVIC::unmask(pac::Interrupt::EXTI15_10);
    }

    // One revolution clockwise, paced by TIM2
    command(&mut usart, "step", |m| m.step(STEPS_PER_REV));
    led.set(true);
    wait_for_step_run();
    led.set(false);

    // Then spin the other way from the PWM
    command(&mut usart, "direction", |m| {
        m.set_direction(Direction::CounterClockwise)
    });
    command(&mut usart, "speed", |m| m.set_speed(CRUISE_RPM));
    command(&mut usart, "start", |m| m.start());

    let mut last_state = None;
    loop {
        if button.take_press() {
            match with_motor(|m| m.state()) {
                Some(State::Disabled) => {
                    command(&mut usart, "enable", |m| m.enable(true));
                    command(&mut usart, "start", |m| m.start());
                }
                Some(_) => command(&mut usart, "emergency stop", |m| m.enable(false)),
                None => {}
            }
        }

        let state = with_motor(|m| m.state());
        if state != last_state {
            if let Some(state) = state {
                let _ = writeln!(usart, "state: {:?}\r", state);
                led.set(state == State::Running);
            }
            last_state = state;
        }

        idle(&button);
    }
}

/// Run `f` on the motor inside a critical section.
fn with_motor<R>(f: impl FnOnce(&mut Motor) -> R) -> Option<R> {
    cortex_m::interrupt::free(|cs| MOTOR.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Run a driver command and log its outcome.
fn command<U: Instance>(
    usart: &mut Usart<U>,
    name: &str,
    f: impl FnOnce(&mut Motor) -> Result<(), Error>,
) {
    match with_motor(f) {
        Some(Ok(())) => {
            let _ = writeln!(usart, "{}: ok\r", name);
        }
        Some(Err(e)) => {
            let _ = writeln!(usart, "{}: {}\r", name, e);
        }
        None => {}
    }
}

/// Sleep until the next interrupt unless a button press is already waiting.
///
/// Checking and sleeping with interrupts masked keeps a press that lands in between pending, so it
/// wakes the core instead of being slept through.
fn idle(button: &UserButton) {
    cortex_m::interrupt::free(|_| {
        if !button.is_pending() {
            cortex_m::asm::wfi();
        }
    });
}

/// Sleep until the running step run completes or is cancelled.
fn wait_for_step_run() {
    while cortex_m::interrupt::free(|cs| {
        let stepping = MOTOR
            .borrow(cs)
            .borrow()
            .as_ref()
            .map_or(false, |m| m.is_stepping());
        if stepping {
            cortex_m::asm::wfi();
        }
        stepping
    }) {}
}

/// Report a fatal setup error and park the core.
fn halt<U: Instance>(usart: &mut Usart<U>, args: fmt::Arguments) -> ! {
    let _ = write!(usart, "{}\r\n", args);
    usart.flush();
    loop {
        cortex_m::asm::wfi();
    }
}

#[interrupt]
fn TIM2() {
    TickTimer::acknowledge();
    with_motor(|m| {
        let _ = m.on_timer_tick();
    });
}

#[interrupt]
fn EXTI15_10() {
    UserButton::on_interrupt();
}
