//! Recording mocks for the A4988 collaborators.
//!
//! Every pin write, PWM call, timer call and delay lands in one shared, ordered event log so tests
//! can assert on both the final levels and the order things happened in.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use stepper2::error::{PwmError, TimerError};
use stepper2::hw::{A4988Pins, Polarity, PulseGenerator, StepTimer};
use stepper2::{Config, A4988};

pub const TICK_HZ: u32 = 1_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Step,
    Dir,
    Enable,
    Reset,
    Sleep,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Pin(Line, bool),
    PwmStart,
    PwmStop,
    PwmDuty(u8),
    PwmReconfigure(u32),
    TimerStart(u32),
    TimerStop,
    DelayNs(u64),
}

/// Failure switches shared between the mocks and the test.
#[derive(Default)]
pub struct Faults {
    pub pin: Cell<Option<Line>>,
    pub pwm: Cell<bool>,
    pub timer: Cell<bool>,
}

type Log = Rc<RefCell<Vec<Event>>>;

#[derive(Debug)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockPin {
    line: Line,
    log: Log,
    faults: Rc<Faults>,
}

impl MockPin {
    fn write(&mut self, high: bool) -> Result<(), PinFault> {
        if self.faults.pin.get() == Some(self.line) {
            return Err(PinFault);
        }
        self.log.borrow_mut().push(Event::Pin(self.line, high));
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = PinFault;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

pub struct MockPwm {
    frequency_hz: u32,
    log: Log,
    faults: Rc<Faults>,
}

impl MockPwm {
    fn record(&mut self, event: Event) -> Result<(), PwmError> {
        if self.faults.pwm.get() {
            return Err(PwmError::ConfigurationError);
        }
        self.log.borrow_mut().push(event);
        Ok(())
    }
}

impl PulseGenerator for MockPwm {
    fn start(&mut self) -> Result<(), PwmError> {
        self.record(Event::PwmStart)
    }

    fn stop(&mut self) -> Result<(), PwmError> {
        self.record(Event::PwmStop)
    }

    fn set_duty_cycle_percent(&mut self, percent: u8) -> Result<(), PwmError> {
        if percent > 100 {
            return Err(PwmError::InvalidDutyCycle);
        }
        self.record(Event::PwmDuty(percent))
    }

    fn reconfigure(&mut self, frequency_hz: u32, _polarity: Polarity) -> Result<(), PwmError> {
        if frequency_hz == 0 {
            return Err(PwmError::InvalidFrequency);
        }
        self.record(Event::PwmReconfigure(frequency_hz))?;
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}

pub struct MockTimer {
    tick_hz: u32,
    log: Log,
    faults: Rc<Faults>,
}

impl StepTimer for MockTimer {
    fn start_periodic(&mut self, interval_ticks: u32) -> Result<(), TimerError> {
        if self.faults.timer.get() {
            return Err(TimerError::ConfigurationError);
        }
        if interval_ticks == 0 {
            return Err(TimerError::InvalidInterval);
        }
        self.log.borrow_mut().push(Event::TimerStart(interval_ticks));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        if self.faults.timer.get() {
            return Err(TimerError::ConfigurationError);
        }
        self.log.borrow_mut().push(Event::TimerStop);
        Ok(())
    }

    fn tick_frequency_hz(&self) -> u32 {
        self.tick_hz
    }
}

pub struct MockDelay {
    log: Log,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::DelayNs(us as u64 * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ms as u64 * 1_000_000));
    }
}

pub type Motor = A4988<MockPin, MockPin, MockPin, MockPin, MockPin, MockPwm, MockTimer, MockDelay>;

/// Test-side handle on the shared log and fault switches.
pub struct Rig {
    log: Log,
    pub faults: Rc<Faults>,
}

impl Rig {
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: Event) -> Option<usize> {
        self.log.borrow().iter().position(|e| *e == event)
    }

    pub fn count(&self, event: Event) -> usize {
        self.log.borrow().iter().filter(|e| **e == event).count()
    }

    /// Last level written to `line`, if any.
    pub fn level(&self, line: Line) -> Option<bool> {
        self.log.borrow().iter().rev().find_map(|e| match e {
            Event::Pin(l, high) if *l == line => Some(*high),
            _ => None,
        })
    }

    /// Sum of all delays, in nanoseconds.
    pub fn total_delay_ns(&self) -> u64 {
        self.log
            .borrow()
            .iter()
            .map(|e| match e {
                Event::DelayNs(ns) => *ns,
                _ => 0,
            })
            .sum()
    }
}

/// Build the mocks without constructing the driver.
pub fn parts(
    pwm_hz: u32,
    tick_hz: u32,
) -> (
    A4988Pins<MockPin, MockPin, MockPin, MockPin, MockPin>,
    MockPwm,
    MockTimer,
    MockDelay,
    Rig,
) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let faults = Rc::new(Faults::default());

    let pin = |line| MockPin {
        line,
        log: log.clone(),
        faults: faults.clone(),
    };
    let pins = A4988Pins::new(
        pin(Line::Step),
        pin(Line::Dir),
        pin(Line::Enable),
        pin(Line::Reset),
        pin(Line::Sleep),
    );
    let pwm = MockPwm {
        frequency_hz: pwm_hz,
        log: log.clone(),
        faults: faults.clone(),
    };
    let timer = MockTimer {
        tick_hz,
        log: log.clone(),
        faults: faults.clone(),
    };
    let delay = MockDelay { log: log.clone() };

    (pins, pwm, timer, delay, Rig { log, faults })
}

pub fn motor_with(config: Config, pwm_hz: u32, tick_hz: u32) -> (Motor, Rig) {
    let (pins, pwm, timer, delay, rig) = parts(pwm_hz, tick_hz);
    let motor = A4988::new(pins, pwm, timer, delay, config).expect("driver init");
    (motor, rig)
}

/// 15 steps/rev, 320 rpm ceiling, PWM at 64 Hz: the driver comes up at 256 rpm.
pub fn motor() -> (Motor, Rig) {
    motor_with(Config::new(15, 320), 64, TICK_HZ)
}

/// Same as [`motor`], with the init sequence already cleared from the log.
pub fn idle_motor() -> (Motor, Rig) {
    let (motor, rig) = motor();
    rig.clear();
    (motor, rig)
}
