//! Recording fakes for pins, timer and delay used by the unit tests

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::interface::PanelPins;
use crate::timer::{CountdownTimer, TimerSetting};

/// Panel connector signal a recording pin stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    R1,
    G1,
    B1,
    R2,
    G2,
    B2,
    Clk,
    Oe,
    Lat,
    A,
    B,
    C,
}

/// Shared, ordered log of every pin write
#[derive(Clone, Default)]
pub struct PinLog(Rc<RefCell<Vec<(Line, bool)>>>);

impl PinLog {
    pub fn events(&self) -> Vec<(Line, bool)> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct RecordingPin {
    line: Line,
    log: PinLog,
    pub fail: bool,
}

impl ErrorType for RecordingPin {
    type Error = ErrorKind;
}

impl RecordingPin {
    fn record(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.log.0.borrow_mut().push((self.line, high));
        Ok(())
    }
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true)
    }
}

pub fn recording_pins() -> (PanelPins<RecordingPin>, PinLog) {
    let log = PinLog::default();
    let pin = |line| RecordingPin {
        line,
        log: log.clone(),
        fail: false,
    };
    let pins = PanelPins {
        r1: pin(Line::R1),
        g1: pin(Line::G1),
        b1: pin(Line::B1),
        r2: pin(Line::R2),
        g2: pin(Line::G2),
        b2: pin(Line::B2),
        clk: pin(Line::Clk),
        oe: pin(Line::Oe),
        lat: pin(Line::Lat),
        a: pin(Line::A),
        b: pin(Line::B),
        c: pin(Line::C),
    };
    (pins, log)
}

#[derive(Default)]
struct TimerState {
    programmed: Vec<TimerSetting>,
    interrupt_enabled: bool,
    running: bool,
}

/// Shared view of what a [`RecordingTimer`] was asked to do
#[derive(Clone, Default)]
pub struct TimerLog(Rc<RefCell<TimerState>>);

impl TimerLog {
    pub fn programmed(&self) -> Vec<TimerSetting> {
        self.0.borrow().programmed.clone()
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.0.borrow().interrupt_enabled
    }

    pub fn running(&self) -> bool {
        self.0.borrow().running
    }
}

pub struct RecordingTimer {
    clock_hz: u32,
    dividers: Vec<u32>,
    max_compare: u32,
    log: TimerLog,
}

impl RecordingTimer {
    pub fn new(clock_hz: u32, dividers: &[u32], max_compare: u32) -> (Self, TimerLog) {
        let log = TimerLog::default();
        let timer = Self {
            clock_hz,
            dividers: dividers.to_vec(),
            max_compare,
            log: log.clone(),
        };
        (timer, log)
    }
}

impl CountdownTimer for RecordingTimer {
    fn input_clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn dividers(&self) -> &[u32] {
        &self.dividers
    }

    fn max_compare(&self) -> u32 {
        self.max_compare
    }

    fn program(&mut self, setting: TimerSetting) {
        self.log.0.borrow_mut().programmed.push(setting);
    }

    fn enable_interrupt(&mut self) {
        self.log.0.borrow_mut().interrupt_enabled = true;
    }

    fn start(&mut self) {
        self.log.0.borrow_mut().running = true;
    }
}

/// Delay that runs `isr` instead of sleeping, standing in for the scan
/// interrupt firing while the foreground spins
pub struct IsrDelay<F> {
    isr: F,
    pub calls: usize,
    pub last_us: u32,
}

impl<F: FnMut()> IsrDelay<F> {
    pub fn new(isr: F) -> Self {
        Self {
            isr,
            calls: 0,
            last_us: 0,
        }
    }
}

impl IsrDelay<fn()> {
    /// A delay that never changes anything
    pub fn idle() -> Self {
        Self::new(|| {})
    }
}

impl<F: FnMut()> DelayNs for IsrDelay<F> {
    fn delay_ns(&mut self, _ns: u32) {
        self.calls += 1;
        (self.isr)();
    }

    fn delay_us(&mut self, us: u32) {
        self.last_us = us;
        self.delay_ns(us.saturating_mul(1_000));
    }
}
