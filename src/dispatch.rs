//! Hand-off between the timer interrupt vector and the scan engine
//!
//! Interrupt vectors are plain functions, so the engine has to be reachable
//! from a `static`. [`TickDispatcher`] is that static slot: the application
//! builds the engine at startup, [`install`](TickDispatcher::install)s it once,
//! and the interrupt handler calls [`dispatch`](TickDispatcher::dispatch).
//!
//! ```rust, ignore
//! static BUFFERS: FrameBuffers = FrameBuffers::new();
//! static SCAN: TickDispatcher<ScanEngine<'static, Output<'static>, Tc3>> = TickDispatcher::new();
//!
//! #[interrupt]
//! fn TC3() {
//!     tc3::clear_status();
//!     SCAN.dispatch();
//! }
//!
//! SCAN.install(ScanEngine::new(pins, tc3, &BUFFERS, MatrixConfig::default()));
//! SCAN.with(|engine| engine.start());
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use log::debug;

/// Something that runs once per timer expiry
///
/// Implementations must not block and should return quickly.
pub trait TickHandler {
    /// Handle one expiry
    fn handle_tick(&mut self);
}

/// Static slot holding the handler the interrupt vector dispatches to
pub struct TickDispatcher<E> {
    slot: Mutex<RefCell<Option<E>>>,
}

impl<E> TickDispatcher<E> {
    /// An empty slot; ticks are ignored until a handler is installed
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store `handler`, returning the one it replaces
    pub fn install(&self, handler: E) -> Option<E> {
        debug!("installing tick handler");
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).replace(handler))
    }

    /// Take the handler out again; later ticks are ignored
    pub fn uninstall(&self) -> Option<E> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }

    /// Whether a handler is installed
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).is_some())
    }

    /// Run `f` on the installed handler with the tick masked
    pub fn with<R>(&self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<E> TickDispatcher<E>
where
    E: TickHandler,
{
    /// Forward one expiry to the installed handler. Call from the interrupt
    /// vector; returns `false` if nothing was installed.
    pub fn dispatch(&self) -> bool {
        critical_section::with(|cs| match self.slot.borrow_ref_mut(cs).as_mut() {
            Some(handler) => {
                handler.handle_tick();
                true
            }
            None => false,
        })
    }
}

impl<E> Default for TickDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::FrameBuffers;
    use crate::config::MatrixConfig;
    use crate::driver::{ScanCursor, ScanEngine};
    use crate::mock::{recording_pins, RecordingPin, RecordingTimer};
    use crate::timer::SAM3X_TC_DIVIDERS;

    struct Counter(u32);

    impl TickHandler for Counter {
        fn handle_tick(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn ticks_before_install_are_ignored() {
        let dispatcher: TickDispatcher<Counter> = TickDispatcher::new();
        assert!(!dispatcher.is_installed());
        assert!(!dispatcher.dispatch());
    }

    #[test]
    fn dispatch_reaches_installed_handler() {
        let dispatcher = TickDispatcher::new();
        assert!(dispatcher.install(Counter(0)).is_none());
        for _ in 0..3 {
            assert!(dispatcher.dispatch());
        }
        assert_eq!(dispatcher.with(|c| c.0), Some(3));

        let old = dispatcher.install(Counter(10));
        assert_eq!(old.map(|c| c.0), Some(3));
        assert_eq!(dispatcher.uninstall().map(|c| c.0), Some(10));
        assert!(!dispatcher.dispatch());
    }

    static BUFFERS: FrameBuffers = FrameBuffers::new();

    #[test]
    fn drives_a_static_scan_engine() {
        let dispatcher: TickDispatcher<ScanEngine<'static, RecordingPin, RecordingTimer>> =
            TickDispatcher::new();
        let (pins, _log) = recording_pins();
        let (timer, timer_log) = RecordingTimer::new(84_000_000, SAM3X_TC_DIVIDERS, u32::MAX);
        dispatcher.install(ScanEngine::new(pins, timer, &BUFFERS, MatrixConfig::default()));
        dispatcher.with(|engine| engine.start());
        assert!(timer_log.running());

        for _ in 0..6 {
            dispatcher.dispatch();
        }
        assert_eq!(
            dispatcher.with(|engine| engine.cursor()),
            Some(ScanCursor::new(2, 1))
        );
    }
}
