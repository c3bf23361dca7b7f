//! Binary Code Modulation scan engine
//!
//! Every timer expiry the engine drives one row-pair for one bit-plane:
//!
//! 1. reprogram the timer with `base_period * 2^bit_plane`, the time this
//!    row-pair stays lit,
//! 2. shift out row `r` and row `r + 8` of the front store for that bit-plane,
//! 3. advance the cursor: bit-plane first (0..4), then row-pair (0..8). When
//!    the row-pair wraps a frame is complete and a pending buffer swap is
//!    carried out.
//!
//! Period and cursor never depend on elapsed time, so a late tick only skews
//! the duty cycle of that one slot.
pub use display_interface::DisplayError;

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::buffer::FrameBuffers;
use crate::color::ChannelLayout;
use crate::config::MatrixConfig;
use crate::dispatch::TickHandler;
use crate::interface::{PanelInterface, PanelPins};
use crate::timer::{CountdownTimer, ModulationTimer, TimerSetting};
use crate::{BIT_PLANES, SCAN_ROWS};

/// Scan progress: which bit-plane of which row-pair is shown next
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanCursor {
    bit_plane: u8,
    row: u8,
}

impl ScanCursor {
    /// First slot of a frame
    pub const START: Self = Self {
        bit_plane: 0,
        row: 0,
    };

    /// Cursor at `(bit_plane, row)`, clamped into `0..4` and `0..8`
    pub fn new(bit_plane: u8, row: u8) -> Self {
        debug_assert!(usize::from(bit_plane) < BIT_PLANES && usize::from(row) < SCAN_ROWS);
        Self {
            bit_plane: bit_plane.min(BIT_PLANES as u8 - 1),
            row: row.min(SCAN_ROWS as u8 - 1),
        }
    }

    /// Bit-plane index, `0..4`
    pub fn bit_plane(&self) -> u8 {
        self.bit_plane
    }

    /// Row-pair index, `0..8`
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Step to the next slot; bit-plane is the inner counter
    ///
    /// Returns `true` when the row-pair wrapped, i.e. a frame was completed.
    pub fn advance(&mut self) -> bool {
        self.bit_plane += 1;
        if usize::from(self.bit_plane) < BIT_PLANES {
            return false;
        }
        self.bit_plane = 0;
        self.row += 1;
        if usize::from(self.row) < SCAN_ROWS {
            return false;
        }
        self.row = 0;
        true
    }
}

/// The scan state machine, driven from the timer interrupt
pub struct ScanEngine<'a, P, T> {
    interface: PanelInterface<P>,
    timer: ModulationTimer<T>,
    buffers: &'a FrameBuffers,
    layout: ChannelLayout,
    cursor: ScanCursor,
    frames: u32,
    faults: u32,
}

impl<'a, P, T> ScanEngine<'a, P, T>
where
    P: OutputPin,
    T: CountdownTimer,
{
    /// Build an engine that shows the front store of `buffers` on the panel
    /// behind `pins`, paced by `timer`
    pub fn new(
        pins: PanelPins<P>,
        timer: T,
        buffers: &'a FrameBuffers,
        config: MatrixConfig,
    ) -> Self {
        debug!(
            "creating scan engine: base period {} us, layout {:?}",
            config.base_period_us, config.layout
        );
        Self {
            interface: PanelInterface::new(pins),
            timer: ModulationTimer::new(timer, config.base_period_us),
            buffers,
            layout: config.layout,
            cursor: ScanCursor::START,
            frames: 0,
            faults: 0,
        }
    }

    /// Rewind to the first slot and start the timer with the bit-plane 0 period
    pub fn start(&mut self) -> TimerSetting {
        debug!("starting scan");
        self.cursor = ScanCursor::START;
        self.timer.start()
    }

    /// Handle one timer expiry
    ///
    /// The cursor advances even when a pin write fails, so the next tick
    /// carries on with the following slot; the error is returned afterwards.
    pub fn on_tick(&mut self) -> Result<(), DisplayError> {
        let ScanCursor { bit_plane, row } = self.cursor;

        self.timer.configure_bit_plane(bit_plane);

        let (upper, lower) = self.buffers.front_row_pair(usize::from(row));
        let result = self
            .interface
            .write_row_pair(row, &upper, &lower, bit_plane, self.layout);

        if self.cursor.advance() {
            self.frames = self.frames.wrapping_add(1);
            self.buffers.swap_if_pending();
        }
        result
    }

    /// Slot the next tick will show
    pub fn cursor(&self) -> ScanCursor {
        self.cursor
    }

    /// Completed frames (wrapping)
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Ticks whose output failed (wrapping)
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    /// Timer setting loaded by the most recent tick
    pub fn timer_setting(&self) -> Option<TimerSetting> {
        self.timer.current()
    }

    /// Tear the engine down and give back pins and timer
    pub fn release(self) -> (PanelPins<P>, T) {
        (self.interface.release(), self.timer.release())
    }
}

impl<P, T> TickHandler for ScanEngine<'_, P, T>
where
    P: OutputPin,
    T: CountdownTimer,
{
    fn handle_tick(&mut self) {
        if let Err(e) = self.on_tick() {
            self.faults = self.faults.wrapping_add(1);
            warn!("row output failed: {:?}", e);
        }
    }
}
