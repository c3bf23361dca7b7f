//! Pin-level interface to the panel's shift registers
//!
//! The panel input is a chain of shift registers: six color lines (red, green
//! and blue for the upper and the lower half), a clock, a latch, an output
//! enable and three row-address lines. [`PanelInterface`] clocks one row-pair
//! of data through those lines using nothing but
//! [`embedded_hal::digital::OutputPin`], so any HAL whose pin writes are fast
//! enough can drive the panel.

use display_interface::DisplayError;
use embedded_hal::digital::{OutputPin, PinState};

use crate::buffer::Row;
use crate::color::{ChannelBits, ChannelLayout};
use crate::SCAN_ROWS;

/// The twelve logical signals of the panel connector
///
/// All lines share one pin type; HALs that give every pin its own type
/// usually offer a type-erased pin (`AnyPin`, `Output<'_>`, `ErasedPin`, ...).
pub struct PanelPins<P> {
    /// Red, upper half
    pub r1: P,
    /// Green, upper half
    pub g1: P,
    /// Blue, upper half
    pub b1: P,
    /// Red, lower half
    pub r2: P,
    /// Green, lower half
    pub g2: P,
    /// Blue, lower half
    pub b2: P,
    /// Shift clock
    pub clk: P,
    /// Output enable
    pub oe: P,
    /// Latch enable
    pub lat: P,
    /// Row address bit 0
    pub a: P,
    /// Row address bit 1
    pub b: P,
    /// Row address bit 2
    pub c: P,
}

/// Shift-out primitive for one row-pair at a time
pub struct PanelInterface<P> {
    pins: PanelPins<P>,
}

#[inline]
fn drive<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DisplayError> {
    pin.set_state(PinState::from(high))
        .map_err(|_| DisplayError::BusWriteError)
}

impl<P> PanelInterface<P>
where
    P: OutputPin,
{
    /// Wrap the panel pins
    pub fn new(pins: PanelPins<P>) -> Self {
        Self { pins }
    }

    /// Give the pins back
    pub fn release(self) -> PanelPins<P> {
        self.pins
    }

    /// Put the row-pair index on the address lines, least significant bit on `a`
    pub fn select_row(&mut self, row: u8) -> Result<(), DisplayError> {
        drive(&mut self.pins.a, row & 0b001 != 0)?;
        drive(&mut self.pins.b, row & 0b010 != 0)?;
        drive(&mut self.pins.c, row & 0b100 != 0)
    }

    /// Drive the six color lines for one column and pulse the clock
    pub fn shift_column(&mut self, upper: ChannelBits, lower: ChannelBits) -> Result<(), DisplayError> {
        drive(&mut self.pins.b1, upper.blue)?;
        drive(&mut self.pins.g1, upper.green)?;
        drive(&mut self.pins.r1, upper.red)?;
        drive(&mut self.pins.b2, lower.blue)?;
        drive(&mut self.pins.g2, lower.green)?;
        drive(&mut self.pins.r2, lower.red)?;

        self.pins.clk.set_low().map_err(|_| DisplayError::BusWriteError)?;
        self.pins.clk.set_high().map_err(|_| DisplayError::BusWriteError)
    }

    /// Clock out row `row` (upper half) and `row + 8` (lower half) for one
    /// bit-plane, then present it
    ///
    /// Address lines are set once, output enable and latch are held high while
    /// the 32 columns are shifted, then latch and output enable drop in that
    /// order.
    pub fn write_row_pair(
        &mut self,
        row: u8,
        upper: &Row,
        lower: &Row,
        bit_plane: u8,
        layout: ChannelLayout,
    ) -> Result<(), DisplayError> {
        debug_assert!(usize::from(row) < SCAN_ROWS);
        self.select_row(row)?;

        self.pins.oe.set_high().map_err(|_| DisplayError::BusWriteError)?;
        self.pins.lat.set_high().map_err(|_| DisplayError::BusWriteError)?;

        for (&top, &bottom) in upper.iter().zip(lower.iter()) {
            self.shift_column(
                layout.modulation_bits(top, bit_plane),
                layout.modulation_bits(bottom, bit_plane),
            )?;
        }

        self.pins.lat.set_low().map_err(|_| DisplayError::BusWriteError)?;
        self.pins.oe.set_low().map_err(|_| DisplayError::BusWriteError)
    }
}
