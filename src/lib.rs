//! 32x16 RGB LED Matrix Driver with Binary Code Modulation
//!
//! Drives the common 1/8-scan 32x16 RGB LED panels (HUB75-style connector:
//! six color lines, clock, latch, output enable and three address lines) from
//! a microcontroller timer interrupt. Colors are stored as 16-bit RGB565 words
//! and shown with 4 bits per channel (4096 colors) using Binary Code
//! Modulation: every bit-plane stays lit for a time proportional to its weight.
//!
//! ## Architecture
//!
//! - [`buffer::FrameBuffers`] holds a front and a back pixel store. The
//!   application paints the back store, the scan engine reads the front one.
//! - [`panel::Panel`] is the application-side handle: `set_pixel`,
//!   `get_pixel`, `request_refresh`. It implements the wait protocol around a
//!   pending swap.
//! - [`driver::ScanEngine`] is the interrupt-side state machine. Each tick it
//!   reprograms the [`timer::ModulationTimer`], shifts out one row-pair for one
//!   bit-plane through [`interface::PanelInterface`] and advances its cursor.
//!   At the end of a frame it performs a requested swap.
//! - [`dispatch::TickDispatcher`] is the static slot the timer interrupt vector
//!   forwards to.
//!
//! Hardware access goes through `embedded-hal` output pins and the small
//! [`timer::CountdownTimer`] trait, so the engine is not tied to one MCU family.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use rgbmatrix_bcm::prelude::*;
//!
//! static BUFFERS: FrameBuffers = FrameBuffers::new();
//! static SCAN: TickDispatcher<ScanEngine<'static, Output<'static>, Tc3>> = TickDispatcher::new();
//!
//! #[interrupt]
//! fn TC3() {
//!     tc3::clear_status();
//!     SCAN.dispatch();
//! }
//!
//! // 1. Build the engine and hand it to the interrupt
//! SCAN.install(ScanEngine::new(pins, tc3, &BUFFERS, MatrixConfig::default()));
//! SCAN.with(|engine| engine.start());
//!
//! // 2. Paint into the back store
//! let mut panel = Panel::new(&BUFFERS, delay);
//! panel.set_pixel(0, 0, rgb444(15, 0, 0));
//!
//! // 3. Show it from the next frame on
//! panel.request_refresh();
//! ```
//!
//! With the `graphics` feature, [`displays::MatrixDisplay`] turns a `Panel`
//! into an `embedded-graphics` draw target.
//!
#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod buffer;
pub mod color;
pub mod config;
#[cfg(feature = "graphics")]
pub mod displays;
pub mod dispatch;
pub mod driver;
pub mod interface;
pub mod panel;
pub mod timer;

#[cfg(test)]
mod mock;

/// Panel width in pixels
pub const WIDTH: usize = 32;

/// Panel height in pixels
pub const HEIGHT: usize = 16;

/// Row-pairs per frame; row `r` and row `r + SCAN_ROWS` are driven together
pub const SCAN_ROWS: usize = HEIGHT / 2;

/// Modulation bits per color channel
pub const BIT_PLANES: usize = 4;

/// Default dwell time of bit-plane 0, in microseconds
pub const DEFAULT_BASE_PERIOD_US: u32 = 100;

/// Useful exports
pub mod prelude {
    pub use crate::buffer::FrameBuffers;
    pub use crate::color::{rgb444, ChannelLayout};
    pub use crate::config::MatrixConfig;
    pub use crate::dispatch::{TickDispatcher, TickHandler};
    pub use crate::driver::{DisplayError, ScanEngine};
    pub use crate::interface::PanelPins;
    pub use crate::panel::Panel;
    pub use crate::timer::{CountdownTimer, TimerSetting};

    #[cfg(feature = "graphics")]
    pub use crate::displays::{DisplayRotation, MatrixDisplay};
}
