//! Foreground drawing surface
//!
//! [`Panel`] is what application code paints through. Writes go to the back
//! store of the shared [`FrameBuffers`]; [`Panel::request_refresh`] asks the
//! scan interrupt to present them.
//!
//! While a refresh is pending the back store is about to become the front
//! store, so `set_pixel`, `fill` and `request_refresh` spin (sleeping on the
//! supplied delay between polls) until the interrupt has performed the swap.
//! Their writes then land in the fresh, blank back store and show up with the
//! *next* refresh. There is no timeout: if the scan interrupt is not running,
//! these calls never return.

use embedded_hal::delay::DelayNs;

use crate::buffer::FrameBuffers;

/// Default sleep between polls of the swap request, in microseconds
pub const DEFAULT_POLL_INTERVAL_US: u32 = 1_000;

/// Application-side handle to the frame buffers
pub struct Panel<'a, D> {
    buffers: &'a FrameBuffers,
    delay: D,
    poll_interval_us: u32,
}

impl<'a, D> Panel<'a, D>
where
    D: DelayNs,
{
    /// Paint into `buffers`, sleeping on `delay` while a refresh is pending
    pub fn new(buffers: &'a FrameBuffers, delay: D) -> Self {
        Self {
            buffers,
            delay,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
        }
    }

    /// Change the sleep between polls of a pending refresh
    pub fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }

    fn wait_for_swap(&mut self) {
        while self.buffers.is_swap_pending() {
            self.delay.delay_us(self.poll_interval_us);
        }
    }

    /// Set the pixel at `(x, y)`. Coordinates outside 32 x 16 are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u16) {
        self.wait_for_swap();
        self.buffers.set_pixel(x, y, color);
    }

    /// Color last written at `(x, y)` in the back store, `None` outside the panel
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u16> {
        self.buffers.get_pixel(x, y)
    }

    /// Set every pixel of the back store to `color`
    pub fn fill(&mut self, color: u16) {
        self.wait_for_swap();
        self.buffers.fill(color);
    }

    /// Set every pixel of the back store to black
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Present the back store at the next frame boundary
    ///
    /// Waits for an earlier request to be honored first, so two calls in a
    /// row produce two swaps, never a lost one.
    pub fn request_refresh(&mut self) {
        self.wait_for_swap();
        self.buffers.request_swap();
    }

    /// Whether a refresh is still waiting for the frame boundary
    pub fn is_refresh_pending(&self) -> bool {
        self.buffers.is_swap_pending()
    }

    /// The shared buffers
    pub fn buffers(&self) -> &'a FrameBuffers {
        self.buffers
    }

    /// Give the delay back
    pub fn release(self) -> D {
        self.delay
    }
}
