//! Scan engine configuration

use crate::color::ChannelLayout;
use crate::DEFAULT_BASE_PERIOD_US;

/// Tunables of the scan engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Dwell time of bit-plane 0 in microseconds; plane `n` lasts `2^n` times as long
    pub base_period_us: u32,
    /// Where the modulation nibbles sit inside a packed color
    pub layout: ChannelLayout,
}

impl MatrixConfig {
    /// Default configuration: 100 us base period, RGB565 colors
    pub const fn new() -> Self {
        Self {
            base_period_us: DEFAULT_BASE_PERIOD_US,
            layout: ChannelLayout::RGB565,
        }
    }

    /// Use a different bit-plane 0 dwell time
    pub const fn with_base_period_us(mut self, base_period_us: u32) -> Self {
        self.base_period_us = base_period_us;
        self
    }

    /// Use a different channel layout
    pub const fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Time for one complete frame (every row-pair at every bit-plane), in microseconds
    pub const fn frame_period_us(&self) -> u32 {
        // each row-pair shows planes 0..4, i.e. 1 + 2 + 4 + 8 base periods
        let weights = (1u32 << crate::BIT_PLANES) - 1;
        self.base_period_us
            .saturating_mul(weights)
            .saturating_mul(crate::SCAN_ROWS as u32)
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self::new()
    }
}
