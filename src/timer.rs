//! Reprogrammable countdown timer that paces the bit-planes
//!
//! Binary Code Modulation shows bit-plane `n` for `2^n` times as long as
//! bit-plane 0. The scan engine therefore reprograms the timer on every tick
//! with `base_period * 2^bit_plane`. [`CountdownTimer`] is the small
//! capability a hardware timer backend has to offer; [`ModulationTimer`]
//! turns periods in microseconds into divider/compare settings for it.

use log::debug;

use crate::BIT_PLANES;

/// Prescalers of the SAM3X Timer/Counter (MCK/2, MCK/8, MCK/32, MCK/128)
pub const SAM3X_TC_DIVIDERS: &[u32] = &[2, 8, 32, 128];

/// Divider and compare value that together give one timer period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSetting {
    /// Input clock prescaler
    pub divider: u32,
    /// Counter value at which the timer fires and restarts
    pub compare: u32,
}

impl TimerSetting {
    /// Period this setting really produces, in nanoseconds
    pub fn period_ns(&self, input_clock_hz: u32) -> u64 {
        u64::from(self.compare) * u64::from(self.divider) * 1_000_000_000
            / u64::from(input_clock_hz.max(1))
    }

    /// Length of one counter step, in nanoseconds
    pub fn resolution_ns(&self, input_clock_hz: u32) -> u64 {
        u64::from(self.divider) * 1_000_000_000 / u64::from(input_clock_hz.max(1))
    }
}

/// A hardware countdown timer that raises an interrupt on expiry
///
/// Implementations are expected to restart counting from zero when
/// [`program`](Self::program) is called and to keep firing periodically until
/// reprogrammed.
pub trait CountdownTimer {
    /// Frequency of the clock feeding the prescaler, in Hz
    fn input_clock_hz(&self) -> u32;

    /// Selectable prescalers, finest first
    fn dividers(&self) -> &[u32];

    /// Largest value the compare register can hold
    fn max_compare(&self) -> u32;

    /// Load a new divider/compare pair
    fn program(&mut self, setting: TimerSetting);

    /// Unmask the expiry interrupt
    fn enable_interrupt(&mut self);

    /// Start counting
    fn start(&mut self);
}

/// Pick the divider/compare pair closest to `period_us`
///
/// Among `dividers` the one with the smallest rounding error wins, earlier
/// entries winning ties. Compare values are rounded to the nearest tick and
/// clamped to `1..=max_compare`, so an unrepresentable period is quantized
/// instead of rejected. An empty divider list behaves like `[1]`.
pub fn compute_setting(
    input_clock_hz: u32,
    period_us: u32,
    dividers: &[u32],
    max_compare: u32,
) -> TimerSetting {
    // in units of clock cycles per microsecond
    let target = u64::from(input_clock_hz).saturating_mul(u64::from(period_us));
    let max_compare = u64::from(max_compare.max(1));

    let candidate = |divider: u32| {
        let scale = u64::from(divider.max(1)) * 1_000_000;
        let compare = ((target + scale / 2) / scale).clamp(1, max_compare);
        let error = (compare * scale).abs_diff(target);
        (
            TimerSetting {
                divider: divider.max(1),
                compare: compare as u32,
            },
            error,
        )
    };

    let mut best = candidate(dividers.first().copied().unwrap_or(1));
    for &divider in dividers.iter().skip(1) {
        let next = candidate(divider);
        if next.1 < best.1 {
            best = next;
        }
    }
    best.0
}

/// Timer driver for the modulation period
pub struct ModulationTimer<T> {
    timer: T,
    base_period_us: u32,
    current: Option<TimerSetting>,
}

impl<T> ModulationTimer<T>
where
    T: CountdownTimer,
{
    /// Wrap `timer`; bit-plane 0 lasts `base_period_us`
    pub fn new(timer: T, base_period_us: u32) -> Self {
        Self {
            timer,
            base_period_us,
            current: None,
        }
    }

    /// Period of bit-plane 0
    pub fn base_period_us(&self) -> u32 {
        self.base_period_us
    }

    /// Requested period of `bit_plane`: base period times `2^bit_plane`
    pub fn period_for(&self, bit_plane: u8) -> u32 {
        debug_assert!(usize::from(bit_plane) < BIT_PLANES);
        let plane = bit_plane.min(BIT_PLANES as u8 - 1);
        self.base_period_us.saturating_mul(1 << plane)
    }

    /// Program the timer for `period_us` and keep its interrupt enabled
    ///
    /// Returns the setting that was loaded; its period may differ from the
    /// request by up to one counter step.
    pub fn configure(&mut self, period_us: u32) -> TimerSetting {
        let setting = compute_setting(
            self.timer.input_clock_hz(),
            period_us,
            self.timer.dividers(),
            self.timer.max_compare(),
        );
        self.timer.program(setting);
        self.timer.enable_interrupt();
        self.current = Some(setting);
        setting
    }

    /// Program the timer for the dwell time of `bit_plane`
    pub fn configure_bit_plane(&mut self, bit_plane: u8) -> TimerSetting {
        self.configure(self.period_for(bit_plane))
    }

    /// Enable the interrupt and start counting with the bit-plane 0 period
    pub fn start(&mut self) -> TimerSetting {
        self.timer.enable_interrupt();
        let setting = self.configure_bit_plane(0);
        debug!(
            "modulation timer started: divider {}, compare {}, {} ns",
            setting.divider,
            setting.compare,
            setting.period_ns(self.timer.input_clock_hz())
        );
        self.timer.start();
        setting
    }

    /// Setting loaded by the last [`configure`](Self::configure)
    pub fn current(&self) -> Option<TimerSetting> {
        self.current
    }

    /// Actual period of the last loaded setting, in nanoseconds
    pub fn current_period_ns(&self) -> Option<u64> {
        let clock = self.timer.input_clock_hz();
        self.current.map(|s| s.period_ns(clock))
    }

    /// Give the timer back
    pub fn release(self) -> T {
        self.timer
    }
}
