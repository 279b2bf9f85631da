//! Wall-clock access and a fixed-timestep frame clock.
//!
//! `draw_web()` calls at ~60fps with variable delta. [`GameClock`] turns frame
//! timestamps into elapsed seconds in whole ticks, so passive income is
//! credited in the same 100ms steps regardless of frame rate.

use std::cell::Cell;

/// Passive-income ticks per real-time second (100ms per tick).
pub const TICKS_PER_SEC: u32 = 10;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// The real clock: `Date.now()` in the browser, `SystemTime` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<f64>,
}

impl FixedClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.now.set(self.now.get() + secs * 1000.0);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Converts per-frame timestamps into elapsed seconds in whole ticks.
pub struct GameClock {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameClock {
    /// `ticks_per_sec`: how many ticks per real-time second (e.g. 10).
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a frame timestamp; returns the seconds to credit this frame.
    ///
    /// The first frame returns 0. A timestamp that goes backwards counts as
    /// no time passing. Long gaps (a backgrounded tab) are credited in full.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(prev) if now_ms.is_finite() => (now_ms - prev).max(0.0),
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_timestamp = Some(now_ms);
        }

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick).floor();
        self.accumulator -= ticks * self.ms_per_tick;
        self.total_ticks = self.total_ticks.saturating_add(ticks as u64);
        ticks * self.ms_per_tick / 1000.0
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(TICKS_PER_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn first_frame_returns_zero() {
        let mut gc = GameClock::new(10);
        assert_eq!(gc.update(0.0), 0.0);
        assert_eq!(gc.total_ticks, 0);
    }

    #[test]
    fn one_tick_at_100ms() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        assert!(approx(gc.update(100.0), 0.1));
        assert_eq!(gc.total_ticks, 1);
    }

    #[test]
    fn remainder_carried_over() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        assert!(approx(gc.update(150.0), 0.1)); // 1 tick, 50ms remainder
        assert!(approx(gc.update(200.0), 0.1)); // 50ms + 50ms = 1 tick
        assert_eq!(gc.total_ticks, 2);
    }

    #[test]
    fn sub_tick_frames_accumulate() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        for t in [16.0, 32.0, 48.0, 64.0, 80.0, 96.0] {
            assert_eq!(gc.update(t), 0.0);
        }
        assert!(approx(gc.update(112.0), 0.1));
        assert_eq!(gc.total_ticks, 1);
    }

    #[test]
    fn long_gap_is_credited_in_full() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        assert!(approx(gc.update(10_000.0), 10.0));
        assert_eq!(gc.total_ticks, 100);
    }

    #[test]
    fn backwards_timestamp_credits_nothing() {
        let mut gc = GameClock::new(10);
        gc.update(1_000.0);
        assert_eq!(gc.update(500.0), 0.0);
        assert!(approx(gc.update(600.0), 0.1));
    }

    #[test]
    fn non_finite_timestamp_is_ignored() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        assert_eq!(gc.update(f64::NAN), 0.0);
        assert!(approx(gc.update(100.0), 0.1));
    }

    #[test]
    fn steady_60fps() {
        let mut gc = GameClock::new(10);
        gc.update(0.0);
        let mut total = 0.0;
        for i in 1..=60 {
            total += gc.update(i as f64 * 16.667);
        }
        assert!(total >= 0.9 && total <= 1.1, "expected ~1s, got {}", total);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(1_000.0);
        assert_eq!(clock.now_ms(), 1_000.0);
        clock.advance_secs(2.5);
        assert_eq!(clock.now_ms(), 3_500.0);
        clock.set(10.0);
        assert_eq!((&clock).now_ms(), 10.0);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000.0);
    }
}
