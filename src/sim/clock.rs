//! Frame clock
//!
//! Turns monotonic timestamps (seconds) into per-frame deltas. The caller
//! supplies the time so the clock stays testable without sleeping.

/// Tracks the previous frame time and derives `dt`
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: f64,
    frame_index: u64,
    max_dt: f32,
}

impl FrameClock {
    /// Start a clock at `start` seconds; the first tick measures from there
    pub fn new(start: f64, max_dt: f32) -> Self {
        Self {
            last: start,
            frame_index: 0,
            max_dt,
        }
    }

    /// Advance to `now` and return the elapsed seconds, in `[0, max_dt]`
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = (now - self.last).max(0.0) as f32;
        // Time never runs backwards for the caller, even if the source does
        self.last = self.last.max(now);
        self.frame_index = self.frame_index.wrapping_add(1);
        dt.min(self.max_dt)
    }

    /// Number of ticks so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_at_start_is_zero() {
        let mut clock = FrameClock::new(2.0, 0.25);
        assert_eq!(clock.tick(2.0), 0.0);
        assert_eq!(clock.frame_index(), 1);
    }

    #[test]
    fn test_tick_measures_elapsed() {
        let mut clock = FrameClock::new(0.0, 0.25);
        assert!((clock.tick(0.016) - 0.016).abs() < 1e-6);
        assert!((clock.tick(0.032) - 0.016).abs() < 1e-6);
        assert_eq!(clock.frame_index(), 2);
    }

    #[test]
    fn test_tick_clamps_long_stall() {
        let mut clock = FrameClock::new(0.0, 0.25);
        assert_eq!(clock.tick(3.0), 0.25);
    }

    #[test]
    fn test_tick_never_negative() {
        let mut clock = FrameClock::new(1.0, 0.25);
        assert_eq!(clock.tick(0.5), 0.0);
        assert!((clock.tick(1.1) - 0.1).abs() < 1e-6);
    }
}
