//! Fixed-step tick accumulation

use log::warn;

/// Converts variable frame time into whole fixed-duration ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    dt: f32,
    remainder: f32,
    max_ticks_per_frame: Option<u32>,
}

impl TickClock {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            remainder: 0.0,
            max_ticks_per_frame: None,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks_per_frame: Option<u32>) -> Self {
        self.max_ticks_per_frame = max_ticks_per_frame;
        self
    }

    /// Accumulates `frame_dt` and returns how many ticks are now due.
    ///
    /// Without a cap every whole `dt` in the remainder is consumed. With a
    /// cap, the ticks beyond it are dropped rather than carried over.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.remainder += frame_dt.max(0.0);

        let mut ticks = 0;
        while self.remainder >= self.dt {
            if self.max_ticks_per_frame.is_some_and(|max| ticks >= max) {
                let dropped = (self.remainder / self.dt).floor();
                warn!(
                    "Tick budget of {} per frame exhausted, dropping {} ticks",
                    ticks, dropped
                );
                self.remainder -= dropped * self.dt;
                // floating point may leave exactly one dt behind
                if self.remainder >= self.dt {
                    self.remainder -= self.dt;
                }
                break;
            }
            self.remainder -= self.dt;
            ticks += 1;
        }
        ticks
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Time accumulated towards the next tick.
    pub fn remainder(&self) -> f32 {
        self.remainder
    }

    /// Fraction of the next tick already elapsed, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.remainder / self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_exact_frame_emits_one_tick() {
        let mut clock = TickClock::new(0.02);
        for _ in 0..10 {
            assert_eq!(clock.advance(0.02), 1);
        }
        assert_eq!(clock.remainder(), 0.0);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = TickClock::new(0.25);
        assert_eq!(clock.advance(0.125), 0);
        assert_approx_eq!(clock.alpha(), 0.5);
        assert_eq!(clock.advance(0.125), 1);
        assert_eq!(clock.remainder(), 0.0);
    }

    #[test]
    fn test_long_frame_emits_many_ticks() {
        let mut clock = TickClock::new(0.25);
        assert_eq!(clock.advance(1.125), 4);
        assert_approx_eq!(clock.remainder(), 0.125);
    }

    #[test]
    fn test_tick_cap_drops_backlog() {
        let mut clock = TickClock::new(0.25).with_max_ticks(Some(2));
        assert_eq!(clock.advance(1.125), 2);
        assert!(clock.remainder() < 0.25);
        assert_eq!(clock.advance(0.125), 1);
    }

    #[test]
    fn test_negative_frame_time_is_ignored() {
        let mut clock = TickClock::new(0.25);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.remainder(), 0.0);
    }
}
