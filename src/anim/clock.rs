use std::time::Instant;

use log::debug;

/// Wall-clock time source for the reveal.
///
/// Each `tick()` returns the real time since the previous tick, so the reveal follows
/// wall-clock time at any frame rate. Two exceptions:
/// - the first tick returns 0, so window and GPU setup never count;
/// - a gap longer than `stall_after` (window drag, breakpoint, suspended process)
///   counts as `stall_after` only, so the curve does not leap forward afterwards.
#[derive(Debug, Clone)]
pub struct RevealClock {
    last: Option<Instant>,
    stall_after: f32,
    animated_s: f32,
    stalls: u32,
}

impl RevealClock {
    /// `stall_after` is in seconds and must be positive and finite.
    pub fn new(stall_after: f32) -> Self {
        debug_assert!(
            stall_after.is_finite() && stall_after > 0.0,
            "stall threshold must be positive"
        );
        Self {
            last: None,
            stall_after,
            animated_s: 0.0,
            stalls: 0,
        }
    }

    /// Seconds of animation time since the previous tick.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// `tick` with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last.replace(now) else {
            return 0.0;
        };

        // Saturates to zero if `now` is not after `last`.
        let gap = now.saturating_duration_since(last).as_secs_f32();
        let dt = if gap > self.stall_after {
            self.stalls += 1;
            debug!("frame gap of {gap:.3}s treated as a stall");
            self.stall_after
        } else {
            gap
        };
        self.animated_s += dt;
        dt
    }

    /// Total animation time handed out so far.
    #[inline]
    pub fn animated_s(&self) -> f32 {
        self.animated_s
    }

    /// Number of gaps that were cut down to `stall_after`.
    #[inline]
    pub fn stalls(&self) -> u32 {
        self.stalls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_tick_is_zero() {
        let mut clock = RevealClock::new(0.5);
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
        assert_eq!(clock.animated_s(), 0.0);
    }

    #[test]
    fn slow_frames_below_the_stall_threshold_are_not_shortened() {
        let mut clock = RevealClock::new(0.5);
        let t0 = Instant::now();
        clock.tick_at(t0);
        // 4 fps: every frame keeps its full real duration.
        for i in 1..=8 {
            let dt = clock.tick_at(t0 + ms(250 * i));
            assert!((dt - 0.25).abs() < 1e-6);
        }
        assert!((clock.animated_s() - 2.0).abs() < 1e-5);
        assert_eq!(clock.stalls(), 0);
    }

    #[test]
    fn stalls_are_cut_to_the_threshold() {
        let mut clock = RevealClock::new(0.5);
        let t0 = Instant::now();
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 + ms(10_000)), 0.5);
        assert_eq!(clock.stalls(), 1);

        let dt = clock.tick_at(t0 + ms(10_016));
        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(clock.stalls(), 1);
    }

    #[test]
    fn time_going_backwards_yields_zero() {
        let mut clock = RevealClock::new(0.5);
        let t0 = Instant::now() + ms(100);
        clock.tick_at(t0);
        assert_eq!(clock.tick_at(t0 - ms(50)), 0.0);
    }
}
