//! Progressive reveal of the curve.
//!
//! The curve buffer never changes once built. Time only affects how many of its
//! leading samples are drawn. This module owns that mapping:
//!
//! - `AnimationState` holds linear progress in `[0, 1]` and whether the reveal is done.
//! - `Reveal` advances a state by a frame's `dt` and maps it to a visible prefix length
//!   through an `Ease` curve.
//!
//! Stepping is a pure function of `(state, dt)`, so tests can drive it with simulated
//! time instead of a real clock:
//! ```ignore
//! let reveal = Reveal::new(22.0, Ease::OutQuad);
//! let mut state = AnimationState::default();
//! for _ in 0..660 {
//!     state = reveal.step(state, 1.0 / 60.0);
//! }
//! let visible = reveal.visible_prefix(state, curve.len());
//! ```

mod clock;

pub use clock::RevealClock;

/// How to map animation time into a normalized [0,1] parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    OutCubic,
}

impl Ease {
    #[inline]
    pub fn sample(self, x: f32) -> f32 {
        let t = x.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InQuad => t * t,
            Ease::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Phase of the reveal. `Complete` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Running,
    Complete,
}

/// Linear reveal progress.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationState {
    progress: f32,
    phase: Phase,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            progress: 0.0,
            phase: Phase::Running,
        }
    }
}

impl AnimationState {
    /// Linear fraction of the duration elapsed, in `[0, 1]`.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

/// Reveal parameters: how long it takes and how progress is eased.
#[derive(Debug, Copy, Clone)]
pub struct Reveal {
    duration: f32,
    ease: Ease,
}

impl Reveal {
    /// `duration` is in the same unit as the `dt` passed to `step` and must be positive.
    pub fn new(duration: f32, ease: Ease) -> Self {
        debug_assert!(duration > 0.0, "reveal duration must be positive");
        Self { duration, ease }
    }

    /// Advance `state` by `dt`.
    ///
    /// Once progress reaches 1 it is clamped to exactly 1 and the state is frozen.
    /// Negative `dt` is ignored so progress never moves backwards.
    ///
    /// Any positive `dt` is applied in full. In the app `dt` comes from `RevealClock`,
    /// which only shortens gaps longer than its stall threshold, so the reveal tracks
    /// wall-clock time even on slow renderers.
    pub fn step(&self, state: AnimationState, dt: f32) -> AnimationState {
        if state.is_complete() {
            return state;
        }

        let progress = state.progress + dt.max(0.0) / self.duration;
        if progress >= 1.0 {
            AnimationState {
                progress: 1.0,
                phase: Phase::Complete,
            }
        } else {
            AnimationState {
                progress,
                phase: Phase::Running,
            }
        }
    }

    /// Eased progress for `state`, in `[0, 1]`.
    #[inline]
    pub fn eased(&self, state: AnimationState) -> f32 {
        self.ease.sample(state.progress)
    }

    /// Number of leading samples of a `total`-sample curve visible in `state`.
    pub fn visible_prefix(&self, state: AnimationState, total: usize) -> usize {
        let eased = self.eased(state) as f64;
        ((total as f64 * eased).floor() as usize).min(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FPS60: f32 = 1.0 / 60.0;

    fn run(reveal: &Reveal, frames: usize, dt: f32) -> AnimationState {
        (0..frames).fold(AnimationState::default(), |s, _| reveal.step(s, dt))
    }

    #[test]
    fn out_quad_endpoints_and_midpoint() {
        assert_eq!(Ease::OutQuad.sample(0.0), 0.0);
        assert_eq!(Ease::OutQuad.sample(1.0), 1.0);
        assert_eq!(Ease::OutQuad.sample(0.5), 0.75);
        // Inputs outside [0, 1] are clamped.
        assert_eq!(Ease::OutQuad.sample(2.0), 1.0);
        assert_eq!(Ease::OutQuad.sample(-1.0), 0.0);
    }

    #[test]
    fn every_ease_is_monotonic_on_the_unit_interval() {
        for ease in [
            Ease::Linear,
            Ease::InQuad,
            Ease::OutQuad,
            Ease::InOutQuad,
            Ease::OutCubic,
        ] {
            let mut prev = ease.sample(0.0);
            assert_eq!(prev, 0.0, "{ease:?}");
            for i in 1..=1000 {
                let v = ease.sample(i as f32 / 1000.0);
                assert!(v >= prev, "{ease:?} decreased at {i}");
                prev = v;
            }
            assert!((prev - 1.0).abs() < 1e-6, "{ease:?}");
        }
    }

    #[test]
    fn half_duration_at_60fps_is_three_quarters_revealed() {
        let reveal = Reveal::new(22.0, Ease::OutQuad);
        let state = run(&reveal, 11 * 60, FPS60);
        assert!((state.progress() - 0.5).abs() < 1e-4);
        assert!((reveal.eased(state) - 0.75).abs() < 1e-4);
        assert_eq!(state.phase(), Phase::Running);
    }

    #[test]
    fn completes_and_freezes_at_exactly_one() {
        let reveal = Reveal::new(22.0, Ease::OutQuad);
        let state = run(&reveal, 23 * 60, FPS60);
        assert!(state.is_complete());
        assert_eq!(state.progress(), 1.0);
        assert_eq!(reveal.eased(state), 1.0);

        let later = reveal.step(state, 100.0);
        assert_eq!(later, state);
    }

    #[test]
    fn single_large_step_clamps() {
        let reveal = Reveal::new(2.0, Ease::Linear);
        let state = reveal.step(AnimationState::default(), 5.0);
        assert!(state.is_complete());
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn negative_dt_does_not_rewind() {
        let reveal = Reveal::new(10.0, Ease::Linear);
        let state = reveal.step(AnimationState::default(), 1.0);
        assert_eq!(reveal.step(state, -5.0), state);
    }

    #[test]
    fn visible_prefix_is_monotonic_and_reaches_total() {
        let reveal = Reveal::new(22.0, Ease::OutQuad);
        let total = 50_000;
        let mut state = AnimationState::default();
        let mut prev = reveal.visible_prefix(state, total);
        assert_eq!(prev, 0);

        while !state.is_complete() {
            state = reveal.step(state, FPS60);
            let visible = reveal.visible_prefix(state, total);
            assert!(visible >= prev);
            assert!(visible <= total);
            prev = visible;
        }
        assert_eq!(reveal.visible_prefix(state, total), total);
    }
}
