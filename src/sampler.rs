//! Domain sampling and discontinuity filtering.
//!
//! The pipeline runs once at startup:
//!
//! 1. `DomainSampler` walks `N` evenly spaced screen x positions over `[-1, 1]`,
//!    evaluates the function at the matching raw x and maps the result to screen y.
//! 2. `DiscontinuityFilter` compares each sample with the previous valid one and turns
//!    large jumps (poles, jump discontinuities) and undefined values into `Sample::Break`.
//! 3. `CurveBuffer` stores the filtered, ordered samples for the renderer.
//!
//! A line-strip renderer draws an edge between consecutive `Point`s only. A `Break`
//! ends the current strip and the next `Point` starts a new one.

use log::info;

use crate::config::{PlotConfig, Viewport};

/// One filtered curve sample in screen space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sample {
    /// A drawable point, connected to the previous `Point` unless a `Break` sits between.
    Point { x: f32, y: f32 },
    /// Segment boundary at `x`. No edge is drawn across it.
    Break { x: f32 },
}

impl Sample {
    #[inline]
    pub fn x(&self) -> f32 {
        match *self {
            Sample::Point { x, .. } | Sample::Break { x } => x,
        }
    }

    #[inline]
    pub fn is_break(&self) -> bool {
        matches!(self, Sample::Break { .. })
    }
}

/// Unfiltered sample: screen x and screen y, `None` if `f` was undefined there.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawSample {
    pub x: f32,
    pub y: Option<f32>,
}

/// Lazily evaluates `f` at `count` evenly spaced positions across the viewport.
///
/// `screen_x[i] = -1 + 2 * i / (count - 1)`, so the first sample is at -1 and the
/// last at exactly 1.
pub struct DomainSampler<F> {
    func: F,
    viewport: Viewport,
    count: usize,
    next: usize,
}

impl<F> DomainSampler<F>
where
    F: Fn(f64) -> f64,
{
    /// `count` must be at least 2.
    pub fn new(func: F, viewport: Viewport, count: usize) -> Self {
        debug_assert!(count >= 2, "DomainSampler needs at least two samples");
        Self {
            func,
            viewport,
            count,
            next: 0,
        }
    }

    #[inline]
    fn screen_x(&self, i: usize) -> f64 {
        -1.0 + 2.0 * i as f64 / (self.count - 1) as f64
    }
}

impl<F> Iterator for DomainSampler<F>
where
    F: Fn(f64) -> f64,
{
    type Item = RawSample;

    fn next(&mut self) -> Option<RawSample> {
        if self.next >= self.count {
            return None;
        }
        let screen_x = self.screen_x(self.next);
        self.next += 1;

        let raw_y = (self.func)(self.viewport.raw_x(screen_x));
        let screen_y = self.viewport.screen_y(raw_y) as f32;

        Some(RawSample {
            x: screen_x as f32,
            // Overflowing f32 is as useless to the renderer as a real pole.
            y: screen_y.is_finite().then_some(screen_y),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl<F> ExactSizeIterator for DomainSampler<F> where F: Fn(f64) -> f64 {}

/// Classifies consecutive samples as connected or broken.
///
/// `prev_y` is the last *valid* screen y seen, whether or not it was emitted as a
/// break. Undefined samples never update it.
#[derive(Debug, Clone)]
pub struct DiscontinuityFilter {
    max_jump: f32,
    prev_y: Option<f32>,
}

impl DiscontinuityFilter {
    pub fn new(max_jump: f32) -> Self {
        Self {
            max_jump,
            prev_y: None,
        }
    }

    /// Classify one raw sample.
    pub fn push(&mut self, raw: RawSample) -> Sample {
        let Some(y) = raw.y else {
            return Sample::Break { x: raw.x };
        };

        let connected = match self.prev_y {
            None => true,
            Some(prev) => (y - prev).abs() < self.max_jump,
        };
        self.prev_y = Some(y);

        if connected {
            Sample::Point { x: raw.x, y }
        } else {
            Sample::Break { x: raw.x }
        }
    }

    /// Filter a whole raw stream.
    pub fn filter<I>(mut self, raw: I) -> impl Iterator<Item = Sample>
    where
        I: IntoIterator<Item = RawSample>,
    {
        raw.into_iter().map(move |s| self.push(s))
    }
}

/// Filtered curve samples in increasing x. Fixed once built.
#[derive(Debug, Clone)]
pub struct CurveBuffer {
    samples: Vec<Sample>,
}

impl CurveBuffer {
    /// Sample and filter `func` over the configured viewport.
    ///
    /// `config` must already be validated.
    pub fn build<F>(func: F, config: &PlotConfig) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let sampler = DomainSampler::new(func, config.viewport, config.sample_count);
        let samples: Vec<Sample> = DiscontinuityFilter::new(config.max_jump)
            .filter(sampler)
            .collect();

        let curve = Self { samples };
        info!(
            "sampled curve: {} samples, {} breaks, {} segments",
            curve.len(),
            curve.break_count(),
            curve.segments(curve.len()).len()
        );
        curve
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn break_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_break()).count()
    }

    /// Connected runs of points within the first `prefix` samples.
    ///
    /// Each item is one line strip; single-point runs are kept (they draw nothing but
    /// still mark where the curve is defined).
    pub fn segments(&self, prefix: usize) -> Vec<&[Sample]> {
        let prefix = prefix.min(self.samples.len());
        self.samples[..prefix]
            .split(Sample::is_break)
            .filter(|run| !run.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(domain_scale: f64, range_scale: f64) -> Viewport {
        Viewport {
            domain_scale,
            range_scale,
        }
    }

    fn raw(x: f32, y: Option<f32>) -> RawSample {
        RawSample { x, y }
    }

    #[test]
    fn sampler_spans_the_viewport_inclusive() {
        let xs: Vec<f32> = DomainSampler::new(|x: f64| x, viewport(1.0, 1.0), 5)
            .map(|s| s.x)
            .collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn sampler_applies_both_scales() {
        let samples: Vec<RawSample> =
            DomainSampler::new(|x: f64| 2.0 * x, viewport(10.0, 4.0), 3).collect();
        // raw x = -10, 0, 10; raw y = -20, 0, 20; screen y = raw y / 4.
        assert_eq!(samples[0], raw(-1.0, Some(-5.0)));
        assert_eq!(samples[1], raw(0.0, Some(0.0)));
        assert_eq!(samples[2], raw(1.0, Some(5.0)));
    }

    #[test]
    fn sampler_marks_non_finite_results_undefined() {
        let samples: Vec<RawSample> =
            DomainSampler::new(|x: f64| x.sqrt(), viewport(1.0, 1.0), 3).collect();
        assert_eq!(samples[0].y, None);
        assert_eq!(samples[1].y, Some(0.0));
        assert_eq!(samples[2].y, Some(1.0));
    }

    #[test]
    fn sampler_is_exact_size_and_not_restartable() {
        let mut sampler = DomainSampler::new(|x: f64| x, viewport(1.0, 1.0), 4);
        assert_eq!(sampler.len(), 4);
        assert_eq!(sampler.by_ref().count(), 4);
        assert_eq!(sampler.next(), None);
    }

    #[test]
    fn filter_emits_first_sample_unconditionally() {
        let mut filter = DiscontinuityFilter::new(2.0);
        assert_eq!(
            filter.push(raw(-1.0, Some(100.0))),
            Sample::Point { x: -1.0, y: 100.0 }
        );
    }

    #[test]
    fn filter_breaks_on_jumps_at_or_above_threshold() {
        let mut filter = DiscontinuityFilter::new(2.0);
        filter.push(raw(0.0, Some(0.0)));
        assert!(!filter.push(raw(0.1, Some(1.5))).is_break());
        // Exactly the threshold is a break.
        assert!(filter.push(raw(0.2, Some(3.5))).is_break());
    }

    #[test]
    fn filter_compares_against_latest_value_even_after_a_break() {
        let mut filter = DiscontinuityFilter::new(2.0);
        filter.push(raw(0.0, Some(0.0)));
        assert!(filter.push(raw(0.1, Some(10.0))).is_break());
        // 10.5 is close to 10.0 (the broken sample), so it connects.
        assert_eq!(
            filter.push(raw(0.2, Some(10.5))),
            Sample::Point { x: 0.2, y: 10.5 }
        );
    }

    #[test]
    fn undefined_samples_break_without_touching_prev_y() {
        let mut filter = DiscontinuityFilter::new(2.0);
        filter.push(raw(0.0, Some(1.0)));
        assert_eq!(filter.push(raw(0.1, None)), Sample::Break { x: 0.1 });
        assert_eq!(filter.push(raw(0.2, None)), Sample::Break { x: 0.2 });
        // Compared against 1.0, not against the undefined samples.
        assert!(!filter.push(raw(0.3, Some(1.5))).is_break());
        assert!(filter.push(raw(0.4, Some(4.0))).is_break());
    }

    #[test]
    fn leading_undefined_region_then_first_valid_point() {
        let mut filter = DiscontinuityFilter::new(2.0);
        assert!(filter.push(raw(-1.0, None)).is_break());
        assert_eq!(
            filter.push(raw(-0.5, Some(50.0))),
            Sample::Point { x: -0.5, y: 50.0 }
        );
    }

    #[test]
    fn curve_has_requested_count_in_increasing_order() {
        let config = PlotConfig {
            sample_count: 1001,
            ..Default::default()
        };
        let curve = CurveBuffer::build(|x: f64| x.tan(), &config);
        assert_eq!(curve.len(), 1001);
        assert!(!curve.is_empty());
        assert!(curve.samples().windows(2).all(|w| w[0].x() < w[1].x()));
        assert_eq!(curve.samples()[0].x(), -1.0);
        assert_eq!(curve.samples()[1000].x(), 1.0);
    }

    #[test]
    fn segments_split_on_breaks_within_prefix() {
        let curve = CurveBuffer {
            samples: vec![
                Sample::Point { x: -1.0, y: 0.0 },
                Sample::Point { x: -0.5, y: 0.1 },
                Sample::Break { x: 0.0 },
                Sample::Point { x: 0.5, y: 0.2 },
                Sample::Point { x: 1.0, y: 0.3 },
            ],
        };
        assert_eq!(curve.break_count(), 1);
        assert_eq!(curve.segments(5).len(), 2);
        assert_eq!(curve.segments(5)[1].len(), 2);
        assert_eq!(curve.segments(2).len(), 1);
        assert_eq!(curve.segments(4).len(), 2);
        assert!(curve.segments(0).is_empty());
        assert_eq!(curve.segments(100).len(), 2);
    }
}
