//! Session constants for a plot.
//!
//! Everything that shapes the curve, the reference geometry, and the reveal animation
//! lives in one `PlotConfig` value. There is no config file and no flags: the binary
//! uses `PlotConfig::default()`, and tests build their own values.

use crate::anim::Ease;
use crate::error::StartupError;

/// Default number of curve samples.
pub const DEFAULT_SAMPLE_COUNT: usize = 50_000;

/// Largest screen-space jump between neighbouring samples that is still drawn as connected.
pub const MAX_JUMP: f32 = 2.0;

/// Simple RGBA color, straight alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Colors for each draw layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Theme {
    /// Color the frame is cleared to before anything is drawn.
    pub clear: Rgba,
    pub background: Rgba,
    pub grid: Rgba,
    pub ticks: Rgba,
    pub axes: Rgba,
    pub curve: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            clear: Rgba::new(0.05, 0.08, 0.15, 1.0),
            background: Rgba::new(0.02, 0.02, 0.05, 1.0),
            grid: Rgba::new(0.3, 0.3, 0.4, 0.2),
            ticks: Rgba::new(0.7, 0.7, 0.8, 0.6),
            axes: Rgba::new(0.7, 0.7, 0.8, 0.6),
            curve: Rgba::new(0.0, 1.0, 0.8, 1.0),
        }
    }
}

/// Maps the normalized `[-1, 1]` viewport to function space and back.
///
/// `screen_x = raw_x / domain_scale`, `screen_y = f(raw_x) / range_scale`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub domain_scale: f64,
    pub range_scale: f64,
}

impl Viewport {
    #[inline]
    pub fn raw_x(&self, screen_x: f64) -> f64 {
        screen_x * self.domain_scale
    }

    #[inline]
    pub fn screen_y(&self, raw_y: f64) -> f64 {
        raw_y / self.range_scale
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            domain_scale: 10.0,
            range_scale: 5.8,
        }
    }
}

/// Full configuration of one plotting session.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Number of curve samples across the viewport (at least 2).
    pub sample_count: usize,
    pub viewport: Viewport,
    /// Grid divisions per half-axis.
    pub grid_lines: u32,
    /// Half-length of a tick mark, in screen units.
    pub tick_size: f32,
    /// Discontinuity threshold in screen units.
    pub max_jump: f32,
    /// Time for the reveal to complete, in seconds.
    pub duration: f32,
    pub ease: Ease,
    /// Frame gaps longer than this many seconds count as a stall and are cut to it.
    pub stall_after: f32,
    pub title: String,
    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),
    pub theme: Theme,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            viewport: Viewport::default(),
            grid_lines: 10,
            tick_size: 0.02,
            max_jump: MAX_JUMP,
            duration: 22.0,
            ease: Ease::OutQuad,
            stall_after: 0.5,
            title: "Calculus in Motion".to_string(),
            window_size: (800, 800),
            theme: Theme::default(),
        }
    }
}

impl PlotConfig {
    /// Reject values the sampling and animation math cannot work with.
    pub fn validate(&self) -> Result<(), StartupError> {
        let invalid = |msg: String| Err(StartupError::Config(msg));

        if self.sample_count < 2 {
            return invalid(format!(
                "sample_count must be at least 2, got {}",
                self.sample_count
            ));
        }
        // The curve is indexed with u32 and u32::MAX is reserved for strip restarts.
        if self.sample_count >= u32::MAX as usize {
            return invalid(format!("sample_count {} is too large", self.sample_count));
        }
        for (name, v) in [
            ("domain_scale", self.viewport.domain_scale),
            ("range_scale", self.viewport.range_scale),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return invalid(format!("{name} must be positive and finite, got {v}"));
            }
        }
        if self.grid_lines == 0 {
            return invalid("grid_lines must be at least 1".to_string());
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return invalid(format!("duration must be positive, got {}", self.duration));
        }
        if !(self.max_jump.is_finite() && self.max_jump > 0.0) {
            return invalid(format!("max_jump must be positive, got {}", self.max_jump));
        }
        // Zero would stop the reveal clock for good.
        if !(self.stall_after.is_finite() && self.stall_after > 0.0) {
            return invalid(format!(
                "stall_after must be positive, got {}",
                self.stall_after
            ));
        }
        if !(self.tick_size.is_finite() && self.tick_size >= 0.0) {
            return invalid(format!(
                "tick_size must be non-negative, got {}",
                self.tick_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_constants() {
        let config = PlotConfig::default();
        assert_eq!(config.sample_count, 50_000);
        assert_eq!(config.viewport.domain_scale, 10.0);
        assert_eq!(config.viewport.range_scale, 5.8);
        assert_eq!(config.grid_lines, 10);
        assert_eq!(config.max_jump, 2.0);
        assert_eq!(config.duration, 22.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn viewport_mapping_is_a_pure_scale() {
        let vp = Viewport::default();
        assert_eq!(vp.raw_x(-1.0), -10.0);
        assert_eq!(vp.raw_x(0.5), 5.0);
        assert!((vp.screen_y(5.8) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut config = PlotConfig {
            sample_count: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(StartupError::Config(_))));

        config.sample_count = 2;
        assert!(config.validate().is_ok());

        config.viewport.range_scale = 0.0;
        assert!(config.validate().is_err());

        config.viewport.range_scale = 1.0;
        config.duration = f32::NAN;
        assert!(config.validate().is_err());

        config.duration = 1.0;
        config.grid_lines = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_a_stall_threshold_that_freezes_the_reveal() {
        for stall_after in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = PlotConfig {
                stall_after,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(StartupError::Config(_))),
                "{stall_after}"
            );
        }
    }

    #[test]
    fn validate_rejects_bad_tick_sizes() {
        for tick_size in [-0.01, f32::NAN, f32::INFINITY] {
            let config = PlotConfig {
                tick_size,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{tick_size}");
        }
        let flat = PlotConfig {
            tick_size: 0.0,
            ..Default::default()
        };
        assert!(flat.validate().is_ok());
    }
}
