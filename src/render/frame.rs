//! Per-frame draw plan.
//!
//! A frame is always the same five draws, back to front:
//! background fill, grid, ticks, axes, then the visible prefix of the curve.
//! Later draws cover earlier ones through alpha blending; there is no depth buffer,
//! so this order is part of the rendering contract.
//!
//! The plan is backend independent. A `RenderSink` turns each `DrawCall` into real
//! draw commands; `plot_renderer` provides the wgpu sink.

use crate::geometry::ReferenceGeometry;

/// Draw layers in painter's order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Grid,
    Ticks,
    Axes,
    Curve,
}

impl Layer {
    pub const ORDER: [Layer; 5] = [
        Layer::Background,
        Layer::Grid,
        Layer::Ticks,
        Layer::Axes,
        Layer::Curve,
    ];

    pub fn mode(self) -> DrawMode {
        match self {
            Layer::Background => DrawMode::FilledQuad,
            Layer::Grid | Layer::Ticks | Layer::Axes => DrawMode::LineList,
            Layer::Curve => DrawMode::LineStrip,
        }
    }
}

/// Primitive used for a draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawMode {
    /// Indexed triangles covering a quad.
    FilledQuad,
    /// Independent segments, two vertices each.
    LineList,
    /// Connected strip; a break sample ends the current strip.
    LineStrip,
}

/// One draw: which layer, how, and how many elements (vertices or indices).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub layer: Layer,
    pub mode: DrawMode,
    pub count: u32,
}

/// Element counts of the static layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticCounts {
    pub background: u32,
    pub grid: u32,
    pub ticks: u32,
    pub axes: u32,
}

impl StaticCounts {
    pub fn of(geometry: &ReferenceGeometry) -> Self {
        Self {
            background: geometry.background.indices.len() as u32,
            grid: geometry.grid.len() as u32,
            ticks: geometry.ticks.len() as u32,
            axes: geometry.axes.len() as u32,
        }
    }
}

/// The ordered draws of a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    calls: [DrawCall; 5],
}

impl FramePlan {
    /// Plan a frame showing the first `visible` curve samples.
    pub fn new(counts: StaticCounts, visible: usize) -> Self {
        let count = |layer: Layer| match layer {
            Layer::Background => counts.background,
            Layer::Grid => counts.grid,
            Layer::Ticks => counts.ticks,
            Layer::Axes => counts.axes,
            Layer::Curve => visible as u32,
        };
        Self {
            calls: Layer::ORDER.map(|layer| DrawCall {
                layer,
                mode: layer.mode(),
                count: count(layer),
            }),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Issue every draw in order. Empty draws are skipped.
    pub fn submit<S: RenderSink>(&self, sink: &mut S) {
        for call in self.calls.iter().filter(|c| c.count > 0) {
            sink.draw(*call);
        }
    }
}

/// Something that can execute a `DrawCall`.
pub trait RenderSink {
    fn draw(&mut self, call: DrawCall);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<DrawCall>,
    }

    impl RenderSink for Recorder {
        fn draw(&mut self, call: DrawCall) {
            self.calls.push(call);
        }
    }

    fn counts() -> StaticCounts {
        StaticCounts::of(&ReferenceGeometry::build(&PlotConfig::default()))
    }

    #[test]
    fn layers_are_drawn_back_to_front() {
        let mut sink = Recorder::default();
        FramePlan::new(counts(), 1234).submit(&mut sink);

        let layers: Vec<Layer> = sink.calls.iter().map(|c| c.layer).collect();
        assert_eq!(layers, Layer::ORDER.to_vec());
        assert!(sink.calls.windows(2).all(|w| w[0].layer < w[1].layer));
    }

    #[test]
    fn curve_count_is_the_visible_prefix() {
        let plan = FramePlan::new(counts(), 777);
        let curve = plan.calls().last().copied().unwrap();
        assert_eq!(curve.layer, Layer::Curve);
        assert_eq!(curve.mode, DrawMode::LineStrip);
        assert_eq!(curve.count, 777);
    }

    #[test]
    fn static_layers_are_drawn_in_full() {
        let plan = FramePlan::new(counts(), 0);
        let calls = plan.calls();
        assert_eq!(calls[0].mode, DrawMode::FilledQuad);
        assert_eq!(calls[0].count, 6);
        assert_eq!(calls[1].count, 80);
        assert_eq!(calls[2].count, 80);
        assert_eq!(calls[3].count, 4);
        assert!(calls[1..4].iter().all(|c| c.mode == DrawMode::LineList));
    }

    #[test]
    fn empty_curve_is_not_submitted() {
        let mut sink = Recorder::default();
        FramePlan::new(counts(), 0).submit(&mut sink);
        assert_eq!(sink.calls.len(), 4);
        assert_eq!(sink.calls.last().map(|c| c.layer), Some(Layer::Axes));
    }
}
