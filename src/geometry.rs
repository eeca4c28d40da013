//! Static reference geometry: background quad, grid, ticks and axes.
//!
//! All positions are in normalized screen space (`[-1, 1]` on both axes). Line
//! geometry is a flat list of segment endpoint pairs, ready for a line-list draw.
//! Nothing here is animated; it is built once and drawn in full every frame.

use crate::config::PlotConfig;

/// A filled quad as four corners plus two CCW triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub corners: [[f32; 2]; 4],
    pub indices: [u16; 6],
}

impl Quad {
    /// The quad covering the whole viewport.
    pub fn full_viewport() -> Self {
        Self {
            corners: [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            indices: [0, 1, 2, 2, 3, 0],
        }
    }
}

/// All non-curve geometry of a plot.
#[derive(Debug, Clone)]
pub struct ReferenceGeometry {
    pub background: Quad,
    /// Line-list vertices: vertical and horizontal grid lines.
    pub grid: Vec<[f32; 2]>,
    /// Line-list vertices: short ticks on both axes.
    pub ticks: Vec<[f32; 2]>,
    /// Line-list vertices: the y axis then the x axis.
    pub axes: Vec<[f32; 2]>,
}

impl ReferenceGeometry {
    pub fn build(config: &PlotConfig) -> Self {
        let n = config.grid_lines as i32;
        let vp = config.viewport;
        // Horizontal lines use the domain step expressed in range units.
        let y_step = (vp.domain_scale / vp.range_scale) as f32;
        let t = config.tick_size;

        let positions = (-n..=n).filter(|&i| i != 0).map(|i| {
            let u = i as f32 / n as f32;
            (u, u * y_step)
        });

        let mut grid = Vec::with_capacity(8 * n as usize);
        let mut ticks = Vec::with_capacity(8 * n as usize);
        for (x, y) in positions {
            grid.extend_from_slice(&[[x, -1.0], [x, 1.0], [-1.0, y], [1.0, y]]);
            ticks.extend_from_slice(&[[x, -t], [x, t], [-t, y], [t, y]]);
        }

        let axes = vec![[0.0, -1.0], [0.0, 1.0], [-1.0, 0.0], [1.0, 0.0]];

        Self {
            background: Quad::full_viewport(),
            grid,
            ticks,
            axes,
        }
    }
}
