//! `calcmotion` library crate root.
//!
//! Plots a single-variable function as a curve that draws itself over a fixed
//! Cartesian viewport, on top of a grid, tick marks and axes.
//!
//! Pipeline:
//! - `expr`: compile the user's text into `f(x)`
//! - `sampler`: sample `f` across the viewport and split the curve at discontinuities
//! - `geometry`: static grid/tick/axis geometry
//! - `anim`: map elapsed time to how much of the curve is visible
//! - `render`: winit/wgpu window, GPU resources, and the per-frame draw plan
//!
//! The binary stays thin: it reads the expression and calls `run_plot`.
//!
//! Note: This crate does **not** initialize logging; callers decide their own setup.

pub mod anim;
pub mod config;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod plot;
pub mod prompt;
pub mod render;
pub mod sampler;

use crate::config::PlotConfig;
use crate::error::StartupError;
use crate::expr::Expression;
use crate::geometry::ReferenceGeometry;
use crate::render::app::AppConfig;
use crate::sampler::CurveBuffer;

/// Everything computed before the first frame.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub geometry: ReferenceGeometry,
    pub curve: CurveBuffer,
}

/// Validate `config`, then sample `expression` and build the reference geometry.
///
/// Consumes the expression: it is not needed once the curve exists.
pub fn prepare(expression: Expression, config: &PlotConfig) -> Result<Prepared, StartupError> {
    config.validate()?;
    let curve = CurveBuffer::build(|x| expression.eval(x), config);
    let geometry = ReferenceGeometry::build(config);
    Ok(Prepared { geometry, curve })
}

/// Sample `expression` and show it in a window until the window is closed.
pub fn run_plot(expression: Expression, config: PlotConfig) -> Result<(), StartupError> {
    log::info!("plotting {expression}");
    let Prepared { geometry, curve } = prepare(expression, &config)?;

    let app_config = AppConfig {
        title: config.title.clone(),
        inner_size: config.window_size,
        ..Default::default()
    };

    render::app::run_with_builder(app_config, move |window| async move {
        plot::PlotState::new(window, config, geometry, curve).await
    })
}
