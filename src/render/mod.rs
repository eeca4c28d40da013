//! Rendering module root.
//!
//! The `render` module owns the window/event-loop integration and the GPU side of
//! the plot. Entry point: `render::app::run_with_builder()`.

pub mod app;

/// Per-frame draw order and the `RenderSink` seam.
pub mod frame;

/// GPU context: device, surface, MSAA target.
pub mod gpu;

/// wgpu pipelines and buffers for the plot layers.
pub mod plot_renderer;
