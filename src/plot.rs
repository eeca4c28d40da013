//! The running plot: per-frame state driven by the app runner.
//!
//! Everything expensive (sampling, filtering, geometry) has already happened when a
//! `PlotState` is built. Each frame only advances the reveal and draws the plan.

use std::sync::Arc;

use anyhow::anyhow;
use log::info;
use winit::window::Window;

use crate::anim::{AnimationState, Reveal, RevealClock};
use crate::config::{PlotConfig, Theme};
use crate::error::StartupError;
use crate::geometry::ReferenceGeometry;
use crate::render::app::AppState;
use crate::render::frame::{FramePlan, StaticCounts};
use crate::render::gpu::Gpu;
use crate::render::plot_renderer::{PlotResources, srgb_to_linear};
use crate::sampler::CurveBuffer;

/// Largest centered square inside a `width` x `height` surface: `(x, y, side)`.
pub fn square_viewport(width: u32, height: u32) -> (f32, f32, f32) {
    let side = width.min(height) as f32;
    let x = (width as f32 - side) * 0.5;
    let y = (height as f32 - side) * 0.5;
    (x, y, side)
}

/// Per-window plot state.
///
/// Field order is drop order: GPU resources go before the device that made them,
/// and the device before the window its surface presents to.
pub struct PlotState {
    resources: PlotResources,
    gpu: Gpu,
    window: Arc<Window>,

    counts: StaticCounts,
    total_samples: usize,
    theme: Theme,

    reveal: Reveal,
    anim: AnimationState,
    clock: RevealClock,
}

impl PlotState {
    pub async fn new(
        window: Arc<Window>,
        config: PlotConfig,
        geometry: ReferenceGeometry,
        curve: CurveBuffer,
    ) -> Result<Self, StartupError> {
        let gpu = Gpu::new(window.clone())
            .await
            .map_err(StartupError::Graphics)?;
        let resources = PlotResources::new(&gpu, &config.theme, &geometry, &curve)
            .map_err(StartupError::Graphics)?;

        Ok(Self {
            resources,
            gpu,
            window,
            counts: StaticCounts::of(&geometry),
            total_samples: curve.len(),
            theme: config.theme,
            reveal: Reveal::new(config.duration, config.ease),
            anim: AnimationState::default(),
            clock: RevealClock::new(config.stall_after),
        })
    }

    /// Advance the reveal by one frame and return the visible prefix.
    fn advance(&mut self) -> usize {
        let dt = self.clock.tick();
        let was_complete = self.anim.is_complete();
        self.anim = self.reveal.step(self.anim, dt);
        if self.anim.is_complete() && !was_complete {
            info!(
                "reveal complete after {:.1}s of animation time ({} stalls skipped)",
                self.clock.animated_s(),
                self.clock.stalls()
            );
        }
        self.reveal.visible_prefix(self.anim, self.total_samples)
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let visible = self.advance();

        if !self.gpu.is_drawable() {
            // Minimized; keep the clock running so the reveal isn't paused.
            self.window.request_redraw();
            return Ok(());
        }

        let (surface_texture, view) = match self.gpu.acquire_frame() {
            Ok(v) => v,
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Lost) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                self.window.request_redraw();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("wgpu SurfaceError::OutOfMemory"));
            }
            Err(wgpu::SurfaceError::Other) => {
                self.gpu.resize(self.gpu.size);
                self.window.request_redraw();
                return Ok(());
            }
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Plot Encoder"),
            });

        {
            let clear = srgb_to_linear(self.theme.clear).to_wgpu();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Plot Pass"),
                color_attachments: &[Some(self.gpu.color_attachment(&view, clear))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (x, y, side) = square_viewport(self.gpu.config.width, self.gpu.config.height);
            pass.set_viewport(x, y, side, side, 0.0, 1.0);

            FramePlan::new(self.counts, visible).submit(&mut self.resources.sink(&mut pass));
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();

        // Keep animating.
        self.window.request_redraw();

        Ok(())
    }
}

impl AppState for PlotState {
    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    fn render(&mut self) -> anyhow::Result<()> {
        Self::render(self)
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_viewport_is_centered() {
        assert_eq!(square_viewport(800, 800), (0.0, 0.0, 800.0));
        assert_eq!(square_viewport(1000, 600), (200.0, 0.0, 600.0));
        assert_eq!(square_viewport(600, 1000), (0.0, 200.0, 600.0));
    }
}
