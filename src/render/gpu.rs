use std::sync::Arc;

use anyhow::Context as _;
use log::{debug, info};
use winit::window::Window;

/// Preferred MSAA sample count; falls back to 1 if the adapter can't do it.
const PREFERRED_MSAA_SAMPLES: u32 = 4;

/// GPU context wrapper:
/// - Owns `wgpu::Instance`, `wgpu::Adapter`, `wgpu::Device`, `wgpu::Queue`
/// - Owns the window `Surface` and the current `SurfaceConfiguration`
/// - Owns the multisampled color target, recreated on resize
pub struct Gpu {
    /// Multisampled render target, `None` when `msaa_samples == 1` or the surface is 0-sized.
    msaa_view: Option<wgpu::TextureView>,
    pub msaa_samples: u32,

    pub size: winit::dpi::PhysicalSize<u32>,
    pub config: wgpu::SurfaceConfiguration,

    /// The surface is tied to the window.
    pub surface: wgpu::Surface<'static>,
    pub surface_format: wgpu::TextureFormat,

    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub adapter: wgpu::Adapter,
    pub instance: wgpu::Instance,
}

impl Gpu {
    /// Create a GPU context for the given window.
    ///
    /// Notes:
    /// - The adapter must be able to present to the window's surface.
    /// - Chooses the first surface format from surface capabilities.
    /// - Configures the surface immediately.
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let size = window.inner_size();

        // The surface holds its own Arc<Window>, so it can be 'static.
        let surface = instance
            .create_surface(window)
            .context("wgpu: failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("wgpu: failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .context("wgpu: failed to request device")?;

        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .first()
            .copied()
            .context("wgpu: surface reported no supported formats")?;

        let target_format = surface_format.add_srgb_suffix();
        let msaa_samples = if adapter
            .get_texture_format_features(target_format)
            .flags
            .sample_count_supported(PREFERRED_MSAA_SAMPLES)
        {
            PREFERRED_MSAA_SAMPLES
        } else {
            1
        };

        info!(
            "gpu: adapter={:?}, format={:?}, msaa={}x",
            adapter.get_info().name,
            surface_format,
            msaa_samples
        );

        let config = Self::make_surface_config(size, surface_format);

        let mut gpu = Self {
            msaa_view: None,
            msaa_samples,
            size,
            config,
            surface,
            surface_format,
            queue,
            device,
            adapter,
            instance,
        };
        gpu.resize(size);

        Ok(gpu)
    }

    /// Format every pipeline renders into.
    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.surface_format.add_srgb_suffix()
    }

    /// Reconfigure the surface (and MSAA target) for a new size.
    ///
    /// You should call this on `WindowEvent::Resized`.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.size = new_size;

        // Avoid configuring 0-sized surfaces; winit can report 0 during minimize.
        if new_size.width == 0 || new_size.height == 0 {
            self.config.width = 0;
            self.config.height = 0;
            self.msaa_view = None;
            return;
        }

        debug!("gpu: resize to {}x{}", new_size.width, new_size.height);
        self.config = Self::make_surface_config(new_size, self.surface_format);
        self.surface.configure(&self.device, &self.config);
        self.msaa_view = self.make_msaa_view(new_size);
    }

    /// Whether the surface currently has an area to draw into.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.config.width > 0 && self.config.height > 0
    }

    /// Acquire the next frame from the surface.
    ///
    /// Returns the surface texture and its view in the SRGB view format.
    ///
    /// Surface acquisition can fail transiently (e.g. during resize) with
    /// `wgpu::SurfaceError`; callers decide whether to reconfigure, retry, or exit.
    pub fn acquire_frame(
        &self,
    ) -> Result<(wgpu::SurfaceTexture, wgpu::TextureView), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.target_format()),
                ..Default::default()
            });

        Ok((surface_texture, view))
    }

    /// Color attachment for `frame_view`: draws into the MSAA target and resolves into
    /// the frame when multisampling is on, otherwise draws into the frame directly.
    pub fn color_attachment<'a>(
        &'a self,
        frame_view: &'a wgpu::TextureView,
        clear: wgpu::Color,
    ) -> wgpu::RenderPassColorAttachment<'a> {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(frame_view)),
            None => (frame_view, None),
        };

        wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
        }
    }

    fn make_msaa_view(&self, size: winit::dpi::PhysicalSize<u32>) -> Option<wgpu::TextureView> {
        if self.msaa_samples <= 1 {
            return None;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Plot MSAA Target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: self.msaa_samples,
            dimension: wgpu::TextureDimension::D2,
            format: self.target_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    fn make_surface_config(
        size: winit::dpi::PhysicalSize<u32>,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            // We render into SRGB view format for correct gamma.
            view_formats: vec![surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: size.width,
            height: size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        }
    }
}
