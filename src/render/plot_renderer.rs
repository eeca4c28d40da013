//! wgpu backend for the plot's frame plan.
//!
//! `PlotResources` is the single owner of every GPU handle the plot needs:
//! three solid-color pipelines (filled triangles, line list, line strip) and one
//! immutable vertex/index/uniform set per draw layer. All geometry is uploaded once
//! at startup; per frame only the curve's index range changes.
//!
//! Curve breaks map onto primitive restart: a `Sample::Break` becomes index `u32::MAX`
//! in the curve's index buffer, which ends the current strip. The visible prefix is
//! then just `draw_indexed(0..visible)`.
//!
//! Notes / current limitations:
//! - Lines are 1px wide (wgpu has no wide lines); MSAA smooths them.
//! - No depth buffer; painter's order comes from `FramePlan`.

use std::{borrow::Cow, mem};

use wgpu::util::DeviceExt as _;

use crate::config::{Rgba, Theme};
use crate::geometry::ReferenceGeometry;
use crate::render::frame::{DrawCall, DrawMode, Layer, RenderSink};
use crate::render::gpu::Gpu;
use crate::sampler::{CurveBuffer, Sample};

/// Index value that restarts a line strip.
pub const STRIP_RESTART: u32 = u32::MAX;

/// GPU vertex format for 2D geometry.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
}

impl Vertex2D {
    pub const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    #[inline]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex2D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Uniform layout for the solid-color pipeline: RGBA in linear space.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct ColorUniform {
    color: [f32; 4],
}

#[inline]
fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Theme colors are authored in sRGB; pipelines render into an sRGB view and blend in
/// linear space. Alpha is left as is.
pub fn srgb_to_linear(c: Rgba) -> Rgba {
    Rgba::new(
        srgb_channel_to_linear(c.r),
        srgb_channel_to_linear(c.g),
        srgb_channel_to_linear(c.b),
        c.a,
    )
}

fn to_vertices(points: &[[f32; 2]]) -> Vec<Vertex2D> {
    points
        .iter()
        .map(|&position| Vertex2D { position })
        .collect()
}

/// Curve samples as strip vertices and indices.
///
/// Every sample keeps its own vertex slot so sample `i` is always index slot `i`;
/// break vertices are never referenced.
pub fn curve_mesh(curve: &CurveBuffer) -> (Vec<Vertex2D>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(curve.len());
    let mut indices = Vec::with_capacity(curve.len());

    for (i, sample) in curve.samples().iter().enumerate() {
        match *sample {
            Sample::Point { x, y } => {
                vertices.push(Vertex2D { position: [x, y] });
                indices.push(i as u32);
            }
            Sample::Break { x } => {
                vertices.push(Vertex2D { position: [x, 0.0] });
                indices.push(STRIP_RESTART);
            }
        }
    }

    (vertices, indices)
}

/// GPU data for one draw layer.
struct GpuLayer {
    // Dropped top to bottom: reverse of creation order.
    index: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    vertex_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _uniform_buffer: wgpu::Buffer,
}

impl GpuLayer {
    fn new(
        gpu: &Gpu,
        bgl: &wgpu::BindGroupLayout,
        label: &str,
        color: Rgba,
        vertices: &[Vertex2D],
        index: Option<(&[u8], wgpu::IndexFormat)>,
    ) -> Self {
        let uniform = ColorUniform {
            color: srgb_to_linear(color).to_array(),
        };
        let uniform_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Uniform Buffer")),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Uniform BG")),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index = index.map(|(bytes, format)| {
            let buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Index Buffer")),
                    contents: bytes,
                    usage: wgpu::BufferUsages::INDEX,
                });
            (buffer, format)
        });

        Self {
            index,
            vertex_buffer,
            bind_group,
            _uniform_buffer: uniform_buffer,
        }
    }
}

/// Owner of every GPU resource used to draw a plot.
///
/// Fields drop top to bottom, which is the reverse of the order `new` creates them.
pub struct PlotResources {
    curve: GpuLayer,
    axes: GpuLayer,
    ticks: GpuLayer,
    grid: GpuLayer,
    background: GpuLayer,

    strip_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    fill_pipeline: wgpu::RenderPipeline,
    _layer_bgl: wgpu::BindGroupLayout,
}

impl PlotResources {
    /// Build pipelines and upload all static and curve geometry.
    pub fn new(
        gpu: &Gpu,
        theme: &Theme,
        geometry: &ReferenceGeometry,
        curve: &CurveBuffer,
    ) -> anyhow::Result<Self> {
        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Plot Solid Shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                    "shaders/solid.wgsl"
                ))),
            });

        let uniform_size = wgpu::BufferSize::new(mem::size_of::<ColorUniform>() as u64)
            .ok_or_else(|| anyhow::anyhow!("color uniform has zero size"))?;

        let layer_bgl = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Plot Layer BGL"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(uniform_size),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Plot Pipeline Layout"),
                bind_group_layouts: &[&layer_bgl],
                immediate_size: 0,
            });

        let make_pipeline = |label: &str,
                             topology: wgpu::PrimitiveTopology,
                             strip_index_format: Option<wgpu::IndexFormat>| {
            gpu.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[Vertex2D::layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: gpu.target_format(),
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology,
                        strip_index_format,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState {
                        count: gpu.msaa_samples,
                        ..Default::default()
                    },
                    multiview_mask: None,
                    cache: None,
                })
        };

        let fill_pipeline = make_pipeline(
            "Plot Fill Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            None,
        );
        let line_pipeline = make_pipeline(
            "Plot Line Pipeline",
            wgpu::PrimitiveTopology::LineList,
            None,
        );
        let strip_pipeline = make_pipeline(
            "Plot Strip Pipeline",
            wgpu::PrimitiveTopology::LineStrip,
            Some(wgpu::IndexFormat::Uint32),
        );

        let background = GpuLayer::new(
            gpu,
            &layer_bgl,
            "Background",
            theme.background,
            &to_vertices(&geometry.background.corners),
            Some((
                bytemuck::cast_slice(&geometry.background.indices),
                wgpu::IndexFormat::Uint16,
            )),
        );
        let grid = GpuLayer::new(
            gpu,
            &layer_bgl,
            "Grid",
            theme.grid,
            &to_vertices(&geometry.grid),
            None,
        );
        let ticks = GpuLayer::new(
            gpu,
            &layer_bgl,
            "Ticks",
            theme.ticks,
            &to_vertices(&geometry.ticks),
            None,
        );
        let axes = GpuLayer::new(
            gpu,
            &layer_bgl,
            "Axes",
            theme.axes,
            &to_vertices(&geometry.axes),
            None,
        );

        let (curve_vertices, curve_indices) = curve_mesh(curve);
        let curve = GpuLayer::new(
            gpu,
            &layer_bgl,
            "Curve",
            theme.curve,
            &curve_vertices,
            Some((
                bytemuck::cast_slice(&curve_indices),
                wgpu::IndexFormat::Uint32,
            )),
        );

        Ok(Self {
            curve,
            axes,
            ticks,
            grid,
            background,
            strip_pipeline,
            line_pipeline,
            fill_pipeline,
            _layer_bgl: layer_bgl,
        })
    }

    fn layer(&self, layer: Layer) -> &GpuLayer {
        match layer {
            Layer::Background => &self.background,
            Layer::Grid => &self.grid,
            Layer::Ticks => &self.ticks,
            Layer::Axes => &self.axes,
            Layer::Curve => &self.curve,
        }
    }

    fn pipeline(&self, mode: DrawMode) -> &wgpu::RenderPipeline {
        match mode {
            DrawMode::FilledQuad => &self.fill_pipeline,
            DrawMode::LineList => &self.line_pipeline,
            DrawMode::LineStrip => &self.strip_pipeline,
        }
    }

    /// A `RenderSink` that records draws into `pass`.
    pub fn sink<'a, 'pass>(
        &'a self,
        pass: &'a mut wgpu::RenderPass<'pass>,
    ) -> PassSink<'a, 'pass> {
        PassSink {
            resources: self,
            pass,
        }
    }
}

/// Executes `DrawCall`s against an open render pass.
pub struct PassSink<'a, 'pass> {
    resources: &'a PlotResources,
    pass: &'a mut wgpu::RenderPass<'pass>,
}

impl RenderSink for PassSink<'_, '_> {
    fn draw(&mut self, call: DrawCall) {
        let layer = self.resources.layer(call.layer);

        self.pass.set_pipeline(self.resources.pipeline(call.mode));
        self.pass.set_bind_group(0, &layer.bind_group, &[]);
        self.pass.set_vertex_buffer(0, layer.vertex_buffer.slice(..));

        match &layer.index {
            Some((buffer, format)) => {
                self.pass.set_index_buffer(buffer.slice(..), *format);
                self.pass.draw_indexed(0..call.count, 0, 0..1);
            }
            None => self.pass.draw(0..call.count, 0..1),
        }
    }
}
