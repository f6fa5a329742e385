//! wgpu render pipeline
//!
//! One shader program, two static meshes, and a small ring of per-draw
//! uniform slots (model matrix + colour) addressed with dynamic offsets.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::scene::{Canvas, MeshKind};
use super::shapes::{circle_vertices, fan_indices, rectangle_vertices};
use super::vertex::Vertex;
use crate::settings::Settings;

/// Draw slots available per frame
const MAX_DRAWS: usize = 8;

// ============================================================================
// GPU DATA STRUCTURES (must match shaders/flat_*.wgsl)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4], // rgb + pad
}

impl DrawUniform {
    fn new(model: Mat4, color: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
        }
    }
}

// ============================================================================
// SHADERS
// ============================================================================

/// Shader stage, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Error lines from a compilation report, one per message
pub fn compilation_log(info: &wgpu::CompilationInfo) -> String {
    info.messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compile one stage, failing with the compiler's own log on error
async fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "flat_vs",
            ShaderStage::Fragment => "flat_fs",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let info = module.get_compilation_info().await;
    let scope_error = scope.pop().await;

    for msg in &info.messages {
        if msg.message_type == wgpu::CompilationMessageType::Warning {
            log::warn!("{stage} shader: {}", msg.message);
        }
    }

    let log = compilation_log(&info);
    if let Some(err) = scope_error {
        let detail = if log.is_empty() { err.to_string() } else { log };
        bail!("{stage} shader compilation failed:\n{detail}");
    }
    if !log.is_empty() {
        bail!("{stage} shader compilation failed:\n{log}");
    }
    Ok(module)
}

// ============================================================================
// MESHES
// ============================================================================

/// Static geometry uploaded once at startup
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    count: u32,
}

impl Mesh {
    /// Vertices drawn as a fan around the first one
    ///
    /// Fewer than three vertices enclose nothing; the mesh then draws nothing.
    pub fn triangle_fan(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let (index_buffer, count) = match fan_upload(vertices.len() as u32) {
            Some((padded, count)) => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&padded),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (Some(buffer), count)
            }
            None => (None, 0),
        };
        Self {
            vertex_buffer,
            index_buffer,
            count,
        }
    }

    /// Vertices drawn as a plain triangle list
    pub fn triangle_list(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            index_buffer: None,
            count: vertices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        // wgpu rejects empty buffer slices
        if self.count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(indices) => {
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.count, 0, 0..1);
            }
            None => pass.draw(0..self.count, 0..1),
        }
    }
}

/// Fan indices padded for upload, with the real index count
///
/// `None` when the fan has no triangles. Index buffers must be a multiple of
/// 4 bytes, so an odd u16 count gets one trailing zero.
fn fan_upload(vertex_count: u32) -> Option<(Vec<u16>, u32)> {
    let mut indices = fan_indices(vertex_count);
    if indices.is_empty() {
        return None;
    }
    let count = indices.len() as u32;
    if indices.len() % 2 == 1 {
        indices.push(0);
    }
    Some((indices, count))
}

// ============================================================================
// RENDERER
// ============================================================================

/// What the frame loop should do after a surface error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// Surface reconfigured; try again next frame
    Reconfigured,
    /// Transient; drop this frame
    SkipFrame,
    /// Unrecoverable; stop the loop
    Fatal,
}

struct PendingDraw {
    mesh: MeshKind,
    uniform: DrawUniform,
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,

    circle: Mesh,
    rectangle: Mesh,

    clear_color: wgpu::Color,
    projection: Mat4,
    pending: Vec<PendingDraw>,

    /// Surface size in physical pixels
    pub size: (u32, u32),
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self> {
        let inner = window.inner_size();
        let (width, height) = (inner.width.max(1), inner.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("squash-ball-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .context("failed to create wgpu device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colours are authored in display space, so write them straight through
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let vs = compile_stage(&device, ShaderStage::Vertex, include_str!("shaders/flat_vs.wgsl"))
            .await?;
        let fs = compile_stage(
            &device,
            ShaderStage::Fragment,
            include_str!("shaders/flat_fs.wgsl"),
        )
        .await?;

        // === Uniforms ===
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let draw_stride = align_to(std::mem::size_of::<DrawUniform>() as u64, alignment);
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_buffer"),
            size: draw_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        // === Program ===
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &draw_layout],
            immediate_size: 0,
        });

        let link_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flat_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        if let Some(err) = link_scope.pop().await {
            bail!("shader program link failed:\n{err}");
        }

        // === Meshes ===
        let circle = Mesh::triangle_fan(
            &device,
            "circle_mesh",
            &circle_vertices(settings.ball_radius, settings.circle_segments),
        );
        let rectangle = Mesh::triangle_list(&device, "rectangle_mesh", &rectangle_vertices());

        let bg = settings.background_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            circle,
            rectangle,
            clear_color: wgpu::Color {
                r: bg.x as f64,
                g: bg.y as f64,
                b: bg.z as f64,
                a: 1.0,
            },
            projection: Mat4::IDENTITY,
            pending: Vec::with_capacity(MAX_DRAWS),
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Encode and present everything submitted through `Canvas` since the
    /// last call
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let pending = std::mem::take(&mut self.pending);

        let globals = Globals {
            projection: self.projection.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        for (i, draw) in pending.iter().enumerate() {
            self.queue.write_buffer(
                &self.draw_buffer,
                i as u64 * self.draw_stride,
                bytemuck::bytes_of(&draw.uniform),
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (i, draw) in pending.iter().enumerate() {
                let offset = (i as u64 * self.draw_stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                let mesh = match draw.mesh {
                    MeshKind::Circle => &self.circle,
                    MeshKind::Rectangle => &self.rectangle,
                };
                mesh.draw(&mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Keep the allocation for the next frame
        self.pending = pending;
        self.pending.clear();
        Ok(())
    }

    /// Decide how to continue after `present` failed
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.config);
                SurfaceAction::Reconfigured
            }
            wgpu::SurfaceError::Timeout => {
                log::warn!("Surface timeout, skipping frame");
                SurfaceAction::SkipFrame
            }
            wgpu::SurfaceError::OutOfMemory => {
                log::error!("Out of memory!");
                SurfaceAction::Fatal
            }
            wgpu::SurfaceError::Other => {
                log::error!("Surface error: {err}");
                SurfaceAction::Fatal
            }
        }
    }
}

impl Canvas for GpuRenderer {
    fn clear(&mut self, color: Vec3) {
        self.clear_color = wgpu::Color {
            r: color.x as f64,
            g: color.y as f64,
            b: color.z as f64,
            a: 1.0,
        };
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    fn draw(&mut self, mesh: MeshKind, model: Mat4, color: Vec3) {
        if self.pending.len() >= MAX_DRAWS {
            log::warn!("Dropping draw: more than {MAX_DRAWS} draws in one frame");
            return;
        }
        self.pending.push(PendingDraw {
            mesh,
            uniform: DrawUniform::new(model, color),
        });
    }
}

/// Round `size` up to a multiple of `alignment`
fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(80, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
        assert_eq!(align_to(80, 0), 80);
    }

    #[test]
    fn test_single_segment_circle_uploads_no_indices() {
        let verts = circle_vertices(50.0, 1);
        assert_eq!(verts.len(), 2);
        assert!(fan_upload(verts.len() as u32).is_none());
    }

    #[test]
    fn test_fan_upload_pads_to_four_bytes() {
        // One triangle: three u16 indices plus one pad
        let (padded, count) = fan_upload(3).unwrap();
        assert_eq!(count, 3);
        assert_eq!(padded, vec![0, 1, 2, 0]);

        let verts = circle_vertices(50.0, 36);
        let (padded, count) = fan_upload(verts.len() as u32).unwrap();
        assert_eq!(count, 35 * 3);
        assert_eq!(padded.len() * 2 % 4, 0);
        assert_eq!(&padded[..count as usize], fan_indices(37).as_slice());
    }

    #[test]
    fn test_uniform_layouts_match_shaders() {
        // mat4x4<f32> is 64 bytes; DrawUniform adds a vec4<f32>
        assert_eq!(std::mem::size_of::<Globals>(), 64);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 80);
    }

    #[test]
    fn test_draw_uniform_packs_color() {
        let u = DrawUniform::new(Mat4::IDENTITY, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(u.color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_compilation_log_keeps_errors_only() {
        let info = wgpu::CompilationInfo {
            messages: vec![
                wgpu::CompilationMessage {
                    message: "unused variable".into(),
                    message_type: wgpu::CompilationMessageType::Warning,
                    location: None,
                },
                wgpu::CompilationMessage {
                    message: "expected ';'".into(),
                    message_type: wgpu::CompilationMessageType::Error,
                    location: Some(wgpu::SourceLocation {
                        line_number: 4,
                        line_position: 12,
                        offset: 60,
                        length: 1,
                    }),
                },
            ],
        };
        assert_eq!(compilation_log(&info), "4:12: expected ';'");
    }

    #[test]
    fn test_shader_stage_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
