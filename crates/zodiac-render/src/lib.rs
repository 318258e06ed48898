//! wgpu renderer for the reveal scene: an instanced point-sprite starfield
//! plus the constellation overlay (line strip and pulsing vertex dots).
//!
//! The renderer owns every GPU object it creates. Dropping it releases the
//! surface, device and buffers; frontends never keep scene objects elsewhere.

pub mod helpers;

use glam::{Mat4, Vec3};
use helpers::{
    create_quad_buffer, make_pipeline, quad_layout, uniform_binding, uniform_layout, PipelineDesc,
};
use wgpu::util::DeviceExt;
use zodiac_core::{
    Camera, Constellation, FrameOutput, RevealController, StarInstance, CLEAR_COLOR,
    CONSTELLATION_WGSL, STARFIELD_WGSL, STAR_SIZE_SCALE, VERTEX_BASE_ALPHA, VERTEX_BASE_SCALE,
    VERTEX_PULSE_SCALE,
};

const DEFAULT_TINT: [f32; 3] = [0.6, 0.8, 1.0];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    params: [f32; 4],
}

impl SceneUniforms {
    fn new(camera: &Camera, model: Mat4, params: [f32; 4]) -> Self {
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            params,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DotInstance {
    pos: [f32; 3],
    scale: f32,
    alpha: f32,
}

impl DotInstance {
    /// `pulse` is the vertex's hover pulse in `[0, 1]`; it grows the dot and
    /// raises its opacity.
    fn new(pos: Vec3, pulse: f32) -> Self {
        let pulse = pulse.clamp(0.0, 1.0);
        Self {
            pos: pos.to_array(),
            scale: VERTEX_BASE_SCALE * (1.0 + pulse * VERTEX_PULSE_SCALE),
            alpha: VERTEX_BASE_ALPHA + (1.0 - VERTEX_BASE_ALPHA) * pulse,
        }
    }
}

struct ConstellationBuffers {
    line_vb: wgpu::Buffer,
    point_count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_bgl: wgpu::BindGroupLayout,

    star_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    dot_pipeline: wgpu::RenderPipeline,

    quad_vb: wgpu::Buffer,
    star_vb: wgpu::Buffer,
    star_count: u32,
    star_uniforms: wgpu::Buffer,
    star_bind_group: wgpu::BindGroup,

    constellations: Vec<ConstellationBuffers>,
    dot_vb: wgpu::Buffer,
    dot_capacity: usize,

    camera: Camera,
    clear_color: wgpu::Color,
    time_sec: f32,
}

/// Device and configured surface, acquired before any scene data is needed.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    pub async fn request(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }
}

impl Renderer {
    /// Build pipelines and upload the starfield and constellation geometry
    /// of `controller`.
    pub fn new(gpu: GpuContext, controller: &RevealController) -> Self {
        let GpuContext {
            surface,
            device,
            queue,
            config,
        } = gpu;
        let format = config.format;
        let (width, height) = (config.width, config.height);

        let uniform_bgl = uniform_layout(&device, "scene_bgl");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&uniform_bgl],
            push_constant_ranges: &[],
        });

        let star_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starfield_shader"),
            source: wgpu::ShaderSource::Wgsl(STARFIELD_WGSL.into()),
        });
        let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("constellation_shader"),
            source: wgpu::ShaderSource::Wgsl(CONSTELLATION_WGSL.into()),
        });

        const STAR_ATTRS: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32, 3 => Float32x4];
        let star_instances = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &STAR_ATTRS,
        };
        const DOT_ATTRS: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32, 3 => Float32];
        let dot_instances = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DotInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &DOT_ATTRS,
        };
        const LINE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        let line_vertices = wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 3) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &LINE_ATTRS,
        };

        let star_pipeline = make_pipeline(
            &device,
            PipelineDesc {
                label: "star_pipeline",
                layout: &pipeline_layout,
                shader: &star_shader,
                vs_entry: "vs_main",
                fs_entry: "fs_main",
                buffers: &[quad_layout(), star_instances],
                topology: wgpu::PrimitiveTopology::TriangleList,
                format,
            },
        );
        let line_pipeline = make_pipeline(
            &device,
            PipelineDesc {
                label: "line_pipeline",
                layout: &pipeline_layout,
                shader: &overlay_shader,
                vs_entry: "vs_line",
                fs_entry: "fs_line",
                buffers: &[line_vertices],
                topology: wgpu::PrimitiveTopology::LineStrip,
                format,
            },
        );
        let dot_pipeline = make_pipeline(
            &device,
            PipelineDesc {
                label: "dot_pipeline",
                layout: &pipeline_layout,
                shader: &overlay_shader,
                vs_entry: "vs_dot",
                fs_entry: "fs_dot",
                buffers: &[quad_layout(), dot_instances],
                topology: wgpu::PrimitiveTopology::TriangleList,
                format,
            },
        );

        let quad_vb = create_quad_buffer(&device);
        let stars = controller.field().instances(1.0);
        let star_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_vb"),
            contents: bytemuck::cast_slice(&stars),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let (star_uniforms, star_bind_group) = uniform_binding(
            &device,
            &uniform_bgl,
            "star_uniforms",
            std::mem::size_of::<SceneUniforms>() as u64,
        );

        let placeholder = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dot_vb"),
            size: std::mem::size_of::<DotInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            uniform_bgl,
            star_pipeline,
            line_pipeline,
            dot_pipeline,
            quad_vb,
            star_vb,
            star_count: stars.len() as u32,
            star_uniforms,
            star_bind_group,
            constellations: Vec::new(),
            dot_vb: placeholder,
            dot_capacity: 1,
            camera: Camera::looking_at_origin(width as f32 / height as f32),
            clear_color: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: 1.0,
            },
            time_sec: 0.0,
        };
        renderer.rebuild_constellations(controller.sequencer().constellations());
        log::info!(
            "[gpu] renderer ready: {} stars, format {:?}",
            renderer.star_count,
            format
        );
        renderer
    }

    /// Re-upload overlay geometry after the constellation set changed.
    pub fn rebuild_constellations(&mut self, list: &[Constellation]) {
        self.constellations = list
            .iter()
            .map(|c| {
                let flat: Vec<[f32; 3]> = c.points.iter().map(|p| p.to_array()).collect();
                let line_vb = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("constellation_vb"),
                        contents: bytemuck::cast_slice(&flat),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                let (uniforms, bind_group) = uniform_binding(
                    &self.device,
                    &self.uniform_bgl,
                    "constellation_uniforms",
                    std::mem::size_of::<SceneUniforms>() as u64,
                );
                ConstellationBuffers {
                    line_vb,
                    point_count: c.points.len() as u32,
                    uniforms,
                    bind_group,
                }
            })
            .collect();
        let need = list.iter().map(|c| c.points.len()).max().unwrap_or(1).max(1);
        if need > self.dot_capacity {
            self.dot_vb = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("dot_vb"),
                size: (std::mem::size_of::<DotInstance>() * need) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.dot_capacity = need;
        }
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// Reconfigure after the surface was lost or went stale.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(
        &mut self,
        frame_out: &FrameOutput,
        controller: &RevealController,
        now_ms: f64,
        dt_sec: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        self.time_sec += dt_sec.max(0.0);
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let star_u = SceneUniforms::new(
            &self.camera,
            frame_out.field_model,
            [STAR_SIZE_SCALE, self.time_sec, frame_out.overlay_opacity, 0.0],
        );
        self.queue
            .write_buffer(&self.star_uniforms, 0, bytemuck::bytes_of(&star_u));

        // Only one constellation is on screen at a time; fade-out precedes fade-in
        let visible = frame_out
            .constellations
            .iter()
            .find(|f| f.index < self.constellations.len() && f.draw_range > 0);
        let mut dot_count = 0u32;
        if let Some(f) = visible {
            let tint = controller
                .phases()
                .get(f.index)
                .map_or(DEFAULT_TINT, |p| p.color);
            let u = SceneUniforms::new(
                &self.camera,
                frame_out.overlay_model,
                [tint[0], tint[1], tint[2], f.opacity * frame_out.overlay_opacity],
            );
            let bufs = &self.constellations[f.index];
            self.queue
                .write_buffer(&bufs.uniforms, 0, bytemuck::bytes_of(&u));

            let seq = controller.sequencer();
            let points = &seq.constellations()[f.index].points;
            let dots: Vec<DotInstance> = points
                .iter()
                .take(f.draw_range.min(self.dot_capacity))
                .enumerate()
                .map(|(vi, p)| DotInstance::new(*p, seq.pulse_amount(f.index, vi, now_ms)))
                .collect();
            self.queue
                .write_buffer(&self.dot_vb, 0, bytemuck::cast_slice(&dots));
            dot_count = dots.len() as u32;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.star_pipeline);
            rpass.set_bind_group(0, &self.star_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            rpass.set_vertex_buffer(1, self.star_vb.slice(..));
            rpass.draw(0..6, 0..self.star_count);

            if let Some(f) = visible {
                let bufs = &self.constellations[f.index];
                let segments = (f.draw_range as u32).min(bufs.point_count);
                if segments >= 2 {
                    rpass.set_pipeline(&self.line_pipeline);
                    rpass.set_bind_group(0, &bufs.bind_group, &[]);
                    rpass.set_vertex_buffer(0, bufs.line_vb.slice(..));
                    rpass.draw(0..segments, 0..1);
                }
                if dot_count > 0 {
                    rpass.set_pipeline(&self.dot_pipeline);
                    rpass.set_bind_group(0, &bufs.bind_group, &[]);
                    rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                    rpass.set_vertex_buffer(1, self.dot_vb.slice(..));
                    rpass.draw(0..6, 0..dot_count);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_wgsl() {
        // three mat4x4<f32> plus one vec4<f32>
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 3 * 64 + 16);
        assert_eq!(std::mem::size_of::<DotInstance>(), 20);
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
    }

    #[test]
    fn pulse_raises_dot_scale_and_opacity() {
        let rest = DotInstance::new(Vec3::ZERO, 0.0);
        let full = DotInstance::new(Vec3::ZERO, 1.0);
        assert_eq!(rest.scale, VERTEX_BASE_SCALE);
        assert_eq!(rest.alpha, VERTEX_BASE_ALPHA);
        assert!((full.scale - VERTEX_BASE_SCALE * (1.0 + VERTEX_PULSE_SCALE)).abs() < 1e-6);
        assert!((full.alpha - 1.0).abs() < 1e-6);
        let half = DotInstance::new(Vec3::ZERO, 0.5);
        assert!(half.alpha > rest.alpha && half.alpha < full.alpha);
    }

    #[test]
    fn quad_covers_unit_square_twice() {
        assert_eq!(helpers::QUAD_CORNERS.len(), 12);
        assert!(helpers::QUAD_CORNERS.iter().all(|c| c.abs() == 1.0));
    }
}
