//! Presentation with wgpu: stroke and visualizer pixmaps become textures
//! that are composited over the page background once per frame.

use tiny_skia::Pixmap;
use tracing::{debug, warn};

use crate::error::RenderError;

/// Device-pixel rectangle an overlay is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A pixmap uploaded to the GPU
struct Layer {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// Rendering system managing wgpu device, pipeline and layer textures
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    layer_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    canvas: Option<Layer>,
    overlay: Option<Layer>,
    background: wgpu::Color,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        background_rgb: [u8; 3],
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance.create_surface(window)?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        // Request device
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface. Layers hold sRGB-encoded premultiplied bytes, so
        // blending happens in encoded space on a non-sRGB target when offered.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        debug!("Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Fifo paces presentation to the display refresh
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Layer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Layer Pipeline Layout"),
            bind_group_layouts: &[&layer_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Layer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    // tiny-skia pixmaps are premultiplied
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
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
            multiview: None,
            cache: None,
        });

        let background = clear_color(background_rgb, surface_format.is_srgb());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            layer_layout,
            sampler,
            canvas: None,
            overlay: None,
            background,
        })
    }

    /// Surface size in device pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Largest texture side the device accepts
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn fits_texture(&self, pixmap: &Pixmap) -> bool {
        let max = self.max_texture_dimension();
        if pixmap.width() > max || pixmap.height() > max {
            warn!(
                "Skipping {}x{} layer upload: exceeds {}px texture limit",
                pixmap.width(),
                pixmap.height(),
                max
            );
            return false;
        }
        true
    }

    /// Reconfigure for a new window size (device pixels). Zero sizes
    /// (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Reconfigure with the current size after a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload the stroke layer
    pub fn upload_canvas(&mut self, pixmap: &Pixmap) {
        if !self.fits_texture(pixmap) {
            return;
        }
        let layer = self.canvas.take();
        self.canvas = Some(self.upload(layer, pixmap, "Canvas Texture"));
    }

    /// Upload the visualizer layer
    pub fn upload_overlay(&mut self, pixmap: &Pixmap) {
        if !self.fits_texture(pixmap) {
            return;
        }
        let layer = self.overlay.take();
        self.overlay = Some(self.upload(layer, pixmap, "Overlay Texture"));
    }

    /// Drop the stroke layer (canvas has no pixels)
    pub fn clear_canvas(&mut self) {
        self.canvas = None;
    }

    fn upload(&self, layer: Option<Layer>, pixmap: &Pixmap, label: &str) -> Layer {
        let size = (pixmap.width(), pixmap.height());
        let layer = match layer {
            Some(layer) if layer.size == size => layer,
            _ => self.create_layer(size, label),
        };

        self.queue.write_texture(
            layer.texture.as_image_copy(),
            pixmap.data(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.0),
                rows_per_image: Some(size.1),
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );

        layer
    }

    fn create_layer(&self, size: (u32, u32), label: &str) -> Layer {
        debug!("Allocating {} {}x{}", label, size.0, size.1);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layer_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Layer {
            texture,
            bind_group,
            size,
        }
    }

    /// Render a frame: background, strokes, then the overlay if given a viewport
    pub fn render(&self, overlay_viewport: Option<Viewport>) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);

            if let Some(canvas) = &self.canvas {
                render_pass.set_bind_group(0, &canvas.bind_group, &[]);
                render_pass.draw(0..3, 0..1); // Fullscreen triangle
            }

            if let (Some(overlay), Some(vp)) = (&self.overlay, overlay_viewport) {
                if self.fits(vp) {
                    render_pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
                    render_pass.set_bind_group(0, &overlay.bind_group, &[]);
                    render_pass.draw(0..3, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Viewports must lie inside the render target
    fn fits(&self, vp: Viewport) -> bool {
        vp.x >= 0.0
            && vp.y >= 0.0
            && vp.width > 0.0
            && vp.height > 0.0
            && vp.x + vp.width <= self.config.width as f32
            && vp.y + vp.height <= self.config.height as f32
    }
}

/// Background clear color for the target format. sRGB targets encode on
/// write, so they take linear components.
fn clear_color([r, g, b]: [u8; 3], srgb_target: bool) -> wgpu::Color {
    let component = |c: u8| {
        if srgb_target {
            srgb_to_linear(c)
        } else {
            c as f64 / 255.0
        }
    };
    wgpu::Color {
        r: component(r),
        g: component(g),
        b: component(b),
        a: 1.0,
    }
}

/// Convert an sRGB byte to a linear clear-color component
fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
