#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use bytemuck::Pod;
    use gpu::{RenderCommand, RenderError, RenderFrame, RenderSurface, SurfaceError, Viewport};
    use layers::PointsLayer;
    use std::borrow::Cow;
    use std::ops::Range;

    use crate::config::RendererSettings;
    use crate::geometry::{
        ArcVertex, Globals, LineVertex, LitVertex, SphereVertex, arc_vertices, buffer_capacity, hex_vertices,
        point_vertices, ring_vertices, sphere_mesh,
    };

    const DEPTH_FORMAT: ::wgpu::TextureFormat = ::wgpu::TextureFormat::Depth24Plus;
    const MSAA_SAMPLES: u32 = 4;
    const POINT_SIDES: usize = 8;

    const GLOBALS_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera: vec4<f32>,
    ambient: vec4<f32>,
    fog_color: vec4<f32>,
    fog_range: vec4<f32>,
    material_color: vec4<f32>,
    material_emissive: vec4<f32>,
    atmosphere: vec4<f32>,
    arcs: vec4<f32>,
    counts: vec4<f32>,
    dir_color: array<vec4<f32>, 4>,
    dir_position: array<vec4<f32>, 4>,
    point_color: array<vec4<f32>, 4>,
    point_position: array<vec4<f32>, 4>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

const GLOBE_RADIUS: f32 = 100.0;

fn diffuse(world: vec3<f32>, n: vec3<f32>) -> vec3<f32> {
    var light = globals.ambient.rgb;
    let dir_count = u32(globals.counts.x);
    for (var i = 0u; i < 4u; i = i + 1u) {
        if (i >= dir_count) {
            break;
        }
        let l = normalize(globals.dir_position[i].xyz);
        light = light + globals.dir_color[i].rgb * max(dot(n, l), 0.0);
    }
    let point_count = u32(globals.counts.y);
    for (var i = 0u; i < 4u; i = i + 1u) {
        if (i >= point_count) {
            break;
        }
        let l = normalize(globals.point_position[i].xyz - world);
        light = light + globals.point_color[i].rgb * max(dot(n, l), 0.0);
    }
    return light;
}

fn specular(world: vec3<f32>, n: vec3<f32>, shininess: f32) -> vec3<f32> {
    let v = normalize(globals.camera.xyz - world);
    let exponent = max(shininess, 1.0);
    var highlight = vec3<f32>(0.0);
    let dir_count = u32(globals.counts.x);
    for (var i = 0u; i < 4u; i = i + 1u) {
        if (i >= dir_count) {
            break;
        }
        let h = normalize(normalize(globals.dir_position[i].xyz) + v);
        highlight = highlight + globals.dir_color[i].rgb * pow(max(dot(n, h), 0.0), exponent);
    }
    let point_count = u32(globals.counts.y);
    for (var i = 0u; i < 4u; i = i + 1u) {
        if (i >= point_count) {
            break;
        }
        let h = normalize(normalize(globals.point_position[i].xyz - world) + v);
        highlight = highlight + globals.point_color[i].rgb * pow(max(dot(n, h), 0.0), exponent);
    }
    // Phong default specular color #111111.
    return highlight * 0.067;
}

fn fogged(color: vec3<f32>, world: vec3<f32>) -> vec3<f32> {
    if (globals.fog_color.w < 0.5) {
        return color;
    }
    let depth = length(world - globals.camera.xyz);
    let span = max(globals.fog_range.y - globals.fog_range.x, 0.001);
    let f = clamp((depth - globals.fog_range.x) / span, 0.0, 1.0);
    return mix(color, globals.fog_color.rgb, f);
}
"#;

    const GLOBE_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
    let world = position * GLOBE_RADIUS * globals.camera.w;
    var out: VsOut;
    out.clip = globals.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    out.normal = normal;
    return out;
}

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(v.normal);
    let base = globals.material_color.rgb;
    let shininess = globals.material_emissive.w;
    let lit = base * diffuse(v.world, n) + specular(v.world, n, shininess) + globals.material_emissive.rgb;
    return vec4<f32>(fogged(min(lit, vec3<f32>(1.0)), v.world), globals.material_color.a);
}
"#;

    const LIT_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
) -> VsOut {
    let world = position * globals.camera.w;
    var out: VsOut;
    out.clip = globals.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    out.normal = normal;
    out.color = color;
    return out;
}

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(v.normal);
    let lit = min(v.color.rgb * diffuse(v.world, n), vec3<f32>(1.0));
    return vec4<f32>(fogged(lit, v.world), v.color.a);
}
"#;

    const ATMOSPHERE_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) normal: vec3<f32>) -> VsOut {
    let world = position * GLOBE_RADIUS * (1.0 + globals.atmosphere.w) * globals.camera.w;
    var out: VsOut;
    out.clip = globals.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    out.normal = normal;
    return out;
}

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(v.normal);
    let view = normalize(globals.camera.xyz - v.world);
    let rim = 1.0 - abs(dot(n, view));
    return vec4<f32>(globals.atmosphere.rgb, clamp(pow(rim, 3.0), 0.0, 1.0));
}
"#;

    const ARC_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) dash: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) dash: vec4<f32>,
) -> VsOut {
    let world = position * globals.camera.w;
    var out: VsOut;
    out.clip = globals.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    out.color = color;
    out.dash = dash;
    return out;
}

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    let r = v.dash.x;
    if (r > globals.arcs.y) {
        discard;
    }
    // Dash distance runs from the destination back so dashes travel towards it.
    let s = (1.0 - r) + globals.arcs.x - v.dash.w;
    if (s < 0.0) {
        discard;
    }
    let period = v.dash.y + v.dash.z;
    if (period > 0.0 && s - floor(s / period) * period > v.dash.y) {
        discard;
    }
    return vec4<f32>(fogged(v.color.rgb, v.world), v.color.a);
}
"#;

    const LINE_WGSL: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
    let world = position * globals.camera.w;
    var out: VsOut;
    out.clip = globals.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    out.color = color;
    return out;
}

@fragment
fn fs_main(v: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(fogged(v.color.rgb, v.world), v.color.a);
}
"#;

    const SPHERE_ATTRS: [::wgpu::VertexAttribute; 2] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    const LIT_ATTRS: [::wgpu::VertexAttribute; 3] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];
    const ARC_ATTRS: [::wgpu::VertexAttribute; 3] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x4];
    const LINE_ATTRS: [::wgpu::VertexAttribute; 2] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    fn vertex_layout<V>(attributes: &[::wgpu::VertexAttribute]) -> ::wgpu::VertexBufferLayout<'_> {
        ::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<V>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    /// A vertex buffer rebuilt only when the scene revision changes. Each entry of
    /// `draws` is one draw call over a slice of the buffer.
    #[derive(Debug)]
    struct CachedMesh {
        revision: u64,
        buffer: Option<::wgpu::Buffer>,
        draws: Vec<Range<u32>>,
    }

    impl CachedMesh {
        fn upload<V: Pod>(device: &::wgpu::Device, label: &str, vertices: &[V], revision: u64) -> Self {
            let count = vertices.len() as u32;
            Self::upload_batches(device, label, vertices, vec![0..count], revision)
        }

        fn upload_batches<V: Pod>(
            device: &::wgpu::Device,
            label: &str,
            vertices: &[V],
            draws: Vec<Range<u32>>,
            revision: u64,
        ) -> Self {
            let buffer = (!vertices.is_empty()).then(|| {
                device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                })
            });
            Self {
                revision,
                buffer,
                draws: draws.into_iter().filter(|r| !r.is_empty()).collect(),
            }
        }

        fn is_current(slot: &Option<Self>, revision: u64) -> bool {
            slot.as_ref().is_some_and(|m| m.revision == revision)
        }

        fn refresh<V: Pod>(
            slot: &mut Option<Self>,
            device: &::wgpu::Device,
            label: &str,
            revision: u64,
            build: impl FnOnce() -> Vec<V>,
        ) {
            if !Self::is_current(slot, revision) {
                *slot = Some(Self::upload(device, label, &build(), revision));
            }
        }

        fn draw(&self, pass: &mut ::wgpu::RenderPass<'_>, pipeline: &::wgpu::RenderPipeline) {
            if let Some(buffer) = &self.buffer {
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                for range in &self.draws {
                    pass.draw(range.clone(), 0..1);
                }
            }
        }
    }

    /// One draw range per point batch, matching the vertex order of `point_vertices`.
    fn point_draws(layer: &PointsLayer) -> Vec<Range<u32>> {
        let per_point = (POINT_SIDES * 9) as u32;
        let mut start = 0;
        layer
            .batches
            .iter()
            .map(|batch| {
                let drawable = batch.points.iter().filter(|p| p.is_drawable()).count() as u32;
                let range = start..start + drawable * per_point;
                start = range.end;
                range
            })
            .collect()
    }

    /// Vertex buffer rewritten in place every frame; reallocated only to grow.
    #[derive(Debug, Default)]
    struct StreamedMesh {
        buffer: Option<::wgpu::Buffer>,
        capacity: u64,
        count: u32,
    }

    impl StreamedMesh {
        fn write<V: Pod>(&mut self, device: &::wgpu::Device, queue: &::wgpu::Queue, label: &str, vertices: &[V]) {
            let bytes: &[u8] = bytemuck::cast_slice(vertices);
            let needed = bytes.len() as u64;
            let capacity = buffer_capacity(self.capacity, needed);
            if capacity != self.capacity || self.buffer.is_none() {
                tracing::debug!(label, capacity, "vertex buffer grown");
                self.buffer = Some(device.create_buffer(&::wgpu::BufferDescriptor {
                    label: Some(label),
                    size: capacity,
                    usage: ::wgpu::BufferUsages::VERTEX | ::wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
                self.capacity = capacity;
            }
            if let (Some(buffer), false) = (&self.buffer, bytes.is_empty()) {
                queue.write_buffer(buffer, 0, bytes);
            }
            self.count = vertices.len() as u32;
        }

        fn draw(&self, pass: &mut ::wgpu::RenderPass<'_>, pipeline: &::wgpu::RenderPipeline) {
            if let (Some(buffer), true) = (&self.buffer, self.count > 0) {
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..self.count, 0..1);
            }
        }
    }

    struct PipelineDesc<'a> {
        label: &'a str,
        shader: &'a ::wgpu::ShaderModule,
        buffer: ::wgpu::VertexBufferLayout<'a>,
        topology: ::wgpu::PrimitiveTopology,
        cull_mode: Option<::wgpu::Face>,
        blend: ::wgpu::BlendState,
        depth_write: bool,
    }

    #[derive(Debug)]
    pub struct WgpuSurface {
        surface: ::wgpu::Surface<'static>,
        _instance: ::wgpu::Instance,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        canvas: web_sys::HtmlCanvasElement,
        sample_count: u32,
        depth_view: ::wgpu::TextureView,
        msaa_view: Option<::wgpu::TextureView>,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        globe_pipeline: ::wgpu::RenderPipeline,
        lit_pipeline: ::wgpu::RenderPipeline,
        atmosphere_pipeline: ::wgpu::RenderPipeline,
        arc_pipeline: ::wgpu::RenderPipeline,
        line_pipeline: ::wgpu::RenderPipeline,
        sphere_vertices: ::wgpu::Buffer,
        sphere_indices: ::wgpu::Buffer,
        sphere_index_count: u32,
        hex: Option<CachedMesh>,
        arcs: Option<CachedMesh>,
        points: Option<CachedMesh>,
        rings: StreamedMesh,
    }

    fn create_attachment(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
        format: ::wgpu::TextureFormat,
        sample_count: u32,
        label: &str,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some(label),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: ::wgpu::TextureDimension::D2,
            format,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn render_error(err: ::wgpu::SurfaceError) -> RenderError {
        match err {
            ::wgpu::SurfaceError::Lost => RenderError::Lost,
            ::wgpu::SurfaceError::Outdated => RenderError::Outdated,
            ::wgpu::SurfaceError::Timeout => RenderError::Timeout,
            ::wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::Other(other.to_string()),
        }
    }

    impl WgpuSurface {
        pub async fn new(
            canvas: web_sys::HtmlCanvasElement,
            settings: &RendererSettings,
            viewport: Viewport,
        ) -> Result<Self, SurfaceError> {
            let (width, height) = viewport.physical_size();
            canvas.set_width(width);
            canvas.set_height(height);

            // WebGPU where the browser has it, WebGL2 otherwise.
            let instance = ::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            });
            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
                .map_err(|e| SurfaceError::CreateSurface(e.to_string()))?;
            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| SurfaceError::Adapter(e.to_string()))?;
            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("globe-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| SurfaceError::Device(e.to_string()))?;

            let caps = surface.get_capabilities(&adapter);
            // Configured colors are display values, so they are written without sRGB encoding.
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| !f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or(SurfaceError::Unsupported)?;
            let alpha_mode = if caps.alpha_modes.contains(&::wgpu::CompositeAlphaMode::PreMultiplied) {
                ::wgpu::CompositeAlphaMode::PreMultiplied
            } else {
                caps.alpha_modes.first().copied().ok_or(SurfaceError::Unsupported)?
            };
            let sample_count = if settings.antialias
                && adapter
                    .get_texture_format_features(format)
                    .flags
                    .sample_count_supported(MSAA_SAMPLES)
            {
                MSAA_SAMPLES
            } else {
                1
            };

            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width,
                height,
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            surface.configure(&device, &config);
            let depth_view = create_attachment(&device, &config, DEPTH_FORMAT, sample_count, "globe-depth");
            let msaa_view = (sample_count > 1)
                .then(|| create_attachment(&device, &config, format, sample_count, "globe-msaa"));

            let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("globe-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-globals-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
            let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("globe-globals-bg"),
                layout: &globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });
            let layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("globe-pipeline-layout"),
                bind_group_layouts: &[&globals_layout],
                immediate_size: 0,
            });

            let shader = |label: &str, body: &str| {
                device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                    label: Some(label),
                    source: ::wgpu::ShaderSource::Wgsl(Cow::Owned(format!("{GLOBALS_WGSL}{body}"))),
                })
            };
            let globe_shader = shader("globe-shader", GLOBE_WGSL);
            let lit_shader = shader("globe-lit-shader", LIT_WGSL);
            let atmosphere_shader = shader("globe-atmosphere-shader", ATMOSPHERE_WGSL);
            let arc_shader = shader("globe-arc-shader", ARC_WGSL);
            let line_shader = shader("globe-line-shader", LINE_WGSL);

            let pipeline = |desc: PipelineDesc<'_>| {
                device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
                    label: Some(desc.label),
                    layout: Some(&layout),
                    vertex: ::wgpu::VertexState {
                        module: desc.shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[desc.buffer],
                    },
                    fragment: Some(::wgpu::FragmentState {
                        module: desc.shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(::wgpu::ColorTargetState {
                            format,
                            blend: Some(desc.blend),
                            write_mask: ::wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: ::wgpu::PrimitiveState {
                        topology: desc.topology,
                        strip_index_format: None,
                        // The sphere mesh winds clockwise seen from outside.
                        front_face: ::wgpu::FrontFace::Cw,
                        cull_mode: desc.cull_mode,
                        polygon_mode: ::wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(::wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: desc.depth_write,
                        depth_compare: ::wgpu::CompareFunction::LessEqual,
                        stencil: ::wgpu::StencilState::default(),
                        bias: ::wgpu::DepthBiasState::default(),
                    }),
                    multisample: ::wgpu::MultisampleState {
                        count: sample_count,
                        ..Default::default()
                    },
                    multiview_mask: None,
                    cache: None,
                })
            };

            let globe_pipeline = pipeline(PipelineDesc {
                label: "globe-sphere-pipeline",
                shader: &globe_shader,
                buffer: vertex_layout::<SphereVertex>(&SPHERE_ATTRS),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(::wgpu::Face::Back),
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
            });
            let lit_pipeline = pipeline(PipelineDesc {
                label: "globe-lit-pipeline",
                shader: &lit_shader,
                buffer: vertex_layout::<LitVertex>(&LIT_ATTRS),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
            });
            let atmosphere_pipeline = pipeline(PipelineDesc {
                label: "globe-atmosphere-pipeline",
                shader: &atmosphere_shader,
                buffer: vertex_layout::<SphereVertex>(&SPHERE_ATTRS),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(::wgpu::Face::Front),
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            });
            let arc_pipeline = pipeline(PipelineDesc {
                label: "globe-arc-pipeline",
                shader: &arc_shader,
                buffer: vertex_layout::<ArcVertex>(&ARC_ATTRS),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            });
            let line_pipeline = pipeline(PipelineDesc {
                label: "globe-ring-pipeline",
                shader: &line_shader,
                buffer: vertex_layout::<LineVertex>(&LINE_ATTRS),
                topology: ::wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            });

            let (vertices, indices) = sphere_mesh(64, 128);
            let sphere_vertices = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                label: Some("globe-sphere-vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: ::wgpu::BufferUsages::VERTEX,
            });
            let sphere_indices = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                label: Some("globe-sphere-indices"),
                contents: bytemuck::cast_slice(&indices),
                usage: ::wgpu::BufferUsages::INDEX,
            });

            tracing::info!(?format, sample_count, width, height, "wgpu surface ready");
            Ok(Self {
                surface,
                _instance: instance,
                device,
                queue,
                config,
                canvas,
                sample_count,
                depth_view,
                msaa_view,
                globals_buffer,
                globals_bind_group,
                globe_pipeline,
                lit_pipeline,
                atmosphere_pipeline,
                arc_pipeline,
                line_pipeline,
                sphere_vertices,
                sphere_indices,
                sphere_index_count: indices.len() as u32,
                hex: None,
                arcs: None,
                points: None,
                rings: StreamedMesh::default(),
            })
        }

        fn draw_sphere(&self, pass: &mut ::wgpu::RenderPass<'_>, pipeline: &::wgpu::RenderPipeline) {
            pass.set_pipeline(pipeline);
            pass.set_vertex_buffer(0, self.sphere_vertices.slice(..));
            pass.set_index_buffer(self.sphere_indices.slice(..), ::wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
        }
    }

    impl RenderSurface for WgpuSurface {
        fn resize(&mut self, viewport: Viewport) {
            let (width, height) = viewport.physical_size();
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view =
                create_attachment(&self.device, &self.config, DEPTH_FORMAT, self.sample_count, "globe-depth");
            if self.sample_count > 1 {
                self.msaa_view = Some(create_attachment(
                    &self.device,
                    &self.config,
                    self.config.format,
                    self.sample_count,
                    "globe-msaa",
                ));
            }
        }

        fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            let globals = Globals::from_frame(frame);
            self.queue
                .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

            for command in &frame.commands {
                match command {
                    RenderCommand::HexPolygons { layer, revision } => {
                        CachedMesh::refresh(&mut self.hex, &self.device, "globe-hex", *revision, || {
                            hex_vertices(layer)
                        })
                    }
                    RenderCommand::Arcs { layer, revision, .. } => {
                        CachedMesh::refresh(&mut self.arcs, &self.device, "globe-arcs", *revision, || {
                            arc_vertices(layer)
                        })
                    }
                    RenderCommand::Points { layer, revision } => {
                        if !CachedMesh::is_current(&self.points, *revision) {
                            self.points = Some(CachedMesh::upload_batches(
                                &self.device,
                                "globe-points",
                                &point_vertices(layer, POINT_SIDES),
                                point_draws(layer),
                                *revision,
                            ));
                        }
                    }
                    RenderCommand::Rings { rings, style } => {
                        self.rings
                            .write(&self.device, &self.queue, "globe-rings", &ring_vertices(rings, style));
                    }
                    RenderCommand::Globe { .. } | RenderCommand::Atmosphere { .. } => {}
                }
            }

            let output = self.surface.get_current_texture().map_err(render_error)?;
            let view = output
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let clear = frame.clear_color;

            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("globe-frame-encoder"),
                });
            {
                let mut pass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("globe-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r: f64::from(clear.r * clear.a),
                                g: f64::from(clear.g * clear.a),
                                b: f64::from(clear.b * clear.a),
                                a: f64::from(clear.a),
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });
                pass.set_bind_group(0, &self.globals_bind_group, &[]);

                for command in &frame.commands {
                    match command {
                        RenderCommand::Globe { .. } => self.draw_sphere(&mut pass, &self.globe_pipeline),
                        RenderCommand::HexPolygons { .. } => {
                            if let Some(mesh) = &self.hex {
                                mesh.draw(&mut pass, &self.lit_pipeline);
                            }
                        }
                        RenderCommand::Atmosphere { .. } => {
                            self.draw_sphere(&mut pass, &self.atmosphere_pipeline)
                        }
                        RenderCommand::Arcs { .. } => {
                            if let Some(mesh) = &self.arcs {
                                mesh.draw(&mut pass, &self.arc_pipeline);
                            }
                        }
                        RenderCommand::Points { .. } => {
                            if let Some(mesh) = &self.points {
                                mesh.draw(&mut pass, &self.lit_pipeline);
                            }
                        }
                        RenderCommand::Rings { .. } => self.rings.draw(&mut pass, &self.line_pipeline),
                    }
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            output.present();
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{RenderError, RenderFrame, RenderSurface, SurfaceError, Viewport};

    use crate::config::RendererSettings;

    #[derive(Debug)]
    pub struct WgpuSurface;

    impl WgpuSurface {
        pub async fn new(
            _canvas: web_sys::HtmlCanvasElement,
            _settings: &RendererSettings,
            _viewport: Viewport,
        ) -> Result<Self, SurfaceError> {
            Err(SurfaceError::UnsupportedTarget)
        }
    }

    impl RenderSurface for WgpuSurface {
        fn resize(&mut self, _viewport: Viewport) {}

        fn render(&mut self, _frame: &RenderFrame<'_>) -> Result<(), RenderError> {
            Err(RenderError::Other(
                "wgpu rendering is only available on wasm32 targets".to_string(),
            ))
        }
    }
}

pub use imp::WgpuSurface;
