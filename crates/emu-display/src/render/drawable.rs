use std::path::{Path, PathBuf};

use wgpu::util::DeviceExt;

use super::ctx::RenderCtx;
use super::error::{DrawableError, ShaderStage};
use super::layout::VertexLayout;
use super::shader::{self, ProgramInterface, TEXTURE_BINDING, TEXTURE_GROUP, SAMPLER_BINDING};
use super::texture::{self, DecodedImage, GpuTexture};

/// One GPU-rendered shape: geometry, a vertex + fragment program, and an
/// optional 2D texture.
///
/// Lifecycle: configure the public fields, [`load`](Self::load) once against
/// a live graphics context, then [`render`](Self::render) into render passes.
/// [`dispose`](Self::dispose) releases every GPU object the Drawable owns.
pub struct Drawable {
    /// Packed vertex records; see [`VertexLayout`].
    pub vertices: Vec<f32>,

    /// Triangle list indexing into `vertices`.
    pub indices: Vec<u32>,

    /// WGSL source exporting `vs_main`.
    pub vertex_shader: String,

    /// WGSL source exporting `fs_main`.
    pub fragment_shader: String,

    /// Whether each vertex carries a UV after its position.
    pub use_texture: bool,

    /// Image bound on texture unit 0. `None` binds an empty unit.
    pub texture_path: Option<PathBuf>,

    label: String,
    resources: Option<GpuResources>,
}

/// GPU objects created by `load`. Dropping them releases the handles.
struct GpuResources {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    texture: GpuTexture,
    has_own_texture: bool,
    bind_group: wgpu::BindGroup,
}

/// Everything `load` needs that can be checked without a GPU.
struct Prepared {
    layout: VertexLayout,
    index_count: u32,
    interface: ProgramInterface,
    image: Option<DecodedImage>,
}

impl Default for Drawable {
    /// A white triangle.
    fn default() -> Self {
        Self::new(
            vec![
                0.0, 0.5, 0.0, //
                0.5, -0.5, 0.0, //
                -0.5, -0.5, 0.0,
            ],
            vec![0, 1, 2],
        )
    }
}

impl Drawable {
    /// Creates an untextured Drawable with the pass-through/white program.
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            vertex_shader: shader::DEFAULT_VERTEX_SHADER.to_string(),
            fragment_shader: shader::DEFAULT_FRAGMENT_SHADER.to_string(),
            use_texture: false,
            texture_path: None,
            label: "drawable".to_string(),
            resources: None,
        }
    }

    /// Quad spanning all of clip space: 4 vertices, 2 triangles.
    ///
    /// With a texture, each vertex also carries a UV (image top-left at the
    /// top-left corner) and the textured program is used.
    pub fn viewport_quad(texture: Option<PathBuf>) -> Self {
        const CORNERS: [[f32; 3]; 4] = [
            [-1.0, -1.0, 0.0],
            [-1.0, 1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
        ];
        const UVS: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];
        const INDICES: [u32; 6] = [0, 1, 2, 1, 2, 3];

        let mut quad = match texture {
            None => Self::new(CORNERS.concat(), INDICES.to_vec()),
            Some(path) => {
                let vertices = CORNERS
                    .iter()
                    .zip(UVS.iter())
                    .flat_map(|(p, uv)| p.iter().chain(uv.iter()).copied())
                    .collect();
                Self::new(vertices, INDICES.to_vec())
                    .with_shaders(shader::TEXTURED_VERTEX_SHADER, shader::TEXTURED_FRAGMENT_SHADER)
                    .with_texture(path)
            }
        };
        quad.label = "viewport quad".to_string();
        quad
    }

    pub fn with_shaders(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    /// Samples `path` on texture unit 0; implies per-vertex UVs.
    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = Some(path.into());
        self.use_texture = true;
        self
    }

    /// Debug label used for GPU object names.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn layout(&self) -> VertexLayout {
        VertexLayout::new(self.use_texture)
    }

    /// Byte size of one vertex record.
    pub fn stride(&self) -> u64 {
        self.layout().stride()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout().floats_per_vertex()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_loaded(&self) -> bool {
        self.resources.is_some()
    }

    /// Whether a texture file was uploaded (as opposed to the empty unit).
    pub fn has_texture(&self) -> bool {
        self.resources.as_ref().is_some_and(|r| r.has_own_texture)
    }

    /// Compiles and links the program and creates every GPU object.
    ///
    /// Stages are compiled vertex first; a failing stage is named in the
    /// error. Nothing is created on the GPU unless compile, link, geometry
    /// checks and texture decode all succeed, and anything wgpu still rejects
    /// while creating the pipeline comes back as
    /// [`DrawableError::ShaderLink`]. Calling `load` on a loaded Drawable
    /// fails with [`DrawableError::AlreadyLoaded`].
    pub fn load(&mut self, ctx: &RenderCtx<'_>) -> Result<(), DrawableError> {
        if self.is_loaded() {
            return Err(DrawableError::AlreadyLoaded);
        }

        let prepared = self.prepare(ctx.surface_format)?;
        let resources = self.create_resources(ctx, prepared)?;

        log::debug!(
            "{} loaded: {} vertices, {} triangles, stride {} bytes, texture: {}",
            self.label,
            self.vertex_count(),
            self.triangle_count(),
            self.stride(),
            self.texture_path
                .as_deref()
                .map(Path::display)
                .map_or_else(|| "none".to_string(), |p| p.to_string()),
        );

        self.resources = Some(resources);
        Ok(())
    }

    /// Draws all indices as a triangle list into `pass`.
    ///
    /// The pass's viewport decides where the shape lands. Texture bindings
    /// are cleared again before returning. Drawing an unloaded Drawable does
    /// nothing.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(res) = self.resources.as_ref() else {
            log::trace!("{} render skipped: not loaded", self.label);
            return;
        };

        pass.set_pipeline(&res.pipeline);
        pass.set_bind_group(TEXTURE_GROUP, &res.bind_group, &[]);
        pass.set_vertex_buffer(0, res.vertex_buffer.slice(..));
        pass.set_index_buffer(res.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..res.index_count, 0, 0..1);

        Self::clear(pass);
    }

    /// Unbinds the texture unit on `pass`.
    ///
    /// Pipelines and vertex/index buffers cannot be unbound in wgpu; they end
    /// with the pass and are always rebound by the next draw.
    pub fn clear(pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(TEXTURE_GROUP, None::<&wgpu::BindGroup>, &[]);
    }

    /// Releases every GPU object owned by this Drawable.
    ///
    /// Buffers and the texture are destroyed immediately rather than when
    /// the last in-flight reference drops. Returns `false` if nothing was
    /// loaded. The Drawable can be loaded again afterwards.
    pub fn dispose(&mut self) -> bool {
        let Some(res) = self.resources.take() else {
            return false;
        };

        res.vertex_buffer.destroy();
        res.index_buffer.destroy();
        res.texture.destroy();
        drop(res);

        log::debug!("{} disposed", self.label);
        true
    }

    /// CPU-side checks: geometry, both stages, link, texture decode.
    fn prepare(&self, target: wgpu::TextureFormat) -> Result<Prepared, DrawableError> {
        let layout = self.layout();
        let index_count = self.validate_geometry(layout)?;

        let vertex = shader::compile(ShaderStage::Vertex, &self.vertex_shader)?;
        let fragment = shader::compile(ShaderStage::Fragment, &self.fragment_shader)?;
        let interface = shader::link(&vertex, &fragment, layout, target)?;

        let image = match &self.texture_path {
            Some(path) => Some(texture::decode_rgba(path)?),
            None => None,
        };

        Ok(Prepared {
            layout,
            index_count,
            interface,
            image,
        })
    }

    fn validate_geometry(&self, layout: VertexLayout) -> Result<u32, DrawableError> {
        let per_vertex = layout.floats_per_vertex();

        if self.vertices.is_empty() {
            return Err(DrawableError::geometry("no vertices"));
        }
        if self.vertices.len() % per_vertex != 0 {
            return Err(DrawableError::geometry(format!(
                "{} floats is not a whole number of {per_vertex}-float vertices",
                self.vertices.len()
            )));
        }
        if self.indices.is_empty() {
            return Err(DrawableError::geometry("no indices"));
        }
        if self.indices.len() % 3 != 0 {
            return Err(DrawableError::geometry(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertices.len() / per_vertex;
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(DrawableError::geometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        u32::try_from(self.indices.len())
            .map_err(|_| DrawableError::geometry("too many indices for one draw call"))
    }

    fn create_resources(
        &self,
        ctx: &RenderCtx<'_>,
        prepared: Prepared,
    ) -> Result<GpuResources, DrawableError> {
        let Prepared {
            layout,
            index_count,
            interface,
            image,
        } = prepared;

        let label = self.label.as_str();

        // Texture first: it is the only step here that can still be refused.
        let (texture, has_own_texture) = match (&image, &self.texture_path) {
            (Some(image), Some(path)) => {
                let t = GpuTexture::upload(ctx, &format!("{label} texture"), image).map_err(
                    |reason| DrawableError::ResourceLoad {
                        path: path.clone(),
                        reason,
                    },
                )?;
                (t, true)
            }
            _ => (GpuTexture::placeholder(ctx), false),
        };
        let sampler = texture::create_sampler(ctx);

        if has_own_texture && !interface.samples_texture {
            log::warn!(
                "{label}: texture is uploaded but no stage declares `{}`",
                shader::TEXTURE_UNIFORM
            );
        }

        // Validation errors raised below would otherwise reach the device's
        // uncaptured-error handler, which panics.
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex stage")),
            source: wgpu::ShaderSource::Wgsl(self.vertex_shader.as_str().into()),
        });
        let fs_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment stage")),
            source: wgpu::ShaderSource::Wgsl(self.fragment_shader.as_str().into()),
        });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} texture unit layout")),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: TEXTURE_BINDING,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: SAMPLER_BINDING,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label} pipeline layout")),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label} pipeline")),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(shader::VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[layout.buffer_layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(shader::FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
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

        // The pipeline keeps what it needs; the stage modules can go.
        drop(vs_module);
        drop(fs_module);

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} vertex buffer")),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} index buffer")),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} texture unit")),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            vertex_buffer.destroy();
            index_buffer.destroy();
            texture.destroy();
            return Err(DrawableError::link(err.to_string()));
        }

        Ok(GpuResources {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count,
            texture,
            has_own_texture,
            bind_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn prepare_err(d: &Drawable) -> DrawableError {
        match d.prepare(TARGET) {
            Err(e) => e,
            Ok(_) => panic!("expected prepare to fail"),
        }
    }

    #[test]
    fn default_is_a_single_triangle() {
        let d = Drawable::default();
        assert_eq!(d.vertex_count(), 3);
        assert_eq!(d.triangle_count(), 1);
        assert_eq!(d.stride(), 12);
        assert!(!d.is_loaded());
    }

    #[test]
    fn viewport_quad_covers_clip_space_with_two_triangles() {
        let q = Drawable::viewport_quad(None);
        assert_eq!(q.vertex_count(), 4);
        assert_eq!(q.indices, vec![0, 1, 2, 1, 2, 3]);
        assert_eq!(q.triangle_count(), 2);

        let corners: Vec<&[f32]> = q.vertices.chunks(3).collect();
        for c in &corners {
            assert_eq!(c[0].abs(), 1.0);
            assert_eq!(c[1].abs(), 1.0);
            assert_eq!(c[2], 0.0);
        }
        // All four corners are distinct.
        for (i, a) in corners.iter().enumerate() {
            for b in &corners[i + 1..] {
                assert_ne!(a, b);
            }
        }

        // Two triangles sharing the 1-2 diagonal: half the square each.
        let area = |t: &[u32]| {
            let p = |i: u32| &q.vertices[i as usize * 3..i as usize * 3 + 2];
            let (a, b, c) = (p(t[0]), p(t[1]), p(t[2]));
            ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
        };
        let total: f32 = q.indices.chunks(3).map(area).sum();
        assert_eq!(total, 4.0);
    }

    #[test]
    fn textured_quad_carries_uvs() {
        let q = Drawable::viewport_quad(Some(PathBuf::from("frame.png")));
        assert!(q.use_texture);
        assert_eq!(q.stride(), 20);
        assert_eq!(q.vertex_count(), 4);
        assert_eq!(q.texture_path.as_deref(), Some(Path::new("frame.png")));
        // Top-left corner samples the image's top-left texel.
        assert_eq!(&q.vertices[5..10], &[-1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn untextured_quad_prepares() {
        let p = Drawable::viewport_quad(None).prepare(TARGET).unwrap();
        assert_eq!(p.index_count, 6);
        assert!(p.image.is_none());
        assert!(!p.interface.samples_texture);
    }

    #[test]
    fn broken_fragment_stage_fails_before_gpu_work() {
        let d = Drawable::viewport_quad(None).with_shaders(
            shader::DEFAULT_VERTEX_SHADER,
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0) ",
        );
        match prepare_err(&d) {
            DrawableError::ShaderCompile { stage, .. } => assert_eq!(stage, ShaderStage::Fragment),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!d.is_loaded());
    }

    #[test]
    fn vertex_stage_is_compiled_first() {
        let d = Drawable::viewport_quad(None).with_shaders("not wgsl", "also not wgsl");
        assert!(matches!(
            prepare_err(&d),
            DrawableError::ShaderCompile { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn scalar_color_output_is_a_link_error() {
        let d = Drawable::viewport_quad(None).with_shaders(
            shader::DEFAULT_VERTEX_SHADER,
            "@fragment fn fs_main() -> @location(0) f32 { return 1.0; }",
        );
        assert!(matches!(prepare_err(&d), DrawableError::ShaderLink { .. }));
    }

    #[test]
    fn partial_vertex_is_rejected() {
        let mut d = Drawable::viewport_quad(None);
        d.vertices.pop();
        assert!(matches!(prepare_err(&d), DrawableError::InvalidGeometry(_)));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut d = Drawable::viewport_quad(None);
        d.indices[5] = 4;
        match prepare_err(&d) {
            DrawableError::InvalidGeometry(msg) => assert!(msg.contains("index 4"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dangling_index_triple_is_rejected() {
        let mut d = Drawable::viewport_quad(None);
        d.indices.push(0);
        assert!(matches!(prepare_err(&d), DrawableError::InvalidGeometry(_)));
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let d = Drawable::new(Vec::new(), Vec::new());
        assert!(matches!(prepare_err(&d), DrawableError::InvalidGeometry(_)));
    }

    #[test]
    fn uv_layout_without_texture_shaders_still_links() {
        // Position-only program ignores the UV attribute.
        let mut d = Drawable::viewport_quad(Some(PathBuf::from("unused.png")));
        d.vertex_shader = shader::DEFAULT_VERTEX_SHADER.to_string();
        d.fragment_shader = shader::DEFAULT_FRAGMENT_SHADER.to_string();
        d.texture_path = None;
        let p = d.prepare(TARGET).unwrap();
        assert_eq!(p.layout, VertexLayout::new(true));
    }

    #[test]
    fn missing_texture_file_is_a_resource_load_error() {
        let path = std::env::temp_dir().join("emu-display-missing-texture.png");
        let d = Drawable::viewport_quad(Some(path.clone()));
        match prepare_err(&d) {
            DrawableError::ResourceLoad { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dispose_on_unloaded_is_noop() {
        let mut d = Drawable::default();
        assert!(!d.dispose());
    }
}
