use anyhow::{Context, Result};

use crate::device::InitError;
use crate::grid::{GridSize, GridUniform, QuadVertex, VertexSet};
use crate::render::{RenderCtx, ShaderProgram};

/// Every GPU object the grid draw needs, built once and never mutated.
pub struct GridResources {
    vertex_buffer: wgpu::Buffer,
    // Bound through `bind_group`; owned here for the renderer's lifetime.
    _grid_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl GridResources {
    /// Builds buffers, pipeline and bind group in dependency order.
    ///
    /// Fails before any GPU call if `grid` is empty, and before the shader module
    /// is created if `shader` does not reflect the pipeline's buffer layouts. Errors
    /// wgpu raises while creating the objects are captured and returned as
    /// `InitError::ResourceCreation`.
    pub fn new(
        ctx: &RenderCtx<'_>,
        vertices: &VertexSet,
        grid: GridSize,
        shader: &ShaderProgram,
    ) -> Result<Self> {
        grid.validate().context(InitError::ResourceCreation)?;

        let oom_scope = ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation_scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let built = Self::create_objects(ctx, vertices, grid, shader);

        // Scopes pop innermost first and must be popped even when `built` failed.
        let validation = pollster::block_on(validation_scope.pop());
        let oom = pollster::block_on(oom_scope.pop());
        if let Some(err) = validation.or(oom) {
            return Err(anyhow::anyhow!("{err}"))
                .context("wgpu rejected a grid resource")
                .context(InitError::ResourceCreation);
        }
        let (vertex_buffer, grid_buffer, pipeline, bind_group) = built?;

        log::debug!(
            "grid resources ready: {}x{} cells, {} vertices, format {:?}",
            grid.width,
            grid.height,
            vertices.vertex_count(),
            ctx.surface_format
        );

        Ok(Self {
            vertex_buffer,
            _grid_buffer: grid_buffer,
            pipeline,
            bind_group,
        })
    }

    fn create_objects(
        ctx: &RenderCtx<'_>,
        vertices: &VertexSet,
        grid: GridSize,
        shader: &ShaderProgram,
    ) -> Result<(wgpu::Buffer, wgpu::Buffer, wgpu::RenderPipeline, wgpu::BindGroup)> {
        let vertex_buffer = Self::create_vertex_buffer(ctx, vertices);
        let grid_buffer = Self::create_grid_buffer(ctx, grid);

        let module = shader.create_module(ctx.device)?;
        let pipeline = Self::create_pipeline(ctx, &module, shader);
        let bind_group = Self::create_bind_group(ctx, &pipeline, &grid_buffer);

        Ok((vertex_buffer, grid_buffer, pipeline, bind_group))
    }

    fn create_vertex_buffer(ctx: &RenderCtx<'_>, vertices: &VertexSet) -> wgpu::Buffer {
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cellgrid vertex buffer"),
            size: vertices.byte_len(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue.write_buffer(&buffer, 0, vertices.as_bytes());
        buffer
    }

    fn create_grid_buffer(ctx: &RenderCtx<'_>, grid: GridSize) -> wgpu::Buffer {
        let uniform = GridUniform::from(grid);
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cellgrid grid buffer"),
            size: GridUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniform));
        buffer
    }

    fn create_pipeline(
        ctx: &RenderCtx<'_>,
        module: &wgpu::ShaderModule,
        shader: &ShaderProgram,
    ) -> wgpu::RenderPipeline {
        ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cellgrid cell pipeline"),
            // Derived from the shader: group 0 resolves to the grid uniform.
            layout: None,

            vertex: wgpu::VertexState {
                module,
                entry_point: Some(shader.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(shader.fragment_entry),
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
        })
    }

    fn create_bind_group(
        ctx: &RenderCtx<'_>,
        pipeline: &wgpu::RenderPipeline,
        grid_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cellgrid bind group"),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: grid_buffer.as_entire_binding(),
            }],
        })
    }

    #[inline]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
