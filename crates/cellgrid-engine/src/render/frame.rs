use std::ops::Range;

use anyhow::{Context, Result};

use crate::device::{Gpu, InitError, SurfaceErrorAction};
use crate::display::CanvasViewport;
use crate::grid::{GridSize, VertexSet};
use crate::paint::Color;
use crate::render::{GridResources, RenderCtx, RenderTarget, ShaderProgram};

/// Vertex and instance ranges of the grid's single draw call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

impl DrawCall {
    /// One quad per cell: every vertex of `vertices`, `width * height` instances.
    pub fn for_grid(vertices: &VertexSet, grid: GridSize) -> Result<Self> {
        let cells = grid
            .cell_count()
            .with_context(|| format!("grid {}x{} overflows the instance range", grid.width, grid.height))?;

        Ok(Self {
            vertices: 0..vertices.vertex_count(),
            instances: 0..cells,
        })
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instances.end - self.instances.start
    }
}

/// Draws the whole grid in one render pass.
///
/// Holds no per-frame state; `render` may be called any number of times.
pub struct GridRenderer {
    resources: GridResources,
    draw: DrawCall,
    clear: Color,
}

impl GridRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        vertices: &VertexSet,
        grid: GridSize,
        shader: &ShaderProgram,
        clear: Color,
    ) -> Result<Self> {
        let draw = DrawCall::for_grid(vertices, grid).context(InitError::ResourceCreation)?;
        let resources = GridResources::new(ctx, vertices, grid, shader)
            .context("failed to build grid resources")?;

        Ok(Self {
            resources,
            draw,
            clear,
        })
    }

    /// Acquires the current surface texture, records the grid pass and submits it.
    ///
    /// Transient surface errors skip the frame; an unrecoverable one is returned.
    pub fn render(&self, gpu: &mut Gpu<'_>, canvas: Option<CanvasViewport>) -> Result<()> {
        let mut frame = match gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                log::warn!("surface texture unavailable: {reason}");
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface lost: {reason}")),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, canvas);
            self.encode(&mut target);
        }

        gpu.submit(frame);
        Ok(())
    }

    /// Records the clear and, when a canvas rectangle is present, the instanced draw.
    pub fn encode(&self, target: &mut RenderTarget<'_>) {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cellgrid grid pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(canvas) = target.canvas else { return };
        rpass.set_viewport(canvas.x, canvas.y, canvas.width, canvas.height, 0.0, 1.0);

        rpass.set_pipeline(self.resources.pipeline());
        rpass.set_vertex_buffer(0, self.resources.vertex_buffer().slice(..));
        rpass.set_bind_group(0, self.resources.bind_group(), &[]);
        rpass.draw(self.draw.vertices.clone(), self.draw.instances.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::display::{DisplayScaler, Viewport};
    use crate::grid::cell::{cell_clip_rect, cell_color, cell_of_instance};

    #[test]
    fn draw_covers_quad_and_every_cell() {
        let draw = DrawCall::for_grid(&VertexSet::cell_quad(), GridSize::new(4, 4)).unwrap();
        assert_eq!(draw.vertices, 0..6);
        assert_eq!(draw.instances, 0..16);
        assert_eq!(draw.instance_count(), 16);
    }

    #[test]
    fn default_grid_draws_a_million_instances() {
        let draw = DrawCall::for_grid(&VertexSet::cell_quad(), GridSize::default()).unwrap();
        assert_eq!(draw.instance_count(), 1024 * 1024);
    }

    #[test]
    fn vertex_range_follows_vertex_set() {
        let quad_pair = VertexSet::from_floats(&[0.0; 24]).unwrap();
        let draw = DrawCall::for_grid(&quad_pair, GridSize::new(2, 3)).unwrap();
        assert_eq!(draw.vertices, 0..12);
        assert_eq!(draw.instances, 0..6);
    }

    #[test]
    fn overflowing_grid_has_no_draw() {
        assert!(DrawCall::for_grid(&VertexSet::cell_quad(), GridSize::new(1 << 16, 1 << 16)).is_err());
    }

    #[test]
    fn two_by_two_grid_on_exact_viewport() {
        let grid = GridSize::square(2);
        let draw = DrawCall::for_grid(&VertexSet::cell_quad(), grid).unwrap();
        assert_eq!(draw.instance_count(), 4);

        let geometry = DisplayScaler::new(600.0, 600.0)
            .fit(Viewport::new(600.0, 600.0))
            .unwrap();
        assert_eq!((geometry.width, geometry.height), (600.0, 600.0));
        assert_eq!(geometry.margin_left + geometry.margin_top, 0.0);

        let mut rects = Vec::new();
        let mut colors = Vec::new();
        for i in draw.instances.clone() {
            let cell = cell_of_instance(i, grid);
            rects.push(cell_clip_rect(cell, grid).map(f32::to_bits));
            colors.push(cell_color(cell, grid).map(f32::to_bits));
        }

        let distinct_rects: HashSet<_> = rects.iter().collect();
        let distinct_colors: HashSet<_> = colors.iter().collect();
        assert_eq!(distinct_rects.len(), 4);
        assert_eq!(distinct_colors.len(), 4);

        assert_eq!(cell_color([0.0, 0.0], grid), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(cell_color([1.0, 0.0], grid), [0.5, 0.0, 1.0, 1.0]);
        assert_eq!(cell_color([0.0, 1.0], grid), [0.0, 0.5, 0.5, 1.0]);
        assert_eq!(cell_color([1.0, 1.0], grid), [0.5, 0.5, 0.5, 1.0]);
    }
}
