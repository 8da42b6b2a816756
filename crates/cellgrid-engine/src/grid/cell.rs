//! CPU reference of the cell shader's math.
//!
//! Every function here evaluates in `f32` with the same operations as
//! `render/shaders/cell.wgsl`, so the results are what the GPU computes.

use super::{GridSize, GridUniform, QuadVertex};

/// Cell coordinate of instance `instance`: `(i mod gx, floor(i / gx))`.
///
/// Instances past the last cell yield rows beyond the grid rather than failing.
#[inline]
pub fn cell_of_instance(instance: u32, grid: GridSize) -> [f32; 2] {
    let [gx, _] = GridUniform::from(grid).size;
    let i = instance as f32;
    [i % gx, (i / gx).floor()]
}

/// Clip-space position of `vertex` inside `cell`: `((pos + 1) / grid) - 1 + 2 * cell / grid`.
#[inline]
pub fn cell_position(vertex: QuadVertex, cell: [f32; 2], grid: GridSize) -> [f32; 2] {
    let g = GridUniform::from(grid).size;
    std::array::from_fn(|k| (vertex.pos[k] + 1.0) / g[k] - 1.0 + cell[k] / g[k] * 2.0)
}

/// Clip-space rectangle `[min_x, min_y, max_x, max_y]` covered by `cell`'s quad.
pub fn cell_clip_rect(cell: [f32; 2], grid: GridSize) -> [f32; 4] {
    let lo = cell_position(QuadVertex { pos: [-1.0, -1.0] }, cell, grid);
    let hi = cell_position(QuadVertex { pos: [1.0, 1.0] }, cell, grid);
    [lo[0], lo[1], hi[0], hi[1]]
}

/// Fragment color for `cell`: `(cx / gx, cy / gy, 1 - cy / gy, 1)`.
#[inline]
pub fn cell_color(cell: [f32; 2], grid: GridSize) -> [f32; 4] {
    let [gx, gy] = GridUniform::from(grid).size;
    let (r, g) = (cell[0] / gx, cell[1] / gy);
    [r, g, 1.0 - g, 1.0]
}
