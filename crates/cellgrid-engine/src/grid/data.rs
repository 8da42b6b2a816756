use anyhow::Result;
use bytemuck::{Pod, Zeroable};

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2], // -1..1
}

impl QuadVertex {
    /// Format of `pos` at `@location(0)`.
    pub const FORMAT: wgpu::VertexFormat = wgpu::VertexFormat::Float32x2;

    const ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
        format: Self::FORMAT,
        offset: 0,
        shader_location: 0,
    }];

    /// Matches `@location(0) pos: vec2f` in the cell shader.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit quad covering clip space, as two triangles.
pub const CELL_QUAD: [QuadVertex; 6] = [
    QuadVertex { pos: [-1.0, -1.0] },
    QuadVertex { pos: [-1.0, 1.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [-1.0, -1.0] },
    QuadVertex { pos: [1.0, -1.0] },
    QuadVertex { pos: [1.0, 1.0] },
];

// ── vertex set ────────────────────────────────────────────────────────────

/// Immutable list of 2D positions uploaded once into the vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSet {
    vertices: Vec<QuadVertex>,
}

impl VertexSet {
    /// The quad drawn for every grid cell.
    pub fn cell_quad() -> Self {
        Self { vertices: CELL_QUAD.to_vec() }
    }

    /// Builds a set from interleaved `x, y` floats.
    pub fn from_floats(floats: &[f32]) -> Result<Self> {
        anyhow::ensure!(!floats.is_empty(), "vertex data is empty");
        anyhow::ensure!(
            floats.len() % 2 == 0,
            "vertex data has {} floats, expected a multiple of 2",
            floats.len()
        );

        let vertices = floats
            .chunks_exact(2)
            .map(|xy| QuadVertex { pos: [xy[0], xy[1]] })
            .collect();

        Ok(Self { vertices })
    }

    #[inline]
    pub fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    /// Number of vertices (float count / 2).
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn byte_len(&self) -> u64 {
        self.as_bytes().len() as u64
    }
}

// ── grid size ─────────────────────────────────────────────────────────────

/// Grid dimensions in cells.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Number of cells, or `None` if it does not fit the draw call's `u32` range.
    #[inline]
    pub fn cell_count(self) -> Option<u32> {
        self.width.checked_mul(self.height)
    }

    pub fn validate(self) -> Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "grid size {}x{} has an empty axis",
            self.width,
            self.height
        );
        anyhow::ensure!(
            self.cell_count().is_some(),
            "grid size {}x{} exceeds the instance range",
            self.width,
            self.height
        );
        Ok(())
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::square(1024)
    }
}

// ── grid uniform ──────────────────────────────────────────────────────────

/// Matches `@group(0) @binding(0) var<uniform> grid: vec2f`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GridUniform {
    pub size: [f32; 2],
}

impl GridUniform {
    pub const SIZE: u64 = std::mem::size_of::<GridUniform>() as u64;
}

impl From<GridSize> for GridUniform {
    fn from(grid: GridSize) -> Self {
        Self { size: [grid.width as f32, grid.height as f32] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn stride_times_count_is_byte_len() {
        let set = VertexSet::cell_quad();
        let layout = QuadVertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.array_stride * set.vertex_count() as u64, set.byte_len());
        assert_eq!(set.byte_len(), 48);
    }

    #[test]
    fn single_attribute_spans_one_vertex() {
        let layout = QuadVertex::layout();
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 1);

        let attr = layout.attributes[0];
        assert_eq!(attr.format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attr.offset, 0);
        assert_eq!(attr.shader_location, 0);
        assert_eq!(attr.format.size(), layout.array_stride);
    }

    // ── vertex set ────────────────────────────────────────────────────────

    #[test]
    fn cell_quad_matches_float_form() {
        let floats = [
            -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, //
            -1.0, -1.0, 1.0, -1.0, 1.0, 1.0,
        ];
        let set = VertexSet::from_floats(&floats).unwrap();
        assert_eq!(set, VertexSet::cell_quad());
        assert_eq!(set.vertex_count(), 6);
        assert_eq!(set.as_bytes(), bytemuck::cast_slice::<f32, u8>(&floats));
    }

    #[test]
    fn odd_float_count_is_rejected() {
        assert!(VertexSet::from_floats(&[0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_vertex_data_is_rejected() {
        assert!(VertexSet::from_floats(&[]).is_err());
    }

    // ── grid ──────────────────────────────────────────────────────────────

    #[test]
    fn default_grid_is_1024_square() {
        let grid = GridSize::default();
        assert_eq!(grid, GridSize::new(1024, 1024));
        assert_eq!(grid.cell_count(), Some(1_048_576));
    }

    #[test]
    fn grid_validation() {
        assert!(GridSize::new(4, 4).validate().is_ok());
        assert!(GridSize::new(0, 4).validate().is_err());
        assert!(GridSize::new(4, 0).validate().is_err());
        assert!(GridSize::new(u32::MAX, 2).validate().is_err());
    }

    #[test]
    fn uniform_is_two_floats() {
        assert_eq!(GridUniform::SIZE, 8);
        let u = GridUniform::from(GridSize::new(3, 5));
        assert_eq!(u.size, [3.0, 5.0]);
        assert_eq!(bytemuck::bytes_of(&u).len(), 8);
    }
}
