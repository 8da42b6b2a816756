//! Grid geometry and uniform data.
//!
//! One quad (two triangles) is instanced once per grid cell. The vertex stage
//! derives each instance's cell from its index; `cell` mirrors that math on the
//! CPU.

pub mod cell;
mod data;

pub use data::{CELL_QUAD, GridSize, GridUniform, QuadVertex, VertexSet};
