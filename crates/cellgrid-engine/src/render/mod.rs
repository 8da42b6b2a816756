//! GPU rendering subsystem.
//!
//! `GridResources` builds every GPU object once; `GridRenderer` records the single
//! instanced draw per frame.
//!
//! Convention:
//! - The vertex shader maps the unit quad into each cell's sub-square of NDC.
//! - The canvas rectangle is applied as the pass viewport, so the shader never sees
//!   window coordinates.

mod ctx;
mod frame;
mod resources;
mod shader;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::{DrawCall, GridRenderer};
pub use resources::GridResources;
pub use shader::{CELL_SHADER, ShaderProgram};
