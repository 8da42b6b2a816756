//! Display scaling.
//!
//! Maps the window's logical viewport to the on-screen geometry of the fixed-size
//! canvas: one uniform scale factor, truncated to whole pixels, centered.

mod scaler;
mod viewport;

pub use scaler::{CanvasGeometry, CanvasViewport, DisplayScaler};
pub use viewport::Viewport;
