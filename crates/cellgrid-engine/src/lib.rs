//! Cellgrid engine crate.
//!
//! Renders a uniform grid of colored cells with one instanced draw call and keeps
//! the canvas uniformly scaled and centered in its window.

pub mod config;
pub mod device;
pub mod display;
pub mod grid;
pub mod logging;
pub mod paint;
pub mod render;
pub mod window;

pub use config::ViewerConfig;
