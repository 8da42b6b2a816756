use anyhow::Result;

use crate::device::GpuInit;
use crate::display::DisplayScaler;
use crate::grid::GridSize;
use crate::paint::Color;

/// Logical canvas size the display scaler fits into the window.
pub const CANVAS_SIZE: (f32, f32) = (600.0, 600.0);

/// Cells per grid axis.
pub const GRID_SIZE: u32 = 1024;

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    /// Logical canvas size; also the window's initial inner size.
    pub canvas_size: (f32, f32),
    pub grid: GridSize,
    pub clear_color: Color,
    pub gpu: GpuInit,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "cellgrid".to_string(),
            canvas_size: CANVAS_SIZE,
            grid: GridSize::square(GRID_SIZE),
            clear_color: Color::WHITE,
            gpu: GpuInit::default(),
        }
    }
}

impl ViewerConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_canvas_size(mut self, width: f32, height: f32) -> Self {
        self.canvas_size = (width, height);
        self
    }

    pub fn with_grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Scaler for the configured canvas size.
    pub fn scaler(&self) -> DisplayScaler {
        DisplayScaler::new(self.canvas_size.0, self.canvas_size.1)
    }

    /// Rejects configurations that cannot produce a frame.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.canvas_size;
        anyhow::ensure!(
            w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0,
            "canvas size {w}x{h} must be positive and finite"
        );
        anyhow::ensure!(self.clear_color.is_finite(), "clear color must be finite");
        self.grid.validate()
    }
}
