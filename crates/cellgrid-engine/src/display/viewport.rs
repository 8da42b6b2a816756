/// Viewport size in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Logical size of a window's client area.
    pub fn of_window(window: &winit::window::Window) -> Self {
        let logical: winit::dpi::LogicalSize<f64> =
            window.inner_size().to_logical(window.scale_factor());
        Self::new(logical.width as f32, logical.height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}
