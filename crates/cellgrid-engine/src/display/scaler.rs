use winit::dpi::PhysicalSize;

use super::Viewport;

/// Fits a fixed logical canvas size into a viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayScaler {
    target_width: f32,
    target_height: f32,
}

/// On-screen canvas size and margins, in logical pixels.
///
/// Recomputed from scratch for every viewport size; never patched.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasGeometry {
    pub scale: f32,
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

/// Canvas rectangle in physical pixels, ready for `RenderPass::set_viewport`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayScaler {
    #[inline]
    pub const fn new(target_width: f32, target_height: f32) -> Self {
        Self { target_width, target_height }
    }

    #[inline]
    pub fn target(&self) -> (f32, f32) {
        (self.target_width, self.target_height)
    }

    /// Uniform scale factor: the canvas never overflows either axis.
    #[inline]
    pub fn scale(&self, viewport: Viewport) -> f32 {
        let sx = viewport.width as f64 / self.target_width as f64;
        let sy = viewport.height as f64 / self.target_height as f64;
        sx.min(sy) as f32
    }

    /// Computes the canvas geometry for `viewport`.
    ///
    /// Returns `None` for zero-sized or non-finite viewports (e.g. a minimized window).
    /// There is no minimum scale; small viewports shrink the canvas proportionally.
    pub fn fit(&self, viewport: Viewport) -> Option<CanvasGeometry> {
        if !viewport.is_valid() {
            return None;
        }

        // f64 keeps whole-pixel results from dropping below the exact product.
        let (vw, vh) = (viewport.width as f64, viewport.height as f64);
        let (tw, th) = (self.target_width as f64, self.target_height as f64);

        let scale = (vw / tw).min(vh / th);
        let width = (scale * tw).floor();
        let height = (scale * th).floor();

        let horizontal = ((vw - width) / 2.0) as f32;
        let vertical = ((vh - height) / 2.0) as f32;

        Some(CanvasGeometry {
            scale: scale as f32,
            width: width as f32,
            height: height as f32,
            margin_left: horizontal,
            margin_right: horizontal,
            margin_top: vertical,
            margin_bottom: vertical,
        })
    }
}

impl CanvasGeometry {
    /// Converts to physical pixels, clamped to the `surface` bounds.
    ///
    /// Returns `None` when the clamped rectangle has no area.
    pub fn to_physical(self, scale_factor: f64, surface: PhysicalSize<u32>) -> Option<CanvasViewport> {
        let s = scale_factor as f32;
        let sw = surface.width as f32;
        let sh = surface.height as f32;

        let x = (self.margin_left * s).clamp(0.0, sw);
        let y = (self.margin_top * s).clamp(0.0, sh);
        let width = (self.width * s).min(sw - x);
        let height = (self.height * s).min(sh - y);

        if width < 1.0 || height < 1.0 {
            None
        } else {
            Some(CanvasViewport { x, y, width, height })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALER: DisplayScaler = DisplayScaler::new(600.0, 600.0);

    fn fit(w: f32, h: f32) -> CanvasGeometry {
        SCALER.fit(Viewport::new(w, h)).expect("valid viewport")
    }

    // ── fit ───────────────────────────────────────────────────────────────

    #[test]
    fn exact_target_has_unit_scale_and_no_margins() {
        let g = fit(600.0, 600.0);
        assert_eq!(g.scale, 1.0);
        assert_eq!((g.width, g.height), (600.0, 600.0));
        assert_eq!((g.margin_left, g.margin_right), (0.0, 0.0));
        assert_eq!((g.margin_top, g.margin_bottom), (0.0, 0.0));
    }

    #[test]
    fn tall_viewport_is_width_limited() {
        let g = fit(300.0, 1200.0);
        assert_eq!(g.scale, 0.5);
        assert_eq!((g.width, g.height), (300.0, 300.0));
        assert_eq!(g.margin_left, 0.0);
        assert_eq!(g.margin_top, 450.0);
        assert_eq!(g.margin_bottom, 450.0);
    }

    #[test]
    fn wide_viewport_is_height_limited() {
        let g = fit(1920.0, 1080.0);
        assert_eq!(g.scale, 1.8);
        assert_eq!((g.width, g.height), (1080.0, 1080.0));
        assert_eq!(g.margin_left, 420.0);
        assert_eq!(g.margin_top, 0.0);
    }

    #[test]
    fn fractional_viewport_is_truncated() {
        let g = fit(1000.5, 700.25);
        assert_eq!((g.width, g.height), (700.0, 700.0));
        assert_eq!(g.margin_left, 150.25);
        assert_eq!(g.margin_top, 0.125);
    }

    #[test]
    fn odd_remainder_gives_half_pixel_margins() {
        let g = fit(601.0, 600.0);
        assert_eq!(g.width, 600.0);
        assert_eq!(g.margin_left, 0.5);
        assert_eq!(g.margin_right, 0.5);
    }

    #[test]
    fn small_viewport_shrinks_without_clamp() {
        let g = fit(60.0, 90.0);
        assert_eq!(g.scale, 0.1);
        assert_eq!((g.width, g.height), (60.0, 60.0));
        assert_eq!(g.margin_top, 15.0);
    }

    #[test]
    fn fit_is_idempotent() {
        assert_eq!(fit(1234.0, 567.0), fit(1234.0, 567.0));
    }

    #[test]
    fn canvas_never_overflows_and_margins_are_symmetric() {
        for w in (50..=2000).step_by(37) {
            for h in (50..=2000).step_by(53) {
                let (w, h) = (w as f32, h as f32);
                let g = fit(w, h);
                assert!(g.width <= w && g.height <= h, "{w}x{h}: {g:?}");
                assert!(g.margin_left >= 0.0 && g.margin_top >= 0.0, "{w}x{h}: {g:?}");
                assert_eq!(g.margin_left, g.margin_right);
                assert_eq!(g.margin_top, g.margin_bottom);
                assert_eq!(g.scale, (w / 600.0).min(h / 600.0));
                assert_eq!(g.width, g.height);
            }
        }
    }

    #[test]
    fn invalid_viewports_yield_nothing() {
        assert!(SCALER.fit(Viewport::new(0.0, 600.0)).is_none());
        assert!(SCALER.fit(Viewport::new(600.0, 0.0)).is_none());
        assert!(SCALER.fit(Viewport::new(f32::INFINITY, 600.0)).is_none());
    }

    #[test]
    fn non_square_target_preserves_aspect() {
        let scaler = DisplayScaler::new(800.0, 400.0);
        let g = scaler.fit(Viewport::new(400.0, 400.0)).expect("valid viewport");
        assert_eq!((g.width, g.height), (400.0, 200.0));
        assert_eq!(g.margin_top, 100.0);
    }

    // ── physical ──────────────────────────────────────────────────────────

    #[test]
    fn physical_viewport_applies_scale_factor() {
        let g = fit(1000.0, 600.0);
        let v = g
            .to_physical(2.0, PhysicalSize::new(2000, 1200))
            .expect("non-empty");
        assert_eq!(v, CanvasViewport { x: 400.0, y: 0.0, width: 1200.0, height: 1200.0 });
    }

    #[test]
    fn physical_viewport_is_clamped_to_surface() {
        let g = fit(600.0, 600.0);
        let v = g
            .to_physical(1.0, PhysicalSize::new(599, 600))
            .expect("non-empty");
        assert_eq!(v.width, 599.0);
        assert!(v.x + v.width <= 599.0);
    }

    #[test]
    fn empty_physical_viewport_is_none() {
        let g = fit(600.0, 600.0);
        assert!(g.to_physical(1.0, PhysicalSize::new(0, 0)).is_none());
    }
}
