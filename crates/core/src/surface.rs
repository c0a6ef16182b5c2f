use linescope_protocol::SurfaceSize;

/// Canvas sizing for high-density displays.
///
/// The backing store is `round(css × dpr)` physical pixels in each
/// dimension. CSS sizes are snapped to whole pixels first, so for an integer
/// device pixel ratio the backing store is an exact integer multiple of the
/// CSS size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSurface {
    size: SurfaceSize,
}

impl CanvasSurface {
    pub fn new(css_width: f64, css_height: f64, dpr: f64) -> Self {
        Self {
            size: measure(css_width, css_height, dpr),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn css_width(&self) -> f64 {
        self.size.css_width
    }

    pub fn css_height(&self) -> f64 {
        self.size.css_height
    }

    pub fn dpr(&self) -> f64 {
        self.size.dpr
    }

    /// Nothing can be drawn on a collapsed surface.
    pub fn is_empty(&self) -> bool {
        self.size.backing_width == 0 || self.size.backing_height == 0
    }

    /// Re-measure. Returns whether anything changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        let next = measure(css_width, css_height, dpr);
        if next == self.size {
            return false;
        }
        log::trace!(
            "surface {}x{}@{} -> {}x{}@{} ({}x{} physical)",
            self.size.css_width,
            self.size.css_height,
            self.size.dpr,
            next.css_width,
            next.css_height,
            next.dpr,
            next.backing_width,
            next.backing_height,
        );
        self.size = next;
        true
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

fn measure(css_width: f64, css_height: f64, dpr: f64) -> SurfaceSize {
    let css = |v: f64| if v.is_finite() { v.round().max(0.0) } else { 0.0 };
    let css_width = css(css_width);
    let css_height = css(css_height);
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    SurfaceSize {
        css_width,
        css_height,
        dpr,
        backing_width: (css_width * dpr).round() as u32,
        backing_height: (css_height * dpr).round() as u32,
    }
}
