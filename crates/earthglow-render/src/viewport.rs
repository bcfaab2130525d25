//! Viewport controller: window size, pixel ratio and camera aspect.
//!
//! Sizes come in as logical pixels. The drawing buffer is the logical size
//! times the pixel ratio. At startup the device pixel ratio is used as is;
//! every resize caps it at `max_pixel_ratio`.

use earthglow_scene::PerspectiveCamera;

/// Minimum drawing buffer dimension (prevents zero-size surfaces).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Drawing buffer dimensions in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

/// Produced when a resize actually changed the drawing buffer inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportResize {
    /// New drawing buffer size for the surface and depth targets.
    pub physical: PhysicalSize,
    /// Camera aspect ratio after the resize.
    pub aspect: f64,
    pub pixel_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    logical_width: f64,
    logical_height: f64,
    pixel_ratio: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(
        logical_width: f64,
        logical_height: f64,
        device_pixel_ratio: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        Self {
            logical_width,
            logical_height,
            pixel_ratio: device_pixel_ratio,
            max_pixel_ratio,
        }
    }

    /// Handle a window resize. The camera aspect is always refreshed; the
    /// return value is `None` when neither size nor effective pixel ratio
    /// changed, so the caller can skip reconfiguring GPU targets.
    pub fn on_resize(
        &mut self,
        logical_width: f64,
        logical_height: f64,
        device_pixel_ratio: f64,
        camera: &mut PerspectiveCamera,
    ) -> Option<ViewportResize> {
        camera.set_aspect_ratio(logical_width, logical_height);

        let pixel_ratio = device_pixel_ratio.min(self.max_pixel_ratio);
        if logical_width == self.logical_width
            && logical_height == self.logical_height
            && pixel_ratio == self.pixel_ratio
        {
            return None;
        }

        self.logical_width = logical_width;
        self.logical_height = logical_height;
        self.pixel_ratio = pixel_ratio;

        Some(ViewportResize {
            physical: self.drawing_buffer_size(),
            aspect: camera.aspect,
            pixel_ratio,
        })
    }

    /// Logical size times pixel ratio, at least 1x1.
    ///
    /// With a capped pixel ratio this is smaller than the window's physical
    /// size; the compositor stretches the surface to fill the window.
    pub fn drawing_buffer_size(&self) -> PhysicalSize {
        let scale = |v: f64| ((v * self.pixel_ratio).round() as u32).max(MIN_SURFACE_DIMENSION);
        PhysicalSize {
            width: scale(self.logical_width),
            height: scale(self.logical_height),
        }
    }

    /// Aspect ratio of the current logical size; 1.0 for a zero height.
    pub fn aspect(&self) -> f64 {
        if self.logical_height > 0.0 {
            self.logical_width / self.logical_height
        } else {
            1.0
        }
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (self.logical_width, self.logical_height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}
