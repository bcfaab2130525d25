//! Cursor offset relative to the window centre.
//!
//! [`CursorTracker`] records the latest pointer position as a signed offset
//! from the centre of the window *as it was when the tracker was created*.
//! The half dimensions are never refreshed on resize, so after the window
//! changes size the "centre" is stale. Animation tuning depends on that
//! behaviour, so it is kept.

use glam::DVec2;
use winit::dpi::PhysicalPosition;

/// Latest cursor offset from the startup window centre, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTracker {
    half_size: DVec2,
    offset: DVec2,
}

impl CursorTracker {
    /// Capture half of the window's logical size. The offset starts at zero,
    /// which the animation treats as "pointer never moved".
    #[must_use]
    pub fn new(window_width: f64, window_height: f64) -> Self {
        Self {
            half_size: DVec2::new(window_width / 2.0, window_height / 2.0),
            offset: DVec2::ZERO,
        }
    }

    /// Record a pointer move at client coordinates `(x, y)` in logical pixels.
    /// No clamping: positions outside the window give offsets beyond the
    /// half size.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.offset = DVec2::new(x, y) - self.half_size;
    }

    /// Forward a winit `CursorMoved` position, converting from physical to
    /// logical pixels first.
    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>, scale_factor: f64) {
        let logical = position.to_logical::<f64>(scale_factor);
        self.on_pointer_move(logical.x, logical.y);
        tracing::trace!(x = self.offset.x, y = self.offset.y, "cursor offset");
    }

    /// Current `(cx, cy)` offset.
    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    /// Half of the window size captured at construction.
    pub fn half_size(&self) -> DVec2 {
        self.half_size
    }
}
