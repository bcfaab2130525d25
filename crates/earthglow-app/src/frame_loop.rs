//! Per-refresh frame driver.
//!
//! There is no fixed timestep: each display refresh runs exactly one
//! animation step from the absolute elapsed time, draws once, and asks for
//! the next refresh. The clock, the renderer and the refresh trigger are
//! traits so the loop can be driven without a window or GPU.

use std::fmt::Display;
use std::time::Instant;

use earthglow_input::CursorTracker;
use earthglow_scene::{FrameContext, PerspectiveCamera, Scene, animate};
use tracing::warn;

/// Source of elapsed seconds since the animation started.
pub trait Clock {
    fn elapsed(&self) -> f64;
}

/// Wall clock, monotonic from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand, for tests and deterministic playback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: f64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f64 {
        self.now
    }
}

/// Schedules the next frame; on a window this is `request_redraw`.
pub trait RefreshTrigger {
    fn request_refresh(&mut self);
}

/// Draws the animated scene.
pub trait FrameRenderer {
    type Error: Display;

    fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), Self::Error>;
}

/// Drives animation and rendering once per refresh.
#[derive(Debug)]
pub struct FrameLoop<C: Clock> {
    clock: C,
    frame_count: u64,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            frame_count: 0,
        }
    }

    /// Run one frame: sample the clock and cursor, animate, draw, then
    /// request the next refresh. The refresh is requested even when drawing
    /// fails, so a transient surface error only costs one frame.
    pub fn frame<R, T>(
        &mut self,
        scene: &mut Scene,
        camera: &PerspectiveCamera,
        cursor: &CursorTracker,
        renderer: &mut R,
        trigger: &mut T,
    ) -> Result<FrameContext, R::Error>
    where
        R: FrameRenderer,
        T: RefreshTrigger,
    {
        let context = FrameContext::new(self.clock.elapsed(), cursor.offset());
        animate(scene, &context);

        let result = renderer.render_frame(scene, camera);
        if let Err(err) = &result {
            warn!(frame = self.frame_count, "Frame render failed: {err}");
        }

        trigger.request_refresh();
        self.frame_count += 1;
        result.map(|()| context)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earthglow_scene::SceneBuilder;

    #[derive(Default)]
    struct RecordingRenderer {
        sphere_yaws: Vec<f64>,
        fail: bool,
    }

    impl FrameRenderer for RecordingRenderer {
        type Error = String;

        fn render_frame(
            &mut self,
            scene: &Scene,
            _camera: &PerspectiveCamera,
        ) -> Result<(), String> {
            self.sphere_yaws.push(scene.sphere.transform.rotation.y);
            if self.fail {
                Err("surface lost".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct CountingTrigger {
        requests: u32,
    }

    impl RefreshTrigger for CountingTrigger {
        fn request_refresh(&mut self) {
            self.requests += 1;
        }
    }

    fn scene() -> (Scene, PerspectiveCamera) {
        SceneBuilder::new().with_seed(Some(7)).build(16.0 / 9.0)
    }

    #[test]
    fn test_frame_animates_before_rendering() {
        let (mut scene, camera) = scene();
        let cursor = CursorTracker::new(800.0, 600.0);
        let mut renderer = RecordingRenderer::default();
        let mut trigger = CountingTrigger::default();
        let mut frame_loop = FrameLoop::new(ManualClock::new(2.0));

        let context = frame_loop
            .frame(&mut scene, &camera, &cursor, &mut renderer, &mut trigger)
            .unwrap();

        assert_eq!(context.elapsed, 2.0);
        assert_eq!(renderer.sphere_yaws.len(), 1);
        // With the cursor untouched the renderer sees this frame's rotation.
        assert_eq!(renderer.sphere_yaws[0], scene.sphere.transform.rotation.y);
        assert!(renderer.sphere_yaws[0] != 0.0);
    }

    #[test]
    fn test_frame_requests_refresh_every_time() {
        let (mut scene, camera) = scene();
        let cursor = CursorTracker::new(800.0, 600.0);
        let mut renderer = RecordingRenderer::default();
        let mut trigger = CountingTrigger::default();
        let mut frame_loop = FrameLoop::new(ManualClock::default());

        for _ in 0..5 {
            frame_loop.clock_mut().advance(1.0 / 60.0);
            frame_loop
                .frame(&mut scene, &camera, &cursor, &mut renderer, &mut trigger)
                .unwrap();
        }
        assert_eq!(trigger.requests, 5);
        assert_eq!(frame_loop.frame_count(), 5);
    }

    #[test]
    fn test_render_error_still_requests_refresh() {
        let (mut scene, camera) = scene();
        let cursor = CursorTracker::new(800.0, 600.0);
        let mut renderer = RecordingRenderer {
            fail: true,
            ..Default::default()
        };
        let mut trigger = CountingTrigger::default();
        let mut frame_loop = FrameLoop::new(ManualClock::new(0.5));

        let result = frame_loop.frame(&mut scene, &camera, &cursor, &mut renderer, &mut trigger);
        assert_eq!(result.unwrap_err(), "surface lost");
        assert_eq!(trigger.requests, 1);
        assert_eq!(frame_loop.frame_count(), 1);
    }

    #[test]
    fn test_frame_passes_cursor_offset() {
        let (mut scene, camera) = scene();
        let mut cursor = CursorTracker::new(800.0, 600.0);
        cursor.on_pointer_move(500.0, 250.0);
        let mut renderer = RecordingRenderer::default();
        let mut trigger = CountingTrigger::default();
        let mut frame_loop = FrameLoop::new(ManualClock::new(1.0));

        let context = frame_loop
            .frame(&mut scene, &camera, &cursor, &mut renderer, &mut trigger)
            .unwrap();
        assert_eq!(context.cursor, glam::DVec2::new(100.0, -50.0));
        assert!(context.cursor_active());
        // Starfield pitch follows cx * t * 0.00007.
        let expected = 100.0 * 1.0 * 0.00007;
        assert!((scene.starfield.transform.rotation.x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
        assert!(a >= 0.0);
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(1.0);
        clock.advance(0.5);
        assert_eq!(clock.elapsed(), 1.5);
        clock.set(0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }
}
