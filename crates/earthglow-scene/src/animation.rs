//! Per-frame animation of the scene from elapsed time and cursor offset.
//!
//! One call to [`animate`] runs three steps in order:
//!
//! 1. base spin: Y rotations as linear functions of time;
//! 2. cursor override: only when the cursor's horizontal offset is non-zero,
//!    the starfield, moon and planet3 take cursor-driven rotations;
//! 3. easing: the sphere, moon, planet1/2 and atmosphere move a fixed
//!    fraction toward a cursor-derived target.
//!
//! Step 3 is applied once per call with constant factors, so its speed
//! depends on frame rate. Later steps read values earlier steps wrote in the
//! same call, and the moon eases using the *sphere's* rotation. Both are
//! part of the look and are kept as is.

use glam::DVec2;

use crate::scene::Scene;

const SPHERE_SPIN: f64 = 0.7;
const MOON_SPIN: f64 = -1.0;
const PLANET1_SPIN: f64 = 0.3;
const PLANET2_SPIN: f64 = -0.5;
const PLANET3_SPIN: f64 = 2.0;
const STARFIELD_SPIN: f64 = -0.1;

/// Starfield rotation per (pixel · second) of cursor offset.
const STARFIELD_CURSOR_RATE: f64 = 0.00007;
/// Moon / planet3 rotation per pixel of cursor offset.
const BODY_CURSOR_TILT: f64 = 0.0009;

const TARGET_X_PER_PIXEL: f64 = 0.007;
const TARGET_Y_PER_PIXEL: f64 = 0.0001;

const EASE_YAW: f64 = 0.5;
const EASE_PITCH: f64 = 0.2;
const EASE_DEPTH: f64 = -0.2;
const PLANET_DEPTH_GAIN: f64 = 7.0;

/// Inputs to one animation step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Cursor offset from the startup window centre; `(0, 0)` until the
    /// pointer first moves.
    pub cursor: DVec2,
}

impl FrameContext {
    pub fn new(elapsed: f64, cursor: DVec2) -> Self {
        Self { elapsed, cursor }
    }

    /// Easing target `(x, y)` derived from the cursor.
    pub fn target(&self) -> DVec2 {
        DVec2::new(
            self.cursor.x * TARGET_X_PER_PIXEL,
            self.cursor.y * TARGET_Y_PER_PIXEL,
        )
    }

    /// Whether the cursor override applies. An offset of exactly zero means
    /// the pointer never moved (or sits on the centre column).
    pub fn cursor_active(&self) -> bool {
        self.cursor.x != 0.0
    }
}

/// Advance every transform in `scene` for this frame.
pub fn animate(scene: &mut Scene, frame: &FrameContext) {
    apply_base_spin(scene, frame.elapsed);
    if frame.cursor_active() {
        apply_cursor_override(scene, frame);
    }
    ease_toward_target(scene, frame.target());
}

/// Step 1.
pub fn apply_base_spin(scene: &mut Scene, t: f64) {
    scene.sphere.transform.rotation.y = SPHERE_SPIN * t;
    scene.moon.transform.rotation.y = MOON_SPIN * t;
    scene.planet1.transform.rotation.y = PLANET1_SPIN * t;
    scene.planet2.transform.rotation.y = PLANET2_SPIN * t;
    scene.planet3.transform.rotation.y = PLANET3_SPIN * t;
    scene.starfield.transform.rotation.y = STARFIELD_SPIN * t;
}

/// Step 2.
fn apply_cursor_override(scene: &mut Scene, frame: &FrameContext) {
    let DVec2 { x: cx, y: cy } = frame.cursor;
    let t = frame.elapsed;

    let stars = &mut scene.starfield.transform.rotation;
    stars.y = cy * t * STARFIELD_CURSOR_RATE;
    stars.x = cx * t * STARFIELD_CURSOR_RATE;
    stars.z = cy * t * STARFIELD_CURSOR_RATE;

    for rotation in [
        &mut scene.moon.transform.rotation,
        &mut scene.planet3.transform.rotation,
    ] {
        rotation.y = cy * BODY_CURSOR_TILT;
        rotation.x = cx * BODY_CURSOR_TILT;
        rotation.z = cy * BODY_CURSOR_TILT;
    }
}

/// Step 3. Statement order matters: each line sees the previous line's write.
fn ease_toward_target(scene: &mut Scene, target: DVec2) {
    let sphere = &mut scene.sphere.transform;
    sphere.rotation.y += EASE_YAW * (target.x - sphere.rotation.y);
    sphere.rotation.x += EASE_PITCH * (target.y - sphere.rotation.x);
    sphere.position.z += EASE_DEPTH * (target.y - sphere.rotation.x);

    let sphere_yaw = sphere.rotation.y;
    let sphere_pitch = sphere.rotation.x;

    let moon = &mut scene.moon.transform;
    moon.rotation.y += EASE_YAW * (target.x - sphere_yaw);
    moon.rotation.x += EASE_PITCH * (target.y - sphere_pitch);
    moon.position.z += EASE_DEPTH * (target.y - sphere_pitch);

    scene.planet1.transform.position.z += PLANET_DEPTH_GAIN * (target.y - sphere_pitch);
    scene.planet2.transform.position.z += -PLANET_DEPTH_GAIN * (target.y - sphere_pitch);

    let atmosphere = &mut scene.atmosphere.transform;
    atmosphere.rotation.x += EASE_PITCH * (target.y - atmosphere.rotation.x);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;
    use crate::transform::Transform;

    const EPS: f64 = 1e-12;

    fn scene() -> Scene {
        SceneBuilder::new().with_seed(Some(3)).build(4.0 / 3.0).0
    }

    fn transforms(scene: &Scene) -> Vec<Transform> {
        let mut all: Vec<Transform> = scene.bodies().iter().map(|b| b.transform).collect();
        all.push(scene.starfield.transform);
        all
    }

    #[test]
    fn test_time_zero_at_rest_keeps_initial_state() {
        let mut scene = scene();
        let before = transforms(&scene);
        animate(&mut scene, &FrameContext::default());
        assert_eq!(transforms(&scene), before);
    }

    #[test]
    fn test_base_spin_formulas() {
        let mut scene = scene();
        let t = 2.5;
        apply_base_spin(&mut scene, t);
        assert!((scene.sphere.transform.rotation.y - 0.7 * t).abs() < EPS);
        assert!((scene.moon.transform.rotation.y + t).abs() < EPS);
        assert!((scene.planet1.transform.rotation.y - 0.3 * t).abs() < EPS);
        assert!((scene.planet2.transform.rotation.y + 0.5 * t).abs() < EPS);
        assert!((scene.planet3.transform.rotation.y - 2.0 * t).abs() < EPS);
        assert!((scene.starfield.transform.rotation.y + 0.1 * t).abs() < EPS);
    }

    #[test]
    fn test_untouched_cursor_follows_linear_spin() {
        let mut scene = scene();
        for &t in &[0.5, 1.0, 7.25, 120.0] {
            animate(&mut scene, &FrameContext::new(t, DVec2::ZERO));
            assert!((scene.planet1.transform.rotation.y - 0.3 * t).abs() < EPS);
            assert!((scene.planet2.transform.rotation.y + 0.5 * t).abs() < EPS);
            assert!((scene.planet3.transform.rotation.y - 2.0 * t).abs() < 1e-9);
            assert!((scene.starfield.transform.rotation.y + 0.1 * t).abs() < EPS);
            // Easing toward a zero target halves the sphere's spin, and the
            // moon eases by the sphere's yaw.
            assert!((scene.sphere.transform.rotation.y - 0.35 * t).abs() < 1e-9);
            assert!((scene.moon.transform.rotation.y + 1.175 * t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cursor_override_sets_starfield_rotation() {
        let mut scene = scene();
        let (cx, cy, t) = (120.0, -40.0, 3.0);
        animate(&mut scene, &FrameContext::new(t, DVec2::new(cx, cy)));
        let stars = scene.starfield.transform.rotation;
        assert!((stars.x - cx * t * 0.00007).abs() < EPS);
        assert!((stars.y - cy * t * 0.00007).abs() < EPS);
        assert!((stars.z - cy * t * 0.00007).abs() < EPS);
        let planet3 = scene.planet3.transform.rotation;
        assert!((planet3.x - cx * 0.0009).abs() < EPS);
        assert!((planet3.y - cy * 0.0009).abs() < EPS);
        assert!((planet3.z - cy * 0.0009).abs() < EPS);
    }

    #[test]
    fn test_zero_horizontal_offset_disables_override() {
        let mut scene = scene();
        let t = 4.0;
        animate(&mut scene, &FrameContext::new(t, DVec2::new(0.0, 250.0)));
        let stars = scene.starfield.transform.rotation;
        assert_eq!(stars.x, 0.0);
        assert_eq!(stars.z, 0.0);
        assert!((stars.y + 0.1 * t).abs() < EPS);
        assert!((scene.planet3.transform.rotation.y - 2.0 * t).abs() < EPS);
    }

    #[test]
    fn test_override_leaves_planet1_planet2_spin() {
        let mut scene = scene();
        let t = 1.5;
        animate(&mut scene, &FrameContext::new(t, DVec2::new(-300.0, 90.0)));
        assert!((scene.planet1.transform.rotation.y - 0.3 * t).abs() < EPS);
        assert!((scene.planet2.transform.rotation.y + 0.5 * t).abs() < EPS);
    }

    #[test]
    fn test_moon_eases_by_sphere_yaw() {
        let mut scene = scene();
        let (t, cx, cy) = (2.0, 50.0, 10.0);
        animate(&mut scene, &FrameContext::new(t, DVec2::new(cx, cy)));
        let target_x = cx * 0.007;
        let sphere_yaw = 0.7 * t + 0.5 * (target_x - 0.7 * t);
        assert!((scene.sphere.transform.rotation.y - sphere_yaw).abs() < EPS);
        let moon_yaw = cy * 0.0009 + 0.5 * (target_x - sphere_yaw);
        assert!((scene.moon.transform.rotation.y - moon_yaw).abs() < EPS);
    }

    #[test]
    fn test_pitch_converges_monotonically() {
        let mut scene = scene();
        let frame = FrameContext::new(10.0, DVec2::new(35.0, 400.0));
        let target_y = frame.target().y;

        let mut sphere_gap = (target_y - scene.sphere.transform.rotation.x).abs();
        let mut shell_gap = (target_y - scene.atmosphere.transform.rotation.x).abs();
        for _ in 0..40 {
            animate(&mut scene, &frame);
            let next_sphere = (target_y - scene.sphere.transform.rotation.x).abs();
            let next_shell = (target_y - scene.atmosphere.transform.rotation.x).abs();
            assert!(next_sphere < sphere_gap);
            assert!(next_shell < shell_gap);
            sphere_gap = next_sphere;
            shell_gap = next_shell;
        }
        assert!(sphere_gap < target_y * 1e-3);
    }

    #[test]
    fn test_repeated_frames_keep_moving_depth() {
        let mut scene = scene();
        let frame = FrameContext::new(1.0, DVec2::new(10.0, 500.0));
        animate(&mut scene, &frame);
        let first = scene.sphere.transform.position.z;
        animate(&mut scene, &frame);
        let second = scene.sphere.transform.position.z;
        assert!(first != 0.0);
        assert!(second != first);
        // Increments shrink as the pitch closes in on the target.
        assert!((second - first).abs() < first.abs());
    }

    #[test]
    fn test_planet_depths_move_in_opposite_directions() {
        let mut scene = scene();
        let z1 = scene.planet1.transform.position.z;
        let z2 = scene.planet2.transform.position.z;
        animate(&mut scene, &FrameContext::new(0.0, DVec2::new(0.0, 200.0)));
        let d1 = scene.planet1.transform.position.z - z1;
        let d2 = scene.planet2.transform.position.z - z2;
        assert!(d1 > 0.0);
        assert!((d1 + d2).abs() < EPS);
        assert_eq!(scene.planet3.transform.position.z, -60.0);
    }

    #[test]
    fn test_target_scaling() {
        let frame = FrameContext::new(0.0, DVec2::new(100.0, -100.0));
        assert!((frame.target().x - 0.7).abs() < EPS);
        assert!((frame.target().y + 0.01).abs() < EPS);
        assert!(frame.cursor_active());
        assert!(!FrameContext::default().cursor_active());
    }
}
