use std::f32::consts::{FRAC_PI_2, TAU};

use crate::input::InputAction;
use bevy::{
    camera::Exposure,
    core_pipeline::tonemapping::Tonemapping,
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
    window::WindowResized,
};
use leafwing_input_manager::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, (orbit_camera, update_aspect_on_resize));
}

const CAMERA_START: Vec3 = Vec3::new(10.0, 6.0, 15.0);
const CAMERA_FOV_DEG: f32 = 45.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;
/// Linear exposure multiplier applied on top of the Blender-style baseline.
const EXPOSURE_SCALE: f32 = 0.9;

/// Auto-rotate speed in "three.js units": 2.0 is one revolution every 30 seconds.
const AUTO_ROTATE_SPEED: f32 = 2.0;
/// Radians of orbit per pixel of mouse drag.
const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;
/// Zoom factor per scroll line.
const ZOOM_PER_LINE: f32 = 0.95;
const ZOOM_PER_PIXEL: f32 = 0.998;
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 100.0;
/// Keep pitch away from the poles so `looking_at` never degenerates.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Spherical camera rig around a target point.
///
/// `yaw` is measured around +Y from +Z toward +X; `pitch` is elevation above the XZ plane.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl OrbitCamera {
    pub fn from_eye(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length().clamp(MIN_RADIUS, MAX_RADIUS);
        Self {
            target,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / offset.length().max(f32::EPSILON))
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-PITCH_LIMIT, PITCH_LIMIT),
            auto_rotate: true,
            auto_rotate_speed: AUTO_ROTATE_SPEED,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    /// Radians per second while auto-rotating.
    pub fn auto_rotate_rate(&self) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed
    }

    /// Advance auto-rotation by `dt` seconds. Positive speed orbits clockwise seen from above.
    pub fn tick(&mut self, dt: f32) {
        if self.auto_rotate {
            self.yaw = (self.yaw - self.auto_rotate_rate() * dt).rem_euclid(TAU);
        }
    }

    /// Apply a mouse drag in pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.yaw = (self.yaw - delta.x * DRAG_RADIANS_PER_PIXEL).rem_euclid(TAU);
        self.pitch = (self.pitch + delta.y * DRAG_RADIANS_PER_PIXEL).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Multiply the distance to the target, staying within the zoom limits.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.radius = (self.radius * factor).clamp(MIN_RADIUS, MAX_RADIUS);
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

/// Scaling exposure by `k` shifts ev100 by `log2(1 / k)`.
pub fn scene_exposure() -> Exposure {
    Exposure {
        ev100: Exposure::BLENDER.ev100 + (1.0 / EXPOSURE_SCALE).log2(),
    }
}

fn add_camera(mut commands: Commands) {
    let orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
    commands.spawn((
        Camera3d::default(),
        scene_exposure(),
        Tonemapping::AcesFitted,
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEG.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        orbit.transform(),
        orbit,
    ));
}

fn orbit_camera(
    mut camera_q: Query<(&mut OrbitCamera, &mut Transform)>,
    actions: Res<ActionState<InputAction>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    time: Res<Time>,
) {
    let Ok((mut orbit, mut transform)) = camera_q.single_mut() else {
        return;
    };

    if actions.just_pressed(&InputAction::ToggleAutoRotate) {
        orbit.auto_rotate = !orbit.auto_rotate;
        info!(auto_rotate = orbit.auto_rotate, "toggled camera auto-rotate");
    }

    // Dragging takes over from auto-rotation until the button is released.
    if actions.pressed(&InputAction::Orbit) {
        orbit.drag(motion.delta);
    } else {
        orbit.tick(time.delta_secs());
    }

    if scroll.delta.y != 0.0 {
        let per_unit = match scroll.unit {
            MouseScrollUnit::Line => ZOOM_PER_LINE,
            MouseScrollUnit::Pixel => ZOOM_PER_PIXEL,
        };
        orbit.zoom(per_unit.powf(scroll.delta.y));
    }

    transform.set_if_neq(orbit.transform());
}

/// Keep the projection's aspect ratio in step with the window.
fn update_aspect_on_resize(
    mut messages: MessageReader<WindowResized>,
    mut projection_q: Query<&mut Projection, With<OrbitCamera>>,
) {
    // Only the latest size matters when several resizes arrive in one frame.
    let Some(resized) = messages.read().last() else {
        return;
    };
    let Some(aspect) = aspect_ratio(resized.width, resized.height) else {
        debug!(width = resized.width, height = resized.height, "ignoring degenerate resize");
        return;
    };

    for mut projection in &mut projection_q {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = aspect;
        }
    }
    debug!(width = resized.width, height = resized.height, aspect, "window resized");
}

/// `width / height`, or `None` for a minimized/zero-sized window.
pub fn aspect_ratio(width: f32, height: f32) -> Option<f32> {
    (width > 0.0 && height > 0.0).then(|| width / height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_round_trips_through_spherical_coordinates() {
        let orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        assert!((orbit.radius - 19.0).abs() < 1.0e-4);
        assert!(orbit.eye().abs_diff_eq(CAMERA_START, 1.0e-4));
    }

    #[test]
    fn auto_rotate_completes_a_revolution_in_thirty_seconds() {
        let mut orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        let start = orbit.eye();

        for _ in 0..(30 * 60) {
            orbit.tick(1.0 / 60.0);
        }
        assert!(orbit.eye().abs_diff_eq(start, 1.0e-2));

        orbit.tick(7.5);
        assert!(!orbit.eye().abs_diff_eq(start, 1.0));
        assert!((orbit.eye().y - start.y).abs() < 1.0e-4);
    }

    #[test]
    fn disabled_auto_rotate_holds_still() {
        let mut orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        orbit.auto_rotate = false;
        let before = orbit.clone();
        orbit.tick(10.0);
        assert_eq!(orbit, before);
    }

    #[test]
    fn drag_clamps_pitch_short_of_the_pole() {
        let mut orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        orbit.drag(Vec2::new(0.0, 1.0e6));
        assert!((orbit.pitch - PITCH_LIMIT).abs() < 1.0e-6);
        orbit.drag(Vec2::new(0.0, -1.0e7));
        assert!((orbit.pitch + PITCH_LIMIT).abs() < 1.0e-6);
    }

    #[test]
    fn zoom_stays_within_limits() {
        let mut orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        orbit.zoom(1.0e-6);
        assert_eq!(orbit.radius, MIN_RADIUS);
        orbit.zoom(1.0e6);
        assert_eq!(orbit.radius, MAX_RADIUS);
        orbit.zoom(f32::NAN);
        assert_eq!(orbit.radius, MAX_RADIUS);
    }

    #[test]
    fn camera_looks_at_target() {
        let orbit = OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO);
        let transform = orbit.transform();
        let forward = transform.forward().as_vec3();
        let to_target = (orbit.target - transform.translation).normalize();
        assert!(forward.abs_diff_eq(to_target, 1.0e-5));
    }

    #[test]
    fn camera_spawns_with_scaled_exposure() {
        use bevy::ecs::system::RunSystemOnce;

        let mut world = World::new();
        world.run_system_once(add_camera).unwrap();

        let mut cameras = world.query_filtered::<(&Exposure, &Tonemapping), With<OrbitCamera>>();
        let (exposure, tonemapping) = cameras.single(&world).unwrap();
        assert_eq!(*tonemapping, Tonemapping::AcesFitted);

        // 0.9x the light of the baseline is a slightly higher ev100.
        let shift = exposure.ev100 - Exposure::BLENDER.ev100;
        assert!((shift - (1.0f32 / 0.9).log2()).abs() < 1.0e-6);
        assert!((exposure.exposure() / Exposure::BLENDER.exposure() - EXPOSURE_SCALE).abs() < 1.0e-4);
    }

    #[test]
    fn aspect_ratio_ignores_zero_sized_windows() {
        assert_eq!(aspect_ratio(1920.0, 1080.0), Some(1920.0 / 1080.0));
        assert_eq!(aspect_ratio(800.0, 0.0), None);
        assert_eq!(aspect_ratio(0.0, 600.0), None);
    }

    #[test]
    fn resize_message_updates_projection() {
        let mut app = App::new();
        app.add_message::<WindowResized>();
        app.add_systems(Update, update_aspect_on_resize);
        let camera = app
            .world_mut()
            .spawn((
                OrbitCamera::from_eye(CAMERA_START, Vec3::ZERO),
                Projection::Perspective(PerspectiveProjection::default()),
            ))
            .id();

        app.world_mut().write_message(WindowResized {
            window: Entity::PLACEHOLDER,
            width: 1600.0,
            height: 400.0,
        });
        app.update();

        let Projection::Perspective(perspective) = app.world().get::<Projection>(camera).unwrap()
        else {
            panic!("expected a perspective projection");
        };
        assert_eq!(perspective.aspect_ratio, 4.0);
    }
}
