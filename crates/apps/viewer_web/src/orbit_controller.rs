//! Orbit controller with inertia, damping, and smooth zoom.
//!
//! Drives the camera around the reconstruction: yaw/pitch orbit about a
//! target point, wheel zoom toward it, and pan in the view plane. All time
//! comes in through `update(dt)` so the controller stays deterministic.

use foundation::math::Vec3;
use gpu::view_proj;

/// Minimum camera distance from the orbit target (scene units).
const MIN_DISTANCE: f64 = 0.5;

/// Maximum camera distance from the orbit target (scene units).
const MAX_DISTANCE: f64 = 500.0;

/// Orbit sensitivity, radians per pixel of drag.
const ORBIT_SPEED: f64 = 0.005;

/// Pan sensitivity, fraction of distance per pixel of drag.
const PAN_SPEED: f64 = 0.002;

/// Damping factor for angular velocity decay (per second).
const ANGULAR_DAMPING: f64 = 4.0;

/// Angular velocity below which inertia stops (radians per second).
const ANGULAR_VELOCITY_THRESHOLD: f64 = 0.0005;

/// Zoom smoothing factor (higher = faster response).
const ZOOM_SMOOTHING: f64 = 8.0;

/// Pitch limits keep the camera off the poles.
const PITCH_LIMIT: f64 = 1.55;

const FOV_Y_RAD: f64 = 45.0 * std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    pub yaw_rad: f64,
    pub pitch_rad: f64,
    pub distance: f64,
    target_distance: f64,
    pub target: Vec3,
    yaw_velocity: f64,
    pitch_velocity: f64,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            yaw_rad: 0.6,
            pitch_rad: 0.3,
            distance: 10.0,
            target_distance: 10.0,
            target: Vec3::ZERO,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a drag delta in pixels and seed inertia from it.
    pub fn orbit(&mut self, delta_x_px: f64, delta_y_px: f64) {
        let dyaw = delta_x_px * ORBIT_SPEED;
        let dpitch = delta_y_px * ORBIT_SPEED;
        self.yaw_rad += dyaw;
        self.pitch_rad = (self.pitch_rad + dpitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        // Treat the drag as one frame's worth of motion at 60 Hz.
        self.yaw_velocity = dyaw * 60.0;
        self.pitch_velocity = dpitch * 60.0;
    }

    /// Shift the orbit target in the view plane.
    pub fn pan(&mut self, delta_x_px: f64, delta_y_px: f64) {
        let forward = (self.target - self.eye_position()).normalized();
        let right = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalized();
        let up = right.cross(forward);

        let scale = self.distance * PAN_SPEED;
        self.target =
            self.target + right * (-delta_x_px * scale) + up * (delta_y_px * scale);
    }

    /// Exponential wheel zoom toward the target.
    pub fn zoom(&mut self, wheel_delta_y: f64) {
        let factor = (wheel_delta_y * 0.0015).exp();
        self.target_distance = (self.target_distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Per-frame damping update: apply inertia, decay it, smooth the zoom.
    pub fn update(&mut self, dt: f64) {
        let dt = dt.clamp(0.0, 0.1);

        if self.yaw_velocity.abs() > 0.0 || self.pitch_velocity.abs() > 0.0 {
            self.yaw_rad += self.yaw_velocity * dt;
            self.pitch_rad = (self.pitch_rad + self.pitch_velocity * dt)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);

            let decay = (-ANGULAR_DAMPING * dt).exp();
            self.yaw_velocity *= decay;
            self.pitch_velocity *= decay;
            if self.yaw_velocity.hypot(self.pitch_velocity) < ANGULAR_VELOCITY_THRESHOLD {
                self.yaw_velocity = 0.0;
                self.pitch_velocity = 0.0;
            }
        }

        let zoom_alpha = 1.0 - (-ZOOM_SMOOTHING * dt).exp();
        self.distance += (self.target_distance - self.distance) * zoom_alpha;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn eye_position(&self) -> Vec3 {
        let dir = Vec3::new(
            self.pitch_rad.cos() * self.yaw_rad.cos(),
            self.pitch_rad.sin(),
            self.pitch_rad.cos() * self.yaw_rad.sin(),
        );
        self.target + dir * self.distance
    }

    pub fn view_proj(&self, canvas_width: f64, canvas_height: f64) -> [[f32; 4]; 4] {
        let aspect = if canvas_height <= 0.0 {
            1.0
        } else {
            (canvas_width / canvas_height).max(1e-6)
        };

        // Dynamic clipping planes for depth precision across zoom levels.
        let near = (self.distance * 0.01).max(0.01);
        let far = (self.distance * 20.0 + 100.0).max(near + 1.0);

        view_proj(
            self.eye_position(),
            self.target,
            Vec3::new(0.0, 1.0, 0.0),
            FOV_Y_RAD,
            aspect,
            near,
            far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::OrbitController;
    use foundation::math::Vec3;

    #[test]
    fn default_state_is_sane() {
        let c = OrbitController::new();
        assert!(c.distance > 0.0);
        assert_eq!(c.target, Vec3::ZERO);
        assert!(c.pitch_rad.abs() < 1.55);
    }

    #[test]
    fn drag_right_increases_yaw() {
        let mut c = OrbitController::new();
        let before = c.yaw_rad;
        c.orbit(10.0, 0.0);
        assert!(c.yaw_rad > before);
    }

    #[test]
    fn pitch_clamps_at_the_poles() {
        let mut c = OrbitController::new();
        c.orbit(0.0, 10_000.0);
        assert!(c.pitch_rad <= 1.55);
        c.orbit(0.0, -100_000.0);
        assert!(c.pitch_rad >= -1.55);
    }

    #[test]
    fn inertia_decays_to_rest() {
        let mut c = OrbitController::new();
        c.orbit(20.0, 0.0);
        let after_drag = c.yaw_rad;

        c.update(1.0 / 60.0);
        assert!(c.yaw_rad > after_drag, "inertia should keep the orbit moving");

        for _ in 0..600 {
            c.update(1.0 / 60.0);
        }
        let settled = c.yaw_rad;
        c.update(1.0 / 60.0);
        assert_eq!(c.yaw_rad, settled, "velocity should fully stop");
    }

    #[test]
    fn zoom_is_smoothed_and_clamped() {
        let mut c = OrbitController::new();
        let start = c.distance;
        c.zoom(-300.0);
        // Distance moves toward the target over updates, not instantly.
        assert_eq!(c.distance, start);
        c.update(1.0 / 60.0);
        assert!(c.distance < start);

        for _ in 0..100 {
            c.zoom(-10_000.0);
            c.update(0.1);
        }
        assert!(c.distance >= 0.5);
    }

    #[test]
    fn eye_orbits_at_the_configured_distance() {
        let mut c = OrbitController::new();
        c.orbit(123.0, -45.0);
        for _ in 0..100 {
            c.update(1.0 / 60.0);
        }
        let radius = (c.eye_position() - c.target).length();
        assert!((radius - c.distance).abs() < 1e-9);
    }

    #[test]
    fn pan_moves_the_target_in_the_view_plane() {
        let mut c = OrbitController::new();
        let before = c.target;
        c.pan(50.0, 0.0);
        let moved = c.target - before;
        assert!(moved.length() > 0.0);
        // Panning must not change the orbit radius.
        let radius = (c.eye_position() - c.target).length();
        assert!((radius - c.distance).abs() < 1e-9);
    }

    #[test]
    fn view_proj_centers_the_target() {
        let c = OrbitController::new();
        let vp = c.view_proj(1280.0, 720.0);
        let t = [0.0f32, 0.0, 0.0];
        let mut clip = [0.0f32; 4];
        for row in 0..4 {
            clip[row] = vp[0][row] * t[0] + vp[1][row] * t[1] + vp[2][row] * t[2] + vp[3][row];
        }
        assert!((clip[0] / clip[3]).abs() < 1e-5);
        assert!((clip[1] / clip[3]).abs() < 1e-5);
    }
}
