use glam::Vec3;

const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 600.0;
const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = 1.5;
/// Radians per pixel of drag
const ORBIT_SENSITIVITY: f32 = 0.008;

/// OrbitCamera circles a target point at a fixed distance.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    /// Angle above the ground plane
    pub pitch: f32,
    pub distance: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.8,
            pitch: 0.6,
            distance: 80.0,
        }
    }

    pub fn zoom_in(&mut self, factor: f32) {
        self.distance = (self.distance / factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn zoom_out(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Rotate by a mouse drag in pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + dy * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * cy, sp, cp * sy) * self.distance
    }

    /// Aim at `target` from far enough to see an object of size `extent`
    pub fn frame(&mut self, target: Vec3, extent: f32) {
        self.target = target;
        self.distance = (extent * 1.5).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_keeps_distance() {
        let mut camera = OrbitCamera::new();
        camera.target = Vec3::new(3.0, 1.0, -2.0);
        camera.orbit(120.0, -40.0);
        let d = camera.eye().distance(camera.target);
        assert!((d - camera.distance).abs() < 1e-3);
        assert!(camera.eye().y > camera.target.y);
    }

    #[test]
    fn test_pitch_and_zoom_clamp() {
        let mut camera = OrbitCamera::new();
        camera.orbit(0.0, 10_000.0);
        assert_eq!(camera.pitch, MAX_PITCH);
        camera.orbit(0.0, -10_000.0);
        assert_eq!(camera.pitch, MIN_PITCH);

        for _ in 0..100 {
            camera.zoom_in(2.0);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.frame(Vec3::ZERO, 1e6);
        assert_eq!(camera.distance, MAX_DISTANCE);
    }
}
