use glam::{Mat4, Vec2, Vec3};

use crate::scene::Scene;

const PICK_RAY_LENGTH: f32 = 1000.0;

/// Perspective camera used for pointer projection. The renderer runs
/// elsewhere; this only answers screen/world conversion questions.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov: f32,
    viewport: (f32, f32),
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3, fov: f32, width: f32, height: f32) -> Self {
        Self {
            position,
            rotation,
            fov,
            viewport: (width.max(1.0), height.max(1.0)),
        }
    }

    /// Builds the camera from the scene's camera object, falling back to
    /// a sensible vantage point when the scene declares none.
    pub fn from_scene(scene: &Scene, width: f32, height: f32) -> Self {
        let (position, rotation, fov) = scene
            .camera()
            .map(|camera| (camera.position, camera.rotation, camera.fov))
            .unwrap_or((Vec3::new(0.0, 2.0, 6.0), Vec3::ZERO, 60.0));
        Self::new(position, rotation, fov, width, height)
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width.max(1.0), height.max(1.0));
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let rotation = Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians());
        let forward = (rotation * Vec3::new(0.0, 0.0, -1.0).extend(0.0)).truncate();
        let right = (rotation * Vec3::X.extend(0.0)).truncate();
        let up = (rotation * Vec3::Y.extend(0.0)).truncate();
        (forward, right, up)
    }

    fn ray_direction(&self, screen: Vec2) -> Vec3 {
        let (width, height) = self.viewport;
        let aspect = width / height;
        let half_v = (self.fov.to_radians() * 0.5).tan();
        let half_h = half_v * aspect;

        // pixel coordinates, origin top-left
        let ndc_x = screen.x / width * 2.0 - 1.0;
        let ndc_y = 1.0 - screen.y / height * 2.0;

        let (forward, right, up) = self.basis();
        (forward + right * (ndc_x * half_h) + up * (ndc_y * half_v)).normalize()
    }

    /// Unprojects a pixel position to the world point `depth` units along
    /// the pointer ray.
    pub fn screen_to_world(&self, screen: Vec2, depth: f32) -> Vec3 {
        self.position + self.ray_direction(screen) * depth
    }

    /// Projects a world point back to pixel coordinates. Points at or
    /// behind the camera plane have no screen position.
    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let (forward, right, up) = self.basis();
        let offset = world - self.position;
        let depth = offset.dot(forward);
        if depth <= 1e-4 {
            return None;
        }

        let (width, height) = self.viewport;
        let aspect = width / height;
        let half_v = (self.fov.to_radians() * 0.5).tan();
        let half_h = half_v * aspect;

        let ndc_x = offset.dot(right) / (depth * half_h);
        let ndc_y = offset.dot(up) / (depth * half_v);
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * width,
            (1.0 - ndc_y) * 0.5 * height,
        ))
    }

    /// Long picking segment through a pixel position.
    pub fn pick_ray(&self, screen: Vec2) -> (Vec3, Vec3) {
        let dir = self.ray_direction(screen);
        (self.position, self.position + dir * PICK_RAY_LENGTH)
    }

    /// Distance from the camera to a world point.
    pub fn distance_to(&self, world: Vec3) -> f32 {
        self.position.distance(world)
    }
}
