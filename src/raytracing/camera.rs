use crate::raytracing::error::GeometryError;

use super::math::{Ray, Vec3};

/// Fixed-position camera. The projection ties world XY directly to the pixel
/// grid: every ray aims at `(x, y, 0)` on the z = 0 plane.
pub struct Camera {
    pub position: Vec3,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    /// Create a normalized ray from the camera toward world `(x, y, 0)`.
    pub fn ray_through(&self, x: f64, y: f64) -> Result<Ray, GeometryError> {
        let direction = Vec3::direction(self.position, Vec3::new(x, y, 0.0))?;
        Ok(Ray {
            origin: self.position,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn ray_through_aims_at_the_grid_point() {
        let camera = Camera::new(Vec3::new(400.0, 300.0, -1000.0));
        let ray = camera.ray_through(400.0, 300.0).unwrap();
        assert_eq!(ray.origin, camera.position);
        assert!((ray.direction.len() - 1.0).abs() < EPSILON);
        // straight ahead: the target sits exactly 1000 units along the ray
        assert!(ray.at(1000.0).distance(Vec3::new(400.0, 300.0, 0.0)) < EPSILON);
    }

    #[test]
    fn ray_through_camera_position_is_degenerate() {
        let camera = Camera::new(Vec3::new(10.0, 20.0, 0.0));
        assert!(camera.ray_through(10.0, 20.0).is_err());
    }
}
