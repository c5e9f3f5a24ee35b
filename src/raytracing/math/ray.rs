use crate::raytracing::error::GeometryError;

use super::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(self: &Self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Cross product of two rays sharing an origin. The result keeps this ray's
    /// origin and carries the normalized cross of the two directions, so it is
    /// orthogonal to both inputs. Parallel directions are degenerate.
    pub fn cross(self: &Self, other: &Ray) -> Result<Ray, GeometryError> {
        let direction = self.direction.cross(other.direction).try_normalize()?;
        Ok(Ray {
            origin: self.origin,
            direction,
        })
    }

    /// Angle between the two ray directions in radians, in [0, pi].
    pub fn angle_to(self: &Self, other: &Ray) -> Result<f64, GeometryError> {
        let mag1 = self.direction.len();
        let mag2 = other.direction.len();
        if mag1 == 0.0 || mag2 == 0.0 {
            return Err(GeometryError::DegenerateVector);
        }
        // keep rounding noise from pushing acos out of its domain
        let cos = (self.direction.dot(other.direction) / (mag1 * mag2)).clamp(-1.0, 1.0);
        Ok(cos.acos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn at_walks_along_the_direction() {
        let ray = Ray {
            origin: Vec3::new(1.0, 0.0, 0.0),
            direction: Vec3::new(0.0, 2.0, 0.0),
        };
        assert_eq!(ray.at(1.5), Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn cross_is_orthogonal_to_both_rays() {
        let r1 = Ray {
            origin: Vec3::new(5.0, 5.0, 5.0),
            direction: Vec3::new(1.0, 2.0, 0.5),
        };
        let r2 = Ray {
            origin: Vec3::new(5.0, 5.0, 5.0),
            direction: Vec3::new(-1.0, 0.0, 3.0),
        };
        let crossed = r1.cross(&r2).unwrap();
        assert!(crossed.direction.dot(r1.direction).abs() < EPSILON);
        assert!(crossed.direction.dot(r2.direction).abs() < EPSILON);
        assert_eq!(crossed.origin, r1.origin);
        assert!((crossed.direction.len() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn cross_of_parallel_rays_is_degenerate() {
        let r1 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(0.0, 1.0, 0.0),
        };
        let r2 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(0.0, 3.0, 0.0),
        };
        assert_eq!(r1.cross(&r2), Err(GeometryError::DegenerateVector));
    }

    #[test]
    fn angle_between_perpendicular_rays_is_half_pi() {
        let r1 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(1.0, 0.0, 0.0),
        };
        let r2 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(0.0, 1.0, 0.0),
        };
        let angle = r1.angle_to(&r2).unwrap();
        assert!((angle - PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn angle_between_opposite_rays_is_pi() {
        let r1 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(2.0, 0.0, 0.0),
        };
        let r2 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(-5.0, 0.0, 0.0),
        };
        let angle = r1.angle_to(&r2).unwrap();
        assert!((angle - PI).abs() < EPSILON);
    }

    #[test]
    fn angle_of_zero_direction_is_degenerate() {
        let r1 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::zero(),
        };
        let r2 = Ray {
            origin: Vec3::zero(),
            direction: Vec3::new(1.0, 0.0, 0.0),
        };
        assert_eq!(r1.angle_to(&r2), Err(GeometryError::DegenerateVector));
    }
}
