use std::vec::Vec;

use rayon::prelude::*;

use crate::raytracing::error::{GeometryError, SceneError};

use super::camera::Camera;
use super::math::{Ray, Vec3};

const PLANE_FACING_EPSILON: f64 = 1e-6;
const STRIPE_PERIOD: i64 = 10;
const MAX_LIT_ANGLE: f64 = 1.57;
const AMBIENT_SCALE: f64 = 0.8;
/// Minimal fill light: shaded surfaces never go fully black.
pub const SHADING_FLOOR: f64 = 0.036;

/// Both crossing points of a ray through a shape, nearest first.
/// Planes report the same point twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point0: Vec3,
    pub point1: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stripe {
    pub color: Vec3,
    pub width: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub color: Vec3,
    pub x_stripe: Option<Stripe>,
    pub y_stripe: Option<Stripe>,
    pub reflectivity: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, color: Vec3) -> Result<Sphere, SceneError> {
        if radius <= 0.0 {
            return Err(SceneError::NonPositiveRadius(radius));
        }
        Ok(Sphere {
            center,
            radius,
            color,
            x_stripe: None,
            y_stripe: None,
            reflectivity: 0.0,
        })
    }

    pub fn with_x_stripe(mut self, color: Vec3, width: i32) -> Sphere {
        self.x_stripe = Some(Stripe { color, width });
        self
    }

    pub fn with_y_stripe(mut self, color: Vec3, width: i32) -> Sphere {
        self.y_stripe = Some(Stripe { color, width });
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: f64) -> Sphere {
        self.reflectivity = reflectivity;
        self
    }

    // https://www.scratchapixel.com/lessons/3d-basic-rendering/minimal-ray-tracer-rendering-simple-shapes/ray-sphere-intersection
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let l = self.center - ray.origin;
        let tca = l.dot(ray.direction);
        // center behind the ray origin along this direction
        if tca < 0.0 {
            return None;
        }

        let d_squared = l.dot(l) - tca * tca;
        if d_squared < 0.0 || d_squared.sqrt() > self.radius {
            return None;
        }
        let thc = (self.radius * self.radius - d_squared).sqrt();

        let t0 = tca - thc;
        let t1 = tca + thc;
        Some(Intersection {
            point0: ray.at(t0),
            point1: ray.at(t1),
        })
    }

    /// Base surface color from the stripe rule: an x stripe band wins over a
    /// y stripe band, otherwise the flat color.
    pub fn surface_color(&self, point: Vec3) -> Vec3 {
        if let Some(stripe) = &self.x_stripe {
            if stripe_band(point.x) <= stripe.width as i64 {
                return stripe.color;
            }
        }
        if let Some(stripe) = &self.y_stripe {
            if stripe_band(point.y) <= stripe.width as i64 {
                return stripe.color;
            }
        }
        self.color
    }

    fn color_at(&self, point: Vec3, camera: Vec3, scene: &Scene, reflect: bool) -> Vec3 {
        let color = self.surface_color(point);
        if !reflect || self.reflectivity == 0.0 {
            return color;
        }

        // single mirror bounce: reflect the viewing direction about the surface
        // normal and take the color of the nearest object it strikes
        let incoming = match Vec3::direction(camera, point) {
            Ok(direction) => direction,
            Err(GeometryError::DegenerateVector) => return color,
        };
        let normal = match self.normal_at(point) {
            Ok(normal) => normal,
            Err(GeometryError::DegenerateVector) => return color,
        };
        let bounce = Ray {
            origin: camera,
            direction: incoming.reflect(normal.direction),
        };

        let mut nearest = f64::INFINITY;
        let mut target: Option<(&Shape, Vec3)> = None;
        for shape in &scene.objects {
            if shape.is_sphere(self) {
                continue;
            }
            if let Some(hit) = shape.intersect(&bounce) {
                let distance = hit.point0.distance(bounce.origin);
                if distance < nearest {
                    nearest = distance;
                    target = Some((shape, hit.point0));
                }
            }
        }

        match target {
            // the bounce target is shaded without a further bounce of its own
            Some((shape, hit_point)) => shape.color_at_inner(hit_point, camera, scene, false),
            None => Vec3::zero(),
        }
    }

    /// Surface normal at `point`, directed toward the center. The reflection
    /// formula is invariant under flipping the normal, so the inward
    /// orientation stays consistent with `Vec3::reflect`.
    pub fn normal_at(&self, point: Vec3) -> Result<Ray, GeometryError> {
        Ok(Ray {
            origin: point,
            direction: Vec3::direction(point, self.center)?,
        })
    }

    /// Identity: center and radius only, colors and stripes are cosmetic.
    pub fn same_as(&self, other: &Sphere) -> bool {
        self.center == other.center && self.radius == other.radius
    }
}

fn stripe_band(coordinate: f64) -> i64 {
    (coordinate.floor() as i64).rem_euclid(STRIPE_PERIOD)
}

/// One-sided infinite plane spanned by three corner points. The corners only
/// derive the surface normal, hits are not clipped against them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanePatch {
    pub corner_a: Vec3,
    pub corner_b: Vec3,
    pub corner_c: Vec3,
    pub color: Vec3,
    normal: Ray,
}

impl PlanePatch {
    pub fn new(
        corner_a: Vec3,
        corner_b: Vec3,
        corner_c: Vec3,
        color: Vec3,
    ) -> Result<PlanePatch, SceneError> {
        let edge1 = Ray {
            origin: corner_a,
            direction: corner_a - corner_b,
        };
        let edge2 = Ray {
            origin: corner_a,
            direction: corner_a - corner_c,
        };
        let normal = edge1
            .cross(&edge2)
            .map_err(|_| SceneError::DegeneratePlane)?;
        Ok(PlanePatch {
            corner_a,
            corner_b,
            corner_c,
            color,
            normal,
        })
    }

    // https://www.scratchapixel.com/lessons/3d-basic-rendering/minimal-ray-tracer-rendering-simple-shapes/ray-plane-and-ray-disk-intersection
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        let denom = self.normal.direction.dot(ray.direction);
        // one-sided: rejects back-facing and grazing rays, not just parallel ones
        if denom < PLANE_FACING_EPSILON {
            return None;
        }

        let t = (self.normal.origin - ray.origin).dot(self.normal.direction) / denom;
        if t < 0.0 {
            return None;
        }
        let point = ray.at(t);
        Some(Intersection {
            point0: point,
            point1: point,
        })
    }

    /// The precomputed plane normal, relocated to `point`.
    pub fn normal_at(&self, point: Vec3) -> Ray {
        Ray {
            origin: point,
            direction: self.normal.direction,
        }
    }

    pub fn same_as(&self, other: &PlanePatch) -> bool {
        self.corner_a == other.corner_a
            && self.corner_b == other.corner_b
            && self.corner_c == other.corner_c
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightModel {
    /// Camera-distance gradient: full color at the camera-facing apex,
    /// darkening toward the silhouette.
    Ambient,
    /// Angle-to-light shading with a hard shadow test.
    PointLight,
    /// Light-distance falloff, black at and beyond `max_distance`.
    Falloff { max_distance: f64 },
}

/// Decorator that shades the wrapped shape with a lighting model. Intersection
/// and normal queries pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Lit {
    pub inner: Box<Shape>,
    pub light: Vec3,
    pub model: LightModel,
}

impl Lit {
    fn color_at(&self, point: Vec3, camera: Vec3, scene: &Scene, reflect: bool) -> Vec3 {
        let base = self.inner.color_at_inner(point, camera, scene, reflect);
        let adjust = match self.model {
            LightModel::Ambient => match self.inner.bounding_sphere() {
                Some((center, radius)) => {
                    let nearest_to_camera = center.distance(camera) - radius;
                    let point_distance = point.distance(camera);
                    (1.0 - (point_distance - nearest_to_camera) / radius) * AMBIENT_SCALE
                }
                // the gradient needs a bounding sphere; a bare plane stays unshaded
                None => return base,
            },
            LightModel::PointLight => self.point_light_adjust(point, scene),
            LightModel::Falloff { max_distance } => {
                let distance = point.distance(self.light).min(max_distance);
                (max_distance - distance) / max_distance
            }
        };
        base * adjust
    }

    fn point_light_adjust(&self, point: Vec3, scene: &Scene) -> f64 {
        let adjust = match self.inner.normal_at(point) {
            Ok(normal) => {
                let toward_point = Ray {
                    origin: self.light,
                    direction: point - self.light,
                };
                match normal.angle_to(&toward_point) {
                    Ok(angle) => 1.0 - angle / MAX_LIT_ANGLE,
                    Err(GeometryError::DegenerateVector) => SHADING_FLOOR,
                }
            }
            Err(GeometryError::DegenerateVector) => SHADING_FLOOR,
        };
        if adjust < SHADING_FLOOR || scene.in_shadow(point, self.light) {
            SHADING_FLOOR
        } else {
            adjust
        }
    }
}

/// Every renderable object in a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Plane(PlanePatch),
    Lit(Lit),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray),
            Shape::Plane(plane) => plane.intersect(ray),
            Shape::Lit(lit) => lit.inner.intersect(ray),
        }
    }

    pub fn normal_at(&self, point: Vec3) -> Result<Ray, GeometryError> {
        match self {
            Shape::Sphere(sphere) => sphere.normal_at(point),
            Shape::Plane(plane) => Ok(plane.normal_at(point)),
            Shape::Lit(lit) => lit.inner.normal_at(point),
        }
    }

    /// Shaded color at `point` as seen from `camera`, including a single
    /// mirror bounce for reflective spheres.
    pub fn color_at(&self, point: Vec3, camera: Vec3, scene: &Scene) -> Vec3 {
        self.color_at_inner(point, camera, scene, true)
    }

    fn color_at_inner(&self, point: Vec3, camera: Vec3, scene: &Scene, reflect: bool) -> Vec3 {
        match self {
            Shape::Sphere(sphere) => sphere.color_at(point, camera, scene, reflect),
            Shape::Plane(plane) => plane.color,
            Shape::Lit(lit) => lit.color_at(point, camera, scene, reflect),
        }
    }

    /// Identity comparison, looking through lighting decorators.
    pub fn same_as(&self, other: &Shape) -> bool {
        match (self.primitive(), other.primitive()) {
            (Shape::Sphere(a), Shape::Sphere(b)) => a.same_as(b),
            (Shape::Plane(a), Shape::Plane(b)) => a.same_as(b),
            _ => false,
        }
    }

    fn primitive(&self) -> &Shape {
        match self {
            Shape::Lit(lit) => lit.inner.primitive(),
            other => other,
        }
    }

    fn is_sphere(&self, sphere: &Sphere) -> bool {
        match self.primitive() {
            Shape::Sphere(other) => sphere.same_as(other),
            _ => false,
        }
    }

    fn bounding_sphere(&self) -> Option<(Vec3, f64)> {
        match self.primitive() {
            Shape::Sphere(sphere) => Some((sphere.center, sphere.radius)),
            _ => None,
        }
    }
}

/// How many shadow casters the occlusion test consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowScan {
    /// Only the first entry of the shadow-caster list.
    First,
    /// Every entry of the shadow-caster list.
    #[default]
    Full,
}

/// Read-only scene: the renderable objects, the (possibly different) set of
/// shadow casters, and the color of rays that miss everything.
pub struct Scene {
    pub objects: Vec<Shape>,
    pub shadow_casters: Vec<Shape>,
    pub background: Vec3,
    pub shadow_scan: ShadowScan,
}

impl Scene {
    /// True when a ray from `point` toward `light` strikes a shadow caster.
    pub fn in_shadow(&self, point: Vec3, light: Vec3) -> bool {
        let direction = match Vec3::direction(point, light) {
            Ok(direction) => direction,
            Err(GeometryError::DegenerateVector) => return false,
        };
        let ray = Ray {
            origin: point,
            direction,
        };
        match self.shadow_scan {
            ShadowScan::First => self
                .shadow_casters
                .first()
                .map_or(false, |caster| caster.intersect(&ray).is_some()),
            ShadowScan::Full => self
                .shadow_casters
                .iter()
                .any(|caster| caster.intersect(&ray).is_some()),
        }
    }
}

/// One rendered grid cell: screen indices, position in normalized device
/// coordinates (z = 0) and the resolved color.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
    pub screen_x: u32,
    pub screen_y: u32,
    pub position: Vec3,
    pub color: Vec3,
}

/// Resolve every pixel of the grid: one camera ray per pixel, nearest hit
/// wins, misses keep the background color. The output is column-major (outer
/// width, inner height). Columns are rendered in parallel into disjoint
/// chunks of the result.
pub fn render(scene: &Scene, camera: &Camera, width: u32, height: u32) -> Vec<Pixel> {
    let x_increment = 2.0 / width as f64;
    let y_increment = 2.0 / height as f64;
    let mut pixels = vec![
        Pixel {
            screen_x: 0,
            screen_y: 0,
            position: Vec3::zero(),
            color: scene.background,
        };
        (width as usize) * (height as usize)
    ];

    let columns: Vec<(usize, &mut [Pixel])> =
        pixels.chunks_mut(height as usize).enumerate().collect();
    columns.into_par_iter().for_each(|(i, column)| {
        let ndc_x = -1.0 + (i as f64 + 1.0) * x_increment;
        for (j, pixel) in column.iter_mut().enumerate() {
            let ndc_y = 1.0 - (j as f64 + 1.0) * y_increment;
            *pixel = render_pixel(scene, camera, i as u32, j as u32, ndc_x, ndc_y);
        }
    });
    pixels
}

fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    screen_x: u32,
    screen_y: u32,
    ndc_x: f64,
    ndc_y: f64,
) -> Pixel {
    let mut color = scene.background;
    if let Ok(ray) = camera.ray_through(screen_x as f64, screen_y as f64) {
        let mut nearest = f64::INFINITY;
        for shape in &scene.objects {
            if let Some(hit) = shape.intersect(&ray) {
                let distance = hit.point0.distance(camera.position);
                if distance < nearest {
                    nearest = distance;
                    color = shape.color_at(hit.point0, camera.position, scene);
                }
            }
        }
    }
    Pixel {
        screen_x,
        screen_y,
        position: Vec3::new(ndc_x, ndc_y, 0.0),
        color,
    }
}

/// Flatten pixels into the interleaved position/color vertex layout a display
/// layer uploads: 6 floats per pixel.
pub fn interleave_vertices(pixels: &[Pixel]) -> Vec<f32> {
    let mut result = Vec::with_capacity(pixels.len() * 6);
    for pixel in pixels {
        result.push(pixel.position.x as f32);
        result.push(pixel.position.y as f32);
        result.push(pixel.position.z as f32);
        result.push(pixel.color.x as f32);
        result.push(pixel.color.y as f32);
        result.push(pixel.color.z as f32);
    }
    result
}
