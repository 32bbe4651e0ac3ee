//! Sphere geometry.

use std::f64::consts::PI;

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::sampling::uniform_sphere;
use crate::shape::{Hit, SurfaceSample};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn area(&self) -> f64 {
        4.0 * PI * self.radius * self.radius
    }

    /// Half of the discriminant test; `None` when the ray line misses.
    fn roots(&self, ray: &Ray) -> Option<(f64, f64)> {
        let op = self.center - ray.origin();
        let b = op.dot(ray.direction());
        let det = b * b - op.length_squared() + self.radius * self.radius;
        if det < 0.0 {
            return None;
        }
        let det = det.sqrt();
        Some((b - det, b + det))
    }

    /// Nearest intersection with `t` strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let (near, far) = self.roots(ray)?;
        let t = if ray_t.surrounds(near) {
            near
        } else if ray_t.surrounds(far) {
            far
        } else {
            return None;
        };

        let point = ray.at(t);
        Some(Hit {
            t,
            point,
            normal: (point - self.center) / self.radius,
        })
    }

    /// Whether any part of the sphere lies ahead of the ray origin.
    ///
    /// Also true when the origin is inside the sphere.
    pub fn is_ahead(&self, ray: &Ray) -> bool {
        matches!(self.roots(ray), Some((_, far)) if far >= 0.0)
    }

    /// Uniform point on the surface with density `1 / area`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        let area = self.area();
        if area <= 0.0 {
            return None;
        }
        let normal = uniform_sphere(rng);
        Some(SurfaceSample {
            point: self.center + normal * self.radius,
            normal,
            pdf: 1.0 / area,
        })
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }
}
