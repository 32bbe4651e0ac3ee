//! Flat-shaded triangle geometry.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::sampling::uniform_triangle;
use crate::shape::{Hit, SurfaceSample};

/// Determinant threshold below which a ray counts as parallel.
const PARALLEL_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Unit face normal, zero for a degenerate triangle
    normal: Vec3,
    area: f64,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        Self {
            v0,
            v1,
            v2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn is_degenerate(&self) -> bool {
        self.area <= 0.0
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction().cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(Hit {
            t,
            point: ray.at(t),
            normal: self.normal,
        })
    }

    /// Uniform point on the face with density `1 / area`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        if self.is_degenerate() {
            return None;
        }
        let (b0, b1, b2) = uniform_triangle(rng);
        Some(SurfaceSample {
            point: self.v0 * b0 + self.v1 * b1 + self.v2 * b2,
            normal: self.normal,
            pdf: 1.0 / self.area,
        })
    }

    pub fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }

    /// Distance from `point` to the plane of the face, plus how far its
    /// projection falls outside the face in barycentric terms.
    pub(crate) fn containment_error(&self, point: Vec3) -> f64 {
        if self.is_degenerate() {
            return f64::INFINITY;
        }
        let plane = (point - self.v0).dot(self.normal);
        let projected = point - self.normal * plane;

        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        let p = projected - self.v0;
        let (d11, d12, d22) = (e1.dot(e1), e1.dot(e2), e2.dot(e2));
        let (dp1, dp2) = (p.dot(e1), p.dot(e2));
        let denom = d11 * d22 - d12 * d12;
        let b1 = (d22 * dp1 - d12 * dp2) / denom;
        let b2 = (d11 * dp2 - d12 * dp1) / denom;
        let b0 = 1.0 - b1 - b2;
        let outside = (-b0).max(0.0) + (-b1).max(0.0) + (-b2).max(0.0);

        plane.abs() + outside * self.area.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_triangle() -> Triangle {
        // In the XY plane at z = -1, facing +Z
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = unit_triangle();
        let hit = tri.hit(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), Interval::HIT).unwrap();

        assert!((hit.t - 1.0).abs() < 1e-9);
        assert!((hit.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();
        assert!(tri.hit(&Ray::new(Vec3::ZERO, Vec3::Z), Interval::HIT).is_none());
        assert!(tri
            .hit(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::NEG_Z), Interval::HIT)
            .is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let tri = unit_triangle();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.hit(&ray, Interval::HIT).is_none());
    }

    #[test]
    fn test_area_and_sampling() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        assert!((tri.area() - 3.0).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let s = tri.sample(&mut rng).unwrap();
            assert!(s.point.z.abs() < 1e-12);
            assert!(s.point.x >= 0.0 && s.point.y >= 0.0);
            assert!(s.point.x / 2.0 + s.point.y / 3.0 <= 1.0 + 1e-12);
            assert!((s.pdf - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(tri.is_degenerate());
        assert_eq!(tri.normal_at(Vec3::ZERO), Vec3::ZERO);
        assert!(tri.sample(&mut rng).is_none());
        assert!(tri.hit(&Ray::new(Vec3::new(0.5, 1.0, 0.0), Vec3::NEG_Y), Interval::HIT).is_none());
    }

    #[test]
    fn test_containment_error() {
        let tri = unit_triangle();
        assert!(tri.containment_error(Vec3::new(0.0, 0.0, -1.0)) < 1e-12);
        assert!(tri.containment_error(Vec3::new(0.0, 0.0, -0.5)) > 0.4);
        assert!(tri.containment_error(Vec3::new(3.0, 0.0, -1.0)) > 0.1);
    }
}
