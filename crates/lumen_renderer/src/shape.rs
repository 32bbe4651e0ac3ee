//! Scene primitives: geometry plus a shared BRDF and an emitted radiance.

use std::sync::Arc;

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::brdf::{Brdf, Color};
use crate::mesh::MeshShape;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Record of a ray-geometry intersection.
///
/// The normal is the outward geometric normal; callers orient it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f64,
    pub point: Vec3,
    pub normal: Vec3,
}

/// A point drawn uniformly over a surface, with its density per unit area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    pub normal: Vec3,
    pub pdf: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere(Sphere),
    Triangle(Triangle),
    Mesh(MeshShape),
}

impl Geometry {
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        match self {
            Geometry::Sphere(s) => s.hit(ray, ray_t),
            Geometry::Triangle(t) => t.hit(ray, ray_t),
            Geometry::Mesh(m) => m.hit(ray, ray_t),
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        match self {
            Geometry::Sphere(s) => s.sample(rng),
            Geometry::Triangle(t) => t.sample(rng),
            Geometry::Mesh(m) => m.sample(rng),
        }
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Geometry::Sphere(s) => s.normal_at(point),
            Geometry::Triangle(t) => t.normal_at(point),
            Geometry::Mesh(m) => m.normal_at(point),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Geometry::Sphere(s) => s.area(),
            Geometry::Triangle(t) => t.area(),
            Geometry::Mesh(m) => m.area(),
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(sphere: Sphere) -> Self {
        Geometry::Sphere(sphere)
    }
}

impl From<Triangle> for Geometry {
    fn from(triangle: Triangle) -> Self {
        Geometry::Triangle(triangle)
    }
}

impl From<MeshShape> for Geometry {
    fn from(mesh: MeshShape) -> Self {
        Geometry::Mesh(mesh)
    }
}

/// A renderable primitive.
///
/// Several shapes may share one BRDF.
#[derive(Debug, Clone)]
pub struct Shape {
    geometry: Geometry,
    brdf: Arc<Brdf>,
    emission: Color,
}

impl Shape {
    pub fn new(geometry: impl Into<Geometry>, brdf: Arc<Brdf>, emission: Color) -> Self {
        Self {
            geometry: geometry.into(),
            brdf,
            emission,
        }
    }

    /// Non-emissive shape.
    pub fn surface(geometry: impl Into<Geometry>, brdf: Arc<Brdf>) -> Self {
        Self::new(geometry, brdf, Color::ZERO)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn brdf(&self) -> &Brdf {
        &self.brdf
    }

    pub fn emission(&self) -> Color {
        self.emission
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.max_element() > 0.0
    }

    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        self.geometry.hit(ray, ray_t)
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        self.geometry.sample(rng)
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        self.geometry.normal_at(point)
    }
}
