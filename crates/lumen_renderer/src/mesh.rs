//! Triangle mesh geometry with a bounding sphere and area sampling.

use std::path::Path;

use lumen_core::{load_stl, MeshPlacement, MeshResult, TriangleSoup};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::sampling::gen_f64;
use crate::shape::{Hit, SurfaceSample};
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Slack added to the bounding sphere radius.
const BOUNDS_MARGIN: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshShape {
    triangles: Vec<Triangle>,
    bounds: Sphere,
    /// Normalized running sum of triangle areas; the last entry is 1.
    cdf: Vec<f64>,
    total_area: f64,
}

impl MeshShape {
    /// Build from an already placed triangle soup.
    pub fn from_soup(soup: &TriangleSoup) -> Self {
        let triangles: Vec<Triangle> = soup
            .triangles
            .iter()
            .map(|[a, b, c]| Triangle::new(*a, *b, *c))
            .collect();

        let bounds = if soup.is_empty() {
            Sphere::new(Vec3::ZERO, 0.0)
        } else {
            let center = soup.bounds().centroid();
            let radius = soup
                .triangles
                .iter()
                .flatten()
                .map(|v| (*v - center).length())
                .fold(0.0, f64::max);
            Sphere::new(center, radius + BOUNDS_MARGIN)
        };

        let mut running = 0.0;
        let mut cdf: Vec<f64> = triangles
            .iter()
            .map(|tri| {
                running += tri.area();
                running
            })
            .collect();
        let total_area = running;
        if total_area > 0.0 {
            for c in &mut cdf {
                *c /= total_area;
            }
        }

        Self {
            triangles,
            bounds,
            cdf,
            total_area,
        }
    }

    /// Load a binary STL file and place it in the scene.
    pub fn load<P: AsRef<Path>>(path: P, placement: &MeshPlacement) -> MeshResult<Self> {
        let mut soup = load_stl(path)?;
        soup.place(placement);
        Ok(Self::from_soup(&soup))
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn bounding_sphere(&self) -> &Sphere {
        &self.bounds
    }

    pub fn area(&self) -> f64 {
        self.total_area
    }

    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    /// Probability that [`MeshShape::sample`] picks triangle `index`.
    pub fn triangle_probability(&self, index: usize) -> f64 {
        let prev = if index == 0 { 0.0 } else { self.cdf[index - 1] };
        self.cdf[index] - prev
    }

    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Hit> {
        if self.is_empty() || !self.bounds.is_ahead(ray) {
            return None;
        }

        let mut closest = None;
        let mut interval = ray_t;
        for tri in &self.triangles {
            if let Some(hit) = tri.hit(ray, interval) {
                interval = interval.with_max(hit.t);
                closest = Some(hit);
            }
        }
        closest
    }

    /// Uniform point over the whole surface with density `1 / area`.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<SurfaceSample> {
        if self.total_area <= 0.0 {
            return None;
        }
        let r = gen_f64(rng);
        let index = self
            .cdf
            .partition_point(|&c| c <= r)
            .min(self.triangles.len() - 1);
        let sample = self.triangles[index].sample(rng)?;
        Some(SurfaceSample {
            pdf: 1.0 / self.total_area,
            ..sample
        })
    }

    /// Normal of the triangle that best contains `point`.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        self.triangles
            .iter()
            .map(|tri| (tri.containment_error(point), tri))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(Vec3::ZERO, |(_, tri)| tri.normal_at(point))
    }
}
