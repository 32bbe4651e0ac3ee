//! Scene container: an ordered list of shapes plus the designated light.

use lumen_math::{Interval, Ray, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::shape::Shape;

/// Nearest intersection in a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    /// Index of the shape that was hit.
    pub index: usize,
    pub t: f64,
    pub point: Vec3,
    /// Outward normal, not yet oriented towards the ray.
    pub normal: Vec3,
}

#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<Shape>,
    light: usize,
}

impl Scene {
    /// Build a scene whose light is `shapes[light]`.
    pub fn new(shapes: Vec<Shape>, light: usize) -> SceneResult<Self> {
        if shapes.is_empty() {
            return Err(SceneError::Empty);
        }
        if light >= shapes.len() {
            return Err(SceneError::LightOutOfRange {
                index: light,
                len: shapes.len(),
            });
        }
        if !shapes[light].is_emissive() {
            return Err(SceneError::LightNotEmissive(light));
        }
        log::debug!("Scene with {} shapes, light at {}", shapes.len(), light);
        Ok(Self { shapes, light })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Shape at `index`. Panics when out of range, like slice indexing.
    pub fn shape(&self, index: usize) -> &Shape {
        &self.shapes[index]
    }

    pub fn light_index(&self) -> usize {
        self.light
    }

    pub fn light(&self) -> &Shape {
        &self.shapes[self.light]
    }

    /// Nearest hit along `ray` by exhaustive scan.
    pub fn intersect(&self, ray: &Ray) -> Option<SceneHit> {
        let mut closest = None;
        let mut interval = Interval::HIT;

        for (index, shape) in self.shapes.iter().enumerate() {
            if let Some(hit) = shape.intersect(ray, interval) {
                interval = interval.with_max(hit.t);
                closest = Some(SceneHit {
                    index,
                    t: hit.t,
                    point: hit.point,
                    normal: hit.normal,
                });
            }
        }

        closest
    }
}
