//! Radiance estimator: recursive Monte Carlo path tracing.
//!
//! Implements:
//! - Next-event estimation towards the scene's designated light
//! - BRDF importance sampling for indirect bounces
//! - Russian roulette termination with unbiased reweighting
//! - Mirror bounces handled purely by sampling; they do not advance the
//!   roulette depth

use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::brdf::{Brdf, Color};
use crate::sampling::gen_f64;
use crate::scene::Scene;

/// Hard stop on the number of bounces along one path, mirror bounces
/// included.
pub const MAX_PATH_DEPTH: u32 = 64;

/// Russian roulette policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RussianRoulette {
    /// Depths up to and including this always continue.
    pub depth: u32,
    /// Continuation probability past `depth`.
    pub probability: f64,
}

impl RussianRoulette {
    pub fn new(depth: u32, probability: f64) -> Self {
        Self {
            depth,
            probability: probability.clamp(0.0, 1.0),
        }
    }

    /// Probability that a path at `depth` is extended.
    pub fn continuation(&self, depth: u32) -> f64 {
        if depth <= self.depth {
            1.0
        } else {
            self.probability
        }
    }
}

impl Default for RussianRoulette {
    fn default() -> Self {
        Self::new(2, 0.0)
    }
}

/// Estimates radiance arriving along camera rays.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    scene: &'a Scene,
    roulette: RussianRoulette,
    /// Direct lighting only, no indirect bounces.
    preview: bool,
}

impl<'a> Estimator<'a> {
    pub fn new(scene: &'a Scene, roulette: RussianRoulette) -> Self {
        Self {
            scene,
            roulette,
            preview: false,
        }
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Radiance arriving at the ray origin along `ray`. Depth starts at 1.
    pub fn radiance(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.trace(ray, depth, 0, true, rng)
    }

    /// `depth` drives Russian roulette and only grows at diffuse bounces;
    /// `bounces` counts every bounce so far.
    ///
    /// `light_emission` is false after a diffuse bounce, since the light
    /// was already counted by next-event estimation there.
    fn trace(
        &self,
        ray: &Ray,
        depth: u32,
        bounces: u32,
        light_emission: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(hit) = self.scene.intersect(ray) else {
            return Color::ZERO;
        };
        let shape = self.scene.shape(hit.index);

        let x = hit.point;
        let o = -ray.direction();
        let n = if hit.normal.dot(o) < 0.0 {
            -hit.normal
        } else {
            hit.normal
        };

        let emitted = if light_emission || hit.index != self.scene.light_index() {
            shape.emission()
        } else {
            Color::ZERO
        };

        let brdf = shape.brdf();
        if brdf.is_specular() {
            return emitted + self.indirect(brdf, x, n, o, depth, bounces, true, rng);
        }

        emitted
            + self.direct_light(hit.index, x, n, o, rng)
            + self.indirect(brdf, x, n, o, depth, bounces, false, rng)
    }

    /// One next-event estimation sample of light reflected at `x`.
    ///
    /// `surface` is the index of the shape `x` lies on and `n` its normal
    /// oriented towards `o`. Returns zero when the light sample is
    /// degenerate or the two points cannot see each other.
    pub fn direct_light(
        &self,
        surface: usize,
        x: Vec3,
        n: Vec3,
        o: Vec3,
        rng: &mut dyn RngCore,
    ) -> Color {
        let light = self.scene.light();
        let Some(sample) = light.sample(rng) else {
            return Color::ZERO;
        };

        let to_light = sample.point - x;
        let dist2 = to_light.length_squared();
        if dist2 <= 0.0 {
            return Color::ZERO;
        }
        let w = to_light / dist2.sqrt();

        let cos_surface = n.dot(w);
        let cos_light = sample.normal.dot(-w).abs();
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return Color::ZERO;
        }

        // Area density to solid angle at x.
        let pdf = sample.pdf * dist2 / cos_light;
        if !(pdf > 0.0 && pdf.is_finite()) {
            return Color::ZERO;
        }

        if !self.mutually_visible(x, surface, sample.point) {
            return Color::ZERO;
        }

        let brdf = self.scene.shape(surface).brdf();
        light.emission() * brdf.eval(n, o, w) * cos_surface / pdf
    }

    /// Shadow test in both directions, so a point on the far side of the
    /// light sphere is rejected.
    fn mutually_visible(&self, x: Vec3, surface: usize, y: Vec3) -> bool {
        let light = self.scene.light_index();
        let towards = self.scene.intersect(&Ray::new(x, y - x));
        if towards.map(|h| h.index) != Some(light) {
            return false;
        }
        let back = self.scene.intersect(&Ray::new(y, x - y));
        back.map(|h| h.index) == Some(surface)
    }

    /// Returns the continuation probability, or `None` to terminate.
    fn continue_path(&self, depth: u32, bounces: u32, rng: &mut dyn RngCore) -> Option<f64> {
        if self.preview || bounces >= MAX_PATH_DEPTH {
            return None;
        }
        let p = self.roulette.continuation(depth);
        if p <= 0.0 {
            return None;
        }
        if p < 1.0 && gen_f64(rng) >= p {
            return None;
        }
        Some(p)
    }

    #[allow(clippy::too_many_arguments)]
    fn indirect(
        &self,
        brdf: &Brdf,
        x: Vec3,
        n: Vec3,
        o: Vec3,
        depth: u32,
        bounces: u32,
        light_emission: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(p) = self.continue_path(depth, bounces, rng) else {
            return Color::ZERO;
        };

        let sample = brdf.sample(n, o, rng);
        let cos = n.dot(sample.direction);
        if sample.pdf <= 0.0 || cos <= 0.0 {
            return Color::ZERO;
        }

        let next_depth = if brdf.is_specular() { depth } else { depth + 1 };
        let incoming = self.trace(
            &Ray::new(x, sample.direction),
            next_depth,
            bounces + 1,
            light_emission,
            rng,
        );
        incoming * brdf.eval(n, o, sample.direction) * cos / (sample.pdf * p)
    }
}
