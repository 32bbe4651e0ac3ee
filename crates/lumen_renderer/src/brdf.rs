//! Surface reflectance models.

use std::f64::consts::PI;

use lumen_math::{approx_eq, Vec3};
use rand::RngCore;

use crate::sampling::cosine_hemisphere;

/// RGB radiance or reflectance, components nominally in [0, 1].
pub type Color = Vec3;

/// A sampled incoming direction and its solid-angle density.
///
/// For a specular surface the density is the discrete probability of the
/// single mirror direction, which is 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrdfSample {
    pub direction: Vec3,
    pub pdf: f64,
}

/// Bidirectional reflectance distribution function of a surface.
///
/// Directions passed in are unit vectors pointing away from the surface:
/// `o` towards the viewer, `i` towards the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brdf {
    /// Lambertian reflector with reflectance `kd`.
    Diffuse { kd: Color },
    /// Perfect mirror with reflectance `ks`.
    Specular { ks: Color },
}

/// Reflection of `o` about the normal `n`.
#[inline]
pub fn mirror_direction(n: Vec3, o: Vec3) -> Vec3 {
    n * (2.0 * n.dot(o)) - o
}

impl Brdf {
    pub fn diffuse(kd: Color) -> Self {
        Brdf::Diffuse { kd }
    }

    pub fn specular(ks: Color) -> Self {
        Brdf::Specular { ks }
    }

    /// True for delta distributions, which can only be sampled.
    pub fn is_specular(&self) -> bool {
        matches!(self, Brdf::Specular { .. })
    }

    /// Surface colour, used for the albedo auxiliary buffer.
    pub fn albedo(&self) -> Color {
        match self {
            Brdf::Diffuse { kd } => *kd,
            Brdf::Specular { ks } => *ks,
        }
    }

    /// Reflectance for light arriving along `i` and leaving along `o`.
    pub fn eval(&self, n: Vec3, o: Vec3, i: Vec3) -> Color {
        match self {
            Brdf::Diffuse { kd } => *kd / PI,
            Brdf::Specular { ks } => {
                let cos_i = n.dot(i);
                if cos_i > 0.0 && approx_eq(i, mirror_direction(n, o)) {
                    *ks / cos_i
                } else {
                    Color::ZERO
                }
            }
        }
    }

    /// Sample an incoming direction for outgoing direction `o`.
    pub fn sample(&self, n: Vec3, o: Vec3, rng: &mut dyn RngCore) -> BrdfSample {
        match self {
            Brdf::Diffuse { .. } => {
                let (direction, pdf) = cosine_hemisphere(n, rng);
                BrdfSample { direction, pdf }
            }
            Brdf::Specular { .. } => BrdfSample {
                direction: mirror_direction(n, o),
                pdf: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::gen_f64;
    use lumen_math::local_frame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_diffuse_eval_is_constant() {
        let brdf = Brdf::diffuse(Color::new(0.75, 0.25, 0.25));
        let n = Vec3::Y;
        let a = brdf.eval(n, Vec3::Y, Vec3::new(1.0, 1.0, 0.0).normalize());
        let b = brdf.eval(n, Vec3::new(0.0, 1.0, 1.0).normalize(), Vec3::Y);
        assert_eq!(a, b);
        assert!((a.x - 0.75 / PI).abs() < 1e-12);
    }

    #[test]
    fn test_diffuse_energy_conservation() {
        // Integrate eval * cos over the hemisphere with uniform sampling
        // (pdf 1 / 2pi); under constant unit radiance this is kd.
        let kd = Color::new(0.8, 0.5, 0.2);
        let brdf = Brdf::diffuse(kd);
        let n = Vec3::new(0.2, 0.9, -0.3).normalize();
        let (u, v, w) = local_frame(n);
        let o = n;
        let mut rng = StdRng::seed_from_u64(42);

        let trials = 200_000;
        let mut sum = Color::ZERO;
        for _ in 0..trials {
            let z = gen_f64(&mut rng);
            let r = (1.0 - z * z).sqrt();
            let phi = 2.0 * PI * gen_f64(&mut rng);
            let i = u * (r * phi.cos()) + v * (r * phi.sin()) + w * z;
            sum += brdf.eval(n, o, i) * n.dot(i) * (2.0 * PI);
        }
        let estimate = sum / trials as f64;

        assert!((estimate - kd).abs().max_element() < 0.01, "estimate {estimate}");
    }

    #[test]
    fn test_diffuse_sample_in_hemisphere() {
        let brdf = Brdf::diffuse(Color::splat(0.5));
        let n = Vec3::NEG_Z;
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let s = brdf.sample(n, n, &mut rng);
            assert!(s.direction.dot(n) >= 0.0);
            assert!(s.pdf >= 0.0);
        }
    }

    #[test]
    fn test_specular_sample_is_exact_mirror() {
        let brdf = Brdf::specular(Color::splat(0.999));
        let n = Vec3::Y;
        let o = Vec3::new(1.0, 1.0, 0.0).normalize();
        let mut rng = StdRng::seed_from_u64(0);

        let s = brdf.sample(n, o, &mut rng);
        assert!(approx_eq(s.direction, Vec3::new(-1.0, 1.0, 0.0).normalize()));
        assert_eq!(s.pdf, 1.0);
    }

    #[test]
    fn test_specular_eval() {
        let ks = Color::splat(0.9);
        let brdf = Brdf::specular(ks);
        let n = Vec3::Y;
        let o = Vec3::new(0.6, 0.8, 0.0);
        let i = mirror_direction(n, o);

        // eval * cos(i) recovers ks at the mirror direction.
        assert!(approx_eq(brdf.eval(n, o, i) * n.dot(i), ks));
        assert_eq!(brdf.eval(n, o, Vec3::Y), Color::ZERO);
        assert!(brdf.is_specular());
        assert!(!Brdf::diffuse(ks).is_specular());
    }
}
