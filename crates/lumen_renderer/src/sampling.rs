//! Random sampling helpers.
//!
//! Every routine draws from a caller-supplied generator. Each render worker
//! owns its own generator, so no random state is shared between threads.

use std::f64::consts::PI;

use lumen_math::{local_frame, Vec3};
use rand::{Rng, RngCore};

/// Uniform draw in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Map a uniform draw in [0, 1) to a tent-distributed offset in [-1, 1).
#[inline]
pub fn tent(u: f64) -> f64 {
    let r = 2.0 * u;
    if r < 1.0 {
        r.sqrt() - 1.0
    } else {
        1.0 - (2.0 - r).sqrt()
    }
}

/// Cosine-weighted direction on the hemisphere around unit normal `n`.
///
/// Returns the direction and its solid-angle density `cos(theta) / pi`.
pub fn cosine_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> (Vec3, f64) {
    let z = gen_f64(rng).sqrt();
    let r = (1.0 - z * z).sqrt();
    let phi = 2.0 * PI * gen_f64(rng);
    let (u, v, w) = local_frame(n);
    let dir = u * (r * phi.cos()) + v * (r * phi.sin()) + w * z;
    let pdf = dir.dot(n).max(0.0) / PI;
    (dir, pdf)
}

/// Uniform point on the unit sphere.
pub fn uniform_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let z = 2.0 * gen_f64(rng) - 1.0;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f64(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform barycentric coordinates over a triangle.
pub fn uniform_triangle(rng: &mut dyn RngCore) -> (f64, f64, f64) {
    let sqrt_r1 = gen_f64(rng).sqrt();
    let r2 = gen_f64(rng);
    (1.0 - sqrt_r1, sqrt_r1 * (1.0 - r2), sqrt_r1 * r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tent_range_and_symmetry() {
        assert_eq!(tent(0.0), -1.0);
        assert!(tent(0.5).abs() < 1e-12);
        assert!((tent(0.999_999) - 1.0).abs() < 1e-2);
        assert!((tent(0.25) + tent(0.75)).abs() < 1e-12);
    }

    #[test]
    fn test_tent_is_peaked_at_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let near = (0..n)
            .map(|_| tent(gen_f64(&mut rng)))
            .filter(|d| d.abs() < 0.5)
            .count();
        // A tent puts 75% of its mass within half its radius.
        let fraction = near as f64 / n as f64;
        assert!((fraction - 0.75).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn test_cosine_hemisphere_stays_above_surface() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = Vec3::new(0.3, -0.5, 0.8).normalize();
        for _ in 0..1000 {
            let (dir, pdf) = cosine_hemisphere(n, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-9);
            assert!(dir.dot(n) >= 0.0);
            assert!((pdf - dir.dot(n) / PI).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniform_sphere_is_unit_and_centred() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut mean = Vec3::ZERO;
        let n = 10_000;
        for _ in 0..n {
            let p = uniform_sphere(&mut rng);
            assert!((p.length() - 1.0).abs() < 1e-9);
            mean += p / n as f64;
        }
        assert!(mean.length() < 0.05);
    }

    #[test]
    fn test_uniform_triangle_barycentrics_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let (a, b, c) = uniform_triangle(&mut rng);
            assert!(a >= 0.0 && b >= 0.0 && c >= 0.0);
            assert!((a + b + c - 1.0).abs() < 1e-12);
        }
    }
}
