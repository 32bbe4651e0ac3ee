//! Lumen math types.
//!
//! Vectors are glam's double precision `DVec3`. The reference scenes use
//! walls built from spheres of radius 1e5, so single precision is not enough.

pub use glam::{dvec3, DVec3};

mod aabb;
mod camera;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use camera::{Camera, Direction};
pub use interval::Interval;
pub use ray::Ray;

/// 3-D vector used for points, directions and RGB radiance.
pub type Vec3 = DVec3;

/// Absolute per-component tolerance used by [`approx_eq`].
pub const EPSILON: f64 = 1e-12;

/// Approximate vector equality with an absolute per-component epsilon.
#[inline]
pub fn approx_eq(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// Build an orthonormal basis `(u, v, w)` with `w` equal to `n`.
///
/// `n` must already be unit length.
pub fn local_frame(n: Vec3) -> (Vec3, Vec3, Vec3) {
    let w = n;
    let helper = if w.x.abs() > 0.1 { Vec3::Y } else { Vec3::X };
    let u = helper.cross(w).normalize();
    let v = w.cross(u);
    (u, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a * b, Vec3::new(4.0, 10.0, 18.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert!((Vec3::new(3.0, 4.0, 0.0).length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_approx_eq() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        assert!(approx_eq(a, a + Vec3::splat(1e-13)));
        assert!(!approx_eq(a, a + Vec3::new(0.0, 1e-9, 0.0)));
    }

    #[test]
    fn test_local_frame_is_orthonormal() {
        for n in [
            Vec3::X,
            Vec3::Y,
            Vec3::NEG_Z,
            Vec3::new(1.0, 2.0, -3.0).normalize(),
        ] {
            let (u, v, w) = local_frame(n);
            assert_eq!(w, n);
            assert!((u.length() - 1.0).abs() < 1e-9);
            assert!((v.length() - 1.0).abs() < 1e-9);
            assert!(u.dot(v).abs() < 1e-9);
            assert!(u.dot(w).abs() < 1e-9);
            assert!(v.dot(w).abs() < 1e-9);
        }
    }
}
