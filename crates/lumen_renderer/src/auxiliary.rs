//! Albedo and normal feature buffers for an external denoiser.

use lumen_math::{Camera, Ray};
use rayon::prelude::*;

use crate::brdf::{mirror_direction, Color};
use crate::error::{RenderError, RenderResult};
use crate::output::ImageBuffer;
use crate::scene::Scene;

/// Mirror bounces followed when looking for a surface colour.
pub const MAX_MIRROR_BOUNCES: u32 = 16;

/// Feature buffers in the same layout as the colour buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryBuffers {
    pub albedo: ImageBuffer,
    /// First-hit normals facing the camera, components in [-1, 1]
    pub normal: ImageBuffer,
}

/// First-hit normal and albedo for the ray through a pixel centre.
///
/// Mirrors are looked through: the albedo is taken from the first
/// non-specular surface along the reflected path.
pub fn pixel_features(scene: &Scene, ray: &Ray) -> (Color, Color) {
    let Some(first) = scene.intersect(ray) else {
        return (Color::ZERO, Color::ZERO);
    };
    let facing = |normal: Color, dir: Color| if normal.dot(dir) > 0.0 { -normal } else { normal };
    let normal = facing(first.normal, ray.direction());

    let mut hit = first;
    let mut dir = ray.direction();
    for _ in 0..MAX_MIRROR_BOUNCES {
        let brdf = scene.shape(hit.index).brdf();
        if !brdf.is_specular() {
            return (brdf.albedo(), normal);
        }
        let n = facing(hit.normal, dir);
        dir = mirror_direction(n, -dir);
        match scene.intersect(&Ray::new(hit.point, dir)) {
            Some(next) => hit = next,
            None => return (Color::ZERO, normal),
        }
    }
    (Color::ZERO, normal)
}

/// Compute albedo and normal buffers at one ray per pixel centre.
pub fn compute_auxiliary(
    scene: &Scene,
    camera: &Camera,
    width: u32,
    height: u32,
) -> RenderResult<AuxiliaryBuffers> {
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroDimension);
    }
    let mut albedo = ImageBuffer::new(width, height);
    let mut normal = ImageBuffer::new(width, height);
    let row_len = width as usize * 3;

    albedo
        .data
        .par_chunks_mut(row_len)
        .zip(normal.data.par_chunks_mut(row_len))
        .enumerate()
        .for_each(|(row, (albedo_row, normal_row))| {
            let y = height - 1 - row as u32;
            for x in 0..width {
                let ray = camera.primary_ray(x as f64 + 0.5, y as f64 + 0.5, width, height);
                let (a, n) = pixel_features(scene, &ray);
                let i = x as usize * 3;
                albedo_row[i..i + 3].copy_from_slice(&[a.x as f32, a.y as f32, a.z as f32]);
                normal_row[i..i + 3].copy_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
            }
        });

    log::debug!("Computed {}x{} auxiliary buffers", width, height);
    Ok(AuxiliaryBuffers { albedo, normal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brdf::Brdf;
    use crate::presets::{reference_camera, ScenePreset};
    use crate::shape::Shape;
    use crate::sphere::Sphere;
    use lumen_math::Vec3;
    use std::sync::Arc;

    #[test]
    fn test_diffuse_wall_features() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        // Straight at the red left wall.
        let ray = Ray::new(Vec3::new(50.0, 40.0, 100.0), Vec3::NEG_X);
        let (albedo, normal) = pixel_features(&scene, &ray);

        assert_eq!(albedo, Color::new(0.75, 0.25, 0.25));
        assert!((normal - Vec3::X).length() < 1e-3);
    }

    #[test]
    fn test_mirror_takes_reflected_albedo() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        // Straight down onto the top of the mirror ball reflects up to
        // the ceiling.
        let down = Ray::new(Vec3::new(73.0, 60.0, 78.0), Vec3::NEG_Y);
        let (albedo, normal) = pixel_features(&scene, &down);

        assert!((normal - Vec3::Y).length() < 1e-6);
        assert_eq!(albedo, Color::splat(0.75));
    }

    #[test]
    fn test_miss_has_no_features() {
        let light = Shape::new(
            Sphere::new(Vec3::ZERO, 1.0),
            Arc::new(Brdf::diffuse(Color::ZERO)),
            Color::ONE,
        );
        let scene = Scene::new(vec![light], 0).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        assert_eq!(pixel_features(&scene, &ray), (Color::ZERO, Color::ZERO));
    }

    #[test]
    fn test_compute_auxiliary_layout() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        let aux = compute_auxiliary(&scene, &reference_camera(), 8, 6).unwrap();

        assert_eq!(aux.albedo.data.len(), 8 * 6 * 3);
        assert_eq!(aux.normal.data.len(), 8 * 6 * 3);
        // Bottom memory row looks at the floor, whose normal points up.
        let floor = aux.normal.get(4, 5);
        assert!(floor.y > 0.9, "floor normal {floor}");
        assert!(aux.albedo.data.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }
}
