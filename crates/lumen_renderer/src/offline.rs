//! Batch renderer for a single high quality image.
//!
//! Rows are traced in parallel with rayon. Each row draws from its own
//! generator seeded with `seed + row`, so a fixed seed reproduces the
//! image exactly regardless of scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use lumen_core::RenderSettings;
use lumen_math::Camera;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::estimator::{Estimator, RussianRoulette};
use crate::output::ImageBuffer;
use crate::renderer::{render_pixel, PixelSampling};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfflineSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per stratum; every pixel has 2x2 strata
    pub samples: u32,
    pub roulette: RussianRoulette,
    pub seed: u64,
}

impl OfflineSettings {
    /// Offline values from `settings`, drawing a seed when none is set.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            samples: settings.offline_samples,
            roulette: RussianRoulette::new(
                settings.offline_rr_depth,
                settings.offline_rr_probability,
            ),
            seed: settings.seed.unwrap_or_else(rand::random),
        }
    }
}

/// Render the whole image with stratified, tent-filtered sampling.
pub fn render_offline(
    scene: &Scene,
    camera: &Camera,
    settings: &OfflineSettings,
) -> RenderResult<ImageBuffer> {
    let (width, height) = (settings.width, settings.height);
    if width == 0 || height == 0 {
        return Err(RenderError::ZeroDimension);
    }

    let start = Instant::now();
    let estimator = Estimator::new(scene, settings.roulette);
    let sampling = PixelSampling::stratified(settings.samples);
    let mut image = ImageBuffer::new(width, height);
    let rows_done = AtomicUsize::new(0);
    let tenth = (height as usize).div_ceil(10);

    log::info!(
        "Offline render {}x{} at {} samples per stratum",
        width,
        height,
        sampling.samples
    );

    image
        .data
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(row, out)| {
            let y = height - 1 - row as u32;
            let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(y as u64));
            for x in 0..width {
                if let Some(color) = render_pixel(
                    &estimator,
                    camera,
                    x,
                    y,
                    width,
                    height,
                    sampling,
                    &mut rng,
                    &|| false,
                ) {
                    let i = x as usize * 3;
                    out[i] = color.x as f32;
                    out[i + 1] = color.y as f32;
                    out[i + 2] = color.z as f32;
                }
            }

            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            if done % tenth == 0 || done == height as usize {
                log::info!("Rendering {}%", done * 100 / height as usize);
            }
        });

    log::info!("Offline render finished in {:.2?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{reference_camera, ScenePreset};

    fn small(seed: u64) -> OfflineSettings {
        OfflineSettings {
            width: 20,
            height: 15,
            samples: 2,
            roulette: RussianRoulette::new(5, 0.9),
            seed,
        }
    }

    #[test]
    fn test_offline_is_reproducible() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        let camera = reference_camera();

        let a = render_offline(&scene, &camera, &small(11)).unwrap();
        let b = render_offline(&scene, &camera, &small(11)).unwrap();
        let c = render_offline(&scene, &camera, &small(12)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.data.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_offline_settings_from_render_settings() {
        let settings = RenderSettings {
            seed: Some(3),
            ..Default::default()
        };
        let offline = OfflineSettings::from_settings(&settings);

        assert_eq!(offline.samples, 16);
        assert_eq!(offline.roulette, RussianRoulette::new(5, 0.9));
        assert_eq!(offline.seed, 3);
    }

    #[test]
    fn test_zero_size_rejected() {
        let scene = ScenePreset::Cornell.build(None).unwrap().scene;
        let settings = OfflineSettings {
            height: 0,
            ..small(1)
        };
        let result = render_offline(&scene, &reference_camera(), &settings);
        assert!(matches!(result, Err(RenderError::ZeroDimension)));
    }
}
