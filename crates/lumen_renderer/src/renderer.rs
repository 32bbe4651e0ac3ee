//! Tile-parallel frame renderer.
//!
//! Each frame spawns one scoped worker per row band. Workers trace their
//! band into a disjoint slice of the output buffer, then bump the shared
//! completion counter. The calling thread polls the counter and runs the
//! caller's pump closure in between, so window events keep flowing while
//! a frame is in flight.
//!
//! Buffer layout: `width * height * 3` floats, rows top to bottom. Pixel
//! row `y` is counted from the bottom of the view, so it lands in memory
//! row `height - 1 - y`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use lumen_core::RenderSettings;
use lumen_math::Camera;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::band::{generate_bands, Band};
use crate::brdf::Color;
use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::estimator::{Estimator, RussianRoulette};
use crate::output::ImageBuffer;
use crate::sampling::{gen_f64, tent};
use crate::scene::Scene;

const POLL_INTERVAL: Duration = Duration::from_micros(200);

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Every band finished.
    Completed,
    /// New input arrived and at least one band was abandoned.
    Cancelled,
    /// Nothing was rendered: the image had converged and no input arrived.
    Idle,
}

/// Samples per pixel and whether to split the pixel into 2x2 strata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSampling {
    /// Samples per stratum
    pub samples: u32,
    pub stratified: bool,
}

impl PixelSampling {
    /// A single jittered sample per pixel for 1, otherwise 2x2 strata.
    pub fn interactive(samples: u32) -> Self {
        Self {
            samples: samples.max(1),
            stratified: samples > 1,
        }
    }

    /// Always 2x2 strata.
    pub fn stratified(samples: u32) -> Self {
        Self {
            samples: samples.max(1),
            stratified: true,
        }
    }
}

/// Estimate the colour of pixel `(x, y)`, `y` counted from the bottom.
///
/// Each stratum's mean is clamped to [0, 1] before the strata are
/// averaged. Returns `None` as soon as `cancelled` reports true; it is
/// checked before every sample.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    estimator: &Estimator,
    camera: &Camera,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    sampling: PixelSampling,
    rng: &mut dyn RngCore,
    cancelled: &dyn Fn() -> bool,
) -> Option<Color> {
    let strata = if sampling.stratified { 2 } else { 1 };
    let weight = 1.0 / (strata * strata) as f64;
    let mut pixel = Color::ZERO;

    for sy in 0..strata {
        for sx in 0..strata {
            let mut radiance = Color::ZERO;
            for _ in 0..sampling.samples {
                if cancelled() {
                    return None;
                }
                let (px, py) = film_position(x, y, sx, sy, strata, rng);
                let ray = camera.primary_ray(px, py, width, height);
                radiance += estimator.radiance(&ray, 1, rng) / sampling.samples as f64;
            }
            pixel += radiance.clamp(Color::ZERO, Color::ONE) * weight;
        }
    }

    Some(pixel)
}

/// Tent-jittered film position inside stratum `(sx, sy)` of a pixel
/// split into `strata` x `strata` cells.
fn film_position(
    x: u32,
    y: u32,
    sx: u32,
    sy: u32,
    strata: u32,
    rng: &mut dyn RngCore,
) -> (f64, f64) {
    let dx = tent(gen_f64(rng));
    let dy = tent(gen_f64(rng));
    let strata = strata as f64;
    (
        x as f64 + (sx as f64 + 0.5 + dx) / strata,
        y as f64 + (sy as f64 + 0.5 + dy) / strata,
    )
}

/// Bumps the completion counter when a worker exits, even by panic.
struct DoneGuard<'a>(&'a RenderContext);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.mark_worker_done();
    }
}

/// Interactive multi-threaded renderer.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    width: u32,
    height: u32,
    workers: usize,
    roulette: RussianRoulette,
    /// Per-frame base seed; drawn fresh each frame when unset.
    seed: Option<u64>,
}

impl FrameRenderer {
    /// One worker per logical CPU and the interactive roulette policy.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            workers: num_cpus::get(),
            roulette: RussianRoulette::default(),
            seed: None,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            workers: settings.thread_count(),
            roulette: RussianRoulette::new(settings.rr_depth, settings.rr_probability),
            seed: settings.seed,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_roulette(mut self, roulette: RussianRoulette) -> Self {
        self.roulette = roulette;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Floats the output buffer must hold.
    pub fn buffer_len(&self) -> usize {
        ImageBuffer::len_for(self.width, self.height)
    }

    /// Render one frame without servicing any events while waiting.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &Camera,
        samples: u32,
        ctx: &RenderContext,
        buffer: &mut [f32],
    ) -> RenderResult<FrameOutcome> {
        self.render_with_pump(scene, camera, samples, ctx, buffer, || {})
    }

    /// Render one frame at `samples` per stratum, calling `pump` while the
    /// workers run.
    ///
    /// With more than one sample the frame is abandoned as soon as the
    /// context reports new input. Abandoned bands keep whatever the buffer
    /// held before.
    pub fn render_with_pump<F: FnMut()>(
        &self,
        scene: &Scene,
        camera: &Camera,
        samples: u32,
        ctx: &RenderContext,
        buffer: &mut [f32],
        mut pump: F,
    ) -> RenderResult<FrameOutcome> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::ZeroDimension);
        }
        let expected = self.buffer_len();
        if buffer.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                found: buffer.len(),
            });
        }

        let start = Instant::now();
        let samples = samples.max(1);
        let bands = generate_bands(self.height, self.workers);
        let estimator = Estimator::new(scene, self.roulette).with_preview(samples == 1);
        let base_seed = self.seed.unwrap_or_else(rand::random);
        let width = self.width;
        let height = self.height;
        let cancelled = AtomicBool::new(false);
        let cancelled = &cancelled;

        ctx.begin_frame(samples);

        thread::scope(|scope| {
            let row_len = width as usize * 3;
            let mut rest = &mut buffer[..];
            let mut handles = Vec::with_capacity(bands.len());

            // Highest band first: it owns the top memory rows.
            for &band in bands.iter().rev() {
                let (chunk, tail) =
                    std::mem::take(&mut rest).split_at_mut(band.rows() as usize * row_len);
                rest = tail;

                handles.push(scope.spawn(move || {
                    let _done = DoneGuard(ctx);
                    let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(band.index as u64));
                    let job = BandJob {
                        estimator: &estimator,
                        camera,
                        width,
                        height,
                        ctx,
                    };
                    if !job.run(band, chunk, &mut rng) {
                        cancelled.store(true, Ordering::SeqCst);
                    }
                }));
            }

            while ctx.workers_done() < bands.len() {
                pump();
                thread::sleep(POLL_INTERVAL);
            }

            for handle in handles {
                if let Err(panic) = handle.join() {
                    std::panic::resume_unwind(panic);
                }
            }
        });

        let outcome = if cancelled.load(Ordering::SeqCst) {
            FrameOutcome::Cancelled
        } else {
            FrameOutcome::Completed
        };
        log::debug!(
            "Frame at {} spp over {} bands: {:?} in {:.2?}",
            samples,
            bands.len(),
            outcome,
            start.elapsed()
        );
        Ok(outcome)
    }
}

/// Per-worker view of a frame.
struct BandJob<'a> {
    estimator: &'a Estimator<'a>,
    camera: &'a Camera,
    width: u32,
    height: u32,
    ctx: &'a RenderContext,
}

impl BandJob<'_> {
    /// Trace every pixel of `band` into `out`, its slice of the buffer.
    /// Returns false if the band was abandoned.
    fn run(&self, band: Band, out: &mut [f32], rng: &mut dyn RngCore) -> bool {
        let ctx = self.ctx;
        let samples = ctx.sample_count();
        let sampling = PixelSampling::interactive(samples);
        let cancellable = samples > 1;
        let cancelled = move || cancellable && ctx.has_new_input();
        let first_row = band.memory_rows(self.height).start;

        for y in band.y_start..band.y_end {
            let row = (self.height - 1 - y - first_row) as usize;
            for x in 0..self.width {
                let Some(color) = render_pixel(
                    self.estimator,
                    self.camera,
                    x,
                    y,
                    self.width,
                    self.height,
                    sampling,
                    rng,
                    &cancelled,
                ) else {
                    return false;
                };
                let i = (row * self.width as usize + x as usize) * 3;
                out[i] = color.x as f32;
                out[i + 1] = color.y as f32;
                out[i + 2] = color.z as f32;
            }
        }
        true
    }
}
