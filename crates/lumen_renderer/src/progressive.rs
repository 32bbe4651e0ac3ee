//! Progressive refinement: the headless frame loop.
//!
//! The sample count doubles after every completed frame up to a cap, and
//! falls back to a single-sample preview whenever input moves the camera.

use std::thread;
use std::time::{Duration, Instant};

use lumen_core::RenderSettings;
use lumen_math::Camera;

use crate::context::RenderContext;
use crate::error::RenderResult;
use crate::output::ImageBuffer;
use crate::renderer::{FrameOutcome, FrameRenderer};
use crate::scene::Scene;

/// Samples-per-stratum schedule: 1, 2, 4, ... up to `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSchedule {
    current: u32,
    max: u32,
}

impl SampleSchedule {
    pub fn new(max: u32) -> Self {
        Self {
            current: 1,
            max: max.max(1),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Double the sample count, saturating at the cap.
    pub fn advance(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.max);
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    pub fn is_converged(&self) -> bool {
        self.current >= self.max
    }
}

/// What one call to [`FrameLoop::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Samples per stratum the frame was rendered with
    pub samples: u32,
    pub outcome: FrameOutcome,
    /// Render time, excluding the frame budget sleep
    pub elapsed: Duration,
}

/// Drives repeated frames: applies input, renders, refines.
///
/// Holds the last completed frame for display; a cancelled frame never
/// replaces it.
pub struct FrameLoop<'a> {
    renderer: &'a FrameRenderer,
    scene: &'a Scene,
    ctx: &'a RenderContext,
    camera: Camera,
    schedule: SampleSchedule,
    frame_budget: Duration,
    move_step: f64,
    sensitivity: f64,
    /// Render target for the frame in flight
    scratch: Vec<f32>,
    display: ImageBuffer,
    /// Whether `display` already holds the frame at the cap
    converged: bool,
}

impl<'a> FrameLoop<'a> {
    pub fn new(
        renderer: &'a FrameRenderer,
        scene: &'a Scene,
        ctx: &'a RenderContext,
        camera: Camera,
        settings: &RenderSettings,
    ) -> Self {
        let (width, height) = (renderer.width(), renderer.height());
        Self {
            renderer,
            scene,
            ctx,
            camera,
            schedule: SampleSchedule::new(settings.max_samples),
            frame_budget: Duration::from_millis(settings.frame_budget_ms),
            move_step: settings.move_step,
            sensitivity: settings.mouse_sensitivity,
            scratch: vec![0.0; renderer.buffer_len()],
            display: ImageBuffer::new(width, height),
            converged: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn schedule(&self) -> &SampleSchedule {
        &self.schedule
    }

    /// The last completed frame.
    pub fn display(&self) -> &ImageBuffer {
        &self.display
    }

    pub fn into_display(self) -> ImageBuffer {
        self.display
    }

    /// Run one iteration of the loop, calling `pump` while workers run.
    pub fn step<F: FnMut()>(&mut self, pump: F) -> RenderResult<FrameReport> {
        let start = Instant::now();

        if self
            .ctx
            .apply_input(&mut self.camera, self.move_step, self.sensitivity)
        {
            log::debug!("Input applied, restarting refinement");
            self.schedule.reset();
            self.converged = false;
        }

        let samples = self.schedule.current();
        if self.converged {
            self.sleep_remaining(start);
            return Ok(FrameReport {
                samples,
                outcome: FrameOutcome::Idle,
                elapsed: start.elapsed(),
            });
        }

        let outcome = self.renderer.render_with_pump(
            self.scene,
            &self.camera,
            samples,
            self.ctx,
            &mut self.scratch,
            pump,
        )?;
        let elapsed = start.elapsed();

        if outcome == FrameOutcome::Completed {
            self.display.data.copy_from_slice(&self.scratch);
            if self.schedule.is_converged() {
                log::info!("Converged at {} samples per stratum", samples);
                self.converged = true;
            }
            self.schedule.advance();
        }

        self.sleep_remaining(start);
        Ok(FrameReport {
            samples,
            outcome,
            elapsed,
        })
    }

    fn sleep_remaining(&self, start: Instant) {
        if let Some(remaining) = self.frame_budget.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}
