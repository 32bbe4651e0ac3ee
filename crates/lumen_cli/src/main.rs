use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lumen_core::RenderSettings;
use lumen_renderer::{
    compute_auxiliary, reference_camera, render_offline, FrameLoop, FrameOutcome, FrameRenderer,
    ImageBuffer, OfflineSettings, RenderContext, Scene, ScenePreset,
};

/// Lumen: a Monte Carlo path tracer.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one high quality image.
    Offline {
        #[command(flatten)]
        common: CommonArgs,

        /// Output image; `.ppm` or any format the image crate knows.
        #[arg(short, long, value_name = "FILE", default_value = "image.ppm")]
        output: PathBuf,

        /// Samples per stratum (each pixel has 2x2 strata).
        #[arg(short, long, value_name = "NUM")]
        samples: Option<u32>,

        /// Also write `<PREFIX>_albedo.png` and `<PREFIX>_normal.png`.
        #[arg(long, value_name = "PREFIX")]
        aux_prefix: Option<String>,
    },

    /// Run the progressive frame loop headless and save the last frame.
    Progressive {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of frames to run.
        #[arg(long, value_name = "NUM", default_value_t = 16)]
        frames: u32,

        /// Output image for the last completed frame.
        #[arg(short, long, value_name = "FILE", default_value = "progressive.ppm")]
        output: PathBuf,

        /// Nudge the camera every few frames to exercise restarts.
        #[arg(long)]
        orbit: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON render settings; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Worker threads (default: one per logical CPU).
    #[arg(short = 't', long, value_name = "NUM")]
    threads: Option<usize>,

    /// Fixed random seed for reproducible output.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Scene preset: cornell, cornell-large-light or cornell-mesh.
    #[arg(long, default_value = "cornell")]
    scene: ScenePreset,

    /// Binary STL file for the cornell-mesh preset.
    #[arg(long, value_name = "FILE")]
    mesh: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl CommonArgs {
    fn settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.config {
            Some(path) => RenderSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => RenderSettings::default(),
        };

        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if self.threads.is_some() {
            settings.threads = self.threads;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        settings.validate().context("Invalid render settings")?;
        Ok(settings)
    }

    fn scene(&self) -> Result<Scene> {
        let preset = self
            .scene
            .build(self.mesh.as_deref())
            .with_context(|| format!("Failed to build scene '{}'", self.scene))?;
        if let Some(err) = &preset.mesh_error {
            log::error!("Rendering without the mesh: {}", err);
        }
        Ok(preset.scene)
    }
}

impl Command {
    fn common(&self) -> &CommonArgs {
        match self {
            Command::Offline { common, .. } | Command::Progressive { common, .. } => common,
        }
    }
}

fn run_offline(
    scene: &Scene,
    settings: &RenderSettings,
    output: &Path,
    samples: Option<u32>,
    aux_prefix: Option<&str>,
) -> Result<()> {
    let camera = reference_camera();
    let mut offline = OfflineSettings::from_settings(settings);
    if let Some(samples) = samples {
        offline.samples = samples.max(1);
    }
    log::info!("Offline seed {}", offline.seed);

    let image = render_offline(scene, &camera, &offline)?;
    image
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(prefix) = aux_prefix {
        let aux = compute_auxiliary(scene, &camera, settings.width, settings.height)?;
        // Map normals from [-1, 1] into displayable range.
        let normal = ImageBuffer {
            data: aux.normal.data.iter().map(|n| n * 0.5 + 0.5).collect(),
            ..aux.normal
        };
        aux.albedo.save(format!("{prefix}_albedo.png"))?;
        normal.save(format!("{prefix}_normal.png"))?;
    }
    Ok(())
}

fn run_progressive(
    scene: &Scene,
    settings: &RenderSettings,
    frames: u32,
    output: &Path,
    orbit: bool,
) -> Result<()> {
    let renderer = FrameRenderer::from_settings(settings);
    let ctx = RenderContext::new();
    let mut frame_loop = FrameLoop::new(&renderer, scene, &ctx, reference_camera(), settings);
    log::info!(
        "Progressive loop: {} frames on {} workers",
        frames,
        renderer.workers()
    );

    let start = Instant::now();
    let mut cancelled = 0;
    for frame in 0..frames {
        // Simulated mouse motion lands while the frame is in flight.
        let nudge = orbit && frame % 4 == 3;
        let mut pumps = 0u32;
        let report = frame_loop.step(|| {
            pumps += 1;
            if nudge && pumps == 1 {
                ctx.add_mouse_delta(5, 0);
            }
        })?;
        if report.outcome == FrameOutcome::Cancelled {
            cancelled += 1;
        }
        log::info!(
            "Frame {:>3}: {:>3} spp {:?} in {:.2?} ({} pumps)",
            frame,
            report.samples,
            report.outcome,
            report.elapsed,
            pumps
        );
    }

    log::info!(
        "Ran {} frames in {:.2?}, {} cancelled, final yaw {:.1}",
        frames,
        start.elapsed(),
        cancelled,
        frame_loop.camera().yaw()
    );

    frame_loop
        .into_display()
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = cli.command.common();

    let level = if common.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let settings = common.settings()?;
    let scene = common.scene()?;
    log::info!(
        "Rendering '{}' at {}x{}",
        common.scene,
        settings.width,
        settings.height
    );

    match &cli.command {
        Command::Offline {
            output,
            samples,
            aux_prefix,
            ..
        } => run_offline(&scene, &settings, output, *samples, aux_prefix.as_deref()),
        Command::Progressive {
            frames,
            output,
            orbit,
            ..
        } => run_progressive(&scene, &settings, *frames, output, *orbit),
    }
}
