//! Lumen renderer - CPU path tracing with next-event estimation.
//!
//! This crate provides:
//!
//! - **Shapes**: spheres, triangles and STL meshes with area sampling
//! - **BRDFs**: Lambertian and perfect mirror
//! - **Estimator**: recursive path tracing with light sampling and
//!   Russian roulette
//! - **Renderers**: a tile-parallel interactive renderer with progressive
//!   refinement, and a rayon batch renderer
//!
//! # Example
//!
//! ```ignore
//! use lumen_renderer::{reference_camera, FrameRenderer, RenderContext, ScenePreset};
//!
//! let scene = ScenePreset::Cornell.build(None)?.scene;
//! let renderer = FrameRenderer::new(640, 480);
//! let ctx = RenderContext::new();
//! let mut buffer = vec![0.0; renderer.buffer_len()];
//! renderer.render(&scene, &reference_camera(), 4, &ctx, &mut buffer)?;
//! ```

pub mod auxiliary;
pub mod band;
pub mod brdf;
pub mod context;
pub mod error;
pub mod estimator;
pub mod mesh;
pub mod offline;
pub mod output;
pub mod presets;
pub mod progressive;
pub mod renderer;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod sphere;
pub mod triangle;

// Re-export commonly used types
pub use auxiliary::{compute_auxiliary, AuxiliaryBuffers};
pub use band::{generate_bands, Band};
pub use brdf::{Brdf, BrdfSample, Color};
pub use context::RenderContext;
pub use error::{RenderError, RenderResult, SceneError, SceneResult};
pub use estimator::{Estimator, RussianRoulette};
pub use mesh::MeshShape;
pub use offline::{render_offline, OfflineSettings};
pub use output::{to_display_byte, ImageBuffer};
pub use presets::{reference_camera, PresetScene, ScenePreset};
pub use progressive::{FrameLoop, FrameReport, SampleSchedule};
pub use renderer::{render_pixel, FrameOutcome, FrameRenderer, PixelSampling};
pub use scene::{Scene, SceneHit};
pub use shape::{Geometry, Hit, Shape, SurfaceSample};
pub use sphere::Sphere;
pub use triangle::Triangle;

// Re-export math types for convenience
pub use lumen_math::{Camera, Direction, Ray, Vec3};
