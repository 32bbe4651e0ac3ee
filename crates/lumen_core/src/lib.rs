//! Lumen Core - geometry loading and render configuration.
//!
//! This crate provides:
//!
//! - **Mesh input**: binary STL triangle soups with recentring and rescaling
//! - **Settings**: `RenderSettings`, loadable from JSON
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{load_stl, MeshPlacement};
//!
//! let mut soup = load_stl("bunny.stl")?;
//! soup.place(&MeshPlacement { scale: 30.0, ..Default::default() });
//! println!("Loaded {} triangles", soup.len());
//! ```

pub mod error;
pub mod mesh;
pub mod settings;

// Re-export commonly used types
pub use error::{ConfigError, ConfigResult, MeshError, MeshResult};
pub use mesh::{load_stl, read_stl, write_stl, MeshPlacement, TriangleSoup};
pub use settings::RenderSettings;
