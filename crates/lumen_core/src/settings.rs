//! Render settings shared by the interactive and offline renderers.
//!
//! Settings can be loaded from a JSON file; every field is optional there
//! and falls back to [`RenderSettings::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Cap for progressive refinement (samples per sub-pixel)
    pub max_samples: u32,
    /// Depths up to and including this always continue (interactive)
    pub rr_depth: u32,
    /// Continuation probability past `rr_depth` (interactive)
    pub rr_probability: f64,
    /// Depths up to and including this always continue (offline)
    pub offline_rr_depth: u32,
    /// Continuation probability past `offline_rr_depth` (offline)
    pub offline_rr_probability: f64,
    /// Samples per sub-pixel stratum for offline renders
    pub offline_samples: u32,
    /// Fixed seed for reproducible renders; random per frame when unset
    pub seed: Option<u64>,
    /// Worker threads; hardware concurrency when unset
    pub threads: Option<usize>,
    /// Target frame duration for the progressive loop
    pub frame_budget_ms: u64,
    /// Camera translation per held key per frame
    pub move_step: f64,
    /// Degrees of rotation per pixel of mouse motion
    pub mouse_sensitivity: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            max_samples: 128,
            rr_depth: 2,
            rr_probability: 0.0,
            offline_rr_depth: 5,
            offline_rr_probability: 0.9,
            offline_samples: 16,
            seed: None,
            threads: None,
            frame_budget_ms: 16,
            move_step: 0.5,
            mouse_sensitivity: 0.2,
        }
    }
}

impl RenderSettings {
    /// Parse settings from a JSON string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let settings: RenderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        log::info!("Loaded render settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings the renderer cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_samples == 0 || self.offline_samples == 0 {
            return Err(ConfigError::Invalid("sample counts must be at least 1".into()));
        }
        for (name, p) in [
            ("rr_probability", self.rr_probability),
            ("offline_rr_probability", self.offline_rr_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Number of render workers to spawn.
    pub fn thread_count(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.threads {
            Some(n) if n > max_threads => {
                log::warn!("Requested {} threads, only {} logical CPUs", n, max_threads);
                n
            }
            Some(n) => n,
            None => max_threads,
        }
    }
}
