//! # Render Options
//!
//! Options that shape the ABC document but are not part of a groove: page
//! width, stem layout, legend, permutation mode.
//!
//! ## YAML
//! ```yaml
//! render-width: 900
//! kick-stems-up: false
//! show-legend: true
//! permutation: false
//! embed-tempo-time-sig: true
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use crate::error::GrooveError;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_RENDER_WIDTH: u32 = 600;
pub const MIN_RENDER_WIDTH: u32 = 400;
pub const MAX_RENDER_WIDTH: u32 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Page width in pixels before clamping.
    pub render_width: u32,
    /// Overrides the groove's own stem layout when set.
    pub kick_stems_up: Option<bool>,
    /// Adds the legend voices; ORed with the groove's flag.
    pub show_legend: bool,
    /// Permutation pages keep the last line unstretched.
    pub permutation: bool,
    /// Overrides the groove's `embedTempoTimeSig` when set.
    pub embed_tempo_time_sig: Option<bool>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            kick_stems_up: None,
            show_legend: false,
            permutation: false,
            embed_tempo_time_sig: None,
        }
    }
}

/// Raw options for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawRenderOptions {
    render_width: Option<u32>,
    kick_stems_up: Option<bool>,
    show_legend: Option<bool>,
    permutation: Option<bool>,
    embed_tempo_time_sig: Option<bool>,
}

impl RenderOptions {
    pub fn from_yaml(content: &str) -> Result<Self, GrooveError> {
        // an empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawRenderOptions =
            serde_yaml::from_str(content).map_err(|e| GrooveError::Config(e.to_string()))?;

        let defaults = Self::default();
        Ok(Self {
            render_width: raw.render_width.unwrap_or(defaults.render_width),
            kick_stems_up: raw.kick_stems_up,
            show_legend: raw.show_legend.unwrap_or(defaults.show_legend),
            permutation: raw.permutation.unwrap_or(defaults.permutation),
            embed_tempo_time_sig: raw.embed_tempo_time_sig,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrooveError> {
        let path = path.as_ref();
        log::debug!("loading render options from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Width written to `%%pagewidth`: clamped to 400..=3000, then scaled by 3/4.
    pub fn page_width(&self) -> u32 {
        self.render_width.clamp(MIN_RENDER_WIDTH, MAX_RENDER_WIDTH) * 3 / 4
    }
}
