//! # Public API
//!
//! Entry points that run the whole pipeline on a session string.
//!
//! ## Conversion Functions
//!
//! - [`render_abc()`] - Session string to ABC with default options
//! - [`render_abc_with_options()`] - Custom page width, stem layout, legend
//! - [`score_to_abc()`] - Already decoded (or hand-built) groove to ABC
//!
//! ## Typical Usage
//!
//! ```rust
//! use groove::render_abc;
//!
//! let conversion = render_abc("?TimeSig=4/4&Div=16&H=|x-x-x-x-x-x-x-x-|&S=|----O-------O---|&K=|o-------o-------|");
//! assert!(conversion.abc.contains("V:Hands"));
//! assert!(conversion.diagnostics.is_empty());
//! ```
//!
//! Conversion never fails: malformed input is corrected and reported in
//! [`Conversion::diagnostics`].

use crate::abc::to_abc;
use crate::config::RenderOptions;
use crate::error::Diagnostics;
use crate::groove::GrooveScore;
use crate::session::decode;

/// Result of one conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub score: GrooveScore,
    pub abc: String,
    pub diagnostics: Diagnostics,
}

/// Convert a session string to ABC with default options and surface id 0.
pub fn render_abc(query: &str) -> Conversion {
    render_abc_with_options(query, &RenderOptions::default(), 0)
}

/// Convert a session string to ABC.
///
/// # Example
/// ```rust
/// use groove::{render_abc_with_options, RenderOptions};
///
/// let options = RenderOptions { kick_stems_up: Some(false), ..RenderOptions::default() };
/// let conversion = render_abc_with_options("?Div=8", &options, 4);
/// assert!(conversion.abc.contains("%%fullsvg _4"));
/// assert!(conversion.abc.contains("V:Feet stem=down"));
/// ```
pub fn render_abc_with_options(query: &str, options: &RenderOptions, surface_id: u64) -> Conversion {
    let (score, diagnostics) = decode(query);
    let abc = score_to_abc(&score, options, surface_id);
    Conversion { score, abc, diagnostics }
}

/// Convert a groove to ABC.
pub fn score_to_abc(score: &GrooveScore, options: &RenderOptions, surface_id: u64) -> String {
    to_abc(score, options, surface_id)
}
