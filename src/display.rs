//! # Display Helpers
//!
//! The seam between the converter and whatever engraves ABC into an image.
//!
//! Every rendered document needs a unique display-surface id (written into
//! `%%fullsvg`). The counter is owned by the caller as a [`SurfaceIds`] value
//! and handed to [`render_groove`]; nothing here is global.
//!
//! ## Example
//! ```rust
//! use groove::{render_groove, Engraver, Engraving, RenderOptions, SurfaceIds};
//!
//! struct Echo;
//!
//! impl Engraver for Echo {
//!     fn engrave(&mut self, abc: &str) -> Engraving {
//!         Engraving { image: format!("<svg>{}</svg>", abc.len()), diagnostics: vec![] }
//!     }
//! }
//!
//! let (score, _) = groove::decode("?TimeSig=4/4&Div=8");
//! let mut ids = SurfaceIds::new();
//! let rendered = render_groove(&score, &RenderOptions::default(), &mut ids, &mut Echo);
//! assert_eq!(rendered.surface_id, 0);
//! assert!(rendered.abc.contains("%%fullsvg _0"));
//! assert_eq!(ids.peek(), 1);
//! ```

use crate::abc::to_abc;
use crate::config::RenderOptions;
use crate::groove::GrooveScore;

/// Caller-owned, monotonically increasing display-surface id counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceIds {
    next: u64,
}

impl SurfaceIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`SurfaceIds::next_id`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// What an engraver returns: an image (typically SVG) and its own messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engraving {
    pub image: String,
    pub diagnostics: Vec<String>,
}

/// Renders an ABC document. Implementations live outside this crate.
pub trait Engraver {
    fn engrave(&mut self, abc: &str) -> Engraving;
}

/// A groove rendered onto one display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGroove {
    pub surface_id: u64,
    pub abc: String,
    pub engraving: Engraving,
    /// Tempo and time signature line, when the groove asks for it.
    pub caption: Option<String>,
}

/// Caption shown next to an engraving: `♩ = 80  4/4`.
pub fn tempo_caption(score: &GrooveScore) -> String {
    format!("\u{2669} = {}  {}", score.tempo, score.meter)
}

/// Convert a groove, take a surface id for it and hand the document to the engraver.
pub fn render_groove(
    score: &GrooveScore,
    options: &RenderOptions,
    ids: &mut SurfaceIds,
    engraver: &mut dyn Engraver,
) -> RenderedGroove {
    let surface_id = ids.next_id();
    let abc = to_abc(score, options, surface_id);
    let engraving = engraver.engrave(&abc);
    for message in &engraving.diagnostics {
        log::warn!("engraver: {}", message);
    }

    let embed = options.embed_tempo_time_sig.unwrap_or(score.embed_tempo_time_sig);
    RenderedGroove {
        surface_id,
        abc,
        engraving,
        caption: embed.then(|| tempo_caption(score)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groove::MeterInfo;

    /// Records every document it is given.
    #[derive(Default)]
    struct RecordingEngraver {
        seen: Vec<String>,
    }

    impl Engraver for RecordingEngraver {
        fn engrave(&mut self, abc: &str) -> Engraving {
            self.seen.push(abc.to_string());
            Engraving {
                image: "<svg/>".to_string(),
                diagnostics: vec!["line 3: bar too long".to_string()],
            }
        }
    }

    #[test]
    fn test_ids_are_monotonic_and_caller_owned() {
        let mut ids = SurfaceIds::starting_at(7);
        assert_eq!(ids.next_id(), 7);
        assert_eq!(ids.next_id(), 8);
        assert_eq!(ids.peek(), 9);

        let mut other = SurfaceIds::new();
        assert_eq!(other.next_id(), 0);
    }

    #[test]
    fn test_render_consumes_one_id_per_document() {
        let score = GrooveScore::new(MeterInfo::default(), 16, 1);
        let mut ids = SurfaceIds::new();
        let mut engraver = RecordingEngraver::default();
        let first = render_groove(&score, &RenderOptions::default(), &mut ids, &mut engraver);
        let second = render_groove(&score, &RenderOptions::default(), &mut ids, &mut engraver);

        assert_eq!(first.surface_id, 0);
        assert_eq!(second.surface_id, 1);
        assert!(engraver.seen[1].contains("%%fullsvg _1\n"));
        assert_eq!(second.engraving.diagnostics.len(), 1);
        assert_eq!(first.caption, None);
    }

    #[test]
    fn test_caption() {
        let mut score = GrooveScore::new(MeterInfo::new(7, 8), 8, 1);
        score.tempo = 104;
        assert_eq!(tempo_caption(&score), "♩ = 104  7/8");

        score.embed_tempo_time_sig = true;
        let rendered = render_groove(&score, &RenderOptions::default(), &mut SurfaceIds::new(), &mut RecordingEngraver::default());
        assert_eq!(rendered.caption.as_deref(), Some("♩ = 104  7/8"));

        let options = RenderOptions { embed_tempo_time_sig: Some(false), ..RenderOptions::default() };
        let rendered = render_groove(&score, &options, &mut SurfaceIds::new(), &mut RecordingEngraver::default());
        assert_eq!(rendered.caption, None);
    }
}
