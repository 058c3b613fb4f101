//! # Groove Data Model
//!
//! ## Type Hierarchy
//! ```text
//! GrooveScore
//!   ├── MeterInfo (time signature top/bottom)
//!   ├── division, notes_per_measure, measures (1..=10)
//!   ├── tempo (20..=400), swing
//!   ├── title / author / comments
//!   ├── NoteGrid per track (sticking, hi-hat, snare, kick, 4 toms)
//!   ├── RepeatMap (begins, ends, alternate endings)
//!   ├── MeasureTextMap (measure -> anchored text)
//!   └── display flags (kick stems up, show toms/stickings/legend)
//! ```
//!
//! ## Grid resolutions
//! A raw grid holds `notes_per_measure * measures` ticks. Before emission every
//! grid is scaled to the canonical resolution: 32 ticks per 4/4 measure, or 48
//! when the division is a triplet division. Index 0 is always the first tick of
//! measure 1.

use crate::error::{Diagnostics, GrooveError};
use crate::symbols::{Instrument, NoteSymbol, NUMBER_OF_TOMS};
use crate::tablature::parse_tablature;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const MAX_MEASURES: usize = 10;
pub const DEFAULT_TEMPO: u16 = 80;
pub const MIN_TEMPO: u16 = 20;
pub const MAX_TEMPO: u16 = 400;
pub const DEFAULT_DIVISION: usize = 16;
/// Finest session division: 32nd-note triplets.
pub const MAX_DIVISION: usize = 48;

/// Time signature. `top` is 1..=32, `bottom` is one of 2, 4, 8, 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterInfo {
    pub top: u8,
    pub bottom: u8,
}

impl Default for MeterInfo {
    fn default() -> Self {
        Self { top: 4, bottom: 4 }
    }
}

impl fmt::Display for MeterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.bottom)
    }
}

fn valid_top(top: i64) -> bool {
    (1..=32).contains(&top)
}

fn valid_bottom(bottom: i64) -> bool {
    matches!(bottom, 2 | 4 | 8 | 16)
}

impl MeterInfo {
    /// Build a meter, resetting an out-of-range part to 4.
    pub fn new(top: i64, bottom: i64) -> Self {
        Self {
            top: if valid_top(top) { top as u8 } else { 4 },
            bottom: if valid_bottom(bottom) { bottom as u8 } else { 4 },
        }
    }

    /// Parse "top/bottom" and reject anything out of range.
    pub fn from_str_strict(s: &str) -> Result<Self, GrooveError> {
        let (top, bottom) = s
            .split_once('/')
            .ok_or_else(|| GrooveError::TimeSignature(format!("expected top/bottom, got '{}'", s)))?;
        let top: i64 = top
            .trim()
            .parse()
            .map_err(|_| GrooveError::TimeSignature(format!("top '{}' is not a number", top)))?;
        let bottom: i64 = bottom
            .trim()
            .parse()
            .map_err(|_| GrooveError::TimeSignature(format!("bottom '{}' is not a number", bottom)))?;
        if !valid_top(top) {
            return Err(GrooveError::TimeSignature(format!("top {} is outside 1..=32", top)));
        }
        if !valid_bottom(bottom) {
            return Err(GrooveError::TimeSignature(format!("bottom {} must be 2, 4, 8 or 16", bottom)));
        }
        Ok(Self { top: top as u8, bottom: bottom as u8 })
    }

    /// Lenient parse: a malformed string falls back to 4/4, an out-of-range
    /// part resets to 4. Never fails.
    pub fn parse_or_default(s: &str, diags: &mut Diagnostics) -> Self {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            diags.push(format!("Malformed time signature '{}', using 4/4", s));
            return Self::default();
        }
        let top = parse_leading_int(parts[0]).unwrap_or(-1);
        let bottom = parse_leading_int(parts[1]).unwrap_or(-1);
        let meter = Self::new(top, bottom);
        if i64::from(meter.top) != top || i64::from(meter.bottom) != bottom {
            diags.push(format!("Time signature '{}' out of range, using {}", s, meter));
        }
        meter
    }

    pub fn top(&self) -> usize {
        usize::from(self.top)
    }

    pub fn bottom(&self) -> usize {
        usize::from(self.bottom)
    }

    /// Ticks per measure for a division: `division * top / bottom`, at least 1.
    pub fn notes_per_measure(&self, division: usize) -> usize {
        (division.saturating_mul(self.top()) / self.bottom()).max(1)
    }

    /// True when the implied division (`notes_per_measure / top * bottom`) is a multiple of 12.
    pub fn is_triplet(&self, notes_per_measure: usize) -> bool {
        (notes_per_measure * self.bottom()) % (12 * self.top()) == 0
    }

    /// Canonical ticks per measure: 48 (triplet) or 32, scaled by top/bottom.
    pub fn canonical_per_measure(&self, triplet: bool) -> usize {
        let base = if triplet { 48 } else { 32 };
        base * self.top() / self.bottom()
    }
}

/// Lenient integer read: optional sign, then leading digits. Trailing text is ignored.
pub(crate) fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Ordered ticks of one track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteGrid {
    ticks: Vec<NoteSymbol>,
}

impl NoteGrid {
    /// An all-silent grid of `len` ticks.
    pub fn silent(len: usize) -> Self {
        Self { ticks: vec![NoteSymbol::Off; len] }
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Symbol at `index`; ticks past the end are silent.
    pub fn get(&self, index: usize) -> NoteSymbol {
        self.ticks.get(index).copied().unwrap_or_default()
    }

    pub fn is_active(&self, index: usize) -> bool {
        !self.get(index).is_off()
    }

    pub fn set(&mut self, index: usize, symbol: NoteSymbol) {
        if let Some(slot) = self.ticks.get_mut(index) {
            *slot = symbol;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = NoteSymbol> + '_ {
        self.ticks.iter().copied()
    }

    pub fn as_slice(&self) -> &[NoteSymbol] {
        &self.ticks
    }

    pub fn has_notes(&self) -> bool {
        self.ticks.iter().any(|s| !s.is_off())
    }
}

impl From<Vec<NoteSymbol>> for NoteGrid {
    fn from(ticks: Vec<NoteSymbol>) -> Self {
        Self { ticks }
    }
}

/// Repeat markers, keyed by 1-indexed measure number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatMap {
    pub begins: BTreeSet<usize>,
    pub ends: BTreeSet<usize>,
    /// Alternate ending label ("1", "2", ...) per measure.
    pub endings: BTreeMap<usize, String>,
}

/// Where measure text attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Begin,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureText {
    pub anchor: Anchor,
    pub text: String,
}

pub type MeasureTextMap = BTreeMap<usize, MeasureText>;

/// Everything needed to render one groove.
#[derive(Debug, Clone, PartialEq)]
pub struct GrooveScore {
    pub meter: MeterInfo,
    /// Time division from the session (4, 8, 12, 16, 24, 32, 48, ...).
    pub division: usize,
    pub notes_per_measure: usize,
    pub measures: usize,
    pub tempo: u16,
    /// Swing percentage; carried for playback collaborators, not notated.
    pub swing: u8,
    pub title: String,
    pub author: String,
    pub comments: String,
    pub sticking: NoteGrid,
    pub hihat: NoteGrid,
    pub snare: NoteGrid,
    pub kick: NoteGrid,
    pub toms: [NoteGrid; NUMBER_OF_TOMS],
    pub repeats: RepeatMap,
    pub measure_text: MeasureTextMap,
    pub kick_stems_up: bool,
    pub show_toms: bool,
    pub show_stickings: bool,
    pub show_legend: bool,
    pub embed_tempo_time_sig: bool,
}

impl GrooveScore {
    /// A silent groove. The measure count is clamped into 1..=10; a division
    /// outside 1..=48 is replaced by 16.
    pub fn new(meter: MeterInfo, division: usize, measures: usize) -> Self {
        let division = if (1..=MAX_DIVISION).contains(&division) { division } else { DEFAULT_DIVISION };
        let notes_per_measure = meter.notes_per_measure(division);
        let measures = measures.clamp(1, MAX_MEASURES);
        let len = notes_per_measure * measures;
        Self {
            meter,
            division,
            notes_per_measure,
            measures,
            tempo: DEFAULT_TEMPO,
            swing: 0,
            title: String::new(),
            author: String::new(),
            comments: String::new(),
            sticking: NoteGrid::silent(len),
            hihat: NoteGrid::silent(len),
            snare: NoteGrid::silent(len),
            kick: NoteGrid::silent(len),
            toms: std::array::from_fn(|_| NoteGrid::silent(len)),
            repeats: RepeatMap::default(),
            measure_text: MeasureTextMap::new(),
            kick_stems_up: true,
            show_toms: false,
            show_stickings: false,
            show_legend: false,
            embed_tempo_time_sig: false,
        }
    }

    /// Parse a tablature line into the given track.
    pub fn set_track(&mut self, instrument: Instrument, tablature: &str, diags: &mut Diagnostics) {
        let grid = parse_tablature(instrument, tablature, self.notes_per_measure, self.measures, diags);
        *self.track_mut(instrument) = grid;
    }

    pub fn track(&self, instrument: Instrument) -> &NoteGrid {
        match instrument {
            Instrument::Sticking => &self.sticking,
            Instrument::HiHat => &self.hihat,
            Instrument::Snare => &self.snare,
            Instrument::Kick => &self.kick,
            Instrument::Tom(n) => &self.toms[tom_index(n)],
        }
    }

    pub fn track_mut(&mut self, instrument: Instrument) -> &mut NoteGrid {
        match instrument {
            Instrument::Sticking => &mut self.sticking,
            Instrument::HiHat => &mut self.hihat,
            Instrument::Snare => &mut self.snare,
            Instrument::Kick => &mut self.kick,
            Instrument::Tom(n) => &mut self.toms[tom_index(n)],
        }
    }

    /// Set the tempo, resetting to the default when outside 20..=400.
    pub fn set_tempo(&mut self, tempo: i64, diags: &mut Diagnostics) {
        if (i64::from(MIN_TEMPO)..=i64::from(MAX_TEMPO)).contains(&tempo) {
            self.tempo = tempo as u16;
        } else {
            diags.push(format!("Tempo {} outside {}..={}, using {}", tempo, MIN_TEMPO, MAX_TEMPO, DEFAULT_TEMPO));
            self.tempo = DEFAULT_TEMPO;
        }
    }

    pub fn is_triplet(&self) -> bool {
        self.meter.is_triplet(self.notes_per_measure)
    }
}

fn tom_index(n: u8) -> usize {
    usize::from(n.clamp(1, NUMBER_OF_TOMS as u8)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triplet_detection() {
        let four_four = MeterInfo::default();
        assert!(!four_four.is_triplet(16));
        assert!(!four_four.is_triplet(8));
        assert!(four_four.is_triplet(12));
        assert!(four_four.is_triplet(24));
        assert!(four_four.is_triplet(48));
        // 3/4 with a 16th division has 12 ticks per measure but is not a triplet feel
        let three_four = MeterInfo::new(3, 4);
        assert!(!three_four.is_triplet(three_four.notes_per_measure(16)));
        assert!(three_four.is_triplet(three_four.notes_per_measure(12)));
        // 6/8 with a 12 division
        let six_eight = MeterInfo::new(6, 8);
        assert_eq!(six_eight.notes_per_measure(12), 9);
        assert!(six_eight.is_triplet(9));
    }

    #[test]
    fn test_triplet_matches_implied_division_for_all_meters() {
        for top in 1..=32i64 {
            for bottom in [2i64, 4, 8, 16] {
                let meter = MeterInfo::new(top, bottom);
                for division in [4usize, 8, 12, 16, 24, 32, 48] {
                    let npm = division * top as usize / bottom as usize;
                    if npm == 0 || (npm * bottom as usize) % top as usize != 0 {
                        continue;
                    }
                    let implied = npm * bottom as usize / top as usize;
                    assert_eq!(meter.is_triplet(npm), implied % 12 == 0, "{}/{} npm {}", top, bottom, npm);
                }
            }
        }
    }

    #[test]
    fn test_canonical_per_measure() {
        assert_eq!(MeterInfo::default().canonical_per_measure(false), 32);
        assert_eq!(MeterInfo::default().canonical_per_measure(true), 48);
        assert_eq!(MeterInfo::new(3, 4).canonical_per_measure(false), 24);
        assert_eq!(MeterInfo::new(6, 8).canonical_per_measure(false), 24);
        assert_eq!(MeterInfo::new(7, 16).canonical_per_measure(true), 21);
    }

    #[test]
    fn test_meter_resets_out_of_range_parts() {
        assert_eq!(MeterInfo::new(33, 4), MeterInfo::new(4, 4));
        assert_eq!(MeterInfo::new(0, 8), MeterInfo { top: 4, bottom: 8 });
        assert_eq!(MeterInfo::new(5, 3), MeterInfo { top: 5, bottom: 4 });
    }

    #[test]
    fn test_parse_or_default() {
        let mut diags = Diagnostics::new();
        assert_eq!(MeterInfo::parse_or_default("7/8", &mut diags), MeterInfo { top: 7, bottom: 8 });
        assert!(diags.is_empty());

        assert_eq!(MeterInfo::parse_or_default("44", &mut diags), MeterInfo::default());
        assert_eq!(MeterInfo::parse_or_default("5/6", &mut diags), MeterInfo { top: 5, bottom: 4 });
        assert_eq!(MeterInfo::parse_or_default("x/8", &mut diags), MeterInfo { top: 4, bottom: 8 });
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_from_str_strict() {
        assert_eq!(MeterInfo::from_str_strict("12/8").unwrap(), MeterInfo { top: 12, bottom: 8 });
        assert!(matches!(MeterInfo::from_str_strict("4"), Err(GrooveError::TimeSignature(_))));
        assert!(MeterInfo::from_str_strict("4/5").is_err());
        assert!(MeterInfo::from_str_strict("40/4").is_err());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("120"), Some(120));
        assert_eq!(parse_leading_int(" 12abc"), Some(12));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_new_score_clamps_measures() {
        let score = GrooveScore::new(MeterInfo::default(), 16, 0);
        assert_eq!(score.measures, 1);
        let score = GrooveScore::new(MeterInfo::default(), 16, 25);
        assert_eq!(score.measures, MAX_MEASURES);
        assert_eq!(score.hihat.len(), 16 * MAX_MEASURES);
        assert!(!score.hihat.has_notes());
    }

    #[test]
    fn test_new_score_resets_oversized_division() {
        let score = GrooveScore::new(MeterInfo::default(), usize::MAX, 1);
        assert_eq!(score.division, DEFAULT_DIVISION);
        assert_eq!(score.notes_per_measure, 16);
        assert_eq!(MeterInfo::new(32, 2).notes_per_measure(usize::MAX), usize::MAX / 2);
    }

    #[test]
    fn test_set_tempo_resets_out_of_range() {
        let mut diags = Diagnostics::new();
        let mut score = GrooveScore::new(MeterInfo::default(), 16, 1);
        score.set_tempo(120, &mut diags);
        assert_eq!(score.tempo, 120);
        score.set_tempo(401, &mut diags);
        assert_eq!(score.tempo, DEFAULT_TEMPO);
        score.set_tempo(19, &mut diags);
        assert_eq!(score.tempo, DEFAULT_TEMPO);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_grid_reads_past_end_as_silent() {
        let grid = NoteGrid::silent(2);
        assert_eq!(grid.get(10), NoteSymbol::Off);
        assert!(!grid.is_active(10));
    }

    #[test]
    fn test_set_track_routes_to_tom() {
        let mut diags = Diagnostics::new();
        let mut score = GrooveScore::new(MeterInfo::default(), 16, 1);
        score.set_track(Instrument::Tom(3), "o---------------", &mut diags);
        assert_eq!(score.toms[2].get(0), NoteSymbol::Tom(3));
        assert!(!score.toms[0].has_notes());
    }
}
