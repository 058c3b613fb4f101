//! # Tablature Parser
//!
//! Turns one per-instrument tablature line into a [`NoteGrid`], and turns grids
//! back into tablature lines for edit round-tripping.
//!
//! ## Length reconciliation
//! A line written for a different resolution is stretched or thinned to fit:
//! - at least twice as long as wanted: take every `ceil(len / want)`-th character
//! - at most half as long as wanted: place characters `ceil(want / len)` ticks apart
//! - otherwise: copy directly, truncating or padding with silence
//!
//! ## Example
//! ```rust
//! use groove::{parse_tablature, Diagnostics, Instrument};
//!
//! let mut diags = Diagnostics::new();
//! // an 8th-note line on a 16th-note board is spread out
//! let grid = parse_tablature(Instrument::HiHat, "|x-x-x-x-|", 16, 1, &mut diags);
//! assert_eq!(grid.len(), 16);
//! assert!(grid.is_active(0));
//! assert!(!grid.is_active(1));
//! assert!(grid.is_active(4));
//! assert!(diags.is_empty());
//! ```

use crate::error::Diagnostics;
use crate::groove::NoteGrid;
use crate::symbols::{lookup, Instrument, NoteSymbol, DECORATIVE_CHARS};

/// Parse a tablature line into exactly `notes_per_measure * measures` ticks.
///
/// Unknown characters become silence and are reported in `diags`.
pub fn parse_tablature(
    instrument: Instrument,
    raw: &str,
    notes_per_measure: usize,
    measures: usize,
    diags: &mut Diagnostics,
) -> NoteGrid {
    let want = notes_per_measure * measures;
    let mut grid = NoteGrid::silent(want);

    let notes: Vec<char> = raw.chars().filter(|c| !DECORATIVE_CHARS.contains(c)).collect();
    if notes.is_empty() || want == 0 {
        return grid;
    }

    let mut read_stride = 1;
    let mut write_stride = 1;
    if notes.len() >= 2 * want {
        read_stride = notes.len().div_ceil(want);
    } else if notes.len() * 2 <= want {
        write_stride = want.div_ceil(notes.len());
    }
    log::trace!(
        "{}: {} chars into {} ticks (read stride {}, write stride {})",
        instrument,
        notes.len(),
        want,
        read_stride,
        write_stride
    );

    for (tick, &c) in (0..want)
        .step_by(write_stride)
        .zip(notes.iter().step_by(read_stride))
    {
        let symbol = lookup(instrument, c).unwrap_or_else(|| {
            diags.push(format!("Bad tablature note '{}' for drum type {}", c, instrument));
            NoteSymbol::Off
        });
        grid.set(tick, symbol);
    }

    grid
}

/// Build a tablature line from a grid.
///
/// `accents` and `others` filter what is written: hi-hat `X` and snare/kick
/// `o`/`O` are accents, everything else is an other; a kick `X` splits into
/// `o` (accents only) and `x` (others only). A `|` is appended every
/// `separator_distance` ticks when it is non-zero.
pub fn tab_line(
    instrument: Instrument,
    grid: &NoteGrid,
    accents: bool,
    others: bool,
    max_len: usize,
    separator_distance: usize,
) -> String {
    let len = max_len.min(grid.len());
    let mut line = String::with_capacity(len + len / separator_distance.max(1) + 1);

    for (i, symbol) in grid.iter().take(len).enumerate() {
        let c = symbol.tab_char(instrument);
        let written = match (instrument, c) {
            (Instrument::HiHat, 'X') => if accents { c } else { '-' },
            (Instrument::Kick | Instrument::Snare, 'o' | 'O') => if accents { c } else { '-' },
            (Instrument::Kick, 'X') => match (accents, others) {
                (true, true) => 'X',
                (true, false) => 'o',
                (false, _) => 'x',
            },
            _ => if others { c } else { '-' },
        };
        line.push(written);

        if separator_distance > 0 && (i + 1) % separator_distance == 0 {
            line.push('|');
        }
    }

    line
}

/// Default tablature for a track that was not given, in the original editor's
/// layout: `|` before every measure and at the end.
///
/// Hi-hat plays every tick (nothing at 48 ticks per measure), snare accents the
/// first tick of every odd beat group, kick plays the first tick of every even
/// beat group, stickings and toms are empty.
pub fn default_tablature(instrument: Instrument, notes_per_measure: usize, time_sig_top: usize, measures: usize) -> String {
    let per_group = (notes_per_measure / time_sig_top.max(1)).max(1);
    let measure: String = (0..notes_per_measure)
        .map(|i| {
            let on_group = i % per_group == 0;
            let group = i / per_group;
            match instrument {
                Instrument::HiHat if notes_per_measure == 48 => '-',
                Instrument::HiHat => 'x',
                Instrument::Snare if on_group && group % 2 == 1 => 'O',
                Instrument::Kick if on_group && group % 2 == 0 => 'o',
                _ => '-',
            }
        })
        .collect();

    let mut line = String::with_capacity((notes_per_measure + 1) * measures + 1);
    for _ in 0..measures {
        line.push('|');
        line.push_str(&measure);
    }
    line.push('|');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{HiHat, Kick, Snare};

    fn parse(instrument: Instrument, raw: &str, npm: usize, measures: usize) -> (NoteGrid, Diagnostics) {
        let mut diags = Diagnostics::new();
        let grid = parse_tablature(instrument, raw, npm, measures, &mut diags);
        (grid, diags)
    }

    #[test]
    fn test_decorations_are_stripped() {
        let (grid, diags) = parse(Instrument::Snare, "|:----O---!(-)[---]O---:|", 16, 1);
        assert!(diags.is_empty());
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.get(4), NoteSymbol::Snare(Snare::Accent));
        assert_eq!(grid.get(12), NoteSymbol::Snare(Snare::Accent));
        assert_eq!(grid.iter().filter(|s| !s.is_off()).count(), 2);
    }

    #[test]
    fn test_unknown_character_is_silent_with_diagnostic() {
        let (grid, diags) = parse(Instrument::Kick, "o-q-", 4, 1);
        assert_eq!(grid.get(0), NoteSymbol::Kick(Kick::Normal));
        assert_eq!(grid.get(2), NoteSymbol::Off);
        assert_eq!(diags.len(), 1);
        assert!(diags.mentions("'q'"));
    }

    #[test]
    fn test_downsample_takes_every_stride_character() {
        // 32 chars onto a 16 tick board: stride 2
        let (grid, _) = parse(Instrument::HiHat, "x-X-o-+-x-X-o-+-x-X-o-+-x-X-o-+-", 16, 1);
        assert_eq!(grid.get(0), NoteSymbol::HiHat(HiHat::Normal));
        assert_eq!(grid.get(1), NoteSymbol::HiHat(HiHat::Accent));
        assert_eq!(grid.get(2), NoteSymbol::HiHat(HiHat::Open));
        assert_eq!(grid.get(3), NoteSymbol::HiHat(HiHat::Close));
        assert_eq!(grid.iter().filter(|s| !s.is_off()).count(), 16);
    }

    #[test]
    fn test_upsample_spreads_characters() {
        let (grid, _) = parse(Instrument::HiHat, "xxxx", 16, 1);
        let active: Vec<usize> = (0..16).filter(|&i| grid.is_active(i)).collect();
        assert_eq!(active, vec![0, 4, 8, 12]);
    }

    #[test]
    fn test_in_between_lengths_truncate_or_pad() {
        // 12 chars on a 16 tick board: copied directly, padded with silence
        let (grid, _) = parse(Instrument::HiHat, "xxxxxxxxxxxx", 16, 1);
        assert_eq!((0..16).filter(|&i| grid.is_active(i)).count(), 12);
        assert!(!grid.is_active(12));

        // 20 chars: truncated to 16
        let (grid, _) = parse(Instrument::HiHat, "xxxxxxxxxxxxxxxxxxxx", 16, 1);
        assert_eq!(grid.len(), 16);
        assert!((0..16).all(|i| grid.is_active(i)));
    }

    #[test]
    fn test_empty_line_is_silent() {
        let (grid, diags) = parse(Instrument::Snare, "||", 8, 2);
        assert_eq!(grid.len(), 16);
        assert!(!grid.has_notes());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_tab_line_filters() {
        let (grid, _) = parse(Instrument::HiHat, "xXo-", 4, 1);
        assert_eq!(tab_line(Instrument::HiHat, &grid, true, true, 4, 0), "xXo-");
        assert_eq!(tab_line(Instrument::HiHat, &grid, true, false, 4, 0), "-X--");
        assert_eq!(tab_line(Instrument::HiHat, &grid, false, true, 4, 0), "x-o-");

        let (grid, _) = parse(Instrument::Kick, "oxX-", 4, 1);
        assert_eq!(tab_line(Instrument::Kick, &grid, true, true, 4, 0), "oxX-");
        assert_eq!(tab_line(Instrument::Kick, &grid, true, false, 4, 0), "o-o-");
        assert_eq!(tab_line(Instrument::Kick, &grid, false, true, 4, 0), "-xx-");
    }

    #[test]
    fn test_tab_line_separators_and_max_len() {
        let (grid, _) = parse(Instrument::Snare, "o-O-g-f-", 4, 2);
        assert_eq!(tab_line(Instrument::Snare, &grid, true, true, 8, 4), "o-O-|g-f-|");
        assert_eq!(tab_line(Instrument::Snare, &grid, true, true, 3, 0), "o-O");
        assert_eq!(tab_line(Instrument::Snare, &grid, true, true, 100, 0).len(), 8);
    }

    #[test]
    fn test_default_grooves() {
        assert_eq!(default_tablature(Instrument::HiHat, 8, 4, 1), "|xxxxxxxx|");
        assert_eq!(default_tablature(Instrument::HiHat, 48, 4, 1), format!("|{}|", "-".repeat(48)));
        assert_eq!(default_tablature(Instrument::Snare, 16, 4, 1), "|----O-------O---|");
        assert_eq!(default_tablature(Instrument::Kick, 16, 4, 2), "|o-------o-------|o-------o-------|");
        assert_eq!(default_tablature(Instrument::Tom(2), 4, 4, 1), "|----|");
        assert_eq!(default_tablature(Instrument::Sticking, 4, 4, 1), "|----|");
    }

    #[test]
    fn test_default_groove_parses_without_diagnostics() {
        for instrument in Instrument::ALL {
            let line = default_tablature(instrument, 16, 4, 2);
            let (grid, diags) = parse(instrument, &line, 16, 2);
            assert!(diags.is_empty(), "{}", instrument);
            assert_eq!(grid.len(), 32);
        }
    }
}
