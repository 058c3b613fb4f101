//! Sticking count derivation.
//!
//! A `c` in the sticking line is a placeholder for the spoken count at that
//! position ("1 e & a", "1 & a", ...). Placeholders are resolved once, on the
//! canonical grid, right before emission, so a count label never leaks back
//! into an encoded session.

use crate::groove::{MeterInfo, NoteGrid};
use crate::symbols::{NoteSymbol, Sticking};
use std::borrow::Cow;

/// Count label for position `index` of a measure of `notes_per_measure` ticks
/// at `division`.
///
/// The implied division `division * 4 / bottom` picks the counting scheme:
/// quarters count beats, eighths add `&`, triplet divisions cycle `& a`,
/// everything else cycles `e & a`.
pub fn count_label(index: usize, notes_per_measure: usize, division: usize, time_sig_bottom: usize) -> String {
    let note_index = index % notes_per_measure.max(1);
    let implied = division * 4 / time_sig_bottom.max(1);
    let triplet_suffix = |beat: usize| match note_index % 3 {
        0 => beat.to_string(),
        1 => "&".to_string(),
        _ => "a".to_string(),
    };

    match implied {
        4 => (note_index + 1).to_string(),
        8 if note_index % 2 == 0 => (note_index / 2 + 1).to_string(),
        8 => "&".to_string(),
        12 => triplet_suffix(note_index / 3 + 1),
        24 => triplet_suffix(note_index / 6 + 1),
        48 => triplet_suffix(note_index / 12 + 1),
        _ => match note_index % 4 {
            // beat length is division / bottom ticks
            0 => (note_index * time_sig_bottom / division.max(1) + 1).to_string(),
            1 => "e".to_string(),
            2 => "&".to_string(),
            _ => "a".to_string(),
        },
    }
}

/// ABC tokens of the canonical sticking grid, with count placeholders resolved.
pub fn sticking_lane(grid: &NoteGrid, division: usize, meter: MeterInfo, triplet: bool) -> Vec<Option<Cow<'static, str>>> {
    let canonical_per_measure = meter.canonical_per_measure(triplet).max(1);
    let notes_per_measure = meter.notes_per_measure(division);

    grid.iter()
        .enumerate()
        .map(|(i, symbol)| match symbol {
            NoteSymbol::Sticking(Sticking::CountPlaceholder) => {
                let adjusted = i * notes_per_measure / canonical_per_measure;
                let label = count_label(adjusted, notes_per_measure, division, meter.bottom());
                Some(Cow::Owned(format!("\"{}\"x", label)))
            }
            other => other.abc_token().map(Cow::Borrowed),
        })
        .collect()
}
