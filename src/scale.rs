//! Resolution scaling from the session grid to the canonical ABC grid.
//!
//! ABC output uses `L:1/32`, so one canonical tick is a 32nd note (or a
//! 32nd-note triplet slot when the groove is in a triplet feel). A session grid
//! at a coarser division is spread out by an integer scaler, inserting silence
//! between the original ticks.

use crate::groove::{MeterInfo, NoteGrid};

/// Canonical ticks per session tick: `ceil(canonical_per_measure / notes_per_measure)`.
pub fn note_scaler(notes_per_measure: usize, meter: MeterInfo) -> usize {
    let triplet = meter.is_triplet(notes_per_measure);
    meter
        .canonical_per_measure(triplet)
        .div_ceil(notes_per_measure.max(1))
        .max(1)
}

/// Spread `grid` onto the canonical grid. Tick `i` lands on `i * scaler`; the
/// result holds `measures * notes_per_measure * scaler` ticks.
pub fn scale_to_canonical(grid: &NoteGrid, measures: usize, notes_per_measure: usize, meter: MeterInfo) -> NoteGrid {
    let scaler = note_scaler(notes_per_measure, meter);
    let len = measures * notes_per_measure;
    if scaler == 1 {
        return NoteGrid::from(grid.iter().take(len).collect::<Vec<_>>());
    }

    let mut scaled = NoteGrid::silent(len * scaler);
    for (i, symbol) in grid.iter().take(len).enumerate() {
        scaled.set(i * scaler, symbol);
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::symbols::Instrument;
    use crate::tablature::parse_tablature;

    fn grid(instrument: Instrument, tab: &str, npm: usize, measures: usize) -> NoteGrid {
        parse_tablature(instrument, tab, npm, measures, &mut Diagnostics::new())
    }

    #[test]
    fn test_scaler_values() {
        let four_four = MeterInfo::default();
        assert_eq!(note_scaler(8, four_four), 4);
        assert_eq!(note_scaler(16, four_four), 2);
        assert_eq!(note_scaler(32, four_four), 1);
        assert_eq!(note_scaler(12, four_four), 4);
        assert_eq!(note_scaler(24, four_four), 2);
        assert_eq!(note_scaler(48, four_four), 1);
        let six_eight = MeterInfo::new(6, 8);
        assert_eq!(note_scaler(12, six_eight), 2);
    }

    #[test]
    fn test_identity_at_canonical_resolution() {
        let original = grid(Instrument::HiHat, "x-x-X-x-x-x-x-x-x-x-x-x-x-x-x-xo", 32, 1);
        let scaled = scale_to_canonical(&original, 1, 32, MeterInfo::default());
        assert_eq!(scaled, original);
    }

    #[test]
    fn test_stride_readback() {
        let original = grid(Instrument::Snare, "o-O-g-f-", 8, 1);
        let scaled = scale_to_canonical(&original, 1, 8, MeterInfo::default());
        assert_eq!(scaled.len(), 32);
        for i in 0..8 {
            assert_eq!(scaled.get(i * 4), original.get(i));
        }
        let active = (0..32).filter(|&i| scaled.is_active(i)).count();
        assert_eq!(active, 4);
    }

    #[test]
    fn test_triplet_grid_scales_to_48() {
        let original = grid(Instrument::HiHat, "xxxxxxxxxxxx|xxxxxxxxxxxx", 12, 2);
        let scaled = scale_to_canonical(&original, 2, 12, MeterInfo::default());
        assert_eq!(scaled.len(), 96);
        assert!(scaled.is_active(0));
        assert!(scaled.is_active(4));
        assert!(!scaled.is_active(2));
        assert!(scaled.is_active(48));
    }
}
