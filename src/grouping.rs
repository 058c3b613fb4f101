//! # Grouping & Folding Engine
//!
//! Cuts the canonical grid into beat windows and decides, per window, how its
//! durations are notated.
//!
//! ## Window sizes
//! - triplet feel: 12 ticks (one beat on the 48-per-measure grid)
//! - compound meters (`top` a multiple of 6, `bottom` a multiple of 8): `96 / bottom`
//! - everything else: `32 / bottom`
//!
//! Windows never cross a measure boundary; the last window of an irregular
//! measure is shorter than the nominal size.
//!
//! ## Triplet cascade
//! Full triplet windows run through [`FOLD_RULES`] in order, first match wins:
//!
//! | rule        | active pattern (12 ticks)     | notated as               |
//! |-------------|-------------------------------|--------------------------|
//! | rest        | nothing                       | one quarter rest         |
//! | quarter     | only tick 0                   | one plain quarter        |
//! | eighths     | only ticks 0 and 6            | two plain eighths        |
//! | sixteenths  | only ticks 0, 3, 6, 9         | four plain sixteenths    |
//!
//! Anything else is a real tuplet (`(3:3:3`, `(6:6:6` or `(12:12:12`). Folding
//! only changes how a window is written; every active tick still starts a span.
//!
//! ## Related Modules
//! - `scale` - produces the canonical grid these windows index into
//! - `abc` - walks the [`Span`]s of each window and emits tokens

use crate::groove::MeterInfo;
use std::ops::Range;

/// Ticks in one triplet window.
pub const TRIPLET_WINDOW: usize = 12;

/// A plain-duration rewrite of a full triplet window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    Rest,
    Quarter,
    Eighths,
    Sixteenths,
}

impl Fold {
    /// Canonical ticks per notated span.
    fn span_len(self) -> usize {
        match self {
            Fold::Rest | Fold::Quarter => 12,
            Fold::Eighths => 6,
            Fold::Sixteenths => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Straight (non-triplet) beat group.
    Plain,
    /// Triplet window rewritten with plain durations.
    Folded(Fold),
    /// Real tuplet: `notes_in_group` is the bracket number, each note slot is `step` ticks.
    Triplet { notes_in_group: usize, step: usize },
}

/// One beat window on the canonical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub len: usize,
    /// 1-indexed measure number.
    pub measure: usize,
    pub kind: WindowKind,
}

/// A run of ticks written as one rest and/or note sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
    /// Durations inside a folded span are written at two thirds of their tick length.
    pub folded: bool,
}

impl Span {
    /// Written length of `ticks` canonical ticks inside this span.
    pub fn notated(&self, ticks: usize) -> usize {
        if self.folded {
            ticks * 2 / 3
        } else {
            ticks
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

impl Window {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// The spans this window is written in, in order, covering it exactly.
    pub fn spans(&self) -> Vec<Span> {
        let chunked = |step: usize, folded: bool| -> Vec<Span> {
            self.range()
                .step_by(step)
                .map(|start| Span { start, len: step.min(self.start + self.len - start), folded })
                .collect()
        };
        match self.kind {
            WindowKind::Plain => vec![Span { start: self.start, len: self.len, folded: false }],
            WindowKind::Folded(fold) => chunked(fold.span_len(), true),
            WindowKind::Triplet { step, .. } => chunked(step.max(1), false),
        }
    }

    /// The tuplet bracket that opens this window, if any.
    pub fn tuplet_marker(&self) -> Option<String> {
        match self.kind {
            WindowKind::Triplet { notes_in_group: n, .. } => Some(format!("({}:{}:{}", n, n, n)),
            _ => None,
        }
    }
}

/// One entry of the triplet cascade.
pub struct FoldRule {
    pub name: &'static str,
    /// Receives the 12 activity flags of the window and the session division.
    pub applies: fn(&[bool], usize) -> bool,
    pub fold: Fold,
}

fn silent(window: &[bool], range: Range<usize>) -> bool {
    window[range].iter().all(|&active| !active)
}

fn whole_beat_rest(window: &[bool], _division: usize) -> bool {
    silent(window, 0..TRIPLET_WINDOW)
}

fn single_quarter(window: &[bool], _division: usize) -> bool {
    silent(window, 1..TRIPLET_WINDOW)
}

fn two_eighths(window: &[bool], division: usize) -> bool {
    division > 12 && silent(window, 1..6) && silent(window, 7..12)
}

fn four_sixteenths(window: &[bool], division: usize) -> bool {
    division == 48 && [1..3, 4..6, 7..9, 10..12].into_iter().all(|r| silent(window, r))
}

/// Triplet cascade, highest priority first.
pub const FOLD_RULES: &[FoldRule] = &[
    FoldRule { name: "rest", applies: whole_beat_rest, fold: Fold::Rest },
    FoldRule { name: "quarter", applies: single_quarter, fold: Fold::Quarter },
    FoldRule { name: "eighths", applies: two_eighths, fold: Fold::Eighths },
    FoldRule { name: "sixteenths", applies: four_sixteenths, fold: Fold::Sixteenths },
];

/// Nominal window size for a meter.
pub fn window_size(meter: MeterInfo, triplet: bool) -> usize {
    if triplet {
        TRIPLET_WINDOW
    } else if meter.top() % 6 == 0 && meter.bottom() % 8 == 0 {
        (96 / meter.bottom()).max(1)
    } else {
        (32 / meter.bottom()).max(1)
    }
}

/// Effective tuplet division of a full 48-division window: 12 when only every
/// fourth tick sounds, 24 when only even ticks sound, else 48.
fn effective_division(window: &[bool], division: usize) -> usize {
    if division != 48 || window.len() < TRIPLET_WINDOW {
        return division;
    }
    let threes = (0..TRIPLET_WINDOW).step_by(4).all(|j| silent(window, j + 1..j + 4));
    if threes {
        return 12;
    }
    let sixes = (1..TRIPLET_WINDOW).step_by(2).all(|j| !window[j]);
    if sixes {
        24
    } else {
        48
    }
}

fn classify_triplet(window: &[bool], division: usize) -> WindowKind {
    if window.len() == TRIPLET_WINDOW {
        if let Some(rule) = FOLD_RULES.iter().find(|rule| (rule.applies)(window, division)) {
            log::trace!("triplet window folded by rule '{}'", rule.name);
            return WindowKind::Folded(rule.fold);
        }
    }
    let effective = effective_division(window, division).max(1);
    WindowKind::Triplet {
        notes_in_group: (effective / 4).max(1),
        step: (48 / effective).max(1),
    }
}

/// Cut the canonical grid into windows.
///
/// `activity[i]` is true when any non-sticking track sounds at tick `i`;
/// reads past its end are silent.
pub fn plan(
    activity: &[bool],
    meter: MeterInfo,
    triplet: bool,
    division: usize,
    ticks_per_measure: usize,
    measures: usize,
) -> Vec<Window> {
    let size = window_size(meter, triplet);
    let ticks_per_measure = ticks_per_measure.max(1);
    log::debug!(
        "planning {} measures of {} ticks, window {} ({})",
        measures,
        ticks_per_measure,
        size,
        if triplet { "triplet" } else { "straight" }
    );

    let mut windows = Vec::with_capacity(measures * ticks_per_measure.div_ceil(size));
    let mut flags = Vec::with_capacity(size);
    for measure in 0..measures {
        let base = measure * ticks_per_measure;
        let mut offset = 0;
        while offset < ticks_per_measure {
            let start = base + offset;
            let len = size.min(ticks_per_measure - offset);
            let kind = if triplet {
                flags.clear();
                flags.extend((start..start + len).map(|i| activity.get(i).copied().unwrap_or(false)));
                classify_triplet(&flags, division)
            } else {
                WindowKind::Plain
            };
            windows.push(Window { start, len, measure: measure + 1, kind });
            offset += len;
        }
    }
    windows
}
