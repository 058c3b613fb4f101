//! # ABC Emitter
//!
//! Turns a [`GrooveScore`] into an ABC document for a drum-notation engraver.
//!
//! ## Purpose
//! The document has a fixed header (page format, custom note heads, drum map,
//! staff layout) followed by three parallel voices:
//! - `Stickings` - hidden rests carrying sticking or count annotations
//! - `Hands` - snare, hi-hat and toms (plus kick when kick stems point up)
//! - `Feet` - kick and hi-hat foot, omitted when kick stems point up
//!
//! ## Pipeline
//! ```text
//! tracks ── scale ──> canonical grids ── grouping::plan ──> windows
//!                                                              │
//!   voices <── packer::pack <── emit_span (rest + notes) <─────┘
//! ```
//!
//! All durations are canonical ticks under `L:1/32`.
//!
//! ## Related Modules
//! - `grouping` - window cascade and spans
//! - `packer` - chord packing for simultaneous tracks
//! - `counts` - sticking count labels

use crate::config::RenderOptions;
use crate::counts::sticking_lane;
use crate::groove::{Anchor, GrooveScore, NoteGrid};
use crate::grouping::{plan, Fold, Span, Window, WindowKind};
use crate::packer::pack;
use crate::scale::scale_to_canonical;
use crate::symbols::{NoteSymbol, NUMBER_OF_TOMS};
use std::borrow::Cow;

/// Tokens sounding on each tick of one voice. An empty entry is silence.
type Lane = Vec<Vec<Cow<'static, str>>>;

const PAGE_FORMAT: &str = "%%flatbeams 1\n\
%%ornament up\n";

const PAGE_FONTS: &str = "%%leftmargin 0cm\n\
%%rightmargin 0cm\n\
%%topspace 10px\n\
%%titlefont calibri 20\n\
%%partsfont calibri 16\n\
%%gchordfont calibri 16\n\
%%annotationfont calibri 16\n\
%%infofont calibri 16\n\
%%textfont calibri 16\n\
%%deco (. 0 a 5 1 1 \"@-8,-3(\"\n\
%%deco ). 0 a 5 1 1 \"@4,-3)\"\n";

const HEAD_DEFINITIONS: &str = "%%beginsvg\n \
<defs>\n \
<path id=\"Xhead\" d=\"m-3,-3 l6,6 m0,-6 l-6,6\" class=\"stroke\" style=\"stroke-width:1.2\"/>\n \
<path id=\"Trihead\" d=\"m-3,2 l 6,0 l-3,-6 l-3,6 l6,0\" class=\"stroke\" style=\"stroke-width:1.2\"/>\n \
</defs>\n\
%%endsvg\n";

const DRUM_MAP: &str = "%%map drum ^g heads=Xhead print=g       % Hi-Hat\n\
%%map drum ^c' heads=Xhead print=c'   % Crash\n\
%%map drum ^d' heads=Xhead print=d'   % Stacker\n\
%%map drum ^e' heads=Xhead print=e'   % Metronome click\n\
%%map drum ^f' heads=Xhead print=f'   % Metronome beep\n\
%%map drum ^A' heads=Xhead print=A'   % Ride\n\
%%map drum ^B' heads=Trihead print=A' % Ride Bell\n\
%%map drum ^D' heads=Trihead print=g   % Cow Bell\n\
%%map drum ^c heads=Xhead print=c  % Cross Stick\n\
%%map drum ^d, heads=Xhead print=d,  % Foot Splash\n";

/// One bar naming every head, written before the groove when the legend is on.
pub const LEGEND: &str = "V:Stickings\n\
x8 x8 x8 x8 x8 x8 x8 x8 ||\n\
V:Hands stem=up \n\
%%voicemap drum\n\
\"^Hi-Hat\"^g4 \"^Open\"!open!^g4 \"^Crash\"^c'4 \"^Stacker\"^d'4 \"^Ride\"^A'4 \"^Ride Bell\"^B'4 x2 \"^Tom\"e4 \"^Tom\"A4 \"^Snare\"c4 \"^Buzz\"!///!c4 \"^Cross\"^c4 \"^Ghost  \"!(.!!).!c4 \"^Flam\"{/c}c4  x10 ||\n\
V:Feet stem=down \n\
%%voicemap drum\n\
x52 \"^Kick\"F4 \"^HH foot\"^d,4 x4 ||\n\
T:\n";

const STICKINGS_VOICE: &str = "V:Stickings\n";
const HANDS_VOICE: &str = "V:Hands stem=up\n%%voicemap drum\n";
const FEET_VOICE: &str = "V:Feet stem=down\n%%voicemap drum\n";

fn kick_stems_up(score: &GrooveScore, options: &RenderOptions) -> bool {
    options.kick_stems_up.unwrap_or(score.kick_stems_up)
}

/// Header of the document, up to and including `K:` (and the legend, if shown).
pub fn header(score: &GrooveScore, options: &RenderOptions, surface_id: u64) -> String {
    let mut abc = String::new();

    abc.push_str(&format!("%abc\n%%fullsvg _{}\nX:6\n", surface_id));
    abc.push_str(&format!("M:{}\n", score.meter));
    // always present, even when blank
    abc.push_str(&format!("T: {}\n", score.title));
    if !score.author.is_empty() {
        abc.push_str(&format!("C: {}\n", score.author));
        abc.push_str("%%musicspace 20px\n");
    }

    abc.push_str("L:1/32\n");
    abc.push_str(if options.permutation { "%%stretchlast 0\n" } else { "%%stretchlast 1\n" });
    abc.push_str(PAGE_FORMAT);
    abc.push_str(&format!("%%pagewidth {}px\n", options.page_width()));
    abc.push_str(PAGE_FONTS);
    abc.push_str(HEAD_DEFINITIONS);
    abc.push_str(DRUM_MAP);

    if kick_stems_up(score, options) {
        abc.push_str("%%staves (Stickings Hands)\n");
    } else {
        abc.push_str("%%staves (Stickings Hands Feet)\n");
    }

    if !score.comments.is_empty() {
        abc.push_str(&format!("P: {}\n", score.comments));
        abc.push_str("%%musicspace 20px\n");
    }

    abc.push_str("K:C clef=perc\n");

    if options.show_legend || score.show_legend {
        abc.push_str(LEGEND);
    }

    abc
}

fn lane_of(grids: &[&NoteGrid], len: usize) -> Lane {
    (0..len)
        .map(|i| grids.iter().filter_map(|grid| grid.get(i).abc_token()).map(Cow::Borrowed).collect())
        .collect()
}

fn is_active(lane: &Lane, tick: usize) -> bool {
    lane.get(tick).is_some_and(|tokens| !tokens.is_empty())
}

/// Write one span of one voice: a rest for any silent lead-in, then every
/// note held until the next note of the voice or the end of the span.
fn emit_span(out: &mut String, lane: &Lane, span: Span, rest_glyph: char) {
    let end = span.start + span.len;

    if !is_active(lane, span.start) {
        let run = span.range().take_while(|&i| !is_active(lane, i)).count();
        out.push(rest_glyph);
        out.push_str(&span.notated(run).to_string());
    }

    for tick in span.range().filter(|&i| is_active(lane, i)) {
        let next = (tick + 1..end).find(|&i| is_active(lane, i)).unwrap_or(end);
        let tokens: Vec<&str> = lane[tick].iter().map(|t| t.as_ref()).collect();
        out.push_str(&pack(&tokens, span.notated(next - tick)));
    }
}

/// A voice being written.
struct VoiceWriter<'a> {
    text: String,
    lane: &'a Lane,
    rest_glyph: char,
    /// Whether tuplet brackets are drawn in this voice.
    bracketed: bool,
}

impl<'a> VoiceWriter<'a> {
    fn new(heading: &str, lane: &'a Lane, rest_glyph: char) -> Self {
        Self { text: heading.to_string(), lane, rest_glyph, bracketed: true }
    }

    /// A voice whose tuplets are implied by the staff below it.
    fn unbracketed(mut self) -> Self {
        self.bracketed = false;
        self
    }

    fn window(&mut self, window: &Window) {
        if let Some(marker) = window.tuplet_marker().filter(|_| self.bracketed) {
            self.text.push_str(&marker);
        }
        for span in window.spans() {
            emit_span(&mut self.text, self.lane, span, self.rest_glyph);
        }
        self.text.push(' ');
    }

    fn finish(mut self) -> String {
        if self.text.ends_with('|') {
            self.text.push('\n');
        } else {
            self.text.push_str("|\n");
        }
        self.text
    }
}

/// Sticking grid with annotations removed where a folded window cannot show them.
fn settle_stickings(sticking: &NoteGrid, windows: &[Window]) -> NoteGrid {
    let mut settled = sticking.clone();
    for window in windows {
        if let WindowKind::Folded(fold) = window.kind {
            for span in window.spans() {
                let first = if fold == Fold::Rest { span.start } else { span.start + 1 };
                for tick in first..span.start + span.len {
                    settled.set(tick, NoteSymbol::Off);
                }
            }
        }
    }
    settled
}

/// The three voice streams (two when kick stems point up).
pub fn voices(score: &GrooveScore, options: &RenderOptions) -> String {
    let stems_up = kick_stems_up(score, options);
    let triplet = score.is_triplet();
    let npm = score.notes_per_measure;
    let scale = |grid: &NoteGrid| scale_to_canonical(grid, score.measures, npm, score.meter);

    let sticking = scale(&score.sticking);
    let hihat = scale(&score.hihat);
    let snare = scale(&score.snare);
    let kick = scale(&score.kick);
    let toms: Vec<NoteGrid> = score.toms.iter().map(scale).collect();
    let len = hihat.len();
    let ticks_per_measure = len / score.measures.max(1);
    log::debug!(
        "{} measures of {} ticks ({}), kick stems {}",
        score.measures,
        ticks_per_measure,
        if triplet { "triplet" } else { "straight" },
        if stems_up { "up" } else { "down" }
    );

    let mut hand_grids: Vec<&NoteGrid> = vec![&snare, &hihat];
    hand_grids.extend(toms.iter().take(NUMBER_OF_TOMS));
    // kick last so a kick+splash chord keeps its spacing
    if stems_up {
        hand_grids.push(&kick);
    }
    let hands_lane = lane_of(&hand_grids, len);
    let feet_lane = lane_of(&[&kick], len);

    let activity: Vec<bool> = (0..len)
        .map(|i| is_active(&hands_lane, i) || is_active(&feet_lane, i))
        .collect();
    let windows = plan(&activity, score.meter, triplet, score.division, ticks_per_measure, score.measures);

    let sticking_lane: Lane = sticking_lane(&settle_stickings(&sticking, &windows), score.division, score.meter, triplet)
        .into_iter()
        .map(|token| token.into_iter().collect())
        .collect();

    let mut stickings = VoiceWriter::new(STICKINGS_VOICE, &sticking_lane, 'x').unbracketed();
    let mut hands = VoiceWriter::new(HANDS_VOICE, &hands_lane, 'z');
    let mut feet = VoiceWriter::new(FEET_VOICE, &feet_lane, if triplet { 'x' } else { 'z' });

    let measures_per_line = if score.meter.canonical_per_measure(triplet) >= 32 { 1 } else { 2 };

    for (i, window) in windows.iter().enumerate() {
        let measure = window.measure;
        let opens_measure = i == 0 || windows[i - 1].measure != measure;
        let closes_measure = windows.get(i + 1).map_or(true, |next| next.measure != measure);

        if opens_measure {
            let opening = measure_opening(score, measure);
            stickings.text.push_str(&opening);
            hands.text.push_str(&opening);
            if let Some(text) = score.measure_text.get(&measure).filter(|t| t.anchor == Anchor::Begin) {
                hands.text.push_str(&format!("\"{}\"", text.text));
            }
        }

        stickings.window(window);
        hands.window(window);
        feet.window(window);

        if closes_measure {
            if let Some(text) = score.measure_text.get(&measure).filter(|t| t.anchor == Anchor::End) {
                hands.text.push_str(&format!("\"{}\"", text.text));
            }
            let bar = if score.repeats.ends.contains(&measure) { ":|" } else { "|" };
            hands.text.push_str(bar);
            stickings.text.push_str(bar);
            feet.text.push('|');

            if measure % measures_per_line == 0 && measure < score.measures {
                for voice in [&mut stickings, &mut hands, &mut feet] {
                    voice.text.push('\n');
                }
            }
        }
    }

    let mut abc = stickings.finish();
    abc.push_str(&hands.finish());
    if !stems_up {
        abc.push_str(&feet.finish());
    }
    abc
}

/// Repeat-begin and ending bracket that open a measure.
fn measure_opening(score: &GrooveScore, measure: usize) -> String {
    let begins = score.repeats.begins.contains(&measure);
    match (begins, score.repeats.endings.get(&measure)) {
        (true, Some(label)) => format!("|:[{}", label),
        (true, None) => "|:".to_string(),
        (false, Some(label)) => format!("[{}", label),
        (false, None) => String::new(),
    }
}

/// The complete ABC document.
pub fn to_abc(score: &GrooveScore, options: &RenderOptions, surface_id: u64) -> String {
    let mut abc = header(score, options, surface_id);
    abc.push_str(&voices(score, options));
    abc
}
