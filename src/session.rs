//! # Session Strings
//!
//! A groove travels as a URL query string:
//!
//! ```text
//! ?TimeSig=4/4&Div=16&measures=2&tempo=95&title=Half%20time
//!     &H=|x-x-x-x-x-x-x-x-|x-x-x-x-x-x-x-x-|&S=|----O-------O---|...
//!     &RepeatBegins=1&RepeatEnds=2&RepeatEndings=2:2&MeasureText=1:b:intro
//! ```
//!
//! Decoding never fails. Keys match case-insensitively and the first match
//! wins; anything up to the first `?` is ignored, so a full URL works too.
//! Missing tracks get a default groove, out-of-range numbers are reset, and
//! every correction is reported in the returned [`Diagnostics`].
//!
//! ## Keys
//! - `TimeSig`, `Div` (1..=48), `measures`, `tempo`, `Swing`
//! - `Stickings`, `H`/`HH`, `S`, `K`/`B`, `T1`..`T4`
//! - `title`, `author`, `comments` (percent-encoded, `+` is a space)
//! - `RepeatBegins`, `RepeatEnds` (`1;3`), `RepeatEndings` (`2:1;4:2`)
//! - `MeasureText` (`1:intro` or `4:e:x3`; an anchor starting with `b` or `s` is Begin)
//! - `embedTempoTimeSig` (`true`/`True`)
//! - `Debug` is accepted and ignored

use crate::error::Diagnostics;
use crate::groove::{
    parse_leading_int, Anchor, GrooveScore, MeasureText, MeasureTextMap, MeterInfo, DEFAULT_DIVISION,
    MAX_DIVISION, MAX_MEASURES,
};
use crate::symbols::Instrument;
use crate::tablature::{default_tablature, tab_line};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Key/value pairs of a query string, in order.
#[derive(Debug, Clone, Default)]
pub struct Query<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Query<'a> {
    pub fn parse(input: &'a str) -> Self {
        let query = input.split_once('?').map_or(input, |(_, rest)| rest);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let mut parts = pair.split('=');
                let key = parts.next().unwrap_or_default();
                (key, parts.next().unwrap_or_default())
            })
            .collect();
        Self { pairs }
    }

    /// Value of the first pair whose key matches case-insensitively.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|&(_, v)| v)
    }

    /// Like [`Query::get`], but an empty value counts as missing.
    fn non_empty(&self, key: &str) -> Option<&'a str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept literally and invalid
/// UTF-8 is replaced.
pub fn percent_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Escape everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(char::from(b))
            }
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}

/// Free text field: percent-decoded, then `+` read as a space.
fn decode_text(value: &str) -> String {
    percent_decode(value).replace('+', " ")
}

fn parse_measure(raw: &str, key: &str, diags: &mut Diagnostics) -> Option<usize> {
    match parse_leading_int(raw) {
        Some(n) if n >= 1 => Some(n as usize),
        _ => {
            diags.push(format!("{}: '{}' is not a measure number", key, raw));
            None
        }
    }
}

/// `1;3;5` -> {1, 3, 5}.
pub fn parse_int_set(value: &str, key: &str, diags: &mut Diagnostics) -> BTreeSet<usize> {
    value
        .split(';')
        .filter(|s| !s.is_empty())
        .filter_map(|s| parse_measure(s, key, diags))
        .collect()
}

/// `2:1;4:2` -> {2: "1", 4: "2"}.
pub fn parse_endings(value: &str, diags: &mut Diagnostics) -> BTreeMap<usize, String> {
    let mut endings = BTreeMap::new();
    for entry in value.split(';').filter(|s| !s.is_empty()) {
        let mut parts = entry.split(':');
        let measure = parts.next().unwrap_or_default();
        match (parse_measure(measure, "RepeatEndings", diags), parts.next()) {
            (Some(m), Some(label)) => {
                endings.insert(m, label.to_string());
            }
            (Some(_), None) => diags.push(format!("RepeatEndings: '{}' has no label", entry)),
            (None, _) => {}
        }
    }
    endings
}

/// `1:intro;4:e:x3` -> measure text. Two fields anchor at Begin.
pub fn parse_measure_text(value: &str, diags: &mut Diagnostics) -> MeasureTextMap {
    let mut texts = MeasureTextMap::new();
    for entry in value.split(';').filter(|s| !s.is_empty()) {
        let parts: Vec<&str> = entry.split(':').collect();
        let Some(measure) = parse_measure(parts[0], "MeasureText", diags) else {
            continue;
        };
        let (anchor, text) = match parts.as_slice() {
            [_, text] => (Anchor::Begin, *text),
            [_, anchor, text] => {
                let begin = anchor.starts_with('b') || anchor.starts_with('s');
                (if begin { Anchor::Begin } else { Anchor::End }, *text)
            }
            _ => {
                diags.push(format!("MeasureText: malformed entry '{}'", entry));
                continue;
            }
        };
        texts.insert(measure, MeasureText { anchor, text: percent_decode(text).into_owned() });
    }
    texts
}

/// Build a groove from a session string.
pub fn decode(input: &str) -> (GrooveScore, Diagnostics) {
    let query = Query::parse(input);
    let mut diags = Diagnostics::new();

    let meter = MeterInfo::parse_or_default(query.get("TimeSig").unwrap_or("4/4"), &mut diags);

    let division = match query.get("Div").map(|v| (v, parse_leading_int(v))) {
        None => DEFAULT_DIVISION,
        Some((_, Some(n))) if (1..=MAX_DIVISION as i64).contains(&n) => n as usize,
        Some((raw, _)) => {
            diags.push(format!("Div '{}' is outside 1..={}, using {}", raw, MAX_DIVISION, DEFAULT_DIVISION));
            DEFAULT_DIVISION
        }
    };

    let measures = match query.get("measures").map(|v| (v, parse_leading_int(v))) {
        None => 1,
        Some((_, Some(n))) if (1..=MAX_MEASURES as i64).contains(&n) => n as usize,
        Some((_, Some(n))) if n > MAX_MEASURES as i64 => {
            diags.push(format!("measures {} clamped to {}", n, MAX_MEASURES));
            MAX_MEASURES
        }
        Some((raw, _)) => {
            diags.push(format!("measures '{}' is invalid, using 1", raw));
            1
        }
    };

    let mut score = GrooveScore::new(meter, division, measures);
    let npm = score.notes_per_measure;
    let top = meter.top();
    log::debug!("decoding {} at division {} ({} per measure), {} measures", meter, division, npm, measures);

    let track = |instrument: Instrument, keys: &[&str], score: &mut GrooveScore, diags: &mut Diagnostics| -> bool {
        let given = keys.iter().find_map(|key| query.non_empty(key));
        let tablature = match given {
            Some(value) => percent_decode(value).into_owned(),
            None => default_tablature(instrument, npm, top, measures),
        };
        score.set_track(instrument, &tablature, diags);
        given.is_some()
    };

    score.show_stickings = track(Instrument::Sticking, &["Stickings"], &mut score, &mut diags);
    track(Instrument::HiHat, &["H", "HH"], &mut score, &mut diags);
    track(Instrument::Snare, &["S"], &mut score, &mut diags);
    track(Instrument::Kick, &["K", "B"], &mut score, &mut diags);
    for n in 1..=4u8 {
        let key = format!("T{}", n);
        if track(Instrument::Tom(n), &[key.as_str()], &mut score, &mut diags) {
            score.show_toms = true;
        }
    }

    score.title = query.get("title").map(decode_text).unwrap_or_default();
    score.author = query.get("author").map(decode_text).unwrap_or_default();
    score.comments = query.get("comments").map(decode_text).unwrap_or_default();

    if let Some(raw) = query.get("tempo") {
        match parse_leading_int(raw) {
            Some(tempo) => score.set_tempo(tempo, &mut diags),
            None => diags.push(format!("tempo '{}' is not a number, using {}", raw, score.tempo)),
        }
    }

    if let Some(raw) = query.get("Swing") {
        match parse_leading_int(raw) {
            Some(swing) if (0..=100).contains(&swing) => score.swing = swing as u8,
            _ => diags.push(format!("Swing '{}' is outside 0..=100, using 0", raw)),
        }
    }

    if let Some(value) = query.get("RepeatBegins") {
        score.repeats.begins = parse_int_set(value, "RepeatBegins", &mut diags);
    }
    if let Some(value) = query.get("RepeatEnds") {
        score.repeats.ends = parse_int_set(value, "RepeatEnds", &mut diags);
    }
    if let Some(value) = query.get("RepeatEndings") {
        score.repeats.endings = parse_endings(value, &mut diags);
    }
    if let Some(value) = query.get("MeasureText") {
        score.measure_text = parse_measure_text(value, &mut diags);
    }

    score.embed_tempo_time_sig = matches!(query.get("embedTempoTimeSig"), Some("true" | "True"));

    (score, diags)
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|i| i.to_string()).collect::<Vec<_>>().join(";")
}

/// Write a groove back out as a session string. Only tracks that were shown
/// or carry notes are written for stickings and toms.
pub fn encode(score: &GrooveScore) -> String {
    let npm = score.notes_per_measure;
    let mut out = format!(
        "?TimeSig={}&Div={}&measures={}&tempo={}",
        score.meter, score.division, score.measures, score.tempo
    );
    if score.swing > 0 {
        let _ = write!(out, "&Swing={}", score.swing);
    }
    for (key, text) in [("title", &score.title), ("author", &score.author), ("comments", &score.comments)] {
        if !text.is_empty() {
            let _ = write!(out, "&{}={}", key, percent_encode(text));
        }
    }

    let mut instruments = Vec::new();
    if score.show_stickings || score.sticking.has_notes() {
        instruments.push(Instrument::Sticking);
    }
    instruments.extend([Instrument::HiHat, Instrument::Snare, Instrument::Kick]);
    if score.show_toms || score.toms.iter().any(|t| t.has_notes()) {
        instruments.extend((1..=4).map(Instrument::Tom));
    }
    for instrument in instruments {
        let grid = score.track(instrument);
        let line = tab_line(instrument, grid, true, true, npm * score.measures, npm);
        let _ = write!(out, "&{}=|{}", instrument.tag(), line);
    }

    let repeats = &score.repeats;
    if !repeats.begins.is_empty() {
        let _ = write!(out, "&RepeatBegins={}", join(&repeats.begins));
    }
    if !repeats.ends.is_empty() {
        let _ = write!(out, "&RepeatEnds={}", join(&repeats.ends));
    }
    if !repeats.endings.is_empty() {
        let _ = write!(out, "&RepeatEndings={}", join(repeats.endings.iter().map(|(m, l)| format!("{}:{}", m, l))));
    }
    if !score.measure_text.is_empty() {
        let entries = score.measure_text.iter().map(|(m, t)| {
            let anchor = match t.anchor {
                Anchor::Begin => 'b',
                Anchor::End => 'e',
            };
            format!("{}:{}:{}", m, anchor, percent_encode(&t.text))
        });
        let _ = write!(out, "&MeasureText={}", join(entries));
    }
    if score.embed_tempo_time_sig {
        out.push_str("&embedTempoTimeSig=true");
    }
    out
}
