//! Integration tests for the groove converter
//!
//! Tests the full pipeline from session string to ABC output.

use groove::{decode, encode, render_abc, render_abc_with_options, RenderOptions};

/// Body of one voice: everything after its heading up to the next voice.
fn voice<'a>(abc: &'a str, name: &str) -> &'a str {
    let heading = format!("\nV:{}", name);
    let Some(start) = abc.rfind(&heading) else {
        return "";
    };
    let body = &abc[start + heading.len()..];
    // skip the rest of the heading line and the voicemap line, if any
    let body = body.split_once('\n').map_or("", |(_, rest)| rest);
    let body = body.strip_prefix("%%voicemap drum\n").unwrap_or(body);
    let end = body.find("V:").unwrap_or(body.len());
    &body[..end]
}

fn stems_down() -> RenderOptions {
    RenderOptions { kick_stems_up: Some(false), ..RenderOptions::default() }
}

#[test]
fn test_straight_sixteenths_end_to_end() {
    let conversion = render_abc_with_options(
        "?TimeSig=4/4&Div=16&H=xxxxxxxxxxxxxxxx&S=----O-------O---&K=o---------------",
        &stems_down(),
        0,
    );
    assert!(conversion.diagnostics.is_empty(), "Should decode without diagnostics");
    let abc = conversion.abc;

    let hands = voice(&abc, "Hands");
    assert_eq!(
        hands,
        "^g2^g2^g2^g2 !accent![c2^g2]^g2^g2^g2 ^g2^g2^g2^g2 !accent![c2^g2]^g2^g2^g2 |\n"
    );
    assert_eq!(hands.matches("^g").count(), 16);
    assert_eq!(hands.matches("!accent!").count(), 2);
    assert_eq!(hands.matches('|').count(), 1);

    assert_eq!(voice(&abc, "Feet"), "F8 z8 z8 z8 |\n");
    assert_eq!(voice(&abc, "Stickings"), "x8 x8 x8 x8 |\n");
}

#[test]
fn test_triplet_groove_end_to_end() {
    let conversion = render_abc_with_options(
        "?TimeSig=4/4&Div=12&H=x-xx-xx-xx-x&S=---O-----O--&K=o-----o-----",
        &stems_down(),
        0,
    );
    let abc = conversion.abc;
    assert_eq!(
        voice(&abc, "Hands"),
        "(3:3:3^g4z4^g4 (3:3:3!accent![c4^g4]z4^g4 (3:3:3^g4z4^g4 (3:3:3!accent![c4^g4]z4^g4 |\n"
    );
    assert_eq!(
        voice(&abc, "Feet"),
        "(3:3:3F4x4x4 (3:3:3x4x4x4 (3:3:3F4x4x4 (3:3:3x4x4x4 |\n"
    );
    assert!(!voice(&abc, "Stickings").contains("(3"), "Sticking annotations carry no tuplet bracket");
}

#[test]
fn test_triplet_quarter_notes_fold() {
    let conversion = render_abc("?TimeSig=4/4&Div=12&H=x--x--x--x--&S=------------&K=------------");
    let hands = voice(&conversion.abc, "Hands");
    assert_eq!(hands, "^g8 ^g8 ^g8 ^g8 |\n");
    assert!(!hands.contains("(3"), "Quarter notes should not be bracketed");
}

#[test]
fn test_repeat_scenario() {
    let conversion = render_abc("?measures=2&RepeatBegins=1&RepeatEnds=2&RepeatEndings=2:2");
    let hands = voice(&conversion.abc, "Hands");
    assert!(hands.starts_with("|:"), "Measure 1 should open with a repeat-begin");
    assert!(hands.contains("|\n[2"), "Measure 2 should open the second ending on a new line");
    assert!(hands.ends_with(":|\n"), "Measure 2 should close with a repeat-end bar");
    assert_eq!(hands.matches(":|").count(), 1);

    let stickings = voice(&conversion.abc, "Stickings");
    assert!(stickings.starts_with("|:"));
    assert!(stickings.ends_with(":|\n"));
}

#[test]
fn test_measure_text_on_hands_only() {
    let conversion = render_abc("?measures=2&MeasureText=1:b:Groove%20A;2:e:x3");
    let hands = voice(&conversion.abc, "Hands");
    assert!(hands.starts_with("\"Groove A\""));
    assert!(hands.ends_with("\"x3\"|\n"));
    assert!(!voice(&conversion.abc, "Stickings").contains("Groove"));
}

#[test]
fn test_measures_and_tempo_are_clamped() {
    let conversion = render_abc("?measures=25&tempo=1000");
    assert_eq!(conversion.score.measures, 10);
    assert_eq!(conversion.score.tempo, 80);
    assert_eq!(conversion.diagnostics.len(), 2);
    let hands = voice(&conversion.abc, "Hands");
    assert_eq!(hands.matches(" |").count(), 10);
    // 4/4 fills 32 canonical ticks, so every measure gets its own line
    assert_eq!(hands.lines().count(), 10);
}

#[test]
fn test_line_breaks_follow_canonical_measure_size() {
    let hands = voice(&render_abc("?TimeSig=4/4&Div=16&measures=2").abc, "Hands").to_string();
    assert_eq!(hands.lines().count(), 2, "Each 4/4 measure should end its line");

    let hands = voice(&render_abc("?TimeSig=3/4&Div=8&measures=4").abc, "Hands").to_string();
    assert_eq!(hands.lines().count(), 2, "Short 3/4 measures should pair up");
}

#[test]
fn test_oversized_division_still_renders() {
    let conversion = render_abc("?Div=4611686018427387904&measures=10");
    assert_eq!(conversion.score.division, 16);
    assert!(conversion.diagnostics.mentions("Div"));
    assert_eq!(voice(&conversion.abc, "Hands").lines().count(), 10);
}

#[test]
fn test_malformed_input_still_renders() {
    let conversion = render_abc("?TimeSig=banana&Div=-3&S=oo??oo&K=zzz&measures=x");
    assert!(!conversion.diagnostics.is_empty());
    assert!(conversion.abc.starts_with("%abc\n"));
    assert!(conversion.abc.contains("M:4/4\n"));
    assert!(conversion.abc.contains("V:Hands stem=up"));
}

#[test]
fn test_compound_meter_groups_by_dotted_quarter() {
    let conversion = render_abc("?TimeSig=6/8&Div=8&H=xxxxxx&S=------&K=------");
    assert!(conversion.abc.contains("M:6/8\n"));
    assert_eq!(voice(&conversion.abc, "Hands"), "^g4^g4^g4 ^g4^g4^g4 |\n");
}

#[test]
fn test_irregular_meter_clamps_last_group() {
    // 5/8 at 16ths: 20 canonical ticks, groups of 4
    let conversion = render_abc("?TimeSig=5/8&Div=16&H=x-x-x-x-x-&S=----------&K=----------");
    assert_eq!(voice(&conversion.abc, "Hands"), "^g4 ^g4 ^g4 ^g4 ^g4 |\n");
}

#[test]
fn test_legend_and_header_options() {
    let options = RenderOptions { show_legend: true, render_width: 1200, ..RenderOptions::default() };
    let conversion = render_abc_with_options("?title=Legend%20test&author=A.+Drummer", &options, 9);
    let abc = conversion.abc;
    assert!(abc.contains("%%fullsvg _9\n"));
    assert!(abc.contains("T: Legend test\n"));
    assert!(abc.contains("C: A. Drummer\n"));
    assert!(abc.contains("%%pagewidth 900px\n"));
    assert!(abc.contains("\"^Kick\"F4"));
    assert!(abc.contains("%%staves (Stickings Hands)\n"));
}

#[test]
fn test_session_round_trip() {
    let query = "?TimeSig=7/8&Div=16&measures=2&tempo=140&H=|x-x-x-x-x-x-x-|X-x-o-x-x-x-x-|\
                 &S=|----O-----g---|----O---f-d---|&K=|o-----o-------|X-------x-----|";
    let (score, diags) = decode(query);
    assert!(diags.is_empty());
    let (again, diags) = decode(&encode(&score));
    assert!(diags.is_empty());
    assert_eq!(again, score);
    assert_eq!(render_abc(query).abc, render_abc(&encode(&score)).abc);
}
