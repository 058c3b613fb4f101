//! Chord & modifier packing.
//!
//! Several tracks sounding on the same tick become one ABC chord. Decorations
//! inside a chord render badly, so they are pulled out in front of it:
//!
//! ```text
//! !accent!c4 + !accent!^g4   ->   !accent![c4^g4]
//! !accent!{/c}c4 + ^g4       ->   !accent!{/c}[c4^g4]
//! ```

/// Decorations hoisted in front of a chord, in output order. `!accent!` is
/// written at most once however many tracks carry it.
const HOISTED_DECORATIONS: [&str; 4] = ["!accent!", "!plus!", "!open!", "!///!"];

/// Grace-note groups hoisted after the decorations: flam, then drag.
const HOISTED_GRACES: [&str; 2] = ["{/c}", "{/cc}"];

/// Pack the tokens sounding on one tick into a single ABC token.
///
/// Every token gets the same `duration` suffix. One token is returned as is;
/// several become a `[...]` chord with their decorations hoisted. No tokens
/// yields an empty string.
pub fn pack(tokens: &[&str], duration: usize) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(token);
        body.push_str(&duration.to_string());
    }
    if tokens.len() < 2 {
        return body;
    }

    let mut prefix = String::new();
    for decoration in HOISTED_DECORATIONS {
        if body.contains(decoration) {
            body = body.replace(decoration, "");
            prefix.push_str(decoration);
        }
    }
    // a token's own brackets are dropped, the chord supplies them
    body.retain(|c| c != '[' && c != ']');
    for grace in HOISTED_GRACES {
        if body.contains(grace) {
            body = body.replace(grace, "");
            prefix.push_str(grace);
        }
    }

    format!("{}[{}]", prefix, body)
}
