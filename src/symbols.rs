//! # Symbol Tables
//!
//! Static per-instrument mappings between tablature characters, articulations
//! and ABC note tokens.
//!
//! ## Tablature characters
//! ```text
//! Stickings  R right   L left   B both   c count   - off
//! Hi-hat     x normal  X accent o open   + close   c crash  r ride  b ride bell
//!            m cowbell s stacker n metronome  N metronome accent     - off
//! Snare      o normal  O accent g ghost  x cross stick  b buzz  f flam  d drag
//! Kick       o normal  x splash (foot hi-hat)  X kick + splash
//! Toms       o normal  (x also means normal on T1 and T4)
//! ```
//!
//! The forward table is keyed by `(Instrument, char)`. The reverse table maps an
//! ABC token back to a single tablature character; it is many-to-one (every
//! "normal" drum token reads back as `o`), so `unparse(parse(c))` is not the
//! identity for every character.

use crate::error::GrooveError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

pub const NUMBER_OF_TOMS: usize = 4;

/// Characters that may decorate a tablature line and carry no note.
pub const DECORATIVE_CHARS: [char; 7] = [':', '!', '(', ')', '[', ']', '|'];

/// One track of a groove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Sticking,
    HiHat,
    Snare,
    Kick,
    /// Tom number 1..=4.
    Tom(u8),
}

impl Instrument {
    pub const ALL: [Instrument; 8] = [
        Instrument::Sticking,
        Instrument::HiHat,
        Instrument::Snare,
        Instrument::Kick,
        Instrument::Tom(1),
        Instrument::Tom(2),
        Instrument::Tom(3),
        Instrument::Tom(4),
    ];

    /// Parse a track tag as used in session strings.
    pub fn from_tag(tag: &str) -> Result<Self, GrooveError> {
        match tag {
            "Stickings" => Ok(Instrument::Sticking),
            "H" | "HH" => Ok(Instrument::HiHat),
            "S" => Ok(Instrument::Snare),
            "K" | "B" => Ok(Instrument::Kick),
            "T1" => Ok(Instrument::Tom(1)),
            "T2" => Ok(Instrument::Tom(2)),
            "T3" => Ok(Instrument::Tom(3)),
            "T4" => Ok(Instrument::Tom(4)),
            _ => Err(GrooveError::UnknownInstrument(tag.to_string())),
        }
    }

    /// Canonical tag written when encoding a session.
    pub fn tag(self) -> &'static str {
        match self {
            Instrument::Sticking => "Stickings",
            Instrument::HiHat => "H",
            Instrument::Snare => "S",
            Instrument::Kick => "K",
            Instrument::Tom(1) => "T1",
            Instrument::Tom(2) => "T2",
            Instrument::Tom(3) => "T3",
            Instrument::Tom(_) => "T4",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sticking {
    Right,
    Left,
    Both,
    /// Resolved to a count label ("1", "e", "&", "a") right before emission.
    CountPlaceholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HiHat {
    Normal,
    Accent,
    Open,
    Close,
    Ride,
    RideBell,
    CowBell,
    Crash,
    Stacker,
    MetronomeNormal,
    MetronomeAccent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Snare {
    Normal,
    Accent,
    Ghost,
    CrossStick,
    Buzz,
    Flam,
    Drag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kick {
    Normal,
    Splash,
    NormalAndSplash,
}

/// Articulation at one tick of one track. `Off` is silence for every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteSymbol {
    #[default]
    Off,
    Sticking(Sticking),
    HiHat(HiHat),
    Snare(Snare),
    Kick(Kick),
    /// Tom number 1..=4, always a normal stroke.
    Tom(u8),
}

// ABC tokens. The packer hoists the `!...!` decorations and grace groups out of chords.
pub const ABC_STICK_R: &str = "\"R\"x";
pub const ABC_STICK_L: &str = "\"L\"x";
pub const ABC_STICK_BOTH: &str = "\"R/L\"x";
pub const ABC_STICK_COUNT: &str = "\"count\"x";
pub const ABC_STICK_OFF: &str = "\"\"x";
pub const ABC_HH_RIDE: &str = "^A'";
pub const ABC_HH_RIDE_BELL: &str = "^B'";
pub const ABC_HH_COW_BELL: &str = "^D'";
pub const ABC_HH_CRASH: &str = "^c'";
pub const ABC_HH_STACKER: &str = "^d'";
pub const ABC_HH_METRONOME_NORMAL: &str = "^e'";
pub const ABC_HH_METRONOME_ACCENT: &str = "^f'";
pub const ABC_HH_OPEN: &str = "!open!^g";
pub const ABC_HH_CLOSE: &str = "!plus!^g";
pub const ABC_HH_ACCENT: &str = "!accent!^g";
pub const ABC_HH_NORMAL: &str = "^g";
pub const ABC_SN_GHOST: &str = "!(.!!).!c";
pub const ABC_SN_ACCENT: &str = "!accent!c";
pub const ABC_SN_NORMAL: &str = "c";
pub const ABC_SN_XSTICK: &str = "^c";
pub const ABC_SN_BUZZ: &str = "!///!c";
pub const ABC_SN_FLAM: &str = "!accent!{/c}c";
pub const ABC_SN_DRAG: &str = "{/cc}c";
pub const ABC_KI_SPLASH_AND_KICK: &str = "[F^d,]";
pub const ABC_KI_SPLASH: &str = "^d,";
pub const ABC_KI_NORMAL: &str = "F";
pub const ABC_T1_NORMAL: &str = "e";
pub const ABC_T2_NORMAL: &str = "d";
pub const ABC_T3_NORMAL: &str = "B";
pub const ABC_T4_NORMAL: &str = "A";

impl NoteSymbol {
    pub fn is_off(self) -> bool {
        self == NoteSymbol::Off
    }

    /// The ABC token for this articulation, `None` for silence.
    pub fn abc_token(self) -> Option<&'static str> {
        let token = match self {
            NoteSymbol::Off => return None,
            NoteSymbol::Sticking(s) => match s {
                Sticking::Right => ABC_STICK_R,
                Sticking::Left => ABC_STICK_L,
                Sticking::Both => ABC_STICK_BOTH,
                Sticking::CountPlaceholder => ABC_STICK_COUNT,
            },
            NoteSymbol::HiHat(h) => match h {
                HiHat::Normal => ABC_HH_NORMAL,
                HiHat::Accent => ABC_HH_ACCENT,
                HiHat::Open => ABC_HH_OPEN,
                HiHat::Close => ABC_HH_CLOSE,
                HiHat::Ride => ABC_HH_RIDE,
                HiHat::RideBell => ABC_HH_RIDE_BELL,
                HiHat::CowBell => ABC_HH_COW_BELL,
                HiHat::Crash => ABC_HH_CRASH,
                HiHat::Stacker => ABC_HH_STACKER,
                HiHat::MetronomeNormal => ABC_HH_METRONOME_NORMAL,
                HiHat::MetronomeAccent => ABC_HH_METRONOME_ACCENT,
            },
            NoteSymbol::Snare(s) => match s {
                Snare::Normal => ABC_SN_NORMAL,
                Snare::Accent => ABC_SN_ACCENT,
                Snare::Ghost => ABC_SN_GHOST,
                Snare::CrossStick => ABC_SN_XSTICK,
                Snare::Buzz => ABC_SN_BUZZ,
                Snare::Flam => ABC_SN_FLAM,
                Snare::Drag => ABC_SN_DRAG,
            },
            NoteSymbol::Kick(k) => match k {
                Kick::Normal => ABC_KI_NORMAL,
                Kick::Splash => ABC_KI_SPLASH,
                Kick::NormalAndSplash => ABC_KI_SPLASH_AND_KICK,
            },
            NoteSymbol::Tom(1) => ABC_T1_NORMAL,
            NoteSymbol::Tom(2) => ABC_T2_NORMAL,
            NoteSymbol::Tom(3) => ABC_T3_NORMAL,
            NoteSymbol::Tom(_) => ABC_T4_NORMAL,
        };
        Some(token)
    }

    /// Tablature character for this symbol, read back through the lossy token table.
    pub fn tab_char(self, instrument: Instrument) -> char {
        match self.abc_token() {
            Some(token) => unparse_token(instrument, token),
            None => '-',
        }
    }
}

/// Forward table rows: (instrument, tablature character, symbol).
const TABLATURE_ENTRIES: &[(Instrument, char, NoteSymbol)] = &[
    (Instrument::Sticking, 'R', NoteSymbol::Sticking(Sticking::Right)),
    (Instrument::Sticking, 'r', NoteSymbol::Sticking(Sticking::Right)),
    (Instrument::Sticking, 'L', NoteSymbol::Sticking(Sticking::Left)),
    (Instrument::Sticking, 'l', NoteSymbol::Sticking(Sticking::Left)),
    (Instrument::Sticking, 'B', NoteSymbol::Sticking(Sticking::Both)),
    (Instrument::Sticking, 'b', NoteSymbol::Sticking(Sticking::Both)),
    (Instrument::Sticking, 'c', NoteSymbol::Sticking(Sticking::CountPlaceholder)),
    (Instrument::HiHat, 'x', NoteSymbol::HiHat(HiHat::Normal)),
    (Instrument::HiHat, 'X', NoteSymbol::HiHat(HiHat::Accent)),
    (Instrument::HiHat, 'o', NoteSymbol::HiHat(HiHat::Open)),
    (Instrument::HiHat, '+', NoteSymbol::HiHat(HiHat::Close)),
    (Instrument::HiHat, 'c', NoteSymbol::HiHat(HiHat::Crash)),
    (Instrument::HiHat, 'r', NoteSymbol::HiHat(HiHat::Ride)),
    (Instrument::HiHat, 'R', NoteSymbol::HiHat(HiHat::Ride)),
    (Instrument::HiHat, 'b', NoteSymbol::HiHat(HiHat::RideBell)),
    (Instrument::HiHat, 'B', NoteSymbol::HiHat(HiHat::RideBell)),
    (Instrument::HiHat, 'm', NoteSymbol::HiHat(HiHat::CowBell)),
    (Instrument::HiHat, 's', NoteSymbol::HiHat(HiHat::Stacker)),
    (Instrument::HiHat, 'n', NoteSymbol::HiHat(HiHat::MetronomeNormal)),
    (Instrument::HiHat, 'N', NoteSymbol::HiHat(HiHat::MetronomeAccent)),
    (Instrument::Snare, 'o', NoteSymbol::Snare(Snare::Normal)),
    (Instrument::Snare, 'O', NoteSymbol::Snare(Snare::Accent)),
    (Instrument::Snare, 'g', NoteSymbol::Snare(Snare::Ghost)),
    (Instrument::Snare, 'x', NoteSymbol::Snare(Snare::CrossStick)),
    (Instrument::Snare, 'b', NoteSymbol::Snare(Snare::Buzz)),
    (Instrument::Snare, 'B', NoteSymbol::Snare(Snare::Buzz)),
    (Instrument::Snare, 'f', NoteSymbol::Snare(Snare::Flam)),
    (Instrument::Snare, 'd', NoteSymbol::Snare(Snare::Drag)),
    (Instrument::Kick, 'o', NoteSymbol::Kick(Kick::Normal)),
    (Instrument::Kick, 'x', NoteSymbol::Kick(Kick::Splash)),
    (Instrument::Kick, 'X', NoteSymbol::Kick(Kick::NormalAndSplash)),
    (Instrument::Tom(1), 'o', NoteSymbol::Tom(1)),
    (Instrument::Tom(1), 'x', NoteSymbol::Tom(1)),
    (Instrument::Tom(2), 'o', NoteSymbol::Tom(2)),
    (Instrument::Tom(3), 'o', NoteSymbol::Tom(3)),
    (Instrument::Tom(4), 'o', NoteSymbol::Tom(4)),
    (Instrument::Tom(4), 'x', NoteSymbol::Tom(4)),
];

static TABLATURE: Lazy<HashMap<(Instrument, char), NoteSymbol>> = Lazy::new(|| {
    TABLATURE_ENTRIES
        .iter()
        .map(|&(instrument, c, symbol)| ((instrument, c), symbol))
        .collect()
});

/// Reverse rows: (ABC token, tablature character).
const TOKEN_ENTRIES: &[(&str, char)] = &[
    (ABC_STICK_R, 'R'),
    (ABC_STICK_L, 'L'),
    (ABC_STICK_BOTH, 'B'),
    (ABC_STICK_OFF, '-'),
    (ABC_STICK_COUNT, 'c'),
    (ABC_HH_RIDE, 'r'),
    (ABC_HH_RIDE_BELL, 'b'),
    (ABC_HH_COW_BELL, 'm'),
    (ABC_HH_CRASH, 'c'),
    (ABC_HH_STACKER, 's'),
    (ABC_HH_METRONOME_NORMAL, 'n'),
    (ABC_HH_METRONOME_ACCENT, 'N'),
    (ABC_HH_OPEN, 'o'),
    (ABC_HH_CLOSE, '+'),
    (ABC_SN_ACCENT, 'O'),
    (ABC_SN_BUZZ, 'b'),
    (ABC_HH_NORMAL, 'x'),
    (ABC_SN_XSTICK, 'x'),
    (ABC_SN_GHOST, 'g'),
    (ABC_SN_NORMAL, 'o'),
    (ABC_KI_NORMAL, 'o'),
    (ABC_T1_NORMAL, 'o'),
    (ABC_T2_NORMAL, 'o'),
    (ABC_T3_NORMAL, 'o'),
    (ABC_T4_NORMAL, 'o'),
    (ABC_SN_FLAM, 'f'),
    (ABC_SN_DRAG, 'd'),
    (ABC_HH_ACCENT, 'X'),
    (ABC_KI_SPLASH_AND_KICK, 'X'),
    (ABC_KI_SPLASH, 'x'),
];

static TOKEN_TO_TAB: Lazy<HashMap<&'static str, char>> =
    Lazy::new(|| TOKEN_ENTRIES.iter().copied().collect());

/// Look up a tablature character. `-` is silence; `None` means the character
/// has no meaning for this instrument.
pub fn lookup(instrument: Instrument, c: char) -> Option<NoteSymbol> {
    if c == '-' {
        return Some(NoteSymbol::Off);
    }
    TABLATURE.get(&(instrument, c)).copied()
}

/// Map an ABC token back to a tablature character. Unknown tokens read as `-`.
pub fn unparse_token(instrument: Instrument, token: &str) -> char {
    match TOKEN_TO_TAB.get(token) {
        Some(&c) => c,
        None => {
            log::debug!("no tablature character for token {:?} on {}", token, instrument);
            '-'
        }
    }
}
