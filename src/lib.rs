pub mod abc;
pub mod api;
pub mod config;
pub mod counts;
pub mod display;
pub mod error;
pub mod groove;
pub mod grouping;
pub mod packer;
pub mod scale;
pub mod session;
pub mod symbols;
pub mod tablature;

pub use abc::to_abc;
pub use api::{render_abc, render_abc_with_options, score_to_abc, Conversion};
pub use config::RenderOptions;
pub use display::{render_groove, tempo_caption, Engraver, Engraving, RenderedGroove, SurfaceIds};
pub use error::*;
pub use groove::*;
pub use session::{decode, encode};
pub use symbols::{Instrument, NoteSymbol};
pub use tablature::{default_tablature, parse_tablature, tab_line};
