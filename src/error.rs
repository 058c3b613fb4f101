//! # Error Types
//!
//! This module defines the error and diagnostic types for the groove converter.
//!
//! Converting a groove never fails: malformed input degrades to a best-effort
//! document. Problems found along the way are collected as [`Diagnostic`]s and
//! handed back next to the output. [`GrooveError`] is reserved for the strict
//! parsers and for the outer surfaces (configuration files, I/O).
//!
//! ## Error Types
//! - `TimeSignature` - A time signature string that is not `top/bottom`
//! - `UnknownInstrument` - A track tag that names no instrument
//! - `Config` - Invalid render options
//! - `Io` - Reading input or writing output failed
//!
//! ## Usage
//! ```rust
//! use groove::{GrooveError, MeterInfo};
//!
//! match MeterInfo::from_str_strict("7/5") {
//!     Ok(meter) => println!("{}/{}", meter.top, meter.bottom),
//!     Err(GrooveError::TimeSignature(message)) => eprintln!("{}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use log::warn;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrooveError {
    /// Time signature that cannot be used.
    ///
    /// # Example
    /// ```
    /// # use groove::GrooveError;
    /// let err = GrooveError::TimeSignature("expected top/bottom, got '44'".to_string());
    /// assert_eq!(err.to_string(), "Invalid time signature: expected top/bottom, got '44'");
    /// ```
    #[error("Invalid time signature: {0}")]
    TimeSignature(String),

    /// Track tag that does not name an instrument (valid: Stickings, H, HH, S, K, B, T1-T4).
    #[error("Unknown instrument tag '{0}'")]
    UnknownInstrument(String),

    /// Render options that could not be loaded.
    #[error("Invalid render options: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An advisory message produced while converting a groove.
///
/// Diagnostics never interrupt output generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
}

/// Ordered list of diagnostics collected during one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.items.push(Diagnostic { message });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// True if any diagnostic message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.items.iter().any(|d| d.message.contains(needle))
    }
}
