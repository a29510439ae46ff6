//! Code points, text encodings and the glyph metrics interface.
//!
//! This crate is the leaf of the overlay text stack. It knows how to walk
//! encoded text one code point at a time, how to recognise the inline
//! `{Color:...}` directives embedded in overlay strings, and what a glyph
//! metrics provider has to answer. It contains no layout logic.

pub mod chars;
pub mod color;
pub mod cursor;
pub mod directive;
pub mod encoding;
pub mod metrics;

/// A decoded character value.
///
/// Not validated as a Unicode scalar: the value is handed to the glyph
/// metrics provider as-is.
pub type CodePoint = u32;

pub use chars::Separators;
pub use color::Color;
pub use cursor::{
  CodePointCursor,
  Cursor,
  Token,
};
pub use directive::{
  ControlDirective,
  FormatState,
};
pub use encoding::{
  Encoding,
  Latin1,
  Text,
  Ucs4,
  Utf8,
  Utf16,
};
pub use metrics::{
  FixedMetrics,
  FontProperties,
  GlyphId,
  GlyphMetrics,
  GlyphProperties,
  Kerning,
};
