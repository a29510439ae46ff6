//! Text layout for overlay rendering.
//!
//! Measurement, ellipsis truncation, greedy line splitting and glyph span
//! batching over any [`the_text::CodePointCursor`]. Everything here is a
//! pure function of the text, a [`the_text::GlyphMetrics`] provider and the
//! caller's budgets; "does not fit" is reported as data, never as an error.

pub mod align;
pub mod format;
pub mod measure;
pub mod span;
pub mod split;
pub mod truncate;

pub use align::{
  Quad,
  TextAlignment,
  align_text,
};
pub use format::{
  FormatError,
  TextFormat,
};
pub use measure::{
  Measurement,
  Pen,
  Spacing,
  char_count_from_width,
  char_width,
  measure,
  newline_count,
  string_width,
};
pub use span::{
  CapacityError,
  DrawTextFlags,
  GlyphInstance,
  Placement,
  SPAN_CAPACITY,
  Span,
  SpanBuilder,
  SpanConsumer,
  SpanState,
  StopReason,
};
pub use split::{
  Line,
  SplitLines,
  split,
};
pub use truncate::{
  Truncated,
  ellipsis,
  ellipsis_double_ended,
};
