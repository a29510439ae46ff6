//! Kerning aware width measurement.
//!
//! Every algorithm in this crate advances its pen through [`Pen`], so a
//! prefix measured while truncating or wrapping produces bit-identical widths
//! when the result is measured again on its own.

use the_text::{
  CodePoint,
  CodePointCursor,
  FormatState,
  GlyphId,
  GlyphMetrics,
  Text,
  chars::{
    CARRIAGE_RETURN,
    LINE_FEED,
    is_line_break,
    is_space,
  },
};

/// Extra advance per glyph when drawing with an outline.
pub const OUTLINE_EXTRA: f32 = 2.0;

/// Spacing adjustments applied on top of glyph advances.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
  /// Added after every plain space.
  pub space_extra: f32,
  /// Adds [`OUTLINE_EXTRA`] after every glyph.
  pub outline:     bool,
}

impl Spacing {
  pub const NONE: Spacing = Spacing {
    space_extra: 0.0,
    outline:     false,
  };
}

/// Pen position on the current line and the glyph it last placed. `y` is
/// the vertical kerning accumulated since the line started.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pen {
  pub x:    f32,
  pub y:    f32,
  pub prev: Option<GlyphId>,
}

impl Pen {
  /// Places `cp` with the given advance and returns the kerned origin of the
  /// glyph as `(x, y)`, with `y` relative to the baseline.
  #[inline]
  pub fn place<M: GlyphMetrics + ?Sized>(
    &mut self,
    metrics: &M,
    cp: CodePoint,
    advance: f32,
    spacing: Spacing,
  ) -> (f32, f32) {
    let kerning = metrics.kerning(self.prev, cp);
    let origin = self.x + kerning.dx;
    let mut x = origin + advance;
    if spacing.outline {
      x += OUTLINE_EXTRA;
    }
    if is_space(cp) {
      x += spacing.space_extra;
    }
    self.x = x;
    self.y += kerning.dy;
    self.prev = Some(kerning.glyph);
    (origin, self.y)
  }

  /// Places `cp` and returns the new pen position.
  #[inline]
  pub fn advance<M: GlyphMetrics + ?Sized>(
    &mut self,
    metrics: &M,
    cp: CodePoint,
    spacing: Spacing,
  ) -> f32 {
    self.place(metrics, cp, metrics.advance_width(cp), spacing);
    self.x
  }

  #[inline]
  pub fn line_break(&mut self) {
    *self = Pen::default();
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
  /// Width of the widest line.
  pub width:           f32,
  /// Width of the line the text ends on.
  pub last_line_width: f32,
  /// Explicit line breaks, with `\r\n` counted once.
  pub newlines:        u32,
}

/// Measures the text under `cursor`. Directives contribute no width.
pub fn measure<M, C>(metrics: &M, mut cursor: C, spacing: Spacing) -> Measurement
where
  M: GlyphMetrics + ?Sized,
  C: CodePointCursor,
{
  let mut format = FormatState::default();
  let mut pen = Pen::default();
  let mut widest = 0.0f32;
  let mut newlines = 0;

  while let Some(cp) = cursor.next_code_point(&mut format) {
    if is_line_break(cp) {
      if cp == CARRIAGE_RETURN {
        cursor.eat(LINE_FEED);
      }
      widest = widest.max(pen.x);
      pen.line_break();
      newlines += 1;
      continue;
    }
    pen.advance(metrics, cp, spacing);
  }

  Measurement {
    width: widest.max(pen.x),
    last_line_width: pen.x,
    newlines,
  }
}

/// Width of a UTF-8 string.
pub fn string_width<M: GlyphMetrics + ?Sized>(metrics: &M, text: &str, spacing: Spacing) -> f32 {
  measure(metrics, Text::utf8(text).cursor(), spacing).width
}

/// Counts explicit line breaks without consulting any metrics.
pub fn newline_count<C: CodePointCursor>(mut cursor: C) -> u32 {
  let mut format = FormatState::default();
  let mut newlines = 0;
  while let Some(cp) = cursor.next_code_point(&mut format) {
    if is_line_break(cp) {
      if cp == CARRIAGE_RETURN {
        cursor.eat(LINE_FEED);
      }
      newlines += 1;
    }
  }
  newlines
}

/// Number of code points that fit before the pen passes `width`. Line
/// breaks count as consumed code points and restart the pen.
pub fn char_count_from_width<M, C>(metrics: &M, mut cursor: C, width: f32, spacing: Spacing) -> usize
where
  M: GlyphMetrics + ?Sized,
  C: CodePointCursor,
{
  let mut format = FormatState::default();
  let mut pen = Pen::default();
  let mut count = 0;

  while let Some(cp) = cursor.next_code_point(&mut format) {
    if is_line_break(cp) {
      if cp == CARRIAGE_RETURN {
        cursor.eat(LINE_FEED);
      }
      pen.line_break();
      count += 1;
      continue;
    }
    if pen.advance(metrics, cp, spacing) > width {
      break;
    }
    count += 1;
  }
  count
}

/// Advance of `cp` placed after `prev`, kerning and spacing included.
pub fn char_width<M: GlyphMetrics + ?Sized>(
  metrics: &M,
  cp: CodePoint,
  prev: Option<GlyphId>,
  spacing: Spacing,
) -> f32 {
  let mut pen = Pen {
    prev,
    ..Pen::default()
  };
  pen.advance(metrics, cp, spacing)
}
