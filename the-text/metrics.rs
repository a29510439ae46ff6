//! The glyph metrics provider interface.
//!
//! Font loading, rasterization and atlas management live behind
//! [`GlyphMetrics`]. Layout only ever asks for advances, kerning and bitmap
//! extents, so anything able to answer those can drive it.

use crate::{
  CodePoint,
  chars,
};

/// Opaque glyph identity used to chain kerning lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphProperties {
  pub advance:         f32,
  pub width:           u32,
  pub height:          u32,
  /// Offset from the pen position to the bitmap's left edge.
  pub bitmap_offset_x: i32,
  /// Offset from the baseline to the bitmap's top edge; usually negative.
  pub bitmap_offset_y: i32,
}

impl GlyphProperties {
  #[inline]
  pub fn has_bitmap(&self) -> bool {
    self.width != 0 && self.height != 0
  }
}

/// Adjustment for placing a code point next to a neighbouring glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kerning {
  pub dx:    f32,
  pub dy:    f32,
  /// Glyph of the code point that was looked up, for the next lookup.
  pub glyph: GlyphId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontProperties {
  pub line_height:               f32,
  pub ascender:                  f32,
  pub ascender_excluding_accent: f32,
  pub descender:                 f32,
}

pub trait GlyphMetrics {
  fn glyph_properties(&self, cp: CodePoint) -> GlyphProperties;

  /// Kerning of `cp` placed after `prev`.
  fn kerning(&self, prev: Option<GlyphId>, cp: CodePoint) -> Kerning;

  /// Kerning of `cp` placed before `next`, for scanning text backwards.
  fn kerning_reverse(&self, next: Option<GlyphId>, cp: CodePoint) -> Kerning;

  fn font_properties(&self) -> FontProperties;

  fn advance_width(&self, cp: CodePoint) -> f32 {
    self.glyph_properties(cp).advance
  }

  /// Bulk lookup. `code_points` is sorted and free of duplicates and `out`
  /// has the same length.
  fn glyph_properties_sorted(&self, code_points: &[CodePoint], out: &mut [GlyphProperties]) {
    debug_assert!(code_points.is_sorted());
    debug_assert_eq!(code_points.len(), out.len());
    for (&cp, props) in code_points.iter().zip(out) {
      *props = self.glyph_properties(cp);
    }
  }
}

impl<M: GlyphMetrics + ?Sized> GlyphMetrics for &M {
  fn glyph_properties(&self, cp: CodePoint) -> GlyphProperties {
    (**self).glyph_properties(cp)
  }

  fn kerning(&self, prev: Option<GlyphId>, cp: CodePoint) -> Kerning {
    (**self).kerning(prev, cp)
  }

  fn kerning_reverse(&self, next: Option<GlyphId>, cp: CodePoint) -> Kerning {
    (**self).kerning_reverse(next, cp)
  }

  fn font_properties(&self) -> FontProperties {
    (**self).font_properties()
  }

  fn advance_width(&self, cp: CodePoint) -> f32 {
    (**self).advance_width(cp)
  }

  fn glyph_properties_sorted(&self, code_points: &[CodePoint], out: &mut [GlyphProperties]) {
    (**self).glyph_properties_sorted(code_points, out)
  }
}

/// Monospace provider with optional per code point overrides and kerning
/// pairs. Glyph ids are the code points themselves and whitespace has no
/// bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedMetrics {
  pub advance:     f32,
  pub line_height: f32,
  pub ascender:    f32,
  pub descender:   f32,
  advances:        Vec<(CodePoint, f32)>,
  kerning_pairs:   Vec<(CodePoint, CodePoint, f32)>,
}

impl FixedMetrics {
  pub fn new(advance: f32, line_height: f32) -> Self {
    Self {
      advance,
      line_height,
      ascender: line_height * 0.8,
      descender: line_height * 0.2,
      advances: Vec::new(),
      kerning_pairs: Vec::new(),
    }
  }

  pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
    self.advances.push((ch as CodePoint, advance));
    self
  }

  /// Shifts `next` by `dx` when it follows `prev`.
  pub fn with_kerning(mut self, prev: char, next: char, dx: f32) -> Self {
    self
      .kerning_pairs
      .push((prev as CodePoint, next as CodePoint, dx));
    self
  }

  fn pair(&self, prev: CodePoint, next: CodePoint) -> f32 {
    self
      .kerning_pairs
      .iter()
      .find(|&&(p, n, _)| p == prev && n == next)
      .map_or(0.0, |&(_, _, dx)| dx)
  }
}

impl Default for FixedMetrics {
  fn default() -> Self {
    Self::new(10.0, 20.0)
  }
}

impl GlyphMetrics for FixedMetrics {
  fn glyph_properties(&self, cp: CodePoint) -> GlyphProperties {
    let advance = self
      .advances
      .iter()
      .find(|&&(c, _)| c == cp)
      .map_or(self.advance, |&(_, advance)| advance);
    if chars::is_whitespace(cp) || chars::is_line_break(cp) {
      return GlyphProperties {
        advance,
        ..Default::default()
      };
    }
    let height = self.ascender.max(0.0) as u32;
    GlyphProperties {
      advance,
      width: advance.max(0.0) as u32,
      height,
      bitmap_offset_x: 0,
      bitmap_offset_y: -(height as i32),
    }
  }

  fn kerning(&self, prev: Option<GlyphId>, cp: CodePoint) -> Kerning {
    Kerning {
      dx:    prev.map_or(0.0, |GlyphId(prev)| self.pair(prev, cp)),
      dy:    0.0,
      glyph: GlyphId(cp),
    }
  }

  fn kerning_reverse(&self, next: Option<GlyphId>, cp: CodePoint) -> Kerning {
    Kerning {
      dx:    next.map_or(0.0, |GlyphId(next)| self.pair(cp, next)),
      dy:    0.0,
      glyph: GlyphId(cp),
    }
  }

  fn font_properties(&self) -> FontProperties {
    FontProperties {
      line_height:               self.line_height,
      ascender:                  self.ascender,
      ascender_excluding_accent: self.ascender,
      descender:                 self.descender,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_metrics_defaults() {
    let metrics = FixedMetrics::default();
    let a = metrics.glyph_properties('a' as CodePoint);
    assert_eq!(a.advance, 10.0);
    assert!(a.has_bitmap());
    assert_eq!(a.bitmap_offset_y, -16);
    assert!(!metrics.glyph_properties(' ' as CodePoint).has_bitmap());
    assert_eq!(metrics.advance_width(' ' as CodePoint), 10.0);
  }

  #[test]
  fn kerning_pairs_apply_in_both_directions() {
    let metrics = FixedMetrics::default().with_kerning('A', 'V', -2.0);
    let forward = metrics.kerning(Some(GlyphId('A' as u32)), 'V' as CodePoint);
    assert_eq!(forward.dx, -2.0);
    assert_eq!(forward.glyph, GlyphId('V' as u32));
    let backward = metrics.kerning_reverse(Some(GlyphId('V' as u32)), 'A' as CodePoint);
    assert_eq!(backward.dx, -2.0);
    assert_eq!(metrics.kerning(None, 'V' as CodePoint).dx, 0.0);
  }

  #[test]
  fn sorted_bulk_lookup_matches_single_lookups() {
    let metrics = FixedMetrics::default().with_advance('i', 4.0);
    let code_points = [' ' as CodePoint, 'a' as CodePoint, 'i' as CodePoint];
    let mut out = [GlyphProperties::default(); 3];
    (&metrics).glyph_properties_sorted(&code_points, &mut out);
    for (cp, props) in code_points.iter().zip(out) {
      assert_eq!(props, metrics.glyph_properties(*cp));
    }
    assert_eq!(out[2].advance, 4.0);
  }
}
