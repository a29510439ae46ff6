use serde::{
  Deserialize,
  Serialize,
};
use the_text::{
  CodePointCursor,
  GlyphMetrics,
};

use crate::measure::{
  Spacing,
  measure,
};

/// Axis aligned rectangle in screen space, y growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quad {
  pub min: [f32; 2],
  pub max: [f32; 2],
}

impl Quad {
  pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
    Self { min, max }
  }

  pub fn width(&self) -> f32 {
    self.max[0] - self.min[0]
  }

  pub fn height(&self) -> f32 {
    self.max[1] - self.min[1]
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
  #[default]
  TopLeft,
  Top,
  TopRight,
  Left,
  Center,
  Right,
  BottomLeft,
  Bottom,
  BottomRight,
}

#[derive(Clone, Copy, PartialEq)]
enum Anchor {
  Start,
  Center,
  End,
}

impl TextAlignment {
  fn anchors(self) -> (Anchor, Anchor) {
    use Anchor::*;
    match self {
      Self::TopLeft => (Start, Start),
      Self::Top => (Center, Start),
      Self::TopRight => (End, Start),
      Self::Left => (Start, Center),
      Self::Center => (Center, Center),
      Self::Right => (End, Center),
      Self::BottomLeft => (Start, End),
      Self::Bottom => (Center, End),
      Self::BottomRight => (End, End),
    }
  }
}

/// Pen origin of the first line's baseline for `text` aligned inside `quad`.
///
/// Top anchored text hangs its first line from the full ascender, bottom
/// anchored text rests its last line on the descender, and vertically centred
/// text centres the block from the accent-free ascender down to the last
/// baseline.
pub fn align_text<M, C>(
  metrics: &M,
  quad: Quad,
  alignment: TextAlignment,
  text: C,
  spacing: Spacing,
) -> [f32; 2]
where
  M: GlyphMetrics + ?Sized,
  C: CodePointCursor,
{
  let font = metrics.font_properties();
  let (horizontal, vertical) = alignment.anchors();

  let measured = if horizontal == Anchor::Start && vertical == Anchor::Start {
    Default::default()
  } else {
    measure(metrics, text, spacing)
  };
  let extra_lines = measured.newlines as f32 * font.line_height;

  let x = match horizontal {
    Anchor::Start => quad.min[0],
    Anchor::Center => 0.5 * (quad.min[0] + quad.max[0] - measured.width),
    Anchor::End => quad.max[0] - measured.width,
  };
  let y = match vertical {
    Anchor::Start => quad.min[1] + font.ascender,
    Anchor::Center => {
      let block = extra_lines + font.ascender_excluding_accent;
      0.5 * (quad.min[1] + quad.max[1] - block) + font.ascender_excluding_accent
    },
    // Measured up from the last baseline, so neither ascender takes part.
    Anchor::End => quad.max[1] - font.descender - extra_lines,
  };
  [x, y]
}

#[cfg(test)]
mod tests {
  use the_text::{
    CodePoint,
    FixedMetrics,
    FontProperties,
    GlyphId,
    GlyphProperties,
    Kerning,
    Text,
  };

  use super::*;

  fn aligned(alignment: TextAlignment, text: &str) -> [f32; 2] {
    let quad = Quad::new([0.0, 0.0], [200.0, 100.0]);
    align_text(
      &FixedMetrics::default(),
      quad,
      alignment,
      Text::utf8(text).cursor(),
      Spacing::NONE,
    )
  }

  #[test]
  fn single_line_anchors() {
    assert_eq!(aligned(TextAlignment::TopLeft, "abcd"), [0.0, 16.0]);
    assert_eq!(aligned(TextAlignment::Top, "abcd"), [80.0, 16.0]);
    assert_eq!(aligned(TextAlignment::TopRight, "abcd"), [160.0, 16.0]);
    assert_eq!(aligned(TextAlignment::Center, "abcd"), [80.0, 58.0]);
    assert_eq!(aligned(TextAlignment::BottomRight, "abcd"), [160.0, 96.0]);
  }

  #[test]
  fn multi_line_blocks_use_widest_line() {
    assert_eq!(aligned(TextAlignment::Right, "ab\nabcd"), [160.0, 48.0]);
    assert_eq!(aligned(TextAlignment::Bottom, "ab\nabcd"), [80.0, 76.0]);
    assert_eq!(aligned(TextAlignment::BottomLeft, "a\nb\nc"), [0.0, 56.0]);
  }

  #[test]
  fn directives_do_not_shift_alignment() {
    assert_eq!(
      aligned(TextAlignment::Center, "{color:ff0000}abcd"),
      aligned(TextAlignment::Center, "abcd")
    );
  }

  struct Accented(FixedMetrics);

  impl GlyphMetrics for Accented {
    fn glyph_properties(&self, cp: CodePoint) -> GlyphProperties {
      self.0.glyph_properties(cp)
    }

    fn kerning(&self, prev: Option<GlyphId>, cp: CodePoint) -> Kerning {
      self.0.kerning(prev, cp)
    }

    fn kerning_reverse(&self, next: Option<GlyphId>, cp: CodePoint) -> Kerning {
      self.0.kerning_reverse(next, cp)
    }

    fn font_properties(&self) -> FontProperties {
      FontProperties {
        ascender_excluding_accent: 12.0,
        ..self.0.font_properties()
      }
    }
  }

  #[test]
  fn centring_uses_the_accent_free_ascender() {
    let metrics = Accented(FixedMetrics::default());
    let quad = Quad::new([10.0, 10.0], [110.0, 50.0]);
    let at = |alignment| align_text(&metrics, quad, alignment, Text::utf8("x").cursor(), Spacing::NONE);

    assert_eq!(at(TextAlignment::TopLeft), [10.0, 26.0]);
    assert_eq!(at(TextAlignment::Left), [10.0, 36.0]);
    assert_eq!(at(TextAlignment::BottomLeft), [10.0, 46.0]);
  }

  #[test]
  fn alignment_reads_from_config_names() {
    let alignment: TextAlignment = toml::from_str::<std::collections::HashMap<String, TextAlignment>>(
      r#"anchor = "bottom-right""#,
    )
    .unwrap()["anchor"];
    assert_eq!(alignment, TextAlignment::BottomRight);
  }
}
