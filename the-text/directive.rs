//! Inline control directives.
//!
//! The only directive is a color override, written `{Color:RRGGBB}`,
//! `{Color:AARRGGBB}` or `{Color:}` to clear it. The tag name is matched
//! without regard to ASCII case. Anything that does not match exactly is
//! ordinary text.

use crate::{
  color::Color,
  encoding::Encoding,
};

/// Longest directive in units, `{Color:AARRGGBB}`.
pub const MAX_DIRECTIVE_LEN: usize = 16;

const COLOR_TAG: &[u8] = b"color:";
const DIRECTIVE_LENS: [usize; 3] = [
  COLOR_TAG.len() + 2,
  COLOR_TAG.len() + 8,
  MAX_DIRECTIVE_LEN,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlDirective {
  /// `None` restores the base color.
  ColorOverride(Option<Color>),
}

impl ControlDirective {
  /// Parses a directive at the very start of `units`, returning it with the
  /// number of units it spans.
  pub fn parse<E: Encoding>(units: &[E::Unit]) -> Option<(Self, usize)> {
    let byte = |i: usize| units.get(i).and_then(|&unit| E::as_ascii(unit));

    if byte(0)? != b'{' {
      return None;
    }
    for (i, expected) in COLOR_TAG.iter().enumerate() {
      if !byte(1 + i)?.eq_ignore_ascii_case(expected) {
        return None;
      }
    }

    let digits_start = 1 + COLOR_TAG.len();
    let mut value: u32 = 0;
    let mut digits = 0;
    while let Some(digit) = byte(digits_start + digits).and_then(|b| (b as char).to_digit(16)) {
      digits += 1;
      if digits > 8 {
        return None;
      }
      value = (value << 4) | digit;
    }
    if byte(digits_start + digits)? != b'}' {
      return None;
    }

    let color = match digits {
      0 => None,
      6 => Some(Color::from_rgb(value)),
      8 => Some(Color::from_argb(value)),
      _ => return None,
    };
    Some((ControlDirective::ColorOverride(color), digits_start + digits + 1))
  }

  /// Parses a directive that ends exactly at the back of `units`.
  pub fn parse_ending_at<E: Encoding>(units: &[E::Unit]) -> Option<(Self, usize)> {
    DIRECTIVE_LENS.iter().find_map(|&len| {
      let start = units.len().checked_sub(len)?;
      match Self::parse::<E>(&units[start..]) {
        Some((directive, parsed)) if parsed == len => Some((directive, len)),
        _ => None,
      }
    })
  }
}

/// Formatting in effect at a point in the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatState {
  pub color_override: Option<Color>,
}

impl FormatState {
  pub fn apply(&mut self, directive: ControlDirective) {
    match directive {
      ControlDirective::ColorOverride(color) => self.color_override = color,
    }
  }

  /// Resolves the color to draw with. An override with zero alpha defers to
  /// `base`.
  pub fn color(&self, base: Color) -> Color {
    match self.color_override {
      Some(color) if color.a != 0 => color,
      _ => base,
    }
  }
}
