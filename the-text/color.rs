use std::{
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer,
};
use thiserror::Error;

/// 8-bit per channel color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
  #[error("expected 6 or 8 hex digits, found {0}")]
  Length(usize),
  #[error("invalid hex digit {0:?}")]
  Digit(char),
}

impl Color {
  pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
  pub const BLACK: Color = Color::rgb(0, 0, 0);
  pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

  pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self { r, g, b, a }
  }

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self::new(r, g, b, 0xFF)
  }

  /// Opaque color from `0xRRGGBB`; the top byte is ignored.
  pub const fn from_rgb(value: u32) -> Self {
    Self::from_argb(value | 0xFF00_0000)
  }

  pub const fn from_argb(value: u32) -> Self {
    let [a, r, g, b] = value.to_be_bytes();
    Self { r, g, b, a }
  }

  pub const fn to_argb(self) -> u32 {
    u32::from_be_bytes([self.a, self.r, self.g, self.b])
  }

  pub fn to_rgba_f32(self) -> [f32; 4] {
    [self.r, self.g, self.b, self.a].map(|c| c as f32 / 255.0)
  }
}

impl Default for Color {
  fn default() -> Self {
    Self::WHITE
  }
}

impl FromStr for Color {
  type Err = ParseColorError;

  /// Accepts `RRGGBB` or `AARRGGBB`, optionally prefixed with `#`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    let mut value: u32 = 0;
    for ch in digits.chars() {
      let digit = ch.to_digit(16).ok_or(ParseColorError::Digit(ch))?;
      value = value.wrapping_shl(4) | digit;
    }
    match digits.chars().count() {
      6 => Ok(Self::from_rgb(value)),
      8 => Ok(Self::from_argb(value)),
      n => Err(ParseColorError::Length(n)),
    }
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.a == 0xFF {
      write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    } else {
      write!(f, "#{:08x}", self.to_argb())
    }
  }
}

impl Serialize for Color {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Color {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}
